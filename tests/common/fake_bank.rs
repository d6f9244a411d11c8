use bank_api_suite::domain_model::*;
use bank_api_suite::infra_fake::InMemoryTestData;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::Filter;

#[derive(Debug, Deserialize)]
struct LoginBody {
    login: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct VerificationBody {
    login: String,
    code: String,
}

#[derive(Debug, Deserialize)]
struct TransferBody {
    from: String,
    to: String,
    amount: i64,
}

/// Behaves like the demo banking service. `/auth` writes a one-time code to the
/// store, in the background when `code_delay` is set. `/auth/verification`
/// trades the latest code for a token. `/cards` lists masked numbers in reverse
/// insertion order.
pub struct FakeBank {
    store: Arc<InMemoryTestData>,
    code_delay: Duration,
    sessions: Mutex<HashMap<String, UserId>>,
}

type Reply = WithStatus<Json>;

fn reply(status: StatusCode, body: serde_json::Value) -> Reply {
    warp::reply::with_status(warp::reply::json(&body), status)
}

fn mask(number: &str) -> String {
    let tail = &number[number.len().saturating_sub(4)..];
    format!("**** **** **** {tail}")
}

impl FakeBank {
    pub fn new(store: Arc<InMemoryTestData>, code_delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            store,
            code_delay,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// Serves the fake under `/api` on an ephemeral port.
    pub fn serve(self: &Arc<Self>) -> SocketAddr {
        let bank = self.clone();
        let with_bank = warp::any().map(move || bank.clone());

        let login = warp::path!("api" / "auth")
            .and(warp::post())
            .and(warp::body::json())
            .and(with_bank.clone())
            .map(|body: LoginBody, bank: Arc<FakeBank>| bank.login(body));

        let verification = warp::path!("api" / "auth" / "verification")
            .and(warp::post())
            .and(warp::body::json())
            .and(with_bank.clone())
            .map(|body: VerificationBody, bank: Arc<FakeBank>| bank.verify(body));

        let cards = warp::path!("api" / "cards")
            .and(warp::get())
            .and(warp::header::optional::<String>("authorization"))
            .and(with_bank.clone())
            .map(|auth: Option<String>, bank: Arc<FakeBank>| bank.cards(auth));

        let transfer = warp::path!("api" / "transfer")
            .and(warp::post())
            .and(warp::header::optional::<String>("authorization"))
            .and(warp::body::json())
            .and(with_bank)
            .map(|auth: Option<String>, body: TransferBody, bank: Arc<FakeBank>| {
                bank.transfer(auth, body)
            });

        let routes = login.or(verification).unify().or(cards).unify().or(transfer).unify();
        let (address, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        address
    }

    fn login(&self, body: LoginBody) -> Reply {
        match self.store.user_by_login(&body.login) {
            Some(user) if user.password == body.password => {
                if self.code_delay.is_zero() {
                    self.store.issue_code(&user.id);
                } else {
                    let store = self.store.clone();
                    let delay = self.code_delay;
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        store.issue_code(&user.id);
                    });
                }
                reply(StatusCode::OK, json!({"status": "ok"}))
            }
            _ => reply(
                StatusCode::BAD_REQUEST,
                json!({
                    "code": "AUTH_INVALID",
                    "message": "Неверно указан логин или пароль",
                }),
            ),
        }
    }

    fn verify(&self, body: VerificationBody) -> Reply {
        let Some(user) = self.store.user_by_login(&body.login) else {
            return reply(StatusCode::BAD_REQUEST, json!({"code": "AUTH_INVALID"}));
        };
        match self.store.latest_code_of(&user.id) {
            Some(code) if code.code == body.code => {
                let token = uuid::Uuid::new_v4().to_string();
                self.sessions
                    .lock()
                    .unwrap()
                    .insert(token.clone(), user.id.clone());
                reply(StatusCode::OK, json!({ "token": token }))
            }
            _ => reply(StatusCode::BAD_REQUEST, json!({"code": "AUTH_INVALID"})),
        }
    }

    fn session(&self, authorization: Option<String>) -> Option<UserId> {
        let token = authorization?.strip_prefix("Bearer ")?.to_owned();
        self.sessions.lock().unwrap().get(&token).cloned()
    }

    fn cards(&self, authorization: Option<String>) -> Reply {
        let Some(user_id) = self.session(authorization) else {
            return reply(StatusCode::UNAUTHORIZED, json!({"code": "AUTH_INVALID"}));
        };
        let listing: Vec<serde_json::Value> = self
            .store
            .cards_of(&user_id)
            .iter()
            .rev()
            .map(|card| {
                json!({"id": card.id, "number": mask(&card.number), "balance": card.balance})
            })
            .collect();
        reply(StatusCode::OK, serde_json::Value::Array(listing))
    }

    fn transfer(&self, authorization: Option<String>, body: TransferBody) -> Reply {
        if self.session(authorization).is_none() {
            return reply(StatusCode::UNAUTHORIZED, json!({"code": "AUTH_INVALID"}));
        }
        match self.store.apply_transfer(&body.from, &body.to, body.amount) {
            Ok(()) => reply(StatusCode::OK, serde_json::Value::Null),
            Err(e) => reply(
                StatusCode::BAD_REQUEST,
                json!({"code": "TRANSFER_REJECTED", "message": e.to_string()}),
            ),
        }
    }
}
