use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::settings;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Exponential backoff used while the service writes the code asynchronously.
#[derive(Debug, Clone, Copy)]
pub struct CodePolling {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub deadline: Duration,
}

impl CodePolling {
    /// Delay before the attempt following one that slept `current`.
    fn next_delay(&self, current: Duration) -> Duration {
        (current * 2).min(self.max_delay)
    }
}

impl Default for CodePolling {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_millis(500),
            deadline: Duration::from_secs(5),
        }
    }
}

impl From<&settings::AuthCode> for CodePolling {
    fn from(config: &settings::AuthCode) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            deadline: Duration::from_millis(config.deadline_ms),
        }
    }
}

pub struct RealAuthService {
    api: Arc<dyn BankApi>,
    user_repo: Arc<dyn UserRepo>,
    auth_code_repo: Arc<dyn AuthCodeRepo>,
    polling: CodePolling,
}

impl RealAuthService {
    pub fn new(
        api: Arc<dyn BankApi>,
        user_repo: Arc<dyn UserRepo>,
        auth_code_repo: Arc<dyn AuthCodeRepo>,
        polling: CodePolling,
    ) -> Self {
        Self {
            api,
            user_repo,
            auth_code_repo,
            polling,
        }
    }
}

impl RealAuthService {
    async fn snapshot_codes(&self, user_id: &UserId) -> Result<CodeSnapshot, AuthError> {
        let Some(latest) = self.auth_code_repo.find_latest_auth_code(user_id).await? else {
            return Ok(CodeSnapshot::default());
        };
        let ties = self
            .auth_code_repo
            .find_auth_codes_since(user_id, latest.created)
            .await?;
        Ok(CodeSnapshot::new(ties.into_iter().chain(Some(latest))))
    }

    /// Rows that may hold the code issued after `snapshot` was taken.
    async fn codes_after(
        &self,
        user_id: &UserId,
        snapshot: &CodeSnapshot,
    ) -> Result<Vec<AuthCodeRecord>, AuthError> {
        Ok(match snapshot.since() {
            Some(since) => {
                self.auth_code_repo
                    .find_auth_codes_since(user_id, since)
                    .await?
            }
            None => self
                .auth_code_repo
                .find_latest_auth_code(user_id)
                .await?
                .into_iter()
                .collect(),
        })
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn login(&self, credentials: &Credentials) -> Result<LoginTicket, AuthError> {
        let user = self
            .user_repo
            .find_user_by_login(&credentials.login)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(credentials.login.clone()))?;

        // Read before logging in, so the wait below can tell the new code apart.
        let snapshot = self.snapshot_codes(&user.id).await?;

        let response = self.api.login(credentials).await?;
        match response.status {
            StatusCode::OK => {
                tracing::debug!(login = %credentials.login, "password accepted");
                Ok(LoginTicket { user, snapshot })
            }
            status @ (StatusCode::BAD_REQUEST
            | StatusCode::UNAUTHORIZED
            | StatusCode::FORBIDDEN) => Err(AuthError::InvalidCredentials(status)),
            status => Err(AuthError::UnexpectedStatus(status)),
        }
    }

    async fn await_fresh_code(&self, ticket: &LoginTicket) -> Result<AuthCodeRecord, AuthError> {
        let user_id = &ticket.user.id;
        let started = Instant::now();
        let mut delay = self.polling.initial_delay;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let candidates = self.codes_after(user_id, &ticket.snapshot).await?;
            if let Some(code) = ticket.snapshot.fresh(&candidates) {
                tracing::debug!(%user_id, attempts, "auth code found");
                return Ok(code);
            }

            let elapsed = started.elapsed();
            if elapsed >= self.polling.deadline {
                tracing::warn!(%user_id, attempts, "gave up waiting for auth code");
                return Err(if candidates.is_empty() {
                    AuthError::CodeNotIssued(user_id.clone())
                } else {
                    AuthError::CodeWaitTimedOut {
                        user_id: user_id.clone(),
                        waited_ms: elapsed.as_millis(),
                    }
                });
            }

            tokio::time::sleep(delay.min(self.polling.deadline - elapsed)).await;
            delay = self.polling.next_delay(delay);
        }
    }

    async fn verify(&self, login: &str, code: &AuthCodeRecord) -> Result<SessionToken, AuthError> {
        let request = VerificationRequest {
            login: login.to_owned(),
            code: code.code.clone(),
        };
        let response = self.api.verify(&request).await?;
        if !response.is_ok() {
            return Err(AuthError::VerificationRejected(response.status));
        }

        response
            .field("token")
            .filter(|token| !token.is_empty())
            .map(SessionToken::new)
            .ok_or(AuthError::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_fake::InMemoryTestData;
    use chrono::{DateTime, Utc};
    use serde_json::json;
    use std::sync::Mutex;

    /// Scripted service: answers with fixed statuses and, on a successful
    /// login, optionally writes a code into the shared store.
    struct ScriptedBank {
        store: Arc<InMemoryTestData>,
        login_status: StatusCode,
        issue_code: bool,
        verify_status: StatusCode,
        verify_body: serde_json::Value,
        verified_codes: Mutex<Vec<String>>,
    }

    impl ScriptedBank {
        fn happy(store: Arc<InMemoryTestData>) -> Self {
            Self {
                store,
                login_status: StatusCode::OK,
                issue_code: true,
                verify_status: StatusCode::OK,
                verify_body: json!({"token": "session-token-1"}),
                verified_codes: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl BankApi for ScriptedBank {
        async fn login(&self, credentials: &Credentials) -> Result<ApiResponse, TransportError> {
            if self.login_status == StatusCode::OK && self.issue_code {
                if let Some(user) = self.store.user_by_login(&credentials.login) {
                    self.store.issue_code(&user.id);
                }
            }
            Ok(ApiResponse {
                status: self.login_status,
                body: serde_json::Value::Null,
            })
        }

        async fn verify(
            &self,
            request: &VerificationRequest,
        ) -> Result<ApiResponse, TransportError> {
            self.verified_codes.lock().unwrap().push(request.code.clone());
            Ok(ApiResponse {
                status: self.verify_status,
                body: self.verify_body.clone(),
            })
        }

        async fn cards(&self, _token: &SessionToken) -> Result<ApiResponse, TransportError> {
            unreachable!("not used by the auth workflow")
        }

        async fn transfer(
            &self,
            _token: &SessionToken,
            _request: &TransferRequest,
        ) -> Result<ApiResponse, TransportError> {
            unreachable!("not used by the auth workflow")
        }
    }

    /// Code table whose clock stamps every row with the same second. Among
    /// equal timestamps "latest" answers with the row inserted first.
    struct FrozenClockCodes {
        store: Arc<InMemoryTestData>,
        created: DateTime<Utc>,
    }

    impl FrozenClockCodes {
        fn rows(&self, user_id: &UserId) -> Vec<AuthCodeRecord> {
            let mut rows = self.store.codes_of(user_id);
            for row in &mut rows {
                row.created = self.created;
            }
            rows
        }
    }

    #[async_trait::async_trait]
    impl AuthCodeRepo for FrozenClockCodes {
        async fn find_latest_auth_code(
            &self,
            user_id: &UserId,
        ) -> Result<Option<AuthCodeRecord>, DataAccessError> {
            Ok(self.rows(user_id).into_iter().next())
        }

        async fn find_auth_codes_since(
            &self,
            user_id: &UserId,
            since: DateTime<Utc>,
        ) -> Result<Vec<AuthCodeRecord>, DataAccessError> {
            let mut rows = self.rows(user_id);
            rows.retain(|row| row.created >= since);
            Ok(rows)
        }
    }

    fn fast_polling() -> CodePolling {
        CodePolling {
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            deadline: Duration::from_millis(80),
        }
    }

    fn service(bank: Arc<ScriptedBank>, store: Arc<InMemoryTestData>) -> RealAuthService {
        RealAuthService::new(bank, store.clone(), store, fast_polling())
    }

    fn vasya() -> Credentials {
        Credentials::new("vasya", "qwerty123")
    }

    #[tokio::test]
    async fn authenticates_with_the_freshly_issued_code() {
        let store = Arc::new(InMemoryTestData::new());
        let user = store.seed_user("vasya", "qwerty123");
        let stale = store.issue_code(&user.id);
        let bank = Arc::new(ScriptedBank::happy(store.clone()));

        let token = service(bank.clone(), store.clone())
            .authenticate(&vasya())
            .await
            .unwrap();

        assert_eq!(token.as_str(), "session-token-1");
        let latest = store.find_latest_auth_code(&user.id).await.unwrap().unwrap();
        let verified = bank.verified_codes.lock().unwrap().clone();
        assert_eq!(verified, vec![latest.code.clone()]);
        assert_ne!(latest.id, stale.id);
    }

    #[tokio::test]
    async fn code_sharing_the_previous_timestamp_is_accepted() {
        let store = Arc::new(InMemoryTestData::new());
        let user = store.seed_user("vasya", "qwerty123");
        let earlier = store.issue_code(&user.id);
        let bank = Arc::new(ScriptedBank::happy(store.clone()));
        let codes = Arc::new(FrozenClockCodes {
            store: store.clone(),
            created: earlier.created,
        });
        let auth = RealAuthService::new(bank.clone(), store.clone(), codes, fast_polling());

        auth.authenticate(&vasya()).await.unwrap();
        auth.authenticate(&vasya()).await.unwrap();

        let issued: Vec<String> = store.codes_of(&user.id).into_iter().map(|c| c.code).collect();
        assert_eq!(issued.len(), 3);
        assert_eq!(*bank.verified_codes.lock().unwrap(), issued[1..].to_vec());
    }

    #[tokio::test]
    async fn each_call_runs_a_new_cycle() {
        let store = Arc::new(InMemoryTestData::new());
        store.seed_user("vasya", "qwerty123");
        let bank = Arc::new(ScriptedBank::happy(store.clone()));
        let auth = service(bank.clone(), store.clone());

        auth.authenticate(&vasya()).await.unwrap();
        auth.authenticate(&vasya()).await.unwrap();

        assert_eq!(bank.verified_codes.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_login_is_reported_before_any_request() {
        let store = Arc::new(InMemoryTestData::new());
        let bank = Arc::new(ScriptedBank::happy(store.clone()));

        let err = service(bank, store).login(&vasya()).await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound(login) if login == "vasya"));
    }

    #[rstest::rstest]
    #[case(StatusCode::BAD_REQUEST, true)]
    #[case(StatusCode::UNAUTHORIZED, true)]
    #[case(StatusCode::FORBIDDEN, true)]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, false)]
    #[case(StatusCode::CREATED, false)]
    #[tokio::test]
    async fn login_rejections_are_classified(
        #[case] status: StatusCode,
        #[case] credentials: bool,
    ) {
        let store = Arc::new(InMemoryTestData::new());
        store.seed_user("vasya", "qwerty123");
        let mut bank = ScriptedBank::happy(store.clone());
        bank.login_status = status;

        let err = service(Arc::new(bank), store)
            .authenticate(&vasya())
            .await
            .unwrap_err();
        if credentials {
            assert!(matches!(err, AuthError::InvalidCredentials(s) if s == status));
        } else {
            assert!(matches!(err, AuthError::UnexpectedStatus(s) if s == status));
        }
    }

    #[tokio::test]
    async fn missing_code_is_distinct_from_stale_code() {
        let store = Arc::new(InMemoryTestData::new());
        let user = store.seed_user("vasya", "qwerty123");
        let mut bank = ScriptedBank::happy(store.clone());
        bank.issue_code = false;
        let auth = service(Arc::new(bank), store.clone());

        let err = auth.authenticate(&vasya()).await.unwrap_err();
        assert!(matches!(err, AuthError::CodeNotIssued(id) if id == user.id));

        store.issue_code(&user.id);
        let err = auth.authenticate(&vasya()).await.unwrap_err();
        assert!(matches!(err, AuthError::CodeWaitTimedOut { waited_ms, .. } if waited_ms >= 80));
    }

    #[tokio::test]
    async fn code_written_late_is_still_picked_up() {
        let store = Arc::new(InMemoryTestData::new());
        let user = store.seed_user("vasya", "qwerty123");
        let mut bank = ScriptedBank::happy(store.clone());
        bank.issue_code = false;
        let auth = service(Arc::new(bank), store.clone());

        let ticket = auth.login(&vasya()).await.unwrap();
        let writer = {
            let store = store.clone();
            let user_id = user.id.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(25)).await;
                store.issue_code(&user_id)
            })
        };

        let code = auth.await_fresh_code(&ticket).await.unwrap();
        assert_eq!(code, writer.await.unwrap());
    }

    #[tokio::test]
    async fn verification_failures() {
        let store = Arc::new(InMemoryTestData::new());
        store.seed_user("vasya", "qwerty123");

        let mut rejected = ScriptedBank::happy(store.clone());
        rejected.verify_status = StatusCode::BAD_REQUEST;
        let err = service(Arc::new(rejected), store.clone())
            .authenticate(&vasya())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::VerificationRejected(StatusCode::BAD_REQUEST)));

        let mut tokenless = ScriptedBank::happy(store.clone());
        tokenless.verify_body = json!({"status": "ok"});
        let err = service(Arc::new(tokenless), store)
            .authenticate(&vasya())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingToken));
    }

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        let polling = fast_polling();
        let delays: Vec<u128> = std::iter::successors(Some(polling.initial_delay), |d| {
            Some(polling.next_delay(*d))
        })
        .take(5)
        .map(|d| d.as_millis())
        .collect();
        assert_eq!(delays, vec![5, 10, 20, 20, 20]);
    }
}
