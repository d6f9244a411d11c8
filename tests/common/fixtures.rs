use super::FakeBank;
use bank_api_suite::application_impl::*;
use bank_api_suite::application_port::AuthService;
use bank_api_suite::domain_model::*;
use bank_api_suite::domain_port::BankApi;
use bank_api_suite::infra_fake::InMemoryTestData;
use bank_api_suite::infra_http::{HttpBankApi, HttpClient};
use std::sync::Arc;
use std::time::Duration;

pub const LOGIN: &str = "vasya";
pub const PASSWORD: &str = "qwerty123";
pub const CARD1_NUMBER: &str = "5559 0000 0000 0001";
pub const CARD2_NUMBER: &str = "5559 0000 0000 0002";

pub struct SeededUser {
    pub user: UserRecord,
    pub card1: CardRecord,
    pub card2: CardRecord,
}

/// The demo account: two cards holding 10000 and 3000 minor units.
pub fn seed_vasya(store: &InMemoryTestData) -> SeededUser {
    let user = store.seed_user(LOGIN, PASSWORD);
    let card1 = store.seed_card(&user.id, CARD1_NUMBER, 10_000);
    let card2 = store.seed_card(&user.id, CARD2_NUMBER, 3_000);
    SeededUser { user, card1, card2 }
}

pub fn credentials() -> Credentials {
    Credentials::new(LOGIN, PASSWORD)
}

pub fn polling() -> CodePolling {
    CodePolling {
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        deadline: Duration::from_secs(2),
    }
}

/// Fake service on an ephemeral port plus the harness pointed at it.
pub struct TestEnv {
    pub store: Arc<InMemoryTestData>,
    pub base_url: String,
    pub api: Arc<dyn BankApi>,
    pub auth_service: Arc<dyn AuthService>,
    pub scenarios: Arc<BankScenarios>,
}

impl TestEnv {
    pub fn start() -> Self {
        Self::start_with_code_delay(Duration::ZERO, polling())
    }

    pub fn start_with_code_delay(code_delay: Duration, polling: CodePolling) -> Self {
        let store = Arc::new(InMemoryTestData::new());
        let address = FakeBank::new(store.clone(), code_delay).serve();
        let base_url = format!("http://{address}/api");

        let http = HttpClient::new(&base_url, Duration::from_secs(5)).unwrap();
        let api: Arc<dyn BankApi> = Arc::new(HttpBankApi::new(http));
        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            api.clone(),
            store.clone(),
            store.clone(),
            polling,
        ));
        let scenarios = Arc::new(BankScenarios::new(
            api.clone(),
            auth_service.clone(),
            store.clone(),
        ));

        Self {
            store,
            base_url,
            api,
            auth_service,
            scenarios,
        }
    }

    pub fn runner(&self, config: SuiteConfig) -> SuiteRunner {
        SuiteRunner::new(self.scenarios.clone(), self.store.clone(), config)
    }
}
