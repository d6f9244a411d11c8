use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::Credentials;
use crate::domain_port::*;
use crate::infra_http::*;
use crate::infra_mysql::*;
use crate::logger::*;
use crate::query_catalog::{QueryCatalog, QueryName};
use crate::settings::Settings;
use sqlx::MySqlPool;
use std::sync::Arc;

/// Everything the suite needs, wired against the live service and database.
pub struct Harness {
    pub runner: SuiteRunner,
    pool: MySqlPool,
}

impl Harness {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let catalog = QueryCatalog::load(&settings.queries.path)?;
        catalog.require_all(&QueryName::REQUIRED)?;

        let pool = connect_pool(&settings.database).await?;
        info!(queries = catalog.len(), "database reachable, query catalog complete");

        let user_repo: Arc<dyn UserRepo> =
            Arc::new(MySqlUserRepo::try_new(pool.clone(), &catalog)?);
        let auth_code_repo: Arc<dyn AuthCodeRepo> =
            Arc::new(MySqlAuthCodeRepo::try_new(pool.clone(), &catalog)?);
        let card_repo: Arc<dyn CardRepo> =
            Arc::new(MySqlCardRepo::try_new(pool.clone(), &catalog)?);
        let cleaner: Arc<dyn TestDataCleaner> =
            Arc::new(MySqlTestDataCleaner::try_new(pool.clone(), &catalog)?);

        let http = HttpClient::new(&settings.api.base_url, settings.api.timeout())?;
        debug!(base_url = http.base_url(), "http client ready");
        let api: Arc<dyn BankApi> = Arc::new(HttpBankApi::new(http));

        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            api.clone(),
            user_repo,
            auth_code_repo,
            CodePolling::from(&settings.auth_code),
        ));
        let scenarios = Arc::new(BankScenarios::new(api, auth_service, card_repo));

        let runner = SuiteRunner::new(
            scenarios,
            cleaner,
            SuiteConfig {
                credentials: Credentials::new(&settings.suite.login, &settings.suite.password),
                transfer_amount: settings.suite.transfer_amount,
                clear_after_run: settings.suite.clear_after_run,
            },
        );

        Ok(Self { runner, pool })
    }

    pub async fn shutdown(&self) {
        self.pool.close().await;
    }
}
