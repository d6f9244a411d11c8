use super::BankScenarios;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use nanoid::nanoid;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

#[derive(Debug, Clone)]
pub struct SuiteConfig {
    pub credentials: Credentials,
    pub transfer_amount: i64,
    pub clear_after_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Passed,
    Failed(String),
    Skipped(String),
}

#[derive(Debug, Clone)]
pub struct StepReport {
    pub name: &'static str,
    pub outcome: StepOutcome,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct SuiteReport {
    pub run_id: String,
    pub steps: Vec<StepReport>,
    /// `None` when teardown is disabled.
    pub teardown: Option<Result<(), String>>,
}

impl SuiteReport {
    pub fn outcome_of(&self, name: &str) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|step| step.name == name)
            .map(|step| &step.outcome)
    }

    pub fn failed(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| !matches!(step.outcome, StepOutcome::Passed))
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0 && !matches!(self.teardown, Some(Err(_)))
    }
}

pub struct SuiteStep;

impl SuiteStep {
    pub const LOGIN: &'static str = "login";
    pub const VERIFICATION: &'static str = "verification";
    pub const LIST_CARDS: &'static str = "list cards";
    pub const TRANSFER: &'static str = "transfer between own cards";
    pub const OVERDRAFT: &'static str = "overdraft is rejected";

    pub const ALL: [&'static str; 5] = [
        Self::LOGIN,
        Self::VERIFICATION,
        Self::LIST_CARDS,
        Self::TRANSFER,
        Self::OVERDRAFT,
    ];
}

/// Runs the steps strictly in declared order. The verification step opens the
/// session every later step depends on; if it fails they are skipped. Teardown
/// runs after the last step whatever the outcomes.
pub struct SuiteRunner {
    scenarios: Arc<BankScenarios>,
    cleaner: Arc<dyn TestDataCleaner>,
    config: SuiteConfig,
}

impl SuiteRunner {
    pub fn new(
        scenarios: Arc<BankScenarios>,
        cleaner: Arc<dyn TestDataCleaner>,
        config: SuiteConfig,
    ) -> Self {
        Self {
            scenarios,
            cleaner,
            config,
        }
    }

    pub async fn run(&self) -> SuiteReport {
        let alphabet: [char; 16] = [
            '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', 'a', 'b', 'c', 'd', 'e', 'f',
        ];
        let run_id = nanoid!(10, &alphabet);
        let span = tracing::info_span!("suite", %run_id);
        self.run_steps(run_id).instrument(span).await
    }

    async fn run_steps(&self, run_id: String) -> SuiteReport {
        let mut steps = Vec::with_capacity(SuiteStep::ALL.len());
        let credentials = &self.config.credentials;

        record(&mut steps, SuiteStep::LOGIN, async {
            self.scenarios.login_succeeds(credentials).await
        })
        .await;

        let ctx = record(&mut steps, SuiteStep::VERIFICATION, async {
            self.scenarios.open_session(credentials).await
        })
        .await;

        match ctx {
            Some(ctx) => self.run_session_steps(&mut steps, &ctx).await,
            None => {
                for &name in &SuiteStep::ALL[2..] {
                    skip(&mut steps, name, "no authenticated session");
                }
            }
        }

        let teardown = if self.config.clear_after_run {
            let result = self
                .cleaner
                .clear_all_test_data()
                .await
                .map_err(|e| e.to_string());
            match &result {
                Ok(()) => tracing::info!("test data cleared"),
                Err(e) => tracing::error!(error = %e, "teardown failed"),
            }
            Some(result)
        } else {
            None
        };

        let report = SuiteReport {
            run_id,
            steps,
            teardown,
        };
        tracing::info!(
            steps = report.steps.len(),
            failed = report.failed(),
            success = report.is_success(),
            "suite finished"
        );
        report
    }

    async fn run_session_steps(&self, steps: &mut Vec<StepReport>, ctx: &SessionContext) {
        let listed = record(steps, SuiteStep::LIST_CARDS, async {
            self.scenarios.list_cards(ctx).await
        })
        .await;
        if listed.is_none() {
            skip(steps, SuiteStep::TRANSFER, "cards could not be listed");
            skip(steps, SuiteStep::OVERDRAFT, "cards could not be listed");
            return;
        }

        let amount = self.config.transfer_amount;
        record(steps, SuiteStep::TRANSFER, async {
            let stored = self.scenarios.stored_cards(ctx).await?;
            let (from, to) = pair(&stored)?;
            self.scenarios.transfer_and_verify(ctx, from, to, amount).await
        })
        .await;

        record(steps, SuiteStep::OVERDRAFT, async {
            let stored = self.scenarios.stored_cards(ctx).await?;
            let (from, to) = pair(&stored)?;
            let listed = self.scenarios.list_cards(ctx).await?;
            let available = listed
                .balance_of(&from.id)
                .ok_or_else(|| AssertionFailure::CardMissing(from.id.clone()))?;
            self.scenarios
                .rejected_transfer_leaves_balances(ctx, from, to, available + 1)
                .await
        })
        .await;
    }
}

fn pair(cards: &CardSet) -> Result<(&CardRecord, &CardRecord), ScenarioError> {
    cards
        .funded_pair()
        .ok_or_else(|| AssertionFailure::NotEnoughCards(cards.len()).into())
}

async fn record<T, F>(steps: &mut Vec<StepReport>, name: &'static str, step: F) -> Option<T>
where
    F: Future<Output = Result<T, ScenarioError>>,
{
    tracing::debug!(step = name, "running");
    let started = Instant::now();
    let result = step.await;
    let elapsed = started.elapsed();

    let (outcome, value) = match result {
        Ok(value) => {
            tracing::info!(step = name, ?elapsed, "passed");
            (StepOutcome::Passed, Some(value))
        }
        Err(e) => {
            tracing::warn!(step = name, error = %e, "failed");
            (StepOutcome::Failed(e.to_string()), None)
        }
    };
    steps.push(StepReport {
        name,
        outcome,
        elapsed,
    });
    value
}

fn skip(steps: &mut Vec<StepReport>, name: &'static str, reason: &str) {
    tracing::warn!(step = name, reason, "skipped");
    steps.push(StepReport {
        name,
        outcome: StepOutcome::Skipped(reason.to_owned()),
        elapsed: Duration::ZERO,
    });
}
