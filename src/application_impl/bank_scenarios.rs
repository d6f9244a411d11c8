use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::infra_http::{AUTH_PATH, CARDS_PATH, TRANSFER_PATH};
use reqwest::StatusCode;
use std::sync::Arc;

/// Authorized actions against the service, each checked against its documented
/// status and, for transfers, against the balance deltas it must produce.
pub struct BankScenarios {
    api: Arc<dyn BankApi>,
    auth_service: Arc<dyn AuthService>,
    card_repo: Arc<dyn CardRepo>,
}

impl BankScenarios {
    pub fn new(
        api: Arc<dyn BankApi>,
        auth_service: Arc<dyn AuthService>,
        card_repo: Arc<dyn CardRepo>,
    ) -> Self {
        Self {
            api,
            auth_service,
            card_repo,
        }
    }

    /// Logs in and verifies once; the returned context is reused by later steps.
    pub async fn open_session(
        &self,
        credentials: &Credentials,
    ) -> Result<SessionContext, ScenarioError> {
        let ticket = self.auth_service.login(credentials).await?;
        let code = self.auth_service.await_fresh_code(&ticket).await?;
        let token = self.auth_service.verify(&credentials.login, &code).await?;
        tracing::info!(login = %credentials.login, "session opened");

        Ok(SessionContext {
            credentials: credentials.clone(),
            user: ticket.user,
            token,
        })
    }

    pub async fn login_succeeds(&self, credentials: &Credentials) -> Result<(), ScenarioError> {
        let response = self.api.login(credentials).await?;
        expect_status(AUTH_PATH, &response, StatusCode::OK)?;
        Ok(())
    }

    pub async fn list_cards(&self, ctx: &SessionContext) -> Result<CardSet, ScenarioError> {
        let response = self.api.cards(&ctx.token).await?;
        expect_status(CARDS_PATH, &response, StatusCode::OK)?;
        let cards: Vec<CardRecord> = response.json()?;
        Ok(CardSet::new(cards))
    }

    /// Cards as the database knows them; the only reliable source of full numbers.
    pub async fn stored_cards(&self, ctx: &SessionContext) -> Result<CardSet, ScenarioError> {
        Ok(self.card_repo.find_cards(&ctx.user.id).await?)
    }

    pub async fn transfer_and_verify(
        &self,
        ctx: &SessionContext,
        from: &CardRecord,
        to: &CardRecord,
        amount: i64,
    ) -> Result<TransferOutcome, ScenarioError> {
        let before = self.balances(ctx, &from.id, &to.id).await?;

        let response = self.api.transfer(&ctx.token, &request(from, to, amount)).await?;
        expect_status(TRANSFER_PATH, &response, StatusCode::OK)?;

        let after = self.balances(ctx, &from.id, &to.id).await?;
        let outcome = TransferOutcome {
            amount,
            before,
            after,
        };
        check_transfer(&outcome, &from.id, &to.id)?;

        tracing::info!(
            from = %from.id,
            to = %to.id,
            amount,
            ?before,
            ?after,
            "transfer verified"
        );
        Ok(outcome)
    }

    /// The service must refuse the transfer and leave both balances as they were.
    pub async fn rejected_transfer_leaves_balances(
        &self,
        ctx: &SessionContext,
        from: &CardRecord,
        to: &CardRecord,
        amount: i64,
    ) -> Result<StatusCode, ScenarioError> {
        let before = self.balances(ctx, &from.id, &to.id).await?;

        let response = self.api.transfer(&ctx.token, &request(from, to, amount)).await?;
        if response.is_ok() {
            return Err(AssertionFailure::TransferAccepted {
                amount,
                status: response.status,
            }
            .into());
        }

        let after = self.balances(ctx, &from.id, &to.id).await?;
        expect_balance(&from.id, before.from, after.from)?;
        expect_balance(&to.id, before.to, after.to)?;

        tracing::info!(amount, status = %response.status, "transfer rejected as expected");
        Ok(response.status)
    }

    async fn balances(
        &self,
        ctx: &SessionContext,
        from: &CardId,
        to: &CardId,
    ) -> Result<BalancePair, ScenarioError> {
        let cards = self.list_cards(ctx).await?;
        let balance = |id: &CardId| {
            cards
                .balance_of(id)
                .ok_or_else(|| AssertionFailure::CardMissing(id.clone()))
        };
        Ok(BalancePair {
            from: balance(from)?,
            to: balance(to)?,
        })
    }
}

fn request(from: &CardRecord, to: &CardRecord, amount: i64) -> TransferRequest {
    TransferRequest {
        from: from.number.clone(),
        to: to.number.clone(),
        amount,
    }
}

pub fn expect_status(
    endpoint: &'static str,
    response: &ApiResponse,
    expected: StatusCode,
) -> Result<(), AssertionFailure> {
    if response.status == expected {
        Ok(())
    } else {
        Err(AssertionFailure::UnexpectedStatus {
            endpoint,
            expected,
            actual: response.status,
        })
    }
}

fn expect_balance(card: &CardId, expected: i64, actual: i64) -> Result<(), AssertionFailure> {
    if expected == actual {
        Ok(())
    } else {
        Err(AssertionFailure::BalanceMismatch {
            card: card.clone(),
            expected,
            actual,
        })
    }
}

/// `after.from == before.from - amount`, `after.to == before.to + amount`, and
/// the total is unchanged.
pub fn check_transfer(
    outcome: &TransferOutcome,
    from: &CardId,
    to: &CardId,
) -> Result<(), AssertionFailure> {
    let TransferOutcome {
        amount,
        before,
        after,
    } = outcome;
    expect_balance(from, before.from - amount, after.from)?;
    expect_balance(to, before.to + amount, after.to)?;
    if before.total() != after.total() {
        return Err(AssertionFailure::SumNotConserved {
            before: before.total(),
            after: after.total(),
        });
    }
    Ok(())
}
