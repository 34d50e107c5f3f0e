//! The ledger service seam: a narrow trait plus its HTTP implementation.

use crate::error::RemoteError;
use crate::ledger::{Cursor, LedgerTransaction};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.youneedabudget.com/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// One page of the transactions endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionsPage {
    pub server_knowledge: Cursor,
    pub transactions: Vec<LedgerTransaction>,
}

/// Everything the engine needs from the ledger service.
#[async_trait::async_trait]
pub trait LedgerApi {
    /// Transactions changed since `since`, or all of them when `since` is `None`.
    async fn fetch_transactions(&self, since: Option<Cursor>)
    -> Result<TransactionsPage, RemoteError>;

    /// Overwrite the memo of a single transaction.
    async fn patch_memo(&self, transaction_id: &str, memo: &str) -> Result<(), RemoteError>;
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct BudgetList {
    budgets: Vec<BudgetSummary>,
}

#[derive(Deserialize)]
struct BudgetSummary {
    id: String,
    #[serde(default)]
    name: String,
}

/// YNAB REST client authenticated with a personal access token.
#[derive(Clone)]
pub struct YnabClient {
    http_client: Client,
    base_url: String,
    api_token: String,
    budget_id: String,
}

impl YnabClient {
    pub fn new(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        budget_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_token: api_token.into(),
            budget_id: budget_id.into(),
        })
    }

    pub fn budget_id(&self) -> &str {
        &self.budget_id
    }

    /// Look up the first budget on the account, for configurations that don't name one.
    pub async fn default_budget_id(
        base_url: &str,
        api_token: &str,
        timeout: Duration,
    ) -> Result<String, RemoteError> {
        let client = Self::new(base_url, api_token, "", timeout)?;
        let url = format!("{}/budgets", client.base_url);
        let body = client.send("GET", client.http_client.get(&url), url).await?;
        let envelope: Envelope<BudgetList> = serde_json::from_str(&body)?;

        let budget = envelope
            .data
            .budgets
            .into_iter()
            .next()
            .ok_or(RemoteError::NoBudgets)?;
        debug!("Using budget {:?} ({})", budget.name, budget.id);
        Ok(budget.id)
    }

    fn transactions_url(&self, since: Option<Cursor>) -> String {
        let base = format!("{}/budgets/{}/transactions", self.base_url, self.budget_id);
        match since {
            Some(cursor) => format!("{base}?last_knowledge_of_server={cursor}"),
            None => base,
        }
    }

    async fn send(
        &self,
        method: &'static str,
        request: reqwest::RequestBuilder,
        url: String,
    ) -> Result<String, RemoteError> {
        let response = request.bearer_auth(&self.api_token).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(RemoteError::Status {
                method,
                url,
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[async_trait::async_trait]
impl LedgerApi for YnabClient {
    async fn fetch_transactions(
        &self,
        since: Option<Cursor>,
    ) -> Result<TransactionsPage, RemoteError> {
        let url = self.transactions_url(since);
        debug!("GET {url}");

        let body = self.send("GET", self.http_client.get(&url), url).await?;
        let envelope: Envelope<TransactionsPage> = serde_json::from_str(&body)?;
        Ok(envelope.data)
    }

    async fn patch_memo(&self, transaction_id: &str, memo: &str) -> Result<(), RemoteError> {
        let url = self.transactions_url(None);
        let request_body = json!({
            "transactions": [{ "id": transaction_id, "memo": memo }]
        });
        debug!("PATCH {url} ({transaction_id})");

        self.send("PATCH", self.http_client.patch(&url).json(&request_body), url)
            .await?;
        Ok(())
    }
}
