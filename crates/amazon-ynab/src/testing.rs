//! In-memory ledger service used by the unit tests.

use crate::error::RemoteError;
use crate::ledger::{Cursor, LedgerTransaction};
use crate::remote::{LedgerApi, TransactionsPage};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeLedger {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    pages: VecDeque<Result<TransactionsPage, u16>>,
    fetch_requests: Vec<Option<Cursor>>,
    patch_failures: HashMap<String, Option<u16>>,
    patches: Vec<(String, String)>,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_page(&self, server_knowledge: i64, transactions: Vec<LedgerTransaction>) {
        self.inner.lock().unwrap().pages.push_back(Ok(TransactionsPage {
            server_knowledge: Cursor(server_knowledge),
            transactions,
        }));
    }

    pub fn push_fetch_error(&self, status: u16) {
        self.inner.lock().unwrap().pages.push_back(Err(status));
    }

    /// Reject memo updates for `transaction_id` with `status`.
    pub fn fail_patch(&self, transaction_id: &str, status: u16) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .patch_failures
            .insert(transaction_id.to_owned(), Some(status));
    }

    /// Time out memo updates for `transaction_id`.
    pub fn time_out_patch(&self, transaction_id: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.patch_failures.insert(transaction_id.to_owned(), None);
    }

    pub fn fetch_requests(&self) -> Vec<Option<Cursor>> {
        self.inner.lock().unwrap().fetch_requests.clone()
    }

    /// Successful memo updates in the order they were received.
    pub fn patches(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().patches.clone()
    }
}

#[async_trait::async_trait]
impl LedgerApi for FakeLedger {
    async fn fetch_transactions(
        &self,
        since: Option<Cursor>,
    ) -> Result<TransactionsPage, RemoteError> {
        let mut inner = self.inner.lock().unwrap();
        inner.fetch_requests.push(since);
        match inner.pages.pop_front() {
            Some(Ok(page)) => Ok(page),
            Some(Err(status)) => Err(status_error("GET", status)),
            None => Err(status_error("GET", 500)),
        }
    }

    async fn patch_memo(&self, transaction_id: &str, memo: &str) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.patch_failures.get(transaction_id) {
            Some(Some(status)) => Err(status_error("PATCH", *status)),
            Some(None) => Err(RemoteError::Timeout),
            None => {
                inner
                    .patches
                    .push((transaction_id.to_owned(), memo.to_owned()));
                Ok(())
            }
        }
    }
}

fn status_error(method: &'static str, status: u16) -> RemoteError {
    RemoteError::Status {
        method,
        url: "fake://transactions".to_owned(),
        status,
        body: String::new(),
    }
}
