use amazon_ynab::{
    Cursor, LedgerApi, LedgerTransaction, MatchConfig, RemoteError, RunConfig, RunError,
    RunReport, TransactionsPage, UpdateOutcome,
};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Serves one canned fetch result and records memo updates.
struct ScriptedLedger {
    page: Mutex<Option<Result<TransactionsPage, u16>>>,
    patches: Mutex<Vec<(String, String)>>,
    failing_id: Option<&'static str>,
}

impl ScriptedLedger {
    fn serving(server_knowledge: i64, transactions: Vec<LedgerTransaction>) -> Self {
        ScriptedLedger {
            page: Mutex::new(Some(Ok(TransactionsPage {
                server_knowledge: Cursor(server_knowledge),
                transactions,
            }))),
            patches: Mutex::new(Vec::new()),
            failing_id: None,
        }
    }

    fn failing_fetch(status: u16) -> Self {
        ScriptedLedger {
            page: Mutex::new(Some(Err(status))),
            patches: Mutex::new(Vec::new()),
            failing_id: None,
        }
    }
}

#[async_trait::async_trait]
impl LedgerApi for ScriptedLedger {
    async fn fetch_transactions(
        &self,
        _since: Option<Cursor>,
    ) -> Result<TransactionsPage, RemoteError> {
        match self.page.lock().unwrap().take() {
            Some(Ok(page)) => Ok(page),
            Some(Err(status)) => Err(RemoteError::Status {
                method: "GET",
                url: "scripted://transactions".into(),
                status,
                body: "unavailable".into(),
            }),
            None => panic!("fetched twice"),
        }
    }

    async fn patch_memo(&self, transaction_id: &str, memo: &str) -> Result<(), RemoteError> {
        if self.failing_id == Some(transaction_id) {
            return Err(RemoteError::Status {
                method: "PATCH",
                url: "scripted://transactions".into(),
                status: 429,
                body: "rate limited".into(),
            });
        }
        self.patches
            .lock()
            .unwrap()
            .push((transaction_id.to_owned(), memo.to_owned()));
        Ok(())
    }
}

fn workdir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("amazon-ynab-run-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn config(dir: &Path, dry_run: bool) -> RunConfig {
    RunConfig {
        purchases_path: dir.join("amazon_transactions.json"),
        cache_path: dir.join("ynab_cache.json"),
        dry_run,
        matching: MatchConfig::default(),
    }
}

const PURCHASES: &str = r#"[
    {"date": "June 10, 2024", "subtotal": "$12.34", "order_number": "111-0000001",
     "description": "Paperback book", "transaction_amount": 1234},
    {"date": "June 12, 2024", "subtotal": "$45.00", "order_number": "111-0000002",
     "description": "Desk lamp", "transaction_amount": 4500},
    {"date": "June 20, 2024", "subtotal": "$3.99", "order_number": "111-0000003",
     "description": "Batteries", "transaction_amount": 399},
    {"date": "", "subtotal": "$9.99", "order_number": "111-0000004",
     "description": "Broken card", "transaction_amount": 0},
    {"date": "June 21, 2024", "subtotal": "$7.00", "order_number": "",
     "description": "No order number", "transaction_amount": 0}
]"#;

fn ledger_transactions() -> Vec<LedgerTransaction> {
    vec![
        LedgerTransaction::new("t-book", "2024-06-13", -12340),
        LedgerTransaction::new("t-lamp", "2024-06-12", -45000),
        LedgerTransaction::new("t-batteries", "2024-06-22", -3990),
        LedgerTransaction::new("t-unrelated", "2024-06-21", -7000),
    ]
}

#[tokio::test]
async fn missing_purchases_skips_everything() {
    let dir = workdir("missing");
    let ledger = ScriptedLedger::serving(1, ledger_transactions());

    let report = amazon_ynab::run(&config(&dir, false), &ledger).await.unwrap();

    assert_eq!(
        report,
        RunReport::InputMissing(dir.join("amazon_transactions.json"))
    );
    assert!(!dir.join("ynab_cache.json").exists());
    assert!(ledger.page.lock().unwrap().is_some(), "no fetch expected");

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn dry_run_reports_without_writing() {
    let dir = workdir("dry-run");
    std::fs::write(dir.join("amazon_transactions.json"), PURCHASES).unwrap();
    let ledger = ScriptedLedger::serving(7, ledger_transactions());

    let RunReport::Completed(summary) = amazon_ynab::run(&config(&dir, true), &ledger)
        .await
        .unwrap()
    else {
        panic!("expected a completed run");
    };

    assert_eq!(summary.purchases, 4);
    assert_eq!(summary.transactions, 4);
    assert_eq!(summary.simulated(), 3);
    assert_eq!(summary.applied(), 0);
    assert!(ledger.patches.lock().unwrap().is_empty());

    let memos: Vec<(&str, &str)> = summary
        .updates
        .iter()
        .map(|update| (update.transaction_id.as_str(), update.memo.as_str()))
        .collect();
    assert_eq!(
        memos,
        [
            ("t-book", "Paperback book"),
            ("t-lamp", "Desk lamp"),
            ("t-batteries", "Batteries"),
        ]
    );

    let cache: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join("ynab_cache.json")).unwrap())
            .unwrap();
    assert_eq!(cache["server_knowledge"], 7);
    assert_eq!(cache["transactions"].as_array().unwrap().len(), 4);

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn failed_update_is_isolated() {
    let dir = workdir("partial");
    std::fs::write(dir.join("amazon_transactions.json"), PURCHASES).unwrap();
    let mut ledger = ScriptedLedger::serving(7, ledger_transactions());
    ledger.failing_id = Some("t-lamp");

    let RunReport::Completed(summary) = amazon_ynab::run(&config(&dir, false), &ledger)
        .await
        .unwrap()
    else {
        panic!("expected a completed run");
    };

    assert_eq!(summary.applied(), 2);
    assert_eq!(summary.failed(), 1);
    assert!(matches!(summary.updates[1].outcome, UpdateOutcome::Failed(_)));
    let patched: Vec<String> = ledger
        .patches
        .lock()
        .unwrap()
        .iter()
        .map(|(id, _)| id.clone())
        .collect();
    assert_eq!(patched, ["t-book", "t-batteries"]);

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn fetch_failure_aborts_before_updates() {
    let dir = workdir("fetch-failure");
    std::fs::write(dir.join("amazon_transactions.json"), PURCHASES).unwrap();
    let previous = r#"{"transactions":[],"server_knowledge":3}"#;
    std::fs::write(dir.join("ynab_cache.json"), previous).unwrap();
    let ledger = ScriptedLedger::failing_fetch(503);

    let error = amazon_ynab::run(&config(&dir, false), &ledger)
        .await
        .unwrap_err();

    assert!(matches!(error, RunError::Fetch(_)));
    assert!(ledger.patches.lock().unwrap().is_empty());
    assert_eq!(
        std::fs::read_to_string(dir.join("ynab_cache.json")).unwrap(),
        previous
    );

    std::fs::remove_dir_all(dir).unwrap();
}
