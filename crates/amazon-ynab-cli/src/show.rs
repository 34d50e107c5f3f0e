use amazon_ynab::{AppliedUpdate, RunSummary, SyncCache, UpdateOutcome};
use anstyle::{AnsiColor, Color, Style};
use std::fmt::Write as _;

pub fn show_summary(summary: &RunSummary, dry_run: bool) {
    print!("{}", render_summary(summary, dry_run));
}

pub fn render_summary(summary: &RunSummary, dry_run: bool) -> String {
    let applied_style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));
    let simulated_style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));
    let failed_style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));
    let bold = Style::new().bold();

    let mut out = String::new();
    for update in &summary.updates {
        let style = match update.outcome {
            UpdateOutcome::Applied => applied_style,
            UpdateOutcome::Simulated => simulated_style,
            UpdateOutcome::Failed(_) => failed_style,
        };
        let _ = writeln!(
            out,
            "{style}[{}]{style:#} {} → {}",
            update.outcome,
            describe_order(update),
            update.transaction_id
        );
        let _ = writeln!(out, "    memo: {}", update.memo);
    }

    if summary.updates.is_empty() {
        let _ = writeln!(
            out,
            "No transactions matched ({} purchases, {} transactions).",
            summary.purchases, summary.transactions
        );
        return out;
    }

    let _ = writeln!(out, "{bold}━━━ Summary ━━━{bold:#}");
    let _ = writeln!(
        out,
        "  {} of {} purchases matched against {} transactions",
        summary.updates.len(),
        summary.purchases,
        summary.transactions
    );
    if dry_run {
        let _ = writeln!(
            out,
            "  {simulated_style}{}{simulated_style:#} memo update(s) not written (dry run)",
            summary.simulated()
        );
    } else {
        let _ = writeln!(
            out,
            "  {applied_style}{}{applied_style:#} memo update(s) written",
            summary.applied()
        );
    }
    if summary.failed() > 0 {
        let _ = writeln!(
            out,
            "  {failed_style}{}{failed_style:#} update(s) failed",
            summary.failed()
        );
    }
    out
}

fn describe_order(update: &AppliedUpdate) -> String {
    match &update.order_id {
        Some(order_id) => format!("order {order_id}"),
        None => "order".to_owned(),
    }
}

pub fn show_cache_status(cache: &SyncCache) {
    let knowledge = cache
        .server_knowledge
        .map(|cursor| cursor.to_string())
        .unwrap_or_else(|| "none (next run fetches everything)".to_owned());
    let deleted = cache.transactions.iter().filter(|t| t.deleted).count();
    let with_memo = cache
        .transactions
        .iter()
        .filter(|t| t.memo.as_deref().is_some_and(|memo| !memo.is_empty()))
        .count();

    println!("Server knowledge: {knowledge}");
    println!("Cached transactions: {}", cache.transactions.len());
    println!("  with memo: {with_memo}");
    println!("  deleted: {deleted}");
    if let (Some(first), Some(last)) = (
        cache.transactions.iter().map(|t| &t.date).min(),
        cache.transactions.iter().map(|t| &t.date).max(),
    ) {
        println!("  dates: {first} to {last}");
    }
}
