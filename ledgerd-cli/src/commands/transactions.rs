//! Transactions command - statement listing and CSV export

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use ledgerd_core::{PageRequest, TransactionFilters, TransactionKind};

use super::{get_context, parse_id};
use crate::output;

#[allow(clippy::too_many_arguments)]
pub fn run(
    account_id: &str,
    user: &str,
    kind: Option<&str>,
    start_date: Option<&str>,
    end_date: Option<&str>,
    page: Option<i64>,
    limit: Option<i64>,
    json: bool,
    csv_path: Option<&Path>,
) -> Result<()> {
    let ctx = get_context()?;
    let user_id = parse_id(user, "user id")?;
    let account_id = parse_id(account_id, "account id")?;

    let filters = TransactionFilters {
        kind: kind.map(parse_kind).transpose()?,
        start_date: start_date.map(parse_date).transpose()?,
        end_date: end_date.map(parse_date).transpose()?,
    };
    let request = PageRequest { page, limit };

    let statement = ctx
        .statement_service
        .list(user_id, account_id, &request, &filters)?;

    if let Some(path) = csv_path {
        write_csv(path, &statement.list)?;
        output::success(&format!(
            "Exported {} transactions to {}",
            statement.list.len(),
            path.display()
        ));
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&statement)?);
        return Ok(());
    }

    if statement.list.is_empty() {
        output::info("No transactions.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Date", "Kind", "Direction", "Amount", "Counterparty", "Description"]);
    for entry in &statement.list {
        table.add_row(vec![
            entry.created_at.clone(),
            entry.kind.clone(),
            entry.direction.clone(),
            entry.amount.clone(),
            entry.account_name.clone().unwrap_or_default(),
            entry.description.clone(),
        ]);
    }
    println!("{table}");
    println!(
        "Page {}/{} ({} matching, {} total)",
        statement.page, statement.total_page, statement.filtered_total, statement.total
    );
    Ok(())
}

fn parse_kind(s: &str) -> Result<TransactionKind> {
    match TransactionKind::parse(s) {
        Some(kind) => Ok(kind),
        None => bail!("invalid kind {s:?} (expected withdrawal, deposit, transfer, or fee)"),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date: {s}"))
}

fn write_csv(path: &Path, entries: &[ledgerd_core::services::StatementEntry]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record([
        "id",
        "date",
        "kind",
        "direction",
        "amount",
        "counterparty",
        "description",
    ])?;
    for entry in entries {
        writer.write_record([
            entry.id.to_string().as_str(),
            &entry.created_at,
            &entry.kind,
            &entry.direction,
            &entry.amount,
            entry.account_name.as_deref().unwrap_or(""),
            &entry.description,
        ])?;
    }
    writer.flush()?;
    Ok(())
}
