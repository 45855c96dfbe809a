// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::path::Path;

use super::required;
use crate::api::ApiClient;
use crate::models::{GracePeriodType, PaymentScheduleRow};
use crate::utils::{maybe_print_json, pretty_table};

pub async fn handle(client: &ApiClient, m: &clap::ArgMatches) -> Result<()> {
    let rows = fetch_rows(client, m).await?;
    if let Some(out) = m.get_one::<String>("csv") {
        write_csv(Path::new(out), &rows)?;
        println!("Wrote {} periods to {}", rows.len(), out);
    }
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &rows)? {
        return Ok(());
    }
    let data: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.period.to_string(),
                r.payment_date.to_string(),
                r.interest.round_dp(2).to_string(),
                r.amortization.round_dp(2).to_string(),
                r.installment.round_dp(2).to_string(),
                r.balance.round_dp(2).to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Period", "Date", "Interest", "Amortization", "Installment", "Balance"],
            data,
        )
    );
    println!(
        "Total periods: {}  Total installments: {:.2}",
        rows.len(),
        total_installments(&rows)
    );
    Ok(())
}

/// Applies `--grace-type`/`--grace-periods` first when given.
pub async fn fetch_rows(client: &ApiClient, m: &clap::ArgMatches) -> Result<Vec<PaymentScheduleRow>> {
    let id: i64 = required(m, "id")?;
    let rows = match m.get_one::<GracePeriodType>("grace-type") {
        Some(kind) => {
            let periods = m.get_one::<u32>("grace-periods").copied().unwrap_or(0);
            client
                .projections()
                .apply_grace_period(id, *kind, periods)
                .await?
        }
        None => client.bonds().fetch_payment_schedule(id).await?,
    };
    Ok(rows)
}

pub fn total_installments(rows: &[PaymentScheduleRow]) -> Decimal {
    rows.iter().map(|r| r.installment).sum::<Decimal>().round_dp(2)
}

fn write_csv(path: &Path, rows: &[PaymentScheduleRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Create CSV at {}", path.display()))?;
    wtr.write_record([
        "period",
        "payment_date",
        "interest",
        "amortization",
        "installment",
        "balance",
    ])?;
    for r in rows {
        wtr.write_record([
            r.period.to_string(),
            r.payment_date.to_string(),
            r.interest.to_string(),
            r.amortization.to_string(),
            r.installment.to_string(),
            r.balance.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
