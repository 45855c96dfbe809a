// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use serde::Serialize;

use super::required;
use crate::api::ApiClient;
use crate::models::YieldIndicators;
use crate::utils::{fmt_pct, maybe_print_json, pretty_table};

pub async fn handle(client: &ApiClient, m: &clap::ArgMatches) -> Result<()> {
    let json_flag = m.get_flag("json");
    if m.get_flag("all") {
        return analyze_all(client, json_flag).await;
    }
    let id: i64 = required(m, "id")?;
    let ind = client.bonds().fetch_yield(id).await?;
    if !maybe_print_json(json_flag, false, &ind)? {
        println!("{}", indicator_table(&ind));
    }
    Ok(())
}

#[derive(Serialize)]
struct AnalysisRow {
    bond_id: i64,
    name: String,
    indicators: Option<YieldIndicators>,
    error: Option<String>,
}

async fn analyze_all(client: &ApiClient, json_flag: bool) -> Result<()> {
    let reports = client.projections().analyze_all().await?;
    let data: Vec<AnalysisRow> = reports
        .into_iter()
        .map(|r| {
            let (indicators, error) = match r.result {
                Ok(ind) => (Some(ind), None),
                Err(e) => (None, Some(e.to_string())),
            };
            AnalysisRow {
                bond_id: r.bond.id,
                name: r.bond.name,
                indicators,
                error,
            }
        })
        .collect();
    if maybe_print_json(json_flag, false, &data)? {
        return Ok(());
    }
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|row| match (&row.indicators, &row.error) {
            (Some(ind), _) => vec![
                row.bond_id.to_string(),
                row.name.clone(),
                fmt_pct(&ind.tcea),
                fmt_pct(&ind.trea),
                ind.duration.round_dp(4).to_string(),
                ind.modified_duration.round_dp(4).to_string(),
                ind.convexity.round_dp(4).to_string(),
                ind.current_price.round_dp(2).to_string(),
                String::new(),
            ],
            (None, err) => {
                let mut cells = vec![row.bond_id.to_string(), row.name.clone()];
                cells.extend(std::iter::repeat_n(String::new(), 6));
                cells.push(err.clone().unwrap_or_default());
                cells
            }
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Name", "TCEA", "TREA", "Duration", "Mod. duration", "Convexity", "Price", "Error"],
            rows,
        )
    );
    Ok(())
}

pub fn indicator_table(ind: &YieldIndicators) -> comfy_table::Table {
    let rows = vec![
        vec!["TCEA (issuer)".to_string(), fmt_pct(&ind.tcea)],
        vec!["TREA (bondholder)".to_string(), fmt_pct(&ind.trea)],
        vec!["Duration (years)".to_string(), ind.duration.round_dp(4).to_string()],
        vec![
            "Modified duration".to_string(),
            ind.modified_duration.round_dp(4).to_string(),
        ],
        vec!["Convexity".to_string(), ind.convexity.round_dp(4).to_string()],
        vec!["Current price".to_string(), ind.current_price.round_dp(2).to_string()],
        vec!["Profit / loss".to_string(), ind.profit_or_loss.round_dp(2).to_string()],
        vec![
            "Max market price".to_string(),
            ind.max_market_price.round_dp(2).to_string(),
        ],
    ];
    pretty_table(&["Indicator", "Value"], rows)
}
