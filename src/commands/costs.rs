// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use rust_decimal::Decimal;

use super::required;
use crate::api::ApiClient;
use crate::models::{Bond, IssuanceCost, Payer};
use crate::utils::{fmt_money, fmt_pct, maybe_print_json, parse_decimal, pretty_table};

pub async fn handle(client: &ApiClient, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(client, sub).await?,
        Some(("update", sub)) => update(client, sub).await?,
        Some(("initial", sub)) => {
            let id: i64 = required(sub, "bond-id")?;
            let bond = client.bonds().calculate_initial_costs(id).await?;
            print_calculation(client, "Initial costs", &bond).await?;
        }
        Some(("final", sub)) => {
            let id: i64 = required(sub, "bond-id")?;
            let bond = client.bonds().calculate_final_costs(id).await?;
            print_calculation(client, "Final costs", &bond).await?;
        }
        _ => {}
    }
    Ok(())
}

async fn show(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let bond_id: i64 = required(sub, "bond-id")?;
    let Some(cost) = client.issuance_costs().scan_for_bond_id(bond_id).await? else {
        println!("No issuance cost recorded for bond {}", bond_id);
        return Ok(());
    };
    if !maybe_print_json(sub.get_flag("json"), false, &cost)? {
        println!("{}", cost_table(&cost, ""));
    }
    Ok(())
}

async fn update(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let bond_id: i64 = required(sub, "bond-id")?;
    let costs = client.issuance_costs();
    let Some(mut cost) = costs.scan_for_bond_id(bond_id).await? else {
        bail!("No issuance cost recorded for bond {}", bond_id);
    };
    apply_cost_args(&mut cost, sub)?;
    cost.validate()?;
    costs.update(&cost).await?;
    println!("Updated issuance cost {} of bond {}", cost.id, bond_id);
    Ok(())
}

async fn print_calculation(client: &ApiClient, title: &str, bond: &Bond) -> Result<()> {
    println!("{} for '{}' (id {})", title, bond.name, bond.id);
    let mut rows = vec![
        vec!["Effective annual rate".to_string(), fmt_pct(&bond.effective_annual_rate)],
        vec!["COK per period".to_string(), fmt_pct(&bond.cok_per_period)],
    ];
    if let Some(cost) = client.issuance_costs().scan_for_bond_id(bond.id).await? {
        rows.push(vec![
            "Initial cost, issuer".to_string(),
            fmt_money(&cost.initial_cost_issuer, &bond.currency),
        ]);
        rows.push(vec![
            "Initial cost, bondholder".to_string(),
            fmt_money(&cost.initial_cost_bondholder, &bond.currency),
        ]);
    }
    println!("{}", pretty_table(&["Indicator", "Value"], rows));
    Ok(())
}

/// Overwrites the cost fields given on the command line.
pub fn apply_cost_args(cost: &mut IssuanceCost, sub: &clap::ArgMatches) -> Result<()> {
    if let Some(raw) = sub.get_one::<String>("premium") {
        cost.premium = parse_decimal(raw)?;
    }
    let lines: [(&str, &str, &mut Decimal, &mut Payer); 4] = [
        (
            "structuring",
            "structuring-payer",
            &mut cost.structuring_cost,
            &mut cost.who_pays_structuring,
        ),
        (
            "placement",
            "placement-payer",
            &mut cost.placement_cost,
            &mut cost.who_pays_placement,
        ),
        (
            "flotation",
            "flotation-payer",
            &mut cost.flotation_cost,
            &mut cost.who_pays_flotation,
        ),
        (
            "cavali",
            "cavali-payer",
            &mut cost.cavali_fee,
            &mut cost.who_pays_cavali,
        ),
    ];
    for (pct_arg, payer_arg, pct, payer) in lines {
        if let Some(raw) = sub.get_one::<String>(pct_arg) {
            *pct = parse_decimal(raw)?;
        }
        if let Some(p) = sub.get_one::<Payer>(payer_arg) {
            *payer = *p;
        }
    }
    Ok(())
}

pub fn cost_table(cost: &IssuanceCost, ccy: &str) -> comfy_table::Table {
    let mut rows = vec![vec!["Premium".to_string(), fmt_pct(&cost.premium), String::new()]];
    for line in cost.lines() {
        rows.push(vec![
            line.item.to_string(),
            fmt_pct(&line.pct),
            line.payer.to_string(),
        ]);
    }
    let money = |d: Decimal| {
        if ccy.is_empty() {
            d.round_dp(2).to_string()
        } else {
            fmt_money(&d, ccy)
        }
    };
    rows.push(vec![
        "Initial cost, issuer".to_string(),
        money(cost.initial_cost_issuer),
        String::new(),
    ]);
    rows.push(vec![
        "Initial cost, bondholder".to_string(),
        money(cost.initial_cost_bondholder),
        String::new(),
    ]);
    pretty_table(&["Item", "Value", "Paid by"], rows)
}
