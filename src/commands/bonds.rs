// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::Utc;
use rust_decimal::Decimal;

use super::costs::{apply_cost_args, cost_table};
use super::required;
use crate::api::ApiClient;
use crate::models::{
    Bond, CouponFrequency, DayCountBasis, GracePeriodType, InterestRateType, IssuanceCost, Session,
};
use crate::utils::{
    fmt_money, fmt_pct, maybe_print_json, parse_capitalization, parse_date, parse_decimal,
    pretty_table,
};

pub async fn handle(client: &ApiClient, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(client, sub).await?,
        Some(("show", sub)) => show(client, sub).await?,
        Some(("find", sub)) => find(client, sub).await?,
        Some(("create", sub)) => {
            create(client, session, sub).await?;
        }
        Some(("update", sub)) => update(client, sub).await?,
        Some(("rm", sub)) => remove(client, sub).await?,
        _ => {}
    }
    Ok(())
}

async fn list(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let bonds = client.bonds().list_all().await?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &bonds)? {
        return Ok(());
    }
    let rows: Vec<Vec<String>> = bonds
        .iter()
        .map(|b| {
            vec![
                b.id.to_string(),
                b.name.clone(),
                b.currency.clone(),
                b.nominal_value.to_string(),
                b.commercial_value.to_string(),
                b.number_of_years.to_string(),
                b.coupon_frequency.to_string(),
                fmt_pct(&b.interest_rate),
                b.issue_date.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Name", "CCY", "Nominal", "Commercial", "Years", "Frequency", "Rate", "Issued"],
            rows,
        )
    );
    Ok(())
}

async fn show(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = required(sub, "id")?;
    let projection = client.projections().load(id).await?;
    if sub.get_flag("json") {
        let v = serde_json::json!({
            "bond": projection.bond,
            "issuanceCost": projection.issuance_cost,
        });
        println!("{}", serde_json::to_string_pretty(&v)?);
        return Ok(());
    }
    println!("{}", bond_table(&projection.bond));
    match &projection.issuance_cost {
        Some(cost) => println!("{}", cost_table(cost, &projection.bond.currency)),
        None => println!("No issuance cost recorded for bond {}", id),
    }
    Ok(())
}

async fn find(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let name: String = required(sub, "name")?;
    match client.bonds().scan_for_name(&name).await? {
        Some(bond) => {
            if !maybe_print_json(sub.get_flag("json"), false, &bond)? {
                println!("{}", bond_table(&bond));
            }
        }
        None => println!("No bond named '{}'", name),
    }
    Ok(())
}

/// Creates the bond and its issuance cost; returns the persisted bond.
pub async fn create(client: &ApiClient, session: &Session, sub: &clap::ArgMatches) -> Result<Bond> {
    let mut bond = blank_bond();
    apply_bond_args(&mut bond, sub)?;
    let mut cost = IssuanceCost::default();
    apply_cost_args(&mut cost, sub)?;

    let projection = client.projections().create(session, &bond, &cost).await?;
    println!(
        "Created bond '{}' (id {}) with issuance cost",
        projection.bond.name, projection.bond.id
    );
    Ok(projection.bond)
}

async fn update(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = required(sub, "id")?;
    let bonds = client.bonds();
    let mut bond = bonds.get(id).await?;
    apply_bond_args(&mut bond, sub)?;
    bond.validate()?;
    bonds.update(&bond).await?;
    println!("Updated bond '{}' (id {})", bond.name, bond.id);
    Ok(())
}

async fn remove(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = required(sub, "id")?;
    client.projections().delete(id).await?;
    println!("Removed bond {}", id);
    Ok(())
}

fn blank_bond() -> Bond {
    Bond {
        id: 0,
        user_id: 0,
        name: String::new(),
        nominal_value: Decimal::ZERO,
        commercial_value: Decimal::ZERO,
        number_of_years: 0,
        coupon_frequency: CouponFrequency::Annual,
        days_per_year: DayCountBasis::Days360,
        interest_rate_type: InterestRateType::Compound,
        capitalization: 0,
        interest_rate: Decimal::ZERO,
        annual_discount_rate: Decimal::ZERO,
        issue_date: Utc::now().date_naive(),
        grace_period_type: GracePeriodType::None,
        grace_period_duration: 0,
        currency: String::new(),
        effective_annual_rate: Decimal::ZERO,
        cok_per_period: Decimal::ZERO,
    }
}

/// Overwrites the fields given on the command line.
pub fn apply_bond_args(bond: &mut Bond, sub: &clap::ArgMatches) -> Result<()> {
    if let Some(name) = sub.get_one::<String>("name") {
        bond.name = name.trim().to_string();
    }
    if let Some(raw) = sub.get_one::<String>("nominal") {
        bond.nominal_value = parse_decimal(raw)?;
    }
    if let Some(raw) = sub.get_one::<String>("commercial") {
        bond.commercial_value = parse_decimal(raw)?;
    }
    if let Some(years) = sub.get_one::<u32>("years") {
        bond.number_of_years = *years;
    }
    if let Some(freq) = sub.get_one::<CouponFrequency>("frequency") {
        bond.coupon_frequency = *freq;
    }
    if let Some(days) = sub.get_one::<DayCountBasis>("days") {
        bond.days_per_year = *days;
    }
    if let Some(kind) = sub.get_one::<InterestRateType>("rate-type") {
        bond.interest_rate_type = *kind;
    }
    if let Some(raw) = sub.get_one::<String>("capitalization") {
        bond.capitalization = parse_capitalization(raw)?;
    }
    if let Some(raw) = sub.get_one::<String>("rate") {
        bond.interest_rate = parse_decimal(raw).context("--rate")?;
    }
    if let Some(raw) = sub.get_one::<String>("discount") {
        bond.annual_discount_rate = parse_decimal(raw).context("--discount")?;
    }
    if let Some(raw) = sub.get_one::<String>("issue-date") {
        bond.issue_date = parse_date(raw)?;
    }
    if let Some(ccy) = sub.get_one::<String>("currency") {
        bond.currency = ccy.trim().to_uppercase();
    }
    Ok(())
}

pub fn bond_table(b: &Bond) -> comfy_table::Table {
    let rows = vec![
        vec!["ID".into(), b.id.to_string()],
        vec!["Name".into(), b.name.clone()],
        vec!["User".into(), b.user_id.to_string()],
        vec!["Nominal value".into(), fmt_money(&b.nominal_value, &b.currency)],
        vec!["Commercial value".into(), fmt_money(&b.commercial_value, &b.currency)],
        vec!["Years".into(), b.number_of_years.to_string()],
        vec!["Coupon frequency".into(), b.coupon_frequency.to_string()],
        vec!["Days per year".into(), b.days_per_year.to_string()],
        vec!["Rate type".into(), b.interest_rate_type.to_string()],
        vec!["Capitalization (days)".into(), b.capitalization.to_string()],
        vec!["Interest rate".into(), fmt_pct(&b.interest_rate)],
        vec!["Annual discount rate".into(), fmt_pct(&b.annual_discount_rate)],
        vec!["Issue date".into(), b.issue_date.to_string()],
        vec![
            "Grace period".into(),
            format!("{} ({} periods)", b.grace_period_type, b.grace_period_duration),
        ],
        vec!["Effective annual rate".into(), fmt_pct(&b.effective_annual_rate)],
        vec!["COK per period".into(), fmt_pct(&b.cok_per_period)],
    ];
    pretty_table(&["Field", "Value"], rows)
}
