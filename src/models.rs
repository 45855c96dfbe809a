// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind} '{value}' (expected one of: {expected})")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CouponFrequency {
    #[serde(rename = "mensual")]
    Monthly,
    #[serde(rename = "bimestral")]
    Bimonthly,
    #[serde(rename = "trimestral")]
    Quarterly,
    #[serde(rename = "cuatrimestral")]
    FourMonthly,
    #[serde(rename = "semestral")]
    Semiannual,
    #[serde(rename = "anual")]
    Annual,
}

impl CouponFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            CouponFrequency::Monthly => 12,
            CouponFrequency::Bimonthly => 6,
            CouponFrequency::Quarterly => 4,
            CouponFrequency::FourMonthly => 3,
            CouponFrequency::Semiannual => 2,
            CouponFrequency::Annual => 1,
        }
    }

    /// Name used by the service on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            CouponFrequency::Monthly => "mensual",
            CouponFrequency::Bimonthly => "bimestral",
            CouponFrequency::Quarterly => "trimestral",
            CouponFrequency::FourMonthly => "cuatrimestral",
            CouponFrequency::Semiannual => "semestral",
            CouponFrequency::Annual => "anual",
        }
    }
}

impl fmt::Display for CouponFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for CouponFrequency {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "mensual" => Ok(CouponFrequency::Monthly),
            "bimonthly" | "bimestral" => Ok(CouponFrequency::Bimonthly),
            "quarterly" | "trimestral" => Ok(CouponFrequency::Quarterly),
            "four-monthly" | "cuatrimestral" => Ok(CouponFrequency::FourMonthly),
            "semiannual" | "semestral" => Ok(CouponFrequency::Semiannual),
            "annual" | "anual" => Ok(CouponFrequency::Annual),
            _ => Err(ParseEnumError {
                kind: "coupon frequency",
                value: s.to_string(),
                expected: "monthly, bimonthly, quarterly, four-monthly, semiannual, annual",
            }),
        }
    }
}

/// Day-count basis, sent as the bare number of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum DayCountBasis {
    Days360,
    Days365,
}

impl DayCountBasis {
    pub fn days(self) -> u16 {
        match self {
            DayCountBasis::Days360 => 360,
            DayCountBasis::Days365 => 365,
        }
    }
}

impl From<DayCountBasis> for u16 {
    fn from(basis: DayCountBasis) -> Self {
        basis.days()
    }
}

impl TryFrom<u16> for DayCountBasis {
    type Error = ParseEnumError;

    fn try_from(days: u16) -> Result<Self, Self::Error> {
        match days {
            360 => Ok(DayCountBasis::Days360),
            365 => Ok(DayCountBasis::Days365),
            other => Err(ParseEnumError {
                kind: "days per year",
                value: other.to_string(),
                expected: "360, 365",
            }),
        }
    }
}

impl FromStr for DayCountBasis {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let days = s.trim().parse::<u16>().map_err(|_| ParseEnumError {
            kind: "days per year",
            value: s.to_string(),
            expected: "360, 365",
        })?;
        DayCountBasis::try_from(days)
    }
}

impl fmt::Display for DayCountBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.days())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestRateType {
    Simple,
    Compound,
}

impl FromStr for InterestRateType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(InterestRateType::Simple),
            "compound" | "compuesto" => Ok(InterestRateType::Compound),
            _ => Err(ParseEnumError {
                kind: "interest rate type",
                value: s.to_string(),
                expected: "simple, compound",
            }),
        }
    }
}

impl fmt::Display for InterestRateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterestRateType::Simple => f.write_str("simple"),
            InterestRateType::Compound => f.write_str("compound"),
        }
    }
}

/// Grace period applied at the start of the payment plan, sent as 0/1/2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GracePeriodType {
    #[default]
    None,
    Partial,
    Total,
}

impl From<GracePeriodType> for u8 {
    fn from(kind: GracePeriodType) -> Self {
        match kind {
            GracePeriodType::None => 0,
            GracePeriodType::Partial => 1,
            GracePeriodType::Total => 2,
        }
    }
}

impl TryFrom<u8> for GracePeriodType {
    type Error = ParseEnumError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(GracePeriodType::None),
            1 => Ok(GracePeriodType::Partial),
            2 => Ok(GracePeriodType::Total),
            other => Err(ParseEnumError {
                kind: "grace period type",
                value: other.to_string(),
                expected: "0, 1, 2",
            }),
        }
    }
}

impl FromStr for GracePeriodType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "ninguno" | "0" => Ok(GracePeriodType::None),
            "partial" | "parcial" | "1" => Ok(GracePeriodType::Partial),
            "total" | "2" => Ok(GracePeriodType::Total),
            _ => Err(ParseEnumError {
                kind: "grace period type",
                value: s.to_string(),
                expected: "none, partial, total",
            }),
        }
    }
}

impl fmt::Display for GracePeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GracePeriodType::None => f.write_str("none"),
            GracePeriodType::Partial => f.write_str("partial"),
            GracePeriodType::Total => f.write_str("total"),
        }
    }
}

/// Who carries an issuance cost line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Payer {
    #[default]
    Issuer,
    Investor,
    Shared,
}

impl FromStr for Payer {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "issuer" | "emisor" => Ok(Payer::Issuer),
            "investor" | "inversor" => Ok(Payer::Investor),
            "shared" | "compartido" => Ok(Payer::Shared),
            _ => Err(ParseEnumError {
                kind: "payer",
                value: s.to_string(),
                expected: "issuer, investor, shared",
            }),
        }
    }
}

impl fmt::Display for Payer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payer::Issuer => f.write_str("issuer"),
            Payer::Investor => f.write_str("investor"),
            Payer::Shared => f.write_str("shared"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bond {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub nominal_value: Decimal,
    pub commercial_value: Decimal,
    pub number_of_years: u32,
    pub coupon_frequency: CouponFrequency,
    pub days_per_year: DayCountBasis,
    pub interest_rate_type: InterestRateType,
    pub capitalization: u32, // days
    pub interest_rate: Decimal,
    pub annual_discount_rate: Decimal,
    #[serde(with = "wire_date")]
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub grace_period_type: GracePeriodType,
    #[serde(default)]
    pub grace_period_duration: u32,
    pub currency: String,
    #[serde(default)]
    pub effective_annual_rate: Decimal,
    #[serde(default)]
    pub cok_per_period: Decimal,
}

impl Bond {
    /// `0` is reserved for records the service has not assigned an id to yet.
    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }

    /// `None` when the term does not fit in a `u32` period count.
    pub fn total_periods(&self) -> Option<u32> {
        self.number_of_years
            .checked_mul(self.coupon_frequency.periods_per_year())
    }

    /// Copy suitable for the create endpoint: no id and zeroed computed fields.
    pub fn as_draft(&self) -> Bond {
        Bond {
            id: 0,
            effective_annual_rate: Decimal::ZERO,
            cok_per_period: Decimal::ZERO,
            ..self.clone()
        }
    }

    /// Shape checks the service expects before a bond is submitted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push("bond name is required".to_string());
        }
        if self.nominal_value <= Decimal::ZERO {
            problems.push("nominal value must be positive".to_string());
        }
        if self.commercial_value <= Decimal::ZERO {
            problems.push("commercial value must be positive".to_string());
        }
        if self.number_of_years == 0 {
            problems.push("number of years must be positive".to_string());
        }
        if self.interest_rate.is_sign_negative() {
            problems.push("interest rate cannot be negative".to_string());
        }
        if self.annual_discount_rate.is_sign_negative() {
            problems.push("discount rate cannot be negative".to_string());
        }
        match self.total_periods() {
            None => problems.push(format!(
                "term too long: {} years of {} coupons",
                self.number_of_years, self.coupon_frequency
            )),
            Some(total) if self.grace_period_duration > total => problems.push(format!(
                "grace period of {} periods exceeds the {} periods of the bond",
                self.grace_period_duration, total
            )),
            Some(_) => {}
        }
        if !crate::utils::is_currency_code(&self.currency) {
            problems.push(format!(
                "currency '{}' must be a three-letter code",
                self.currency
            ));
        }
        ValidationError::check("bond", problems)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuanceCost {
    pub id: i64,
    pub bond_id: i64,
    pub premium: Decimal,
    pub structuring_cost: Decimal,
    pub who_pays_structuring: Payer,
    pub placement_cost: Decimal,
    pub who_pays_placement: Payer,
    pub flotation_cost: Decimal,
    #[serde(rename = "whoPaysFloatation")]
    pub who_pays_flotation: Payer,
    pub cavali_fee: Decimal,
    pub who_pays_cavali: Payer,
    #[serde(default)]
    pub initial_cost_issuer: Decimal,
    #[serde(default)]
    pub initial_cost_bondholder: Decimal,
}

/// One percentage line of an issuance cost breakdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostLine {
    pub item: &'static str,
    pub pct: Decimal,
    pub payer: Payer,
}

impl IssuanceCost {
    pub fn lines(&self) -> [CostLine; 4] {
        [
            CostLine {
                item: "Structuring",
                pct: self.structuring_cost,
                payer: self.who_pays_structuring,
            },
            CostLine {
                item: "Placement",
                pct: self.placement_cost,
                payer: self.who_pays_placement,
            },
            CostLine {
                item: "Flotation",
                pct: self.flotation_cost,
                payer: self.who_pays_flotation,
            },
            CostLine {
                item: "CAVALI",
                pct: self.cavali_fee,
                payer: self.who_pays_cavali,
            },
        ]
    }

    /// Copy bound to `bond_id`, ready for the create endpoint.
    pub fn draft_for(&self, bond_id: i64) -> IssuanceCost {
        IssuanceCost {
            id: 0,
            bond_id,
            initial_cost_issuer: Decimal::ZERO,
            initial_cost_bondholder: Decimal::ZERO,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Vec::new();
        if self.premium.is_sign_negative() {
            problems.push("premium cannot be negative".to_string());
        }
        for line in self.lines() {
            if line.pct.is_sign_negative() {
                problems.push(format!("{} cost cannot be negative", line.item));
            }
        }
        ValidationError::check("issuance cost", problems)
    }
}

/// Indicators the service computes for a bond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldIndicators {
    pub bond_id: i64,
    pub tcea: Decimal,
    pub trea: Decimal,
    pub duration: Decimal,
    pub modified_duration: Decimal,
    pub convexity: Decimal,
    pub current_price: Decimal,
    pub profit_or_loss: Decimal,
    pub max_market_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentScheduleRow {
    pub period: u32,
    #[serde(with = "wire_date")]
    pub payment_date: NaiveDate,
    pub interest: Decimal,
    pub amortization: Decimal,
    #[serde(rename = "cuota")]
    pub installment: Decimal,
    #[serde(rename = "saldo")]
    pub balance: Decimal,
}

/// The schedule endpoint answers either with the rows or with `{"data": rows}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ScheduleEnvelope {
    Rows(Vec<PaymentScheduleRow>),
    Wrapped { data: Vec<PaymentScheduleRow> },
}

impl ScheduleEnvelope {
    pub(crate) fn into_rows(self) -> Vec<PaymentScheduleRow> {
        match self {
            ScheduleEnvelope::Rows(rows) | ScheduleEnvelope::Wrapped { data: rows } => rows,
        }
    }
}

/// Identity of the user creating projections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            user_id: 1,
            username: String::new(),
        }
    }
}

/// Accepts `YYYY-MM-DD` and ISO-8601 date-times, writes `YYYY-MM-DD`.
pub(crate) mod wire_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(d: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveDate, String> {
        let head = raw.trim().get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(head, FORMAT)
            .map_err(|e| format!("invalid date '{}': {}", raw, e))
    }
}
