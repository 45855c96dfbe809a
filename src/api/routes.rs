// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Paths of the bond service, relative to the configured base URL.

pub const BONDS: &str = "/api/v1/bonds";
pub const ISSUANCE_COSTS: &str = "/api/v1/issuance-costs";

pub fn bond(id: i64) -> String {
    format!("{BONDS}/{id}")
}

pub fn bond_initial_costs(id: i64) -> String {
    format!("{BONDS}/{id}/initial-costs")
}

pub fn bond_final_costs(id: i64) -> String {
    format!("{BONDS}/{id}/final-costs")
}

pub fn bond_yields(id: i64) -> String {
    format!("{BONDS}/{id}/yields")
}

pub fn bond_payment_schedule(id: i64) -> String {
    format!("{BONDS}/{id}/payment-schedule")
}

pub fn issuance_cost(id: i64) -> String {
    format!("{ISSUANCE_COSTS}/{id}")
}
