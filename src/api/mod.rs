// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod bonds;
pub mod client;
pub mod issuance_costs;
pub mod projection;
pub mod routes;

pub use bonds::BondsApi;
pub use client::ApiClient;
pub use issuance_costs::IssuanceCostsApi;
pub use projection::{Projection, ProjectionsApi, YieldReport};
