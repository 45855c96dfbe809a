// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod analysis;
pub mod bonds;
pub mod costs;
pub mod schedule;
pub mod setup;

use anyhow::{Result, anyhow};

/// Value of an argument clap already marked as required.
pub(crate) fn required<T>(m: &clap::ArgMatches, id: &str) -> Result<T>
where
    T: Clone + Send + Sync + 'static,
{
    m.get_one::<T>(id)
        .cloned()
        .ok_or_else(|| anyhow!("Missing required argument '{}'", id))
}
