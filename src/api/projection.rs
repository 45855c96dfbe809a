// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Flows that touch a bond and its issuance cost together.
//!
//! The service has no combined endpoints, so these run several requests in
//! sequence. When a later request fails, the earlier ones are undone with a
//! compensating request and the outcome is reported in
//! [`WorkflowError::Partial`].

use tokio::task::JoinSet;
use tracing::{info, warn};

use super::client::ApiClient;
use crate::error::{ApiError, Operation, Rollback, Step, ValidationError, WorkflowError};
use crate::models::{Bond, GracePeriodType, IssuanceCost, PaymentScheduleRow, Session, YieldIndicators};

/// A bond with its issuance cost, if one was recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub bond: Bond,
    pub issuance_cost: Option<IssuanceCost>,
}

/// Outcome of fetching one bond's indicators during [`ProjectionsApi::analyze_all`].
#[derive(Debug)]
pub struct YieldReport {
    pub bond: Bond,
    pub result: Result<YieldIndicators, ApiError>,
}

pub struct ProjectionsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ProjectionsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Creates `bond` for the session's user, finds it again by name to learn
    /// its id, then records `cost` against it. A failed cost step deletes the
    /// bond again.
    pub async fn create(
        &self,
        session: &Session,
        bond: &Bond,
        cost: &IssuanceCost,
    ) -> Result<Projection, WorkflowError> {
        let bonds = self.client.bonds();
        let costs = self.client.issuance_costs();

        let mut draft = bond.as_draft();
        draft.user_id = session.user_id;
        draft.validate()?;
        cost.validate()?;

        // The id is recovered by name below, so a clash would pick up the wrong bond.
        if bonds.scan_for_name(&draft.name).await?.is_some() {
            return Err(ValidationError {
                subject: "bond",
                problems: vec![format!("a bond named '{}' already exists", draft.name)],
            }
            .into());
        }

        bonds.create(&draft).await?;
        info!(name = %draft.name, "bond created, looking up its id");

        let created = match bonds.scan_for_name(&draft.name).await {
            Ok(Some(b)) => b,
            Ok(None) => {
                return Err(WorkflowError::Orphaned {
                    name: draft.name.clone(),
                });
            }
            Err(source) => {
                return Err(WorkflowError::Partial {
                    step: Step::LookupBond,
                    completed: Step::CreateBond,
                    source,
                    rollback: Rollback::Skipped,
                });
            }
        };

        let cost_draft = cost.draft_for(created.id);
        if let Err(source) = costs.create(&cost_draft).await {
            warn!(bond_id = created.id, "issuance cost failed, deleting the new bond");
            let rollback = match bonds.delete(created.id).await {
                Ok(()) => Rollback::Completed,
                Err(e) => Rollback::Failed(e),
            };
            return Err(WorkflowError::Partial {
                step: Step::CreateIssuanceCost,
                completed: Step::CreateBond,
                source,
                rollback,
            });
        }

        info!(bond_id = created.id, name = %created.name, "projection created");
        Ok(Projection {
            bond: created,
            issuance_cost: Some(cost_draft),
        })
    }

    /// Deletes the issuance cost, then the bond. If the bond cannot be
    /// deleted, the issuance cost is recorded again.
    pub async fn delete(&self, bond_id: i64) -> Result<(), WorkflowError> {
        let bonds = self.client.bonds();
        let costs = self.client.issuance_costs();

        let cost = costs.scan_for_bond_id(bond_id).await?;
        if let Some(c) = &cost {
            costs.delete(c.id).await?;
        }

        let Err(source) = bonds.delete(bond_id).await else {
            info!(bond_id, "projection deleted");
            return Ok(());
        };
        let Some(c) = cost else {
            return Err(source.into());
        };
        warn!(bond_id, "bond delete failed, restoring its issuance cost");
        let rollback = match costs.create(&c.draft_for(bond_id)).await {
            Ok(()) => Rollback::Completed,
            Err(e) => Rollback::Failed(e),
        };
        Err(WorkflowError::Partial {
            step: Step::DeleteBond,
            completed: Step::DeleteIssuanceCost,
            source,
            rollback,
        })
    }

    /// Bond and issuance cost, fetched concurrently.
    pub async fn load(&self, bond_id: i64) -> Result<Projection, ApiError> {
        let bonds = self.client.bonds();
        let costs = self.client.issuance_costs();
        let (bond, issuance_cost) =
            tokio::try_join!(bonds.get(bond_id), costs.scan_for_bond_id(bond_id))?;
        Ok(Projection {
            bond,
            issuance_cost,
        })
    }

    /// Stores the grace-period settings on the bond, then fetches the schedule
    /// the service regenerates from them.
    pub async fn apply_grace_period(
        &self,
        bond_id: i64,
        kind: GracePeriodType,
        periods: u32,
    ) -> Result<Vec<PaymentScheduleRow>, WorkflowError> {
        let bonds = self.client.bonds();
        let mut bond = bonds.get(bond_id).await?;
        let periods = if kind == GracePeriodType::None { 0 } else { periods };
        let problem = match bond.total_periods() {
            None => Some(format!(
                "bond {} has a term too long to schedule ({} years)",
                bond_id, bond.number_of_years
            )),
            Some(total) if periods > total => Some(format!(
                "{} periods exceeds the {} periods of bond {}",
                periods, total, bond_id
            )),
            Some(_) => None,
        };
        if let Some(problem) = problem {
            return Err(ValidationError {
                subject: "grace period",
                problems: vec![problem],
            }
            .into());
        }
        if bond.grace_period_type != kind || bond.grace_period_duration != periods {
            bond.grace_period_type = kind;
            bond.grace_period_duration = periods;
            bonds.update(&bond).await?;
            info!(bond_id, grace = %kind, periods, "grace period updated");
        }
        Ok(bonds.fetch_payment_schedule(bond_id).await?)
    }

    /// Indicators for every bond, one concurrent request per bond. A failed
    /// bond does not stop the others; its error is kept in the report.
    pub async fn analyze_all(&self) -> Result<Vec<YieldReport>, ApiError> {
        let bonds = self.client.bonds().list_all().await?;
        let mut tasks = JoinSet::new();
        for (idx, bond) in bonds.iter().enumerate() {
            let client = self.client.clone();
            let id = bond.id;
            tasks.spawn(async move { (idx, client.bonds().fetch_yield(id).await) });
        }

        let mut results: Vec<Option<Result<YieldIndicators, ApiError>>> =
            bonds.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, result)) => results[idx] = Some(result),
                Err(e) => warn!(error = %e, "yield task did not finish"),
            }
        }

        Ok(bonds
            .into_iter()
            .zip(results)
            .map(|(bond, result)| YieldReport {
                result: result.unwrap_or_else(|| {
                    Err(ApiError::unknown(
                        Operation::FetchYield,
                        format!("yield task for bond {} ended without a result", bond.id),
                    ))
                }),
                bond,
            })
            .collect())
    }
}
