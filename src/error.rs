// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Failure types of the bond service client.
//!
//! Every remote operation reports failures as an [`ApiError`]. Its `Display`
//! output is the sanitized message shown to users; the full detail is logged
//! when the error is built and stays reachable through the accessors.

use std::error::Error as StdError;
use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::error;

/// Remote operation that produced a failure. Carries the message used when
/// the service rejects a request without saying why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListBonds,
    GetBond,
    CreateBond,
    UpdateBond,
    DeleteBond,
    CalculateInitialCosts,
    CalculateFinalCosts,
    FetchYield,
    FetchPaymentSchedule,
    ListIssuanceCosts,
    GetIssuanceCost,
    CreateIssuanceCost,
    UpdateIssuanceCost,
    DeleteIssuanceCost,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::ListBonds => "bond.list",
            Operation::GetBond => "bond.get",
            Operation::CreateBond => "bond.create",
            Operation::UpdateBond => "bond.update",
            Operation::DeleteBond => "bond.delete",
            Operation::CalculateInitialCosts => "bond.initial_costs",
            Operation::CalculateFinalCosts => "bond.final_costs",
            Operation::FetchYield => "bond.yields",
            Operation::FetchPaymentSchedule => "bond.payment_schedule",
            Operation::ListIssuanceCosts => "issuance_cost.list",
            Operation::GetIssuanceCost => "issuance_cost.get",
            Operation::CreateIssuanceCost => "issuance_cost.create",
            Operation::UpdateIssuanceCost => "issuance_cost.update",
            Operation::DeleteIssuanceCost => "issuance_cost.delete",
        }
    }

    pub fn default_message(self) -> &'static str {
        match self {
            Operation::ListBonds => "Failed to fetch bonds",
            Operation::GetBond => "Failed to fetch bond",
            Operation::CreateBond => "Failed to create bond",
            Operation::UpdateBond => "Failed to update bond",
            Operation::DeleteBond => "Failed to delete bond",
            Operation::CalculateInitialCosts => "Failed to fetch calculus of initial costs.",
            Operation::CalculateFinalCosts => "Failed to fetch calculus of final costs.",
            Operation::FetchYield => "Failed to fetch bond yields.",
            Operation::FetchPaymentSchedule => "Failed to fetch payment schedule.",
            Operation::ListIssuanceCosts => "Failed to fetch issuance costs",
            Operation::GetIssuanceCost => "Failed to fetch issuance cost",
            Operation::CreateIssuanceCost => "Failed to create issuance cost",
            Operation::UpdateIssuanceCost => "Failed to update issuance cost",
            Operation::DeleteIssuanceCost => "Failed to delete issuance cost",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The service answered with an error status.
    Statused,
    /// The request failed for another reason; detail is kept off the message.
    Unexpected,
    /// The failure carried no error value at all.
    Unknown,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{}: {message}", status_label(.status))]
    Status {
        operation: Operation,
        /// Always set by [`ApiError::from_response`]; `None` only for errors
        /// built by hand, displayed as `Unknown`.
        status: Option<u16>,
        message: String,
    },

    #[error("An unexpected error occurred")]
    Unexpected {
        operation: Operation,
        raw_message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("An unknown error occurred")]
    Unknown { operation: Operation, detail: String },
}

fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "Unknown".to_string(), |s| s.to_string())
}

#[derive(Deserialize)]
struct ServerMessage {
    message: Option<String>,
}

fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ServerMessage>(body)
        .ok()?
        .message
        .filter(|m| !m.trim().is_empty())
}

fn error_chain(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut cur = err.source();
    while let Some(e) = cur {
        out.push_str(": ");
        out.push_str(&e.to_string());
        cur = e.source();
    }
    out
}

impl ApiError {
    /// The service answered, but not with a success status.
    pub fn from_response(operation: Operation, status: StatusCode, body: &str) -> Self {
        let message =
            server_message(body).unwrap_or_else(|| operation.default_message().to_string());
        error!(
            operation = %operation,
            status = status.as_u16(),
            message = %message,
            body = %body,
            "bond service rejected the request"
        );
        ApiError::Status {
            operation,
            status: Some(status.as_u16()),
            message,
        }
    }

    /// Anything reqwest reports before a status is known, or while decoding
    /// a success body: connect/DNS failures, timeouts, malformed JSON.
    /// Error statuses never reach here; `execute` routes them to
    /// [`ApiError::from_response`].
    pub fn from_transport(operation: Operation, err: reqwest::Error) -> Self {
        let raw_message = error_chain(&err);
        error!(
            operation = %operation,
            timeout = err.is_timeout(),
            connect = err.is_connect(),
            decode = err.is_decode(),
            url = ?err.url().map(|u| u.as_str()),
            error = %raw_message,
            "unexpected failure calling bond service"
        );
        ApiError::Unexpected {
            operation,
            raw_message,
            source: Some(err),
        }
    }

    pub fn unknown(operation: Operation, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        error!(operation = %operation, detail = %detail, "unknown failure calling bond service");
        ApiError::Unknown { operation, detail }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::Status { .. } => FailureKind::Statused,
            ApiError::Unexpected { .. } => FailureKind::Unexpected,
            ApiError::Unknown { .. } => FailureKind::Unknown,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            ApiError::Status { operation, .. }
            | ApiError::Unexpected { operation, .. }
            | ApiError::Unknown { operation, .. } => *operation,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => *status,
            _ => None,
        }
    }

    /// Unsanitized detail, for logs and diagnostics.
    pub fn raw_message(&self) -> &str {
        match self {
            ApiError::Status { message, .. } => message,
            ApiError::Unexpected { raw_message, .. } => raw_message,
            ApiError::Unknown { detail, .. } => detail,
        }
    }

    /// Message safe to show to users; same text as `Display`.
    pub fn display_message(&self) -> String {
        self.to_string()
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Input that fails shape checks before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {subject}: {}", .problems.join("; "))]
pub struct ValidationError {
    pub subject: &'static str,
    pub problems: Vec<String>,
}

impl ValidationError {
    pub(crate) fn check(subject: &'static str, problems: Vec<String>) -> Result<(), Self> {
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { subject, problems })
        }
    }
}

/// Steps of the multi-request projection workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CreateBond,
    LookupBond,
    CreateIssuanceCost,
    DeleteIssuanceCost,
    DeleteBond,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::CreateBond => "creating the bond",
            Step::LookupBond => "looking up the new bond",
            Step::CreateIssuanceCost => "creating the issuance cost",
            Step::DeleteIssuanceCost => "deleting the issuance cost",
            Step::DeleteBond => "deleting the bond",
        })
    }
}

/// Outcome of the compensating action run after a partial failure.
#[derive(Debug)]
pub enum Rollback {
    Completed,
    /// Nothing identified the record to undo.
    Skipped,
    Failed(ApiError),
}

impl fmt::Display for Rollback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rollback::Completed => f.write_str("earlier steps were rolled back"),
            Rollback::Skipped => f.write_str("earlier steps could not be rolled back"),
            Rollback::Failed(e) => write!(f, "rollback failed ({}), remote state is inconsistent", e),
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The first request failed; nothing changed remotely.
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{step} failed after {completed}: {source}; {rollback}")]
    Partial {
        step: Step,
        completed: Step,
        #[source]
        source: ApiError,
        rollback: Rollback,
    },

    /// Created, then missing from the list; there is no id to roll back with.
    #[error("bond '{name}' was created but could not be found again")]
    Orphaned { name: String },
}

impl WorkflowError {
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            WorkflowError::Api(e) | WorkflowError::Partial { source: e, .. } => Some(e),
            _ => None,
        }
    }

    pub fn rolled_back(&self) -> bool {
        matches!(
            self,
            WorkflowError::Partial {
                rollback: Rollback::Completed,
                ..
            }
        )
    }
}
