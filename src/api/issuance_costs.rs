// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt::Display;

use reqwest::Method;
use tracing::debug;

use super::client::ApiClient;
use super::routes;
use crate::error::{ApiError, Operation};
use crate::models::IssuanceCost;

/// Issuance cost endpoints. Obtained from [`ApiClient::issuance_costs`].
pub struct IssuanceCostsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> IssuanceCostsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list_all(&self) -> Result<Vec<IssuanceCost>, ApiError> {
        let op = Operation::ListIssuanceCosts;
        self.client
            .call_json(op, self.client.request(Method::GET, routes::ISSUANCE_COSTS))
            .await
    }

    /// Downloads every issuance cost and returns the first whose bond id,
    /// as text, equals `bond_id`. No match is `Ok(None)`.
    pub async fn scan_for_bond_id(
        &self,
        bond_id: impl Display,
    ) -> Result<Option<IssuanceCost>, ApiError> {
        let key = bond_id.to_string();
        let key = key.trim();
        let costs = self.list_all().await?;
        debug!(bond_id = key, scanned = costs.len(), "scanning issuance costs by bond id");
        Ok(costs.into_iter().find(|c| c.bond_id.to_string() == key))
    }

    pub async fn get(&self, id: i64) -> Result<IssuanceCost, ApiError> {
        let op = Operation::GetIssuanceCost;
        self.client
            .call_json(op, self.client.request(Method::GET, &routes::issuance_cost(id)))
            .await
    }

    pub async fn create(&self, cost: &IssuanceCost) -> Result<(), ApiError> {
        let op = Operation::CreateIssuanceCost;
        let rb = self
            .client
            .request(Method::POST, routes::ISSUANCE_COSTS)
            .json(cost);
        self.client.call(op, rb).await?;
        Ok(())
    }

    /// Full replace; the service keys the record by `cost.id` in the body.
    pub async fn update(&self, cost: &IssuanceCost) -> Result<(), ApiError> {
        let op = Operation::UpdateIssuanceCost;
        let rb = self
            .client
            .request(Method::PUT, routes::ISSUANCE_COSTS)
            .json(cost);
        self.client.call(op, rb).await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let op = Operation::DeleteIssuanceCost;
        self.client
            .call(
                op,
                self.client.request(Method::DELETE, &routes::issuance_cost(id)),
            )
            .await?;
        Ok(())
    }
}
