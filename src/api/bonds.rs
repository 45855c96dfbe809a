// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use reqwest::Method;
use tracing::debug;

use super::client::ApiClient;
use super::routes;
use crate::error::{ApiError, Operation};
use crate::models::{Bond, PaymentScheduleRow, ScheduleEnvelope, YieldIndicators};

/// Bond endpoints. Obtained from [`ApiClient::bonds`].
pub struct BondsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> BondsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Full collection, unpaginated.
    pub async fn list_all(&self) -> Result<Vec<Bond>, ApiError> {
        let op = Operation::ListBonds;
        self.client
            .call_json(op, self.client.request(Method::GET, routes::BONDS))
            .await
    }

    /// Downloads every bond and returns the first one named `name`.
    ///
    /// The service has no lookup by name, so each call costs a full list
    /// fetch. Duplicate names resolve to whichever comes first; no match is
    /// `Ok(None)`.
    pub async fn scan_for_name(&self, name: &str) -> Result<Option<Bond>, ApiError> {
        let bonds = self.list_all().await?;
        debug!(name, scanned = bonds.len(), "scanning bonds by name");
        Ok(bonds.into_iter().find(|b| b.name == name))
    }

    pub async fn get(&self, id: i64) -> Result<Bond, ApiError> {
        let op = Operation::GetBond;
        self.client
            .call_json(op, self.client.request(Method::GET, &routes::bond(id)))
            .await
    }

    /// The service assigns the id; look the bond up afterwards to learn it.
    pub async fn create(&self, bond: &Bond) -> Result<(), ApiError> {
        let op = Operation::CreateBond;
        let rb = self.client.request(Method::POST, routes::BONDS).json(bond);
        self.client.call(op, rb).await?;
        Ok(())
    }

    /// Full replace of the bond stored under `bond.id`.
    pub async fn update(&self, bond: &Bond) -> Result<(), ApiError> {
        let op = Operation::UpdateBond;
        let rb = self
            .client
            .request(Method::PUT, &routes::bond(bond.id))
            .json(bond);
        self.client.call(op, rb).await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let op = Operation::DeleteBond;
        self.client
            .call(op, self.client.request(Method::DELETE, &routes::bond(id)))
            .await?;
        Ok(())
    }

    /// Asks the service to compute issuance costs; returns the updated bond.
    pub async fn calculate_initial_costs(&self, id: i64) -> Result<Bond, ApiError> {
        let op = Operation::CalculateInitialCosts;
        self.client
            .call_json(
                op,
                self.client.request(Method::PUT, &routes::bond_initial_costs(id)),
            )
            .await
    }

    pub async fn calculate_final_costs(&self, id: i64) -> Result<Bond, ApiError> {
        let op = Operation::CalculateFinalCosts;
        self.client
            .call_json(
                op,
                self.client.request(Method::PUT, &routes::bond_final_costs(id)),
            )
            .await
    }

    pub async fn fetch_yield(&self, id: i64) -> Result<YieldIndicators, ApiError> {
        let op = Operation::FetchYield;
        self.client
            .call_json(op, self.client.request(Method::GET, &routes::bond_yields(id)))
            .await
    }

    /// Schedule for the bond's current grace-period settings.
    pub async fn fetch_payment_schedule(&self, id: i64) -> Result<Vec<PaymentScheduleRow>, ApiError> {
        let op = Operation::FetchPaymentSchedule;
        let envelope: ScheduleEnvelope = self
            .client
            .call_json(
                op,
                self.client
                    .request(Method::GET, &routes::bond_payment_schedule(id)),
            )
            .await?;
        Ok(envelope.into_rows())
    }
}
