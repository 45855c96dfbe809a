// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! In-process stand-in for the bond service.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Request, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, StatusCode};
use axum::middleware::{Next, from_fn_with_state};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use tokio::net::TcpListener;

use bondclip::api::ApiClient;
use bondclip::models::{
    Bond, CouponFrequency, DayCountBasis, GracePeriodType, InterestRateType, IssuanceCost, Payer,
    PaymentScheduleRow, YieldIndicators,
};

#[derive(Debug, Clone)]
pub enum Failure {
    Status { status: u16, message: Option<String> },
    /// 200 with a body that is not JSON.
    Garbage,
}

#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Default)]
pub struct FakeState {
    pub bonds: Mutex<Vec<Bond>>,
    pub costs: Mutex<Vec<IssuanceCost>>,
    next_id: AtomicI64,
    failures: Mutex<HashMap<String, Failure>>,
    pub seen: Mutex<Vec<Seen>>,
    pub wrap_schedule: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl FakeState {
    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

pub struct FakeService {
    pub base_url: String,
    pub state: Arc<FakeState>,
}

impl FakeService {
    pub fn client(&self) -> ApiClient {
        ApiClient::unauthenticated(&self.base_url, Duration::from_secs(5)).unwrap()
    }

    pub fn authed_client(&self, token: &str) -> ApiClient {
        ApiClient::authenticated(&self.base_url, Duration::from_secs(5), token).unwrap()
    }

    /// Every `method path` request answers with `failure` until cleared.
    pub fn fail(&self, method: &str, path: &str, failure: Failure) {
        self.state
            .failures
            .lock()
            .unwrap()
            .insert(format!("{} {}", method, path), failure);
    }

    pub fn fail_status(&self, method: &str, path: &str, status: u16, message: Option<&str>) {
        self.fail(
            method,
            path,
            Failure::Status {
                status,
                message: message.map(str::to_string),
            },
        );
    }

    /// Holds every answer back by `delay`.
    pub fn delay_responses(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = Some(delay);
    }

    pub fn clear_failures(&self) {
        self.state.failures.lock().unwrap().clear();
    }

    pub fn seed_bond(&self, bond: Bond) -> i64 {
        let id = self.state.next_id();
        self.state.bonds.lock().unwrap().push(Bond { id, ..bond });
        id
    }

    pub fn seed_cost(&self, cost: IssuanceCost) -> i64 {
        let id = self.state.next_id();
        self.state
            .costs
            .lock()
            .unwrap()
            .push(IssuanceCost { id, ..cost });
        id
    }

    pub fn bond_names(&self) -> Vec<String> {
        self.state
            .bonds
            .lock()
            .unwrap()
            .iter()
            .map(|b| b.name.clone())
            .collect()
    }

    pub fn cost_bond_ids(&self) -> Vec<i64> {
        self.state
            .costs
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.bond_id)
            .collect()
    }

    pub fn requests(&self) -> Vec<Seen> {
        self.state.seen.lock().unwrap().clone()
    }
}

pub async fn spawn() -> FakeService {
    let state = Arc::new(FakeState::default());
    let app = router(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    FakeService {
        base_url: format!("http://{}", addr),
        state,
    }
}

/// A base URL nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Answers one request with a 500 whose body stops short of its
/// `Content-Length`, then hangs up.
pub async fn truncated_error_url() -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = sock.read(&mut buf).await;
        let head = "HTTP/1.1 500 Internal Server Error\r\n\
                    content-type: application/json\r\n\
                    content-length: 200\r\n\r\n{\"mess";
        let _ = sock.write_all(head.as_bytes()).await;
        let _ = sock.shutdown().await;
    });
    format!("http://{}", addr)
}

pub fn sample_bond(name: &str) -> Bond {
    Bond {
        id: 0,
        user_id: 1,
        name: name.to_string(),
        nominal_value: Decimal::new(1000, 0),
        commercial_value: Decimal::new(1050, 0),
        number_of_years: 5,
        coupon_frequency: CouponFrequency::Semiannual,
        days_per_year: DayCountBasis::Days360,
        interest_rate_type: InterestRateType::Compound,
        capitalization: 180,
        interest_rate: Decimal::new(8, 0),
        annual_discount_rate: Decimal::new(45, 1),
        issue_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        grace_period_type: GracePeriodType::None,
        grace_period_duration: 0,
        currency: "USD".into(),
        effective_annual_rate: Decimal::ZERO,
        cok_per_period: Decimal::ZERO,
    }
}

pub fn sample_cost(bond_id: i64) -> IssuanceCost {
    IssuanceCost {
        id: 0,
        bond_id,
        premium: Decimal::new(1, 0),
        structuring_cost: Decimal::new(45, 2),
        who_pays_structuring: Payer::Issuer,
        placement_cost: Decimal::new(25, 2),
        who_pays_placement: Payer::Shared,
        flotation_cost: Decimal::new(15, 2),
        who_pays_flotation: Payer::Investor,
        cavali_fee: Decimal::new(50, 2),
        who_pays_cavali: Payer::Shared,
        initial_cost_issuer: Decimal::ZERO,
        initial_cost_bondholder: Decimal::ZERO,
    }
}

type Shared = State<Arc<FakeState>>;

fn router(state: Arc<FakeState>) -> Router {
    Router::new()
        .route("/api/v1/bonds", get(list_bonds).post(create_bond))
        .route(
            "/api/v1/bonds/{id}",
            get(get_bond).put(update_bond).delete(delete_bond),
        )
        .route("/api/v1/bonds/{id}/initial-costs", put(initial_costs))
        .route("/api/v1/bonds/{id}/final-costs", put(final_costs))
        .route("/api/v1/bonds/{id}/yields", get(yields))
        .route("/api/v1/bonds/{id}/payment-schedule", get(schedule))
        .route(
            "/api/v1/issuance-costs",
            get(list_costs).post(create_cost).put(update_cost),
        )
        .route(
            "/api/v1/issuance-costs/{id}",
            get(get_cost).delete(delete_cost),
        )
        .layer(from_fn_with_state(state.clone(), record_and_inject))
        .with_state(state)
}

async fn record_and_inject(State(state): Shared, req: Request, next: Next) -> Response {
    let seen = {
        let header = |name: HeaderName| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Seen {
            method: req.method().to_string(),
            path: req.uri().path().to_string(),
            authorization: header(AUTHORIZATION),
            content_type: header(CONTENT_TYPE),
        }
    };
    let key = format!("{} {}", seen.method, seen.path);
    state.seen.lock().unwrap().push(seen);

    let delay = { *state.delay.lock().unwrap() };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let failure = { state.failures.lock().unwrap().get(&key).cloned() };
    match failure {
        Some(Failure::Status { status, message }) => {
            let body = message
                .map(|m| json!({ "message": m }).to_string())
                .unwrap_or_default();
            let code = StatusCode::from_u16(status).unwrap();
            (code, [(CONTENT_TYPE, "application/json")], body).into_response()
        }
        Some(Failure::Garbage) => {
            (StatusCode::OK, [(CONTENT_TYPE, "application/json")], "{\"id\": 1,").into_response()
        }
        None => next.run(req).await,
    }
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": format!("{} not found", what) })),
    )
        .into_response()
}

fn find_bond(state: &FakeState, id: i64) -> Option<Bond> {
    state.bonds.lock().unwrap().iter().find(|b| b.id == id).cloned()
}

async fn list_bonds(State(state): Shared) -> Json<Vec<Bond>> {
    Json(state.bonds.lock().unwrap().clone())
}

async fn create_bond(State(state): Shared, Json(bond): Json<Bond>) -> StatusCode {
    let id = state.next_id();
    state.bonds.lock().unwrap().push(Bond { id, ..bond });
    StatusCode::CREATED
}

async fn get_bond(State(state): Shared, Path(id): Path<i64>) -> Response {
    match find_bond(&state, id) {
        Some(b) => Json(b).into_response(),
        None => not_found("Bond"),
    }
}

async fn update_bond(State(state): Shared, Path(id): Path<i64>, Json(bond): Json<Bond>) -> Response {
    let mut bonds = state.bonds.lock().unwrap();
    match bonds.iter_mut().find(|b| b.id == id) {
        Some(slot) => {
            *slot = Bond { id, ..bond };
            StatusCode::OK.into_response()
        }
        None => not_found("Bond"),
    }
}

async fn delete_bond(State(state): Shared, Path(id): Path<i64>) -> Response {
    let mut bonds = state.bonds.lock().unwrap();
    let before = bonds.len();
    bonds.retain(|b| b.id != id);
    if bonds.len() == before {
        return not_found("Bond");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn initial_costs(State(state): Shared, Path(id): Path<i64>) -> Response {
    let Some(mut bond) = find_bond(&state, id) else {
        return not_found("Bond");
    };
    bond.effective_annual_rate = bond.interest_rate;
    bond.cok_per_period = bond.annual_discount_rate / Decimal::from(bond.coupon_frequency.periods_per_year());
    for c in state.costs.lock().unwrap().iter_mut().filter(|c| c.bond_id == id) {
        c.initial_cost_issuer = bond.commercial_value * c.structuring_cost / Decimal::ONE_HUNDRED;
        c.initial_cost_bondholder = bond.commercial_value * c.cavali_fee / Decimal::ONE_HUNDRED;
    }
    Json(bond).into_response()
}

async fn final_costs(State(state): Shared, Path(id): Path<i64>) -> Response {
    match find_bond(&state, id) {
        Some(b) => Json(b).into_response(),
        None => not_found("Bond"),
    }
}

async fn yields(State(state): Shared, Path(id): Path<i64>) -> Response {
    let Some(bond) = find_bond(&state, id) else {
        return not_found("Bond");
    };
    Json(YieldIndicators {
        bond_id: id,
        tcea: bond.interest_rate + Decimal::ONE,
        trea: bond.interest_rate - Decimal::ONE,
        duration: Decimal::new(43, 1),
        modified_duration: Decimal::new(41, 1),
        convexity: Decimal::new(215, 1),
        current_price: bond.commercial_value,
        profit_or_loss: Decimal::new(-125, 1),
        max_market_price: bond.nominal_value,
    })
    .into_response()
}

/// Bullet schedule; under a total grace period nothing is paid.
fn schedule_rows(bond: &Bond) -> Vec<PaymentScheduleRow> {
    let per_year = bond.coupon_frequency.periods_per_year();
    let n = bond.total_periods().unwrap_or(0);
    let coupon = bond.nominal_value * bond.interest_rate / Decimal::ONE_HUNDRED / Decimal::from(per_year);
    (1..=n)
        .map(|p| {
            let in_grace = p <= bond.grace_period_duration;
            let interest = if in_grace && bond.grace_period_type == GracePeriodType::Total {
                Decimal::ZERO
            } else {
                coupon
            };
            let amortization = if p == n { bond.nominal_value } else { Decimal::ZERO };
            PaymentScheduleRow {
                period: p,
                payment_date: bond.issue_date
                    + chrono::Duration::days(i64::from(360 / per_year * p)),
                interest,
                amortization,
                installment: interest + amortization,
                balance: bond.nominal_value - amortization,
            }
        })
        .collect()
}

async fn schedule(State(state): Shared, Path(id): Path<i64>) -> Response {
    let Some(bond) = find_bond(&state, id) else {
        return not_found("Bond");
    };
    let rows = schedule_rows(&bond);
    if state.wrap_schedule.load(Ordering::SeqCst) {
        Json(json!({ "data": rows })).into_response()
    } else {
        Json(rows).into_response()
    }
}

async fn list_costs(State(state): Shared) -> Json<Vec<IssuanceCost>> {
    Json(state.costs.lock().unwrap().clone())
}

async fn create_cost(State(state): Shared, Json(cost): Json<IssuanceCost>) -> StatusCode {
    let id = state.next_id();
    state.costs.lock().unwrap().push(IssuanceCost { id, ..cost });
    StatusCode::CREATED
}

async fn update_cost(State(state): Shared, Json(cost): Json<IssuanceCost>) -> Response {
    let mut costs = state.costs.lock().unwrap();
    match costs.iter_mut().find(|c| c.id == cost.id) {
        Some(slot) => {
            *slot = cost;
            StatusCode::OK.into_response()
        }
        None => not_found("Issuance cost"),
    }
}

async fn get_cost(State(state): Shared, Path(id): Path<i64>) -> Response {
    let found = state.costs.lock().unwrap().iter().find(|c| c.id == id).cloned();
    match found {
        Some(c) => Json(c).into_response(),
        None => not_found("Issuance cost"),
    }
}

async fn delete_cost(State(state): Shared, Path(id): Path<i64>) -> Response {
    let mut costs = state.costs.lock().unwrap();
    let before = costs.len();
    costs.retain(|c| c.id != id);
    if costs.len() == before {
        return not_found("Issuance cost");
    }
    StatusCode::NO_CONTENT.into_response()
}
