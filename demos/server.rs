//! Simple REST API server example for the refill engine.
//!
//! Run with: `cargo run --example server`
//!
//! ## Endpoints
//!
//! - `GET /machines/:id/products` - List a machine's products
//! - `GET /machines/:id/stats` - Aggregate fill statistics
//! - `GET /machines/:id/refills` - Refill history, most recent first
//! - `POST /machines/:id/refills` - Commit a refill
//! - `GET /routes/:id` - Route summary card
//!
//! ## Example Usage
//!
//! ```bash
//! # Fill machine M0001 to capacity
//! curl -X POST http://localhost:3000/machines/M0001/refills \
//!   -H "Content-Type: application/json" \
//!   -d '{"driver": "John Smith", "lorry": "LRY-1234", "code": "FULL"}'
//!
//! # Explicit per-product quantities
//! curl -X POST http://localhost:3000/machines/M0001/refills \
//!   -H "Content-Type: application/json" \
//!   -d '{"driver": "John Smith", "entries": [{"product": 1, "in": 20}, {"product": 4, "out": 2}]}'
//!
//! # Inspect the result
//! curl http://localhost:3000/machines/M0001/products
//! curl http://localhost:3000/machines/M0001/refills
//! ```

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use restock_rs::{
    DeliveryDetails, Machine, MachineId, MachineStats, MachineStatus, Product, ProductId,
    QuickFillCode, RefillEngine, RefillError, RefillFrequency, RefillTransaction, Route, RouteId,
    RouteSummary,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;

// === Request/Response DTOs ===

/// Request body for committing a refill.
///
/// A quick-fill `code` (if present) is applied first, then explicit
/// `entries` override individual products:
/// ```json
/// {"driver": "John Smith", "code": "HALF", "entries": [{"product": 1, "in": 5, "out": 1}]}
/// ```
#[derive(Debug, Deserialize)]
pub struct RefillRequest {
    #[serde(default)]
    pub driver: String,
    #[serde(default)]
    pub backup: Option<String>,
    #[serde(default)]
    pub assistance: Option<String>,
    #[serde(default)]
    pub lorry: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub entries: Vec<EntryRequest>,
}

/// One product's quantities within a refill request.
#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    pub product: u32,
    #[serde(default, rename = "in")]
    pub in_qty: u32,
    #[serde(default, rename = "out")]
    pub out_qty: u32,
}

impl RefillRequest {
    fn delivery_details(&self) -> DeliveryDetails {
        DeliveryDetails::new(self.driver.clone())
            .with_backup(self.backup.clone().unwrap_or_default())
            .with_assistance(self.assistance.clone().unwrap_or_default())
            .with_lorry(self.lorry.clone().unwrap_or_default())
            .with_notes(self.notes.clone().unwrap_or_default())
    }
}

/// Response body for errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// === Application State ===

/// Shared application state containing the refill engine.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RefillEngine>,
}

// === Error Handling ===

/// Wrapper for converting `RefillError` into HTTP responses.
pub struct AppError(RefillError);

impl From<RefillError> for AppError {
    fn from(err: RefillError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            RefillError::InvalidCapacity => (StatusCode::BAD_REQUEST, "INVALID_CAPACITY"),
            RefillError::DuplicateProduct => (StatusCode::CONFLICT, "DUPLICATE_PRODUCT"),
            RefillError::ProductNotFound => (StatusCode::NOT_FOUND, "PRODUCT_NOT_FOUND"),
            RefillError::MachineNotFound => (StatusCode::NOT_FOUND, "MACHINE_NOT_FOUND"),
            RefillError::InsufficientStock { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_STOCK")
            }
            RefillError::MissingDriverName => (StatusCode::BAD_REQUEST, "MISSING_DRIVER_NAME"),
            RefillError::DuplicateRefill => (StatusCode::CONFLICT, "DUPLICATE_REFILL"),
            RefillError::MissingRouteName => (StatusCode::BAD_REQUEST, "MISSING_ROUTE_NAME"),
            RefillError::MissingMachineName => (StatusCode::BAD_REQUEST, "MISSING_MACHINE_NAME"),
            RefillError::EmptyOrder => (StatusCode::BAD_REQUEST, "EMPTY_ORDER"),
        };

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

fn machine_not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "machine not found".to_string(),
            code: "MACHINE_NOT_FOUND".to_string(),
        }),
    )
}

// === Handlers ===

/// POST /machines/:id/refills - Commit a refill for a machine.
async fn create_refill(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RefillRequest>,
) -> Result<(StatusCode, Json<RefillTransaction>), AppError> {
    let machine_id = MachineId::new(id);
    let mut session = state.engine.begin_refill(&machine_id)?;

    if let Some(code) = &request.code {
        session.apply_code(QuickFillCode::parse(code));
    }
    for entry in &request.entries {
        let product_id = ProductId(entry.product);
        session.set_in(product_id, entry.in_qty)?;
        session.set_out(product_id, entry.out_qty)?;
    }

    let transaction = state
        .engine
        .commit_refill(session, request.delivery_details())?;
    Ok((StatusCode::CREATED, Json((*transaction).clone())))
}

/// GET /machines/:id/products - List a machine's products.
async fn list_products(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Product>>, (StatusCode, Json<ErrorResponse>)> {
    let machine_id = MachineId::new(id);
    let products = state.engine.products_for_machine(&machine_id);
    if products.is_empty() && state.engine.machine(&machine_id).is_none() {
        return Err(machine_not_found());
    }
    Ok(Json(products))
}

/// GET /machines/:id/stats - Aggregate fill statistics.
async fn machine_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MachineStats>, (StatusCode, Json<ErrorResponse>)> {
    let machine_id = MachineId::new(id);
    let products = state.engine.products_for_machine(&machine_id);
    if products.is_empty() && state.engine.machine(&machine_id).is_none() {
        return Err(machine_not_found());
    }
    Ok(Json(MachineStats::from_products(&products)))
}

/// GET /machines/:id/refills - Refill history, most recent first.
async fn list_refills(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<RefillTransaction>> {
    let machine_id = MachineId::new(id);
    let refills = state
        .engine
        .refill_history(&machine_id)
        .iter()
        .map(|t| (**t).clone())
        .collect();
    Json(refills)
}

/// GET /routes/:id - Route summary card.
async fn route_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RouteSummary>, (StatusCode, Json<ErrorResponse>)> {
    state
        .engine
        .route_summary(&RouteId::new(id))
        .map(Json)
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "route not found".to_string(),
                    code: "ROUTE_NOT_FOUND".to_string(),
                }),
            )
        })
}

// === Router ===

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/machines/{id}/products", get(list_products))
        .route("/machines/{id}/stats", get(machine_stats))
        .route("/machines/{id}/refills", get(list_refills).post(create_refill))
        .route("/routes/{id}", get(route_summary))
        .with_state(state)
}

// === Demo Data ===

fn seed_engine() -> RefillEngine {
    let engine = RefillEngine::new();

    engine.add_route(Route::new(
        RouteId::new("ROUTE-001"),
        "Route Sel 1",
        "Central Business District",
    ));
    engine.add_machine(Machine::new(
        MachineId::new("M0001"),
        RouteId::new("ROUTE-001"),
        "Main Lobby, Building A",
        MachineStatus::NeedsRefill,
        RefillFrequency::Daily,
    ));
    engine.add_machine(Machine::new(
        MachineId::new("M0002"),
        RouteId::new("ROUTE-001"),
        "Floor 2, Building A",
        MachineStatus::Operational,
        RefillFrequency::Weekday,
    ));

    let m1 = MachineId::new("M0001");
    let m2 = MachineId::new("M0002");
    let inventory = [
        (1, &m1, "Coca Cola", 12, 50),
        (2, &m1, "Pepsi", 8, 50),
        (3, &m1, "Sprite", 15, 50),
        (4, &m1, "Water", 5, 40),
        (5, &m1, "Chips", 25, 30),
        (6, &m1, "Candy Bar", 18, 30),
        (7, &m2, "Coca Cola", 40, 50),
        (8, &m2, "Pepsi", 35, 50),
        (9, &m2, "Water", 30, 40),
        (10, &m2, "Chips", 22, 30),
    ];
    for (id, machine, name, stock, capacity) in inventory {
        engine
            .add_product(Product::new(ProductId(id), machine.clone(), name, stock, capacity).unwrap())
            .unwrap();
    }

    engine
}

// === Main ===

#[tokio::main]
async fn main() {
    let state = AppState {
        engine: Arc::new(seed_engine()),
    };

    let app = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:3000").await.unwrap();
    println!("Refill API server running on http://127.0.0.1:3000");
    println!();
    println!("Endpoints:");
    println!("  GET  /machines/:id/products  - List a machine's products");
    println!("  GET  /machines/:id/stats     - Aggregate fill statistics");
    println!("  GET  /machines/:id/refills   - Refill history");
    println!("  POST /machines/:id/refills   - Commit a refill");
    println!("  GET  /routes/:id             - Route summary");

    axum::serve(listener, app).await.unwrap();
}
