// src/handlers/inventory.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::Authenticated,
        rbac::{CanManageStock, RequireRole},
    },
    models::inventory::VatType,
};

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: CreateProduct
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "O código de barras é obrigatório."))]
    pub barcode: String,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    pub category: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub cost_price: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    pub selling_price: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub stock_quantity: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub reorder_level: Decimal,

    pub vat_type: VatType,
}

pub async fn create_product(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    _guard: RequireRole<CanManageStock>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let product = app_state
        .inventory_service
        .create_product(
            &user.schema,
            &payload.barcode,
            &payload.name,
            payload.category.as_deref(),
            payload.cost_price,
            payload.selling_price,
            payload.stock_quantity,
            payload.reorder_level,
            payload.vat_type,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list_products(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.inventory_service.list_products(&user.schema).await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.inventory_service.get_product(&user.schema, id).await?;
    Ok(Json(product))
}

/// Consulta do caixa: `GET /api/products/barcode/{code}`.
pub async fn get_by_barcode(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(barcode): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state
        .inventory_service
        .find_by_barcode(&user.schema, &barcode)
        .await?;
    Ok(Json(product))
}

// ---
// Payload: UpdateProduct (parcial; estoque e custo mudam só pelos fluxos
// de venda/compra)
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: Option<String>,
    pub category: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub selling_price: Option<Decimal>,

    #[validate(custom(function = "validate_not_negative"))]
    pub reorder_level: Option<Decimal>,

    pub vat_type: Option<VatType>,
}

pub async fn update_product(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    _guard: RequireRole<CanManageStock>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let product = app_state
        .inventory_service
        .update_product(
            &user.schema,
            id,
            payload.name.as_deref(),
            payload.category.as_deref(),
            payload.selling_price,
            payload.reorder_level,
            payload.vat_type,
        )
        .await?;
    Ok(Json(product))
}

pub async fn deactivate_product(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    _guard: RequireRole<CanManageStock>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .inventory_service
        .deactivate_product(&user.schema, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn low_stock(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.inventory_service.low_stock(&user.schema).await?;
    Ok(Json(products))
}
