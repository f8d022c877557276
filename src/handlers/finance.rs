// src/handlers/finance.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::Authenticated,
        rbac::{CanManageFinance, CanManageStock, RequireRole},
    },
};

fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor deve ser positivo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Despesas
// ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpensePayload {
    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    pub category: String,

    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub description: String,

    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,

    pub expense_date: NaiveDate,
}

pub async fn create_expense(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    _guard: RequireRole<CanManageFinance>,
    Json(payload): Json<CreateExpensePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let expense = app_state
        .finance_service
        .create_expense(
            &user.schema,
            &payload.category,
            &payload.description,
            payload.amount,
            payload.expense_date,
            user.id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

#[derive(Debug, Deserialize)]
pub struct ExpenseListQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category: Option<String>,
}

pub async fn list_expenses(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    _guard: RequireRole<CanManageFinance>,
    Query(query): Query<ExpenseListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let expenses = app_state
        .finance_service
        .list_expenses(&user.schema, query.from, query.to, query.category.as_deref())
        .await?;
    Ok(Json(expenses))
}

pub async fn delete_expense(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    _guard: RequireRole<CanManageFinance>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.finance_service.delete_expense(&user.schema, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Fornecedores
// ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub phone: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
}

pub async fn create_supplier(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    _guard: RequireRole<CanManageStock>,
    Json(payload): Json<CreateSupplierPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let supplier = app_state
        .finance_service
        .create_supplier(
            &user.schema,
            &payload.name,
            payload.phone.as_deref(),
            payload.email.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn list_suppliers(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
) -> Result<impl IntoResponse, AppError> {
    let suppliers = app_state.finance_service.list_suppliers(&user.schema).await?;
    Ok(Json(suppliers))
}

pub async fn get_supplier(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let supplier = app_state.finance_service.get_supplier(&user.schema, id).await?;
    Ok(Json(supplier))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSupplierPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
}

pub async fn update_supplier(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    _guard: RequireRole<CanManageStock>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSupplierPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let supplier = app_state
        .finance_service
        .update_supplier(
            &user.schema,
            id,
            payload.name.as_deref(),
            payload.phone.as_deref(),
            payload.email.as_deref(),
        )
        .await?;
    Ok(Json(supplier))
}

pub async fn deactivate_supplier(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    _guard: RequireRole<CanManageStock>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .finance_service
        .deactivate_supplier(&user.schema, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
