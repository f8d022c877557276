// src/handlers/crm.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, config::AppState, middleware::auth::Authenticated};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub phone: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
}

pub async fn create_customer(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    Json(payload): Json<CreateCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let customer = app_state
        .crm_service
        .create_customer(
            &user.schema,
            &payload.name,
            payload.phone.as_deref(),
            payload.email.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn list_customers(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
) -> Result<impl IntoResponse, AppError> {
    let customers = app_state.crm_service.list_customers(&user.schema).await?;
    Ok(Json(customers))
}

pub async fn get_customer(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state.crm_service.get_customer(&user.schema, id).await?;
    Ok(Json(customer))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
}

pub async fn update_customer(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let customer = app_state
        .crm_service
        .update_customer(
            &user.schema,
            id,
            payload.name.as_deref(),
            payload.phone.as_deref(),
            payload.email.as_deref(),
        )
        .await?;
    Ok(Json(customer))
}
