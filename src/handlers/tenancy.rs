// src/handlers/tenancy.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::Authenticated,
        rbac::{CanManageSettings, RequireRole},
    },
    models::auth::Role,
    models::sales::PaymentMethod,
};

// ---
// Equipe (usuários operacionais do tenant)
// ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaffPayload {
    #[validate(length(min = 3, message = "O nome de usuário deve ter no mínimo 3 caracteres."))]
    pub username: String,
    #[validate(length(min = 2, message = "O nome completo é obrigatório."))]
    pub full_name: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    pub role: Role,
}

pub async fn create_staff(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    _guard: RequireRole<CanManageSettings>,
    Json(payload): Json<CreateStaffPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    // Papéis administrativos não nascem por esta rota
    if matches!(payload.role, Role::SuperAdmin | Role::Admin) {
        return Err(AppError::Forbidden(
            "Papel inválido para usuário operacional.".to_string(),
        ));
    }

    let staff = app_state
        .tenancy_service
        .create_staff_user(
            user.tenant_id,
            &user.schema,
            &payload.username,
            &payload.full_name,
            &payload.password,
            payload.role,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(staff)))
}

pub async fn list_staff(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    _guard: RequireRole<CanManageSettings>,
) -> Result<impl IntoResponse, AppError> {
    let staff = app_state.tenancy_service.list_staff(user.tenant_id).await?;
    Ok(Json(staff))
}

pub async fn deactivate_staff(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    _guard: RequireRole<CanManageSettings>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let staff = app_state
        .tenancy_service
        .deactivate_staff_user(user.tenant_id, &user.schema, user_id)
        .await?;
    Ok(Json(staff))
}

// ---
// Configurações do tenant
// ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsPayload {
    #[validate(length(min = 2, message = "O nome do negócio é obrigatório."))]
    pub business_name: Option<String>,
    pub phone: Option<String>,
}

pub async fn get_settings(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
) -> Result<impl IntoResponse, AppError> {
    let tenant = app_state.tenancy_service.get_tenant(user.tenant_id).await?;
    Ok(Json(tenant))
}

pub async fn update_settings(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    _guard: RequireRole<CanManageSettings>,
    Json(payload): Json<UpdateSettingsPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let tenant = app_state
        .tenancy_service
        .update_settings(
            user.tenant_id,
            payload.business_name.as_deref(),
            payload.phone.as_deref(),
        )
        .await?;
    Ok(Json(tenant))
}

// ---
// Assinatura
// ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubscribePayload {
    pub plan_id: Uuid,
    pub payment_method: PaymentMethod,
    pub reference: Option<String>,
}

/// Registra a intenção de pagamento da assinatura (status pending). A
/// confirmação chega depois, pelo callback do gateway.
pub async fn subscribe(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    _guard: RequireRole<CanManageSettings>,
    Json(payload): Json<SubscribePayload>,
) -> Result<impl IntoResponse, AppError> {
    let payment = app_state
        .subscription_service
        .record_payment(
            user.tenant_id,
            payload.plan_id,
            payload.payment_method,
            payload.reference.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResultPayload {
    pub success: bool,
}

pub async fn confirm_payment(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    _guard: RequireRole<CanManageSettings>,
    Path(payment_id): Path<Uuid>,
    Json(payload): Json<PaymentResultPayload>,
) -> Result<impl IntoResponse, AppError> {
    let payment = app_state
        .subscription_service
        .confirm_payment(user.tenant_id, payment_id, payload.success)
        .await?;
    Ok(Json(payment))
}

pub async fn subscription_status(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
) -> Result<impl IntoResponse, AppError> {
    let tenant = app_state
        .subscription_service
        .tenant_status(user.tenant_id)
        .await?;
    Ok(Json(serde_json::json!({
        "subscriptionStatus": tenant.subscription_status,
        "planId": tenant.plan_id,
        "trialEndsAt": tenant.trial_ends_at,
    })))
}
