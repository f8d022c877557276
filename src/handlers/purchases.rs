// src/handlers/purchases.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::Authenticated,
        rbac::{CanManageStock, RequireRole},
    },
    models::sales::PaymentMethod,
    services::purchase_service::{CreatePurchaseInput, PurchaseLineInput},
};

fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor deve ser positivo.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: CreatePurchase
// ---
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLinePayload {
    pub product_id: Uuid,

    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,

    #[validate(custom(function = "validate_positive"))]
    pub unit_cost: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchasePayload {
    pub supplier_id: Uuid,

    #[validate(
        length(min = 1, message = "A compra precisa de ao menos um item."),
        nested
    )]
    pub items: Vec<PurchaseLinePayload>,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub amount_paid: Decimal,

    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

pub async fn create_purchase(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    _guard: RequireRole<CanManageStock>,
    Json(payload): Json<CreatePurchasePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let input = CreatePurchaseInput {
        supplier_id: payload.supplier_id,
        items: payload
            .items
            .into_iter()
            .map(|line| PurchaseLineInput {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_cost: line.unit_cost,
            })
            .collect(),
        amount_paid: payload.amount_paid,
        payment_method: payload.payment_method,
        notes: payload.notes,
    };

    let purchase = app_state
        .purchase_service
        .create_purchase(&user.schema, user.id, input)
        .await?;

    Ok((StatusCode::CREATED, Json(purchase)))
}

#[derive(Debug, Deserialize)]
pub struct PurchaseListQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

pub async fn list_purchases(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    Query(query): Query<PurchaseListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let purchases = app_state
        .purchase_service
        .list_purchases(&user.schema, query.from, query.to)
        .await?;
    Ok(Json(purchases))
}

pub async fn get_purchase(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let purchase = app_state
        .purchase_service
        .get_purchase(&user.schema, id)
        .await?;
    Ok(Json(purchase))
}

// ---
// Pagamento de compra em aberto
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PurchasePaymentPayload {
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
}

pub async fn pay_purchase(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    _guard: RequireRole<CanManageStock>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PurchasePaymentPayload>,
) -> Result<impl IntoResponse, AppError> {
    if payload.amount <= Decimal::ZERO {
        let mut errors = validator::ValidationErrors::new();
        let mut err = validator::ValidationError::new("range");
        err.message = Some("O valor do pagamento deve ser positivo.".into());
        errors.add("amount", err);
        return Err(AppError::ValidationError(errors));
    }

    let purchase = app_state
        .purchase_service
        .make_payment(&user.schema, id, payload.amount, payload.payment_method)
        .await?;
    Ok(Json(purchase))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn line(quantity: &str, unit_cost: &str) -> PurchaseLinePayload {
        PurchaseLinePayload {
            product_id: Uuid::new_v4(),
            quantity: dec(quantity),
            unit_cost: dec(unit_cost),
        }
    }

    fn payload(items: Vec<PurchaseLinePayload>, amount_paid: &str) -> CreatePurchasePayload {
        CreatePurchasePayload {
            supplier_id: Uuid::new_v4(),
            items,
            amount_paid: dec(amount_paid),
            payment_method: PaymentMethod::Cash,
            notes: None,
        }
    }

    #[test]
    fn compra_valida_passa_na_validacao() {
        assert!(payload(vec![line("10", "58.00")], "0").validate().is_ok());
    }

    #[test]
    fn compra_sem_itens_e_rejeitada() {
        assert!(payload(vec![], "0").validate().is_err());
    }

    // Quantidade negativa numa linha reduziria o estoque numa entrada
    // de mercadoria; custo negativo inverteria o saldo do fornecedor.
    #[test]
    fn quantidade_negativa_ou_zero_e_rejeitada() {
        assert!(payload(vec![line("-3", "58.00")], "0").validate().is_err());
        assert!(payload(vec![line("0", "58.00")], "0").validate().is_err());
    }

    #[test]
    fn custo_unitario_negativo_ou_zero_e_rejeitado() {
        assert!(payload(vec![line("3", "-58.00")], "0").validate().is_err());
        assert!(payload(vec![line("3", "0")], "0").validate().is_err());
    }

    #[test]
    fn valor_pago_negativo_e_rejeitado() {
        assert!(payload(vec![line("3", "58.00")], "-1.00").validate().is_err());
    }
}
