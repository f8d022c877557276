// src/handlers/sales.rs

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
        rbac::{CanRecordSales, CanVoidSales, RequireRole},
    },
    models::sales::PaymentMethod,
    services::sale_service::{CreateSaleInput, SaleLineInput},
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
// Payload: CreateSale
// ---
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaleLinePayload {
    pub product_id: Uuid,

    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalePayload {
    pub customer_id: Option<Uuid>,

    #[validate(
        length(min = 1, message = "A venda precisa de ao menos um item."),
        nested
    )]
    pub items: Vec<SaleLinePayload>,

    pub payment_method: PaymentMethod,

    #[validate(custom(function = "validate_not_negative"))]
    pub amount_paid: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub discount: Decimal,

    pub mpesa_code: Option<String>,
    pub notes: Option<String>,
}

pub async fn create_sale(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    _guard: RequireRole<CanRecordSales>,
    Json(payload): Json<CreateSalePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let input = CreateSaleInput {
        customer_id: payload.customer_id,
        items: payload
            .items
            .into_iter()
            .map(|line| SaleLineInput {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect(),
        payment_method: payload.payment_method,
        amount_paid: payload.amount_paid,
        discount: payload.discount,
        mpesa_code: payload.mpesa_code,
        notes: payload.notes,
    };

    let sale = app_state
        .sale_service
        .create_sale(&user.schema, user.id, input)
        .await?;

    Ok((StatusCode::CREATED, Json(sale)))
}

// ---
// Listagem com filtro de período
// ---
#[derive(Debug, Deserialize)]
pub struct SaleListQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

pub async fn list_sales(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    Query(query): Query<SaleListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let sales = app_state
        .sale_service
        .list_sales(&user.schema, query.from, query.to)
        .await?;
    Ok(Json(sales))
}

pub async fn get_sale(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let sale = app_state.sale_service.get_sale(&user.schema, id).await?;
    Ok(Json(sale))
}

// ---
// Anulação
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VoidSalePayload {
    #[validate(length(min = 5, message = "O motivo da anulação deve ter no mínimo 5 caracteres."))]
    pub reason: String,
}

pub async fn void_sale(
    State(app_state): State<AppState>,
    Authenticated(user): Authenticated,
    _guard: RequireRole<CanVoidSales>,
    Path(id): Path<Uuid>,
    Json(payload): Json<VoidSalePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let sale = app_state
        .sale_service
        .void_sale(&user.schema, id, &payload.reason, user.id)
        .await?;
    Ok(Json(sale))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn line(quantity: &str) -> SaleLinePayload {
        SaleLinePayload {
            product_id: Uuid::new_v4(),
            quantity: dec(quantity),
            unit_price: None,
        }
    }

    fn payload(items: Vec<SaleLinePayload>, discount: &str) -> CreateSalePayload {
        CreateSalePayload {
            customer_id: None,
            items,
            payment_method: PaymentMethod::Cash,
            amount_paid: dec("500.00"),
            discount: dec(discount),
            mpesa_code: None,
            notes: None,
        }
    }

    #[test]
    fn venda_valida_passa_na_validacao() {
        assert!(payload(vec![line("2")], "0").validate().is_ok());
    }

    #[test]
    fn venda_sem_itens_e_rejeitada() {
        assert!(payload(vec![], "0").validate().is_err());
    }

    // Quantidade negativa numa linha inverteria a baixa de estoque
    // (aumentaria o saldo) e produziria subtotal/IVA negativos.
    #[test]
    fn quantidade_negativa_ou_zero_e_rejeitada() {
        assert!(payload(vec![line("-5")], "0").validate().is_err());
        assert!(payload(vec![line("0")], "0").validate().is_err());
    }

    #[test]
    fn desconto_negativo_e_rejeitado() {
        assert!(payload(vec![line("1")], "-10.00").validate().is_err());
    }

    #[test]
    fn preco_negativo_na_linha_e_rejeitado() {
        let mut item = line("1");
        item.unit_price = Some(dec("-116.00"));
        assert!(payload(vec![item], "0").validate().is_err());
    }
}
