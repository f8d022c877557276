// src/models/sales.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "sale_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Completed,
    Voided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Mpesa,
    Card,
    Credit,
}

// ---
// Venda (registro financeiro imutável)
// ---
// Depois de criada, a única transição permitida é o void, que restaura o
// estoque e anexa uma nota de auditoria; a linha nunca é apagada.
// Invariantes: subtotal - discount == total_amount;
// soma dos subtotais/IVA das linhas == subtotal/vat_amount da venda.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    pub receipt_no: String,
    pub cashier_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub subtotal: Decimal,
    pub vat_amount: Decimal,
    pub discount: Decimal,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub amount_paid: Decimal,
    pub change_amount: Decimal,
    pub mpesa_code: Option<String>,
    pub status: SaleStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub vat_amount: Decimal,
}

// Venda completa (cabeçalho + linhas), retornada pelos endpoints de detalhe
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}
