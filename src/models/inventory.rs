// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Tratamento de IVA do produto. O preço de venda é SEMPRE com imposto
/// incluso; em linhas "vatable" o IVA é extraído com `valor * 16/116`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "vat_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VatType {
    Vatable,
    Exempt,
    ZeroRated,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub barcode: String,
    pub name: String,
    pub category: Option<String>,

    // Sobrescrito a cada compra (última compra vence, sem média ponderada)
    pub cost_price: Decimal,
    pub selling_price: Decimal,

    pub stock_quantity: Decimal,
    // Limiar de estoque baixo: stock_quantity <= reorder_level
    pub reorder_level: Decimal,

    pub vat_type: VatType,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
