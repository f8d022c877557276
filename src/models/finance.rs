// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Lançamento avulso de despesa. Sem invariante cruzada com outras
// entidades; usado em relatórios por categoria e por período.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub expense_date: NaiveDate,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}
