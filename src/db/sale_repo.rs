// src/db/sale_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sales::{PaymentMethod, Sale, SaleItem},
};

#[derive(Clone)]
pub struct SaleRepository;

pub struct NewSale<'a> {
    pub receipt_no: &'a str,
    pub cashier_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub subtotal: Decimal,
    pub vat_amount: Decimal,
    pub discount: Decimal,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub amount_paid: Decimal,
    pub change_amount: Decimal,
    pub mpesa_code: Option<&'a str>,
    pub notes: Option<&'a str>,
}

impl SaleRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert_sale<'e, E>(&self, executor: E, sale: NewSale<'_>) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales
                (receipt_no, cashier_id, customer_id, subtotal, vat_amount, discount,
                 total_amount, payment_method, amount_paid, change_amount, mpesa_code, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(sale.receipt_no)
        .bind(sale.cashier_id)
        .bind(sale.customer_id)
        .bind(sale.subtotal)
        .bind(sale.vat_amount)
        .bind(sale.discount)
        .bind(sale.total_amount)
        .bind(sale.payment_method)
        .bind(sale.amount_paid)
        .bind(sale.change_amount)
        .bind(sale.mpesa_code)
        .bind(sale.notes)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        product_id: Uuid,
        quantity: Decimal,
        unit_price: Decimal,
        subtotal: Decimal,
        vat_amount: Decimal,
    ) -> Result<SaleItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, SaleItem>(
            r#"
            INSERT INTO sale_items (sale_id, product_id, quantity, unit_price, subtotal, vat_amount)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(sale_id)
        .bind(product_id)
        .bind(quantity)
        .bind(unit_price)
        .bind(subtotal)
        .bind(vat_amount)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(sale)
    }

    /// Carrega a venda travando a linha (FOR UPDATE). Usado no void para
    /// serializar dois voids concorrentes da mesma venda.
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(sale)
    }

    pub async fn items_for_sale<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<Vec<SaleItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, SaleItem>("SELECT * FROM sale_items WHERE sale_id = $1")
            .bind(sale_id)
            .fetch_all(executor)
            .await?;
        Ok(items)
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT * FROM sales
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
              AND ($2::timestamptz IS NULL OR created_at <= $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(executor)
        .await?;
        Ok(sales)
    }

    /// Transição terminal: marca como anulada e ANEXA a nota de auditoria ao
    /// campo notes (concatenação; não existe tabela de auditoria).
    pub async fn mark_voided<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        audit_note: &str,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            UPDATE sales
            SET status = 'voided',
                notes  = COALESCE(notes || E'\n', '') || $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(audit_note)
        .fetch_one(executor)
        .await?;
        Ok(sale)
    }
}
