// src/db/purchase_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::purchasing::{Purchase, PurchaseItem},
    models::sales::PaymentMethod,
};

#[derive(Clone)]
pub struct PurchaseRepository;

pub struct NewPurchase<'a> {
    pub invoice_no: &'a str,
    pub supplier_id: Uuid,
    pub created_by: Uuid,
    pub subtotal: Decimal,
    pub vat_amount: Decimal,
    pub total_cost: Decimal,
    pub amount_paid: Decimal,
    pub balance: Decimal,
    pub payment_method: PaymentMethod,
    pub notes: Option<&'a str>,
}

impl PurchaseRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert_purchase<'e, E>(
        &self,
        executor: E,
        purchase: NewPurchase<'_>,
    ) -> Result<Purchase, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Purchase>(
            r#"
            INSERT INTO purchases
                (invoice_no, supplier_id, created_by, subtotal, vat_amount,
                 total_cost, amount_paid, balance, payment_method, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(purchase.invoice_no)
        .bind(purchase.supplier_id)
        .bind(purchase.created_by)
        .bind(purchase.subtotal)
        .bind(purchase.vat_amount)
        .bind(purchase.total_cost)
        .bind(purchase.amount_paid)
        .bind(purchase.balance)
        .bind(purchase.payment_method)
        .bind(purchase.notes)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        purchase_id: Uuid,
        product_id: Uuid,
        quantity: Decimal,
        unit_cost: Decimal,
        subtotal: Decimal,
        vat_amount: Decimal,
    ) -> Result<PurchaseItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, PurchaseItem>(
            r#"
            INSERT INTO purchase_items
                (purchase_id, product_id, quantity, unit_cost, subtotal, vat_amount)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(purchase_id)
        .bind(product_id)
        .bind(quantity)
        .bind(unit_cost)
        .bind(subtotal)
        .bind(vat_amount)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Purchase>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let purchase = sqlx::query_as::<_, Purchase>("SELECT * FROM purchases WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(purchase)
    }

    /// Recarrega a compra travando a linha (FOR UPDATE): dois pagamentos
    /// concorrentes da mesma compra ficam serializados pelo banco.
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Purchase>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let purchase =
            sqlx::query_as::<_, Purchase>("SELECT * FROM purchases WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(purchase)
    }

    pub async fn items_for_purchase<'e, E>(
        &self,
        executor: E,
        purchase_id: Uuid,
    ) -> Result<Vec<PurchaseItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items =
            sqlx::query_as::<_, PurchaseItem>("SELECT * FROM purchase_items WHERE purchase_id = $1")
                .bind(purchase_id)
                .fetch_all(executor)
                .await?;
        Ok(items)
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Purchase>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let purchases = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT * FROM purchases
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
              AND ($2::timestamptz IS NULL OR created_at <= $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(executor)
        .await?;
        Ok(purchases)
    }

    pub async fn apply_payment<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        amount_paid: Decimal,
        balance: Decimal,
    ) -> Result<Purchase, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let purchase = sqlx::query_as::<_, Purchase>(
            "UPDATE purchases SET amount_paid = $2, balance = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(amount_paid)
        .bind(balance)
        .fetch_one(executor)
        .await?;
        Ok(purchase)
    }
}
