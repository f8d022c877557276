// src/db/supplier_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::purchasing::Supplier};

#[derive(Clone)]
pub struct SupplierRepository;

impl SupplierRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (name, phone, email)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(phone)
        .bind(email)
        .fetch_one(executor)
        .await?;
        Ok(supplier)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(supplier)
    }

    pub async fn list_active<'e, E>(&self, executor: E) -> Result<Vec<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let suppliers = sqlx::query_as::<_, Supplier>(
            "SELECT * FROM suppliers WHERE is_active ORDER BY name ASC",
        )
        .fetch_all(executor)
        .await?;
        Ok(suppliers)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // O saldo NÃO entra aqui: ele é um livro-razão mutado apenas pelos
        // fluxos de compra e pagamento.
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers SET
                name       = COALESCE($2, name),
                phone      = COALESCE($3, phone),
                email      = COALESCE($4, email),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(phone)
        .bind(email)
        .fetch_optional(executor)
        .await?;
        Ok(supplier)
    }

    pub async fn deactivate<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result =
            sqlx::query("UPDATE suppliers SET is_active = FALSE, updated_at = now() WHERE id = $1")
                .bind(id)
                .execute(executor)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Lançamento no razão do fornecedor: delta positivo na criação de uma
    /// compra com saldo em aberto, negativo em pagamento.
    pub async fn adjust_balance<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        delta: Decimal,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let supplier = sqlx::query_as::<_, Supplier>(
            "UPDATE suppliers SET balance = balance + $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(delta)
        .fetch_one(executor)
        .await?;
        Ok(supplier)
    }
}
