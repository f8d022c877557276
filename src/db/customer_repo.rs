// src/db/customer_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::crm::Customer};

#[derive(Clone)]
pub struct CustomerRepository;

impl CustomerRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, phone, email)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(phone)
        .bind(email)
        .fetch_one(executor)
        .await?;
        Ok(customer)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(customer)
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customers =
            sqlx::query_as::<_, Customer>("SELECT * FROM customers ORDER BY name ASC")
                .fetch_all(executor)
                .await?;
        Ok(customers)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET
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
        Ok(customer)
    }

    /// Crédito de fidelidade pós-venda (fora da transação da venda).
    pub async fn add_loyalty_points<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        points: i64,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE customers SET loyalty_points = loyalty_points + $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(points)
        .execute(executor)
        .await?;
        Ok(())
    }
}
