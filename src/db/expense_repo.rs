// src/db/expense_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::finance::Expense};

#[derive(Clone)]
pub struct ExpenseRepository;

impl ExpenseRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        category: &str,
        description: &str,
        amount: Decimal,
        expense_date: NaiveDate,
        created_by: Uuid,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (category, description, amount, expense_date, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(category)
        .bind(description)
        .bind(amount)
        .bind(expense_date)
        .bind(created_by)
        .fetch_one(executor)
        .await?;
        Ok(expense)
    }

    /// Listagem para relatório: período e categoria são filtros opcionais.
    pub async fn list<'e, E>(
        &self,
        executor: E,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        category: Option<&str>,
    ) -> Result<Vec<Expense>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT * FROM expenses
            WHERE ($1::date IS NULL OR expense_date >= $1)
              AND ($2::date IS NULL OR expense_date <= $2)
              AND ($3::text IS NULL OR category = $3)
            ORDER BY expense_date DESC, created_at DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(category)
        .fetch_all(executor)
        .await?;
        Ok(expenses)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
