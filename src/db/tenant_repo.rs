// src/db/tenant_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::schema::SchemaName,
    models::sales::PaymentMethod,
    models::tenancy::{
        Payment, PaymentStatus, SubscriptionHistory, SubscriptionPlan, SubscriptionStatus, Tenant,
    },
};

/// Repositório do registro de tenants e da cobrança (esquema compartilhado).
#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        business_name: &str,
        schema_name: &SchemaName,
        email: &str,
        phone: Option<&str>,
        trial_ends_at: DateTime<Utc>,
    ) -> Result<Tenant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (business_name, schema_name, email, phone, trial_ends_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(business_name)
        .bind(schema_name.as_str())
        .bind(email)
        .bind(phone)
        .bind(trial_ends_at)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                // Cobre a corrida entre o pré-check de e-mail e o INSERT
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists(email.to_string());
                }
            }
            e.into()
        })?;
        Ok(tenant)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tenant)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tenant)
    }

    pub async fn update_contact<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        business_name: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Option<Tenant>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            UPDATE tenants SET
                business_name = COALESCE($2, business_name),
                phone         = COALESCE($3, phone),
                updated_at    = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(business_name)
        .bind(phone)
        .fetch_optional(executor)
        .await?;
        Ok(tenant)
    }

    pub async fn set_subscription<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        plan_id: Uuid,
        status: SubscriptionStatus,
    ) -> Result<Tenant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            UPDATE tenants SET
                plan_id             = $2,
                subscription_status = $3,
                updated_at          = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(plan_id)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(tenant)
    }

    // ---
    // Cobrança
    // ---

    pub async fn find_plan(&self, plan_id: Uuid) -> Result<Option<SubscriptionPlan>, AppError> {
        let plan =
            sqlx::query_as::<_, SubscriptionPlan>("SELECT * FROM subscription_plans WHERE id = $1")
                .bind(plan_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(plan)
    }

    pub async fn insert_payment<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        plan_id: Uuid,
        amount: Decimal,
        method: PaymentMethod,
        reference: Option<&str>,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (tenant_id, plan_id, amount, method, reference)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(plan_id)
        .bind(amount)
        .bind(method)
        .bind(reference)
        .fetch_one(executor)
        .await?;
        Ok(payment)
    }

    pub async fn set_payment_status<'e, E>(
        &self,
        executor: E,
        payment_id: Uuid,
        status: PaymentStatus,
    ) -> Result<Option<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments SET
                status       = $2,
                confirmed_at = CASE WHEN $2 = 'confirmed'::payment_status THEN now() ELSE confirmed_at END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(payment_id)
        .bind(status)
        .fetch_optional(executor)
        .await?;
        Ok(payment)
    }

    pub async fn insert_history<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        plan_id: Uuid,
        payment_id: Option<Uuid>,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Result<SubscriptionHistory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, SubscriptionHistory>(
            r#"
            INSERT INTO subscription_history (tenant_id, plan_id, payment_id, starts_at, ends_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(plan_id)
        .bind(payment_id)
        .bind(starts_at)
        .bind(ends_at)
        .fetch_one(executor)
        .await?;
        Ok(entry)
    }
}
