// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Role, TenantUser},
};

/// Repositório do registro compartilhado de usuários (public.tenant_users).
/// O login resolve por aqui; é a fonte autoritativa de identidade.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        username: &str,
        full_name: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<TenantUser, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TenantUser>(
            r#"
            INSERT INTO tenant_users (tenant_id, username, full_name, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(username)
        .bind(full_name)
        .bind(password_hash)
        .bind(role)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                // Unicidade é por tenant, não global
                if db_err.is_unique_violation() {
                    return AppError::UsernameAlreadyExists(username.to_string());
                }
            }
            e.into()
        })
    }

    /// Projeta o usuário no esquema do tenant (<schema>.users). A linha local
    /// é derivada: se divergir, o registro compartilhado vence e a projeção
    /// pode ser reescrita.
    pub async fn mirror_into_tenant<'e, E>(
        &self,
        executor: E,
        user: &TenantUser,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, full_name, role, is_active)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                username   = EXCLUDED.username,
                full_name  = EXCLUDED.full_name,
                role       = EXCLUDED.role,
                is_active  = EXCLUDED.is_active,
                updated_at = now()
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.full_name)
        .bind(user.role)
        .bind(user.is_active)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn find_for_login(
        &self,
        tenant_id: Uuid,
        username: &str,
    ) -> Result<Option<TenantUser>, AppError> {
        let user = sqlx::query_as::<_, TenantUser>(
            "SELECT * FROM tenant_users WHERE tenant_id = $1 AND username = $2 AND is_active",
        )
        .bind(tenant_id)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TenantUser>, AppError> {
        let user = sqlx::query_as::<_, TenantUser>("SELECT * FROM tenant_users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn list_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<TenantUser>, AppError> {
        let users = sqlx::query_as::<_, TenantUser>(
            "SELECT * FROM tenant_users WHERE tenant_id = $1 ORDER BY username ASC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn set_active<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        user_id: Uuid,
        is_active: bool,
    ) -> Result<Option<TenantUser>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, TenantUser>(
            r#"
            UPDATE tenant_users SET is_active = $3, updated_at = now()
            WHERE id = $2 AND tenant_id = $1
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .bind(is_active)
        .fetch_optional(executor)
        .await?;
        Ok(user)
    }
}
