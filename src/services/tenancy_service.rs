// src/services/tenancy_service.rs

use bcrypt::hash;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{SchemaName, TenantDb, TenantRepository, UserRepository},
    models::auth::{RegisterTenantPayload, Role, TenantUser},
    models::tenancy::Tenant,
};

/// DDL fixo do esquema de tenant, embutido no binário.
const TENANT_SCHEMA_DDL: &str = include_str!("../../sql/tenant_schema.sql");

const TRIAL_DAYS: i64 = 14;

#[derive(Clone)]
pub struct TenancyService {
    db: TenantDb,
    tenant_repo: TenantRepository,
    user_repo: UserRepository,
}

impl TenancyService {
    pub fn new(db: TenantDb, tenant_repo: TenantRepository, user_repo: UserRepository) -> Self {
        Self {
            db,
            tenant_repo,
            user_repo,
        }
    }

    /// Provisiona um tenant novo: linha no registro, CREATE SCHEMA, DDL
    /// fixo, usuário admin no registro compartilhado + projeção no esquema
    /// do tenant, tudo numa única transação no pool público (DDL é
    /// transacional no Postgres: se qualquer passo falhar, nada fica).
    ///
    /// Estes são os DOIS únicos pontos do sistema onde um identificador
    /// entra no texto SQL, e ele é sempre o `SchemaName` validado e gerado
    /// pelo servidor, nunca input do usuário final.
    pub async fn register_tenant(
        &self,
        payload: &RegisterTenantPayload,
    ) -> Result<(Tenant, TenantUser, SchemaName), AppError> {
        if self
            .tenant_repo
            .find_by_email(&payload.email)
            .await?
            .is_some()
        {
            return Err(AppError::EmailAlreadyExists(payload.email.clone()));
        }

        let schema = SchemaName::generate(&payload.business_name);

        // Hash fora da transação (e fora do event loop)
        let password = payload.password.clone();
        let password_hash =
            tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let mut tx = self.db.begin_shared().await?;

        let tenant = self
            .tenant_repo
            .create(
                &mut *tx,
                &payload.business_name,
                &schema,
                &payload.email,
                payload.phone.as_deref(),
                Utc::now() + Duration::days(TRIAL_DAYS),
            )
            .await?;

        sqlx::query(&format!("CREATE SCHEMA {}", schema.quoted()))
            .execute(&mut *tx)
            .await?;

        // Escopo da transação: tabelas novas resolvem no esquema do tenant,
        // tenant_users continua resolvendo no public.
        sqlx::query(&format!("SET LOCAL search_path TO {}, public", schema.quoted()))
            .execute(&mut *tx)
            .await?;

        // O script de DDL roda statement a statement na mesma transação
        for statement in TENANT_SCHEMA_DDL.split(';') {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }
            sqlx::query(statement).execute(&mut *tx).await?;
        }

        let admin = self
            .user_repo
            .create(
                &mut *tx,
                tenant.id,
                &payload.username,
                &payload.full_name,
                &password_hash,
                Role::Admin,
            )
            .await?;

        self.user_repo.mirror_into_tenant(&mut *tx, &admin).await?;

        tx.commit().await?;
        tracing::info!(
            "Tenant '{}' provisionado no esquema '{}'",
            tenant.business_name,
            schema
        );

        Ok((tenant, admin, schema))
    }

    /// Cria um usuário operacional (caixa, gerente, estoquista). O registro
    /// compartilhado é autoritativo; a projeção no esquema do tenant é
    /// derivada e best-effort: se falhar, é reconstruída sob demanda.
    pub async fn create_staff_user(
        &self,
        tenant_id: Uuid,
        schema: &SchemaName,
        username: &str,
        full_name: &str,
        password: &str,
        role: Role,
    ) -> Result<TenantUser, AppError> {
        let password = password.to_owned();
        let password_hash =
            tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let user = self
            .user_repo
            .create(
                self.db.shared(),
                tenant_id,
                username,
                full_name,
                &password_hash,
                role,
            )
            .await?;

        let tenant_pool = self.db.pool(schema).await;
        if let Err(e) = self.user_repo.mirror_into_tenant(&tenant_pool, &user).await {
            tracing::warn!(
                "Projeção do usuário {} no esquema '{}' falhou (será refeita): {}",
                user.username,
                schema,
                e
            );
        }

        Ok(user)
    }

    pub async fn list_staff(&self, tenant_id: Uuid) -> Result<Vec<TenantUser>, AppError> {
        self.user_repo.list_for_tenant(tenant_id).await
    }

    /// Desativa no registro autoritativo e propaga para a projeção.
    pub async fn deactivate_staff_user(
        &self,
        tenant_id: Uuid,
        schema: &SchemaName,
        user_id: Uuid,
    ) -> Result<TenantUser, AppError> {
        let user = self
            .user_repo
            .set_active(self.db.shared(), tenant_id, user_id, false)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let tenant_pool = self.db.pool(schema).await;
        if let Err(e) = self.user_repo.mirror_into_tenant(&tenant_pool, &user).await {
            tracing::warn!("Projeção da desativação de {} falhou: {}", user.username, e);
        }

        Ok(user)
    }

    pub async fn get_tenant(&self, tenant_id: Uuid) -> Result<Tenant, AppError> {
        self.tenant_repo
            .find_by_id(tenant_id)
            .await?
            .ok_or(AppError::TenantNotFound)
    }

    pub async fn update_settings(
        &self,
        tenant_id: Uuid,
        business_name: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Tenant, AppError> {
        self.tenant_repo
            .update_contact(self.db.shared(), tenant_id, business_name, phone)
            .await?
            .ok_or(AppError::TenantNotFound)
    }
}
