// src/db/tenant_db.rs

use std::sync::Arc;

use sqlx::{PgPool, Postgres, Transaction};

use crate::common::error::AppError;
use crate::db::pool_registry::TenantPoolRegistry;
use crate::db::schema::SchemaName;

/// Fachada de acesso a dados com roteamento de esquema.
///
/// - Leituras simples: `pool(schema)` devolve o pool do tenant e a query roda
///   parametrizada, direto nele.
/// - Escritas multi-passo: `begin(schema)` adquire UMA conexão do pool do
///   tenant e abre a transação nela. O chamador executa quantos statements
///   quiser com `&mut *tx` e dá `commit()`. Qualquer erro propaga com `?`,
///   o `Transaction` é dropado e o sqlx faz ROLLBACK, devolvendo a conexão
///   ao pool. Não existe caminho de commit parcial.
///
/// O `search_path` já vem configurado na conexão (ver `TenantPoolRegistry`),
/// então nenhum SQL de roteamento é montado aqui.
#[derive(Clone)]
pub struct TenantDb {
    registry: Arc<TenantPoolRegistry>,
}

impl TenantDb {
    pub fn new(registry: Arc<TenantPoolRegistry>) -> Self {
        Self { registry }
    }

    /// Pool do esquema compartilhado (public).
    pub fn shared(&self) -> &PgPool {
        self.registry.public_pool()
    }

    /// Pool do esquema do tenant, para statements avulsos.
    pub async fn pool(&self, schema: &SchemaName) -> PgPool {
        self.registry.tenant_pool(schema).await
    }

    /// Abre uma transação no esquema do tenant.
    pub async fn begin(&self, schema: &SchemaName) -> Result<Transaction<'static, Postgres>, AppError> {
        let pool = self.registry.tenant_pool(schema).await;
        let tx = pool.begin().await?;
        Ok(tx)
    }

    /// Abre uma transação no esquema compartilhado.
    pub async fn begin_shared(&self) -> Result<Transaction<'static, Postgres>, AppError> {
        let tx = self.registry.public_pool().begin().await?;
        Ok(tx)
    }
}
