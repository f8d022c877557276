// src/db/pool_registry.rs

use std::collections::HashMap;
use std::time::{Duration, Instant};

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tokio::sync::Mutex;

use crate::common::error::AppError;
use crate::db::schema::SchemaName;

/// Pool compartilhado (esquema public): criado no boot do processo.
const PUBLIC_MAX_CONNECTIONS: u32 = 20;
/// Pools de tenant: menores, criados sob demanda.
const TENANT_MAX_CONNECTIONS: u32 = 10;
/// Quantos pools de tenant mantemos vivos ao mesmo tempo (LRU).
const DEFAULT_MAX_TENANT_POOLS: usize = 64;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(2);
const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

struct CachedPool {
    pool: PgPool,
    last_used: Instant,
}

/// Registro explícito de pools de conexão, um por esquema de tenant, mais o
/// pool compartilhado do esquema public.
///
/// Substitui o padrão de mapa global mutável: o registro é um objeto com
/// dono (vive no `AppState`), tem capacidade limitada com despejo LRU e
/// expõe `shutdown()` para drenar tudo no encerramento do processo.
///
/// O roteamento de esquema acontece AQUI, uma única vez por pool: cada pool
/// de tenant é criado com `search_path = <schema>,public` como parâmetro de
/// conexão. Nenhuma query precisa montar `SET search_path` em SQL, e uma
/// conexão de um tenant nunca serve outro tenant.
pub struct TenantPoolRegistry {
    base_options: PgConnectOptions,
    public_pool: PgPool,
    max_tenant_pools: usize,
    pools: Mutex<HashMap<SchemaName, CachedPool>>,
}

impl TenantPoolRegistry {
    /// Cria o registro e verifica a conectividade do pool público.
    pub async fn new(database_url: &str) -> Result<Self, AppError> {
        let base_options: PgConnectOptions = database_url.parse::<PgConnectOptions>()?;
        let registry = Self::from_options(base_options, DEFAULT_MAX_TENANT_POOLS);

        // O pool público é eager: se o banco está fora, o processo não sobe.
        sqlx::query("SELECT 1").execute(&registry.public_pool).await?;
        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(registry)
    }

    /// Construtor interno sem verificação de conectividade (pools lazy).
    pub(crate) fn from_options(base_options: PgConnectOptions, max_tenant_pools: usize) -> Self {
        let public_pool = PgPoolOptions::new()
            .max_connections(PUBLIC_MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .idle_timeout(IDLE_TIMEOUT)
            .connect_lazy_with(base_options.clone());

        Self {
            base_options,
            public_pool,
            max_tenant_pools,
            pools: Mutex::new(HashMap::new()),
        }
    }

    /// Pool do esquema compartilhado (tenants, tenant_users, payments...).
    pub fn public_pool(&self) -> &PgPool {
        &self.public_pool
    }

    /// Pool do esquema de um tenant. Criado na primeira chamada e reusado
    /// nas seguintes; a construção é lazy, então erros de conexão só
    /// aparecem na primeira query.
    pub async fn tenant_pool(&self, schema: &SchemaName) -> PgPool {
        let mut pools = self.pools.lock().await;

        if let Some(cached) = pools.get_mut(schema) {
            cached.last_used = Instant::now();
            return cached.pool.clone();
        }

        // Capacidade cheia: despeja o pool menos recentemente usado.
        if pools.len() >= self.max_tenant_pools {
            let oldest = pools
                .iter()
                .min_by_key(|(_, cached)| cached.last_used)
                .map(|(schema, _)| schema.clone());
            if let Some(oldest) = oldest {
                if let Some(evicted) = pools.remove(&oldest) {
                    tracing::info!("Despejando pool ocioso do esquema '{}'", oldest);
                    evicted.pool.close().await;
                }
            }
        }

        let options = self
            .base_options
            .clone()
            .options([("search_path", format!("{},public", schema.as_str()))]);

        let pool = PgPoolOptions::new()
            .max_connections(TENANT_MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .idle_timeout(IDLE_TIMEOUT)
            .connect_lazy_with(options);

        tracing::info!("Criado pool de conexões para o esquema '{}'", schema);
        pools.insert(
            schema.clone(),
            CachedPool {
                pool: pool.clone(),
                last_used: Instant::now(),
            },
        );

        pool
    }

    /// Quantos pools de tenant estão vivos (para observabilidade e testes).
    pub async fn tenant_pool_count(&self) -> usize {
        self.pools.lock().await.len()
    }

    /// Drena todos os pools. Chamado uma única vez no encerramento.
    pub async fn shutdown(&self) {
        let mut pools = self.pools.lock().await;
        for (schema, cached) in pools.drain() {
            tracing::info!("Fechando pool do esquema '{}'", schema);
            cached.pool.close().await;
        }
        self.public_pool.close().await;
        tracing::info!("Todos os pools de conexão foram drenados.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(max_pools: usize) -> TenantPoolRegistry {
        // Pools lazy: nada aqui abre conexão de rede.
        let options = PgConnectOptions::new()
            .host("localhost")
            .port(5432)
            .database("pos_test")
            .username("pos");
        TenantPoolRegistry::from_options(options, max_pools)
    }

    fn schema(name: &str) -> SchemaName {
        SchemaName::new(name).unwrap()
    }

    #[tokio::test]
    async fn pool_de_tenant_e_cacheado() {
        let registry = registry(8);
        registry.tenant_pool(&schema("duka_a")).await;
        registry.tenant_pool(&schema("duka_a")).await;
        assert_eq!(registry.tenant_pool_count().await, 1);

        registry.tenant_pool(&schema("duka_b")).await;
        assert_eq!(registry.tenant_pool_count().await, 2);
    }

    #[tokio::test]
    async fn capacidade_despeja_o_menos_usado() {
        let registry = registry(2);
        let pool_a = registry.tenant_pool(&schema("duka_a")).await;
        // "b" fica mais recente que "a"; "c" deve despejar "a".
        registry.tenant_pool(&schema("duka_b")).await;
        registry.tenant_pool(&schema("duka_c")).await;

        assert_eq!(registry.tenant_pool_count().await, 2);
        assert!(pool_a.is_closed());
    }

    #[tokio::test]
    async fn reuso_renova_a_posicao_no_lru() {
        let registry = registry(2);
        let pool_a = registry.tenant_pool(&schema("duka_a")).await;
        let pool_b = registry.tenant_pool(&schema("duka_b")).await;

        // Toca "a" de novo: agora "b" é o menos recente.
        registry.tenant_pool(&schema("duka_a")).await;
        registry.tenant_pool(&schema("duka_c")).await;

        assert!(!pool_a.is_closed());
        assert!(pool_b.is_closed());
    }

    #[tokio::test]
    async fn shutdown_drena_tudo() {
        let registry = registry(8);
        let pool_a = registry.tenant_pool(&schema("duka_a")).await;
        registry.shutdown().await;

        assert_eq!(registry.tenant_pool_count().await, 0);
        assert!(pool_a.is_closed());
        assert!(registry.public_pool().is_closed());
    }
}
