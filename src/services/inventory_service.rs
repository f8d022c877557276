// src/services/inventory_service.rs

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProductRepository, SchemaName, TenantDb},
    models::inventory::{Product, VatType},
};

#[derive(Clone)]
pub struct InventoryService {
    db: TenantDb,
    product_repo: ProductRepository,
}

impl InventoryService {
    pub fn new(db: TenantDb, product_repo: ProductRepository) -> Self {
        Self { db, product_repo }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_product(
        &self,
        schema: &SchemaName,
        barcode: &str,
        name: &str,
        category: Option<&str>,
        cost_price: Decimal,
        selling_price: Decimal,
        stock_quantity: Decimal,
        reorder_level: Decimal,
        vat_type: VatType,
    ) -> Result<Product, AppError> {
        let pool = self.db.pool(schema).await;
        self.product_repo
            .create(
                &pool,
                barcode,
                name,
                category,
                cost_price,
                selling_price,
                stock_quantity,
                reorder_level,
                vat_type,
            )
            .await
    }

    pub async fn get_product(&self, schema: &SchemaName, id: Uuid) -> Result<Product, AppError> {
        let pool = self.db.pool(schema).await;
        self.product_repo
            .find_by_id(&pool, id)
            .await?
            .ok_or(AppError::ProductNotFound)
    }

    /// Consulta do caixa: leitura do código de barras.
    pub async fn find_by_barcode(
        &self,
        schema: &SchemaName,
        barcode: &str,
    ) -> Result<Product, AppError> {
        let pool = self.db.pool(schema).await;
        self.product_repo
            .find_by_barcode(&pool, barcode)
            .await?
            .ok_or(AppError::ProductNotFound)
    }

    pub async fn list_products(&self, schema: &SchemaName) -> Result<Vec<Product>, AppError> {
        let pool = self.db.pool(schema).await;
        self.product_repo.list_active(&pool).await
    }

    pub async fn update_product(
        &self,
        schema: &SchemaName,
        id: Uuid,
        name: Option<&str>,
        category: Option<&str>,
        selling_price: Option<Decimal>,
        reorder_level: Option<Decimal>,
        vat_type: Option<VatType>,
    ) -> Result<Product, AppError> {
        let pool = self.db.pool(schema).await;
        self.product_repo
            .update(&pool, id, name, category, selling_price, reorder_level, vat_type)
            .await?
            .ok_or(AppError::ProductNotFound)
    }

    pub async fn deactivate_product(&self, schema: &SchemaName, id: Uuid) -> Result<(), AppError> {
        let pool = self.db.pool(schema).await;
        if !self.product_repo.deactivate(&pool, id).await? {
            return Err(AppError::ProductNotFound);
        }
        Ok(())
    }

    /// Alerta de reposição: produtos ativos com estoque no limiar, usados
    /// tanto pela tela de operação quanto pelo polling do dashboard.
    pub async fn low_stock(&self, schema: &SchemaName) -> Result<Vec<Product>, AppError> {
        let pool = self.db.pool(schema).await;
        self.product_repo.list_low_stock(&pool).await
    }
}
