// src/services/crm_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CustomerRepository, SchemaName, TenantDb},
    models::crm::Customer,
};

#[derive(Clone)]
pub struct CrmService {
    db: TenantDb,
    customer_repo: CustomerRepository,
}

impl CrmService {
    pub fn new(db: TenantDb, customer_repo: CustomerRepository) -> Self {
        Self { db, customer_repo }
    }

    pub async fn create_customer(
        &self,
        schema: &SchemaName,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Customer, AppError> {
        let pool = self.db.pool(schema).await;
        self.customer_repo.create(&pool, name, phone, email).await
    }

    pub async fn get_customer(&self, schema: &SchemaName, id: Uuid) -> Result<Customer, AppError> {
        let pool = self.db.pool(schema).await;
        self.customer_repo
            .find_by_id(&pool, id)
            .await?
            .ok_or(AppError::CustomerNotFound)
    }

    pub async fn list_customers(&self, schema: &SchemaName) -> Result<Vec<Customer>, AppError> {
        let pool = self.db.pool(schema).await;
        self.customer_repo.list(&pool).await
    }

    pub async fn update_customer(
        &self,
        schema: &SchemaName,
        id: Uuid,
        name: Option<&str>,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Customer, AppError> {
        let pool = self.db.pool(schema).await;
        self.customer_repo
            .update(&pool, id, name, phone, email)
            .await?
            .ok_or(AppError::CustomerNotFound)
    }
}
