// src/services/finance_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ExpenseRepository, SchemaName, SupplierRepository, TenantDb},
    models::finance::Expense,
    models::purchasing::Supplier,
};

#[derive(Clone)]
pub struct FinanceService {
    db: TenantDb,
    expense_repo: ExpenseRepository,
    supplier_repo: SupplierRepository,
}

impl FinanceService {
    pub fn new(
        db: TenantDb,
        expense_repo: ExpenseRepository,
        supplier_repo: SupplierRepository,
    ) -> Self {
        Self {
            db,
            expense_repo,
            supplier_repo,
        }
    }

    // ---
    // Despesas
    // ---

    pub async fn create_expense(
        &self,
        schema: &SchemaName,
        category: &str,
        description: &str,
        amount: Decimal,
        expense_date: NaiveDate,
        created_by: Uuid,
    ) -> Result<Expense, AppError> {
        let pool = self.db.pool(schema).await;
        self.expense_repo
            .create(&pool, category, description, amount, expense_date, created_by)
            .await
    }

    pub async fn list_expenses(
        &self,
        schema: &SchemaName,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        category: Option<&str>,
    ) -> Result<Vec<Expense>, AppError> {
        let pool = self.db.pool(schema).await;
        self.expense_repo.list(&pool, from, to, category).await
    }

    pub async fn delete_expense(&self, schema: &SchemaName, id: Uuid) -> Result<(), AppError> {
        let pool = self.db.pool(schema).await;
        if !self.expense_repo.delete(&pool, id).await? {
            return Err(AppError::ExpenseNotFound);
        }
        Ok(())
    }

    // ---
    // Fornecedores (o saldo só muda pelos fluxos de compra/pagamento)
    // ---

    pub async fn create_supplier(
        &self,
        schema: &SchemaName,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Supplier, AppError> {
        let pool = self.db.pool(schema).await;
        self.supplier_repo.create(&pool, name, phone, email).await
    }

    pub async fn get_supplier(&self, schema: &SchemaName, id: Uuid) -> Result<Supplier, AppError> {
        let pool = self.db.pool(schema).await;
        self.supplier_repo
            .find_by_id(&pool, id)
            .await?
            .ok_or(AppError::SupplierNotFound)
    }

    pub async fn list_suppliers(&self, schema: &SchemaName) -> Result<Vec<Supplier>, AppError> {
        let pool = self.db.pool(schema).await;
        self.supplier_repo.list_active(&pool).await
    }

    pub async fn update_supplier(
        &self,
        schema: &SchemaName,
        id: Uuid,
        name: Option<&str>,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Supplier, AppError> {
        let pool = self.db.pool(schema).await;
        self.supplier_repo
            .update(&pool, id, name, phone, email)
            .await?
            .ok_or(AppError::SupplierNotFound)
    }

    pub async fn deactivate_supplier(&self, schema: &SchemaName, id: Uuid) -> Result<(), AppError> {
        let pool = self.db.pool(schema).await;
        if !self.supplier_repo.deactivate(&pool, id).await? {
            return Err(AppError::SupplierNotFound);
        }
        Ok(())
    }
}
