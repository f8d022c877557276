// src/config.rs

use std::{env, sync::Arc};

use crate::db::{
    CustomerRepository, ExpenseRepository, ProductRepository, PurchaseRepository, SaleRepository,
    SupplierRepository, TenantDb, TenantPoolRegistry, TenantRepository, UserRepository,
};
use crate::services::{
    AuthService, CrmService, FinanceService, InventoryService, PurchaseService, SaleService,
    SubscriptionService, TenancyService,
};

#[derive(Clone)]
pub struct AppState {
    /// Registro de pools: um pool público + um pool por esquema de tenant.
    /// Dono explícito do ciclo de vida das conexões (ver shutdown no main).
    pub registry: Arc<TenantPoolRegistry>,
    pub tenant_db: TenantDb,

    pub auth_service: AuthService,
    pub tenancy_service: TenancyService,
    pub inventory_service: InventoryService,
    pub sale_service: SaleService,
    pub purchase_service: PurchaseService,
    pub crm_service: CrmService,
    pub finance_service: FinanceService,
    pub subscription_service: SubscriptionService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Pool público eager: se o banco está fora, o processo não sobe
        let registry = Arc::new(TenantPoolRegistry::new(&database_url).await?);
        let tenant_db = TenantDb::new(registry.clone());

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(registry.public_pool().clone());
        let tenant_repo = TenantRepository::new(registry.public_pool().clone());
        let product_repo = ProductRepository::new();
        let sale_repo = SaleRepository::new();
        let purchase_repo = PurchaseRepository::new();
        let customer_repo = CustomerRepository::new();
        let supplier_repo = SupplierRepository::new();
        let expense_repo = ExpenseRepository::new();

        let auth_service =
            AuthService::new(user_repo.clone(), tenant_repo.clone(), jwt_secret.clone());
        let tenancy_service =
            TenancyService::new(tenant_db.clone(), tenant_repo.clone(), user_repo.clone());
        let inventory_service = InventoryService::new(tenant_db.clone(), product_repo.clone());
        let sale_service = SaleService::new(
            tenant_db.clone(),
            sale_repo,
            product_repo.clone(),
            customer_repo.clone(),
        );
        let purchase_service = PurchaseService::new(
            tenant_db.clone(),
            purchase_repo,
            product_repo,
            supplier_repo.clone(),
        );
        let crm_service = CrmService::new(tenant_db.clone(), customer_repo);
        let finance_service = FinanceService::new(tenant_db.clone(), expense_repo, supplier_repo);
        let subscription_service = SubscriptionService::new(tenant_db.clone(), tenant_repo);

        Ok(Self {
            registry,
            tenant_db,
            auth_service,
            tenancy_service,
            inventory_service,
            sale_service,
            purchase_service,
            crm_service,
            finance_service,
            subscription_service,
        })
    }
}
