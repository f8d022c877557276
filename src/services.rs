pub mod auth;
pub use auth::AuthService;
pub mod tenancy_service;
pub use tenancy_service::TenancyService;
pub mod inventory_service;
pub use inventory_service::InventoryService;
pub mod sale_service;
pub use sale_service::SaleService;
pub mod purchase_service;
pub use purchase_service::PurchaseService;
pub mod crm_service;
pub use crm_service::CrmService;
pub mod finance_service;
pub use finance_service::FinanceService;
pub mod subscription_service;
pub use subscription_service::SubscriptionService;
