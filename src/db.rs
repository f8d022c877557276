pub mod schema;
pub use schema::SchemaName;
pub mod pool_registry;
pub use pool_registry::TenantPoolRegistry;
pub mod tenant_db;
pub use tenant_db::TenantDb;

pub mod user_repo;
pub use user_repo::UserRepository;
pub mod tenant_repo;
pub use tenant_repo::TenantRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod sale_repo;
pub use sale_repo::SaleRepository;
pub mod purchase_repo;
pub use purchase_repo::PurchaseRepository;
pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod supplier_repo;
pub use supplier_repo::SupplierRepository;
pub mod expense_repo;
pub use expense_repo::ExpenseRepository;
