pub mod auth;
pub mod crm;
pub mod finance;
pub mod inventory;
pub mod purchases;
pub mod sales;
pub mod tenancy;
