pub mod auth;
pub mod crm;
pub mod finance;
pub mod inventory;
pub mod purchasing;
pub mod sales;
pub mod tenancy;
