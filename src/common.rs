pub mod error;
pub mod numbering;
