pub mod receipt;
pub mod tariff;
