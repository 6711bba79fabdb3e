//! Business rules that do not touch the database.

pub mod cart;
pub mod checkout;
pub mod contact;
pub mod coupon;
pub mod loyalty;
pub mod money;
pub mod order_status;
pub mod pricing;
pub mod reports;
