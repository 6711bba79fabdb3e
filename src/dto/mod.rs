pub mod admin;
pub mod auth;
pub mod cart;
pub mod contact;
pub mod coupons;
pub mod loyalty;
pub mod orders;
pub mod products;
pub mod profile;
pub mod reviews;
pub mod zones;
