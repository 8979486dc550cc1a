pub mod auth;
pub mod catalog;
pub mod stock;
pub mod orders;
pub mod members;
