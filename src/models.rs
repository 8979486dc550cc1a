pub mod auth;
pub mod catalog;
pub mod members;
pub mod orders;
pub mod stock;
