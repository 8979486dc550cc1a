pub mod auth;
pub mod catalog_service;
pub mod stock_service;
pub mod order_service;
pub mod member_service;

#[cfg(test)]
mod scenarios;
