pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod stock_repo;
pub use stock_repo::StockRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod member_repo;
pub use member_repo::MemberRepository;
