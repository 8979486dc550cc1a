// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::me,

        // --- Catálogo (público) ---
        handlers::catalog::list_products,
        handlers::catalog::get_product,
        handlers::catalog::menu,
        handlers::catalog::list_categories,
        handlers::catalog::list_subcategories,
        handlers::catalog::search_index,

        // --- Catálogo (admin) ---
        handlers::catalog::create_product,
        handlers::catalog::update_product,
        handlers::catalog::delete_product,
        handlers::catalog::create_category,
        handlers::catalog::update_category,
        handlers::catalog::delete_category,
        handlers::catalog::create_subcategory,
        handlers::catalog::update_subcategory,
        handlers::catalog::delete_subcategory,

        // --- Pedidos ---
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::set_paid,

        // --- STOCK ---
        handlers::stock::record_movement,
        handlers::stock::stock_report,
        handlers::stock::rebuild_projection,
        handlers::stock::verify_projection,

        // --- Família ---
        handlers::members::list_members,
        handlers::members::get_member,
        handlers::members::create_member,
        handlers::members::update_member,
        handlers::members::delete_member,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::LoginPayload,
            models::auth::LoginResponse,
            models::auth::AdminUser,

            // --- Catalog ---
            models::catalog::Category,
            models::catalog::Subcategory,
            models::catalog::MenuCategory,
            models::catalog::MenuSubcategory,
            models::catalog::Product,
            models::catalog::SearchEntry,
            models::catalog::ProductFields,
            models::catalog::CategoryFields,
            models::catalog::SubcategoryFields,
            models::catalog::Created,
            models::catalog::Message,

            // --- Orders ---
            models::orders::PaidStatus,
            models::orders::OrderSummary,
            models::orders::OrderItemSummary,
            models::orders::OrderCreated,
            handlers::orders::CartItemPayload,
            handlers::orders::CreateOrderPayload,
            handlers::orders::SetPaidPayload,

            // --- Stock ---
            models::stock::MovementKind,
            models::stock::StockMovement,
            models::stock::StockReportRow,
            models::stock::ProjectionDrift,
            handlers::stock::StockMovementPayload,
            handlers::stock::RebuildResult,

            // --- Members ---
            models::members::FamilyMember,
            models::members::MemberFields,
            handlers::members::RegisterMemberPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Login do painel administrativo"),
        (name = "Catalog", description = "Vitrine: produtos, categorias e menu"),
        (name = "Catalog Admin", description = "Manutenção do catálogo"),
        (name = "Orders", description = "Checkout e gestão de pedidos"),
        (name = "Stock", description = "Livro-razão de estoque e relatório diário"),
        (name = "Members", description = "Cadastro da Família")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
