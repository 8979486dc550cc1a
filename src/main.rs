//src/main.rs

use anyhow::Context;
use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG sobrescreve; o padrão é "info".
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados.")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let listener = TcpListener::bind(&config.server_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", config.server_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app(app_state))
        .await
        .context("Erro no servidor Axum")?;

    Ok(())
}

fn app(app_state: AppState) -> Router {
    // Vitrine e checkout (públicos)
    let public_routes = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/login", post(handlers::auth::login))
        .route("/orders", post(handlers::orders::create_order))
        .route("/productos", get(handlers::catalog::list_products))
        .route("/productos/{id}", get(handlers::catalog::get_product))
        .route("/menu", get(handlers::catalog::menu))
        .route("/categorias", get(handlers::catalog::list_categories))
        .route("/subcategorias", get(handlers::catalog::list_subcategories))
        .route("/search-index", get(handlers::catalog::search_index));

    // Painel: tudo exige o JWT do administrador
    let admin_routes = Router::new()
        .route("/me", get(handlers::auth::me))
        .route("/stock/movimiento", post(handlers::stock::record_movement))
        .route("/stock/report", get(handlers::stock::stock_report))
        .route("/stock/rebuild", post(handlers::stock::rebuild_projection))
        .route("/stock/verify", get(handlers::stock::verify_projection))
        .route("/orders", get(handlers::orders::list_orders))
        .route("/orders/{order_id}/pay", put(handlers::orders::set_paid))
        .route("/productos", post(handlers::catalog::create_product))
        .route("/productos/{id}"
               ,put(handlers::catalog::update_product)
               .delete(handlers::catalog::delete_product)
        )
        .route("/categorias", post(handlers::catalog::create_category))
        .route("/categorias/{id}"
               ,put(handlers::catalog::update_category)
               .delete(handlers::catalog::delete_category)
        )
        .route("/subcategorias", post(handlers::catalog::create_subcategory))
        .route("/subcategorias/{id}"
               ,put(handlers::catalog::update_subcategory)
               .delete(handlers::catalog::delete_subcategory)
        )
        .route("/miembros"
               ,get(handlers::members::list_members)
               .post(handlers::members::create_member)
        )
        .route("/miembros/{dni}"
               ,get(handlers::members::get_member)
               .put(handlers::members::update_member)
               .delete(handlers::members::delete_member)
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", public_routes)
        .nest("/api/admin", admin_routes)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    // O pool é preguiçoso: as rotas testadas aqui respondem antes de tocar o banco.
    fn test_state() -> AppState {
        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/garcia_vidal_test".to_string()),
            "JWT_SECRET" => Some("segredo-de-teste".to_string()),
            "ADMIN_PASSWORD_HASH" => Some("$2b$04$invalidoinvalidoinvalidoinvalidoinvalidoinvalidoinv".to_string()),
            _ => None,
        })
        .unwrap();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        AppState::with_pool(pool, &config).unwrap()
    }

    fn json_request(method: &str, uri: &str) -> axum::http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_answers_ok() {
        let response = app(test_state())
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn empty_cart_is_rejected_before_touching_the_database() {
        let body = r#"{"nombre": "Ana", "metodoPago": "Efectivo", "montoTotal": 10, "cartItems": []}"#;
        let response = app(test_state())
            .oneshot(json_request("POST", "/api/orders").body(Body::from(body)).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn admin_routes_require_a_token() {
        let response = app(test_state())
            .oneshot(Request::builder().uri("/api/admin/stock/report").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(test_state())
            .oneshot(
                Request::builder()
                    .uri("/api/admin/orders")
                    .header(header::AUTHORIZATION, "Bearer nao.e.jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn zero_quantity_movement_is_a_bad_request() {
        let state = test_state();
        let token = state.auth_service.create_token("admin").unwrap();

        let body = r#"{"id_producto": 5, "tipo": "entrada", "cantidad": 0}"#;
        let response = app(state)
            .oneshot(
                json_request("POST", "/api/admin/stock/movimiento")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["details"]["cantidad"].is_array());
    }

    #[tokio::test]
    async fn malformed_body_is_reported_in_the_client_language() {
        let broken = r#"{"nombre": "Ana", "cartItems": ["#;
        let send = |language: Option<&'static str>| {
            let mut request = json_request("POST", "/api/orders");
            if let Some(language) = language {
                request = request.header(header::ACCEPT_LANGUAGE, language);
            }
            app(test_state()).oneshot(request.body(Body::from(broken)).unwrap())
        };

        let en = send(Some("en")).await.unwrap();
        assert_eq!(en.status(), StatusCode::BAD_REQUEST);
        let en = body_json(en).await;
        assert_eq!(en["error"], "Invalid JSON body");
        assert!(en["details"]["cause"].is_string());

        let es = body_json(send(None).await.unwrap()).await;
        assert_eq!(es["error"], "Cuerpo JSON inválido");
    }

    #[tokio::test]
    async fn wrong_content_type_keeps_the_error_envelope() {
        let response = app(test_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/orders")
                    .header(header::ACCEPT_LANGUAGE, "en")
                    .body(Body::from("nombre=Ana"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid JSON body");
    }

    #[tokio::test]
    async fn english_locale_is_honoured_in_errors() {
        let response = app(test_state())
            .oneshot(
                Request::builder()
                    .uri("/api/admin/me")
                    .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let es = body_json(
            app(test_state())
                .oneshot(Request::builder().uri("/api/admin/me").body(Body::empty()).unwrap())
                .await
                .unwrap(),
        )
        .await;
        let en = body_json(response).await;
        assert_ne!(es["error"], en["error"]);
    }
}
