// src/handlers/catalog.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::{
        db_utils::acquire_connection,
        error::{ApiError, AppError, AppJson},
    },
    config::AppState,
    middleware::i18n::Locale,
    models::catalog::{
        Category, CategoryFields, Created, MenuCategory, Message, Product, ProductFields,
        SearchEntry, Subcategory, SubcategoryFields,
    },
};

// =============================================================================
//  1. LOJA (PÚBLICO)
// =============================================================================

// GET /api/productos
#[utoipa::path(
    get,
    path = "/api/productos",
    tag = "Catalog",
    responses((status = 200, description = "Produtos com subcategoria e categoria", body = Vec<Product>))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let products = app_state
        .catalog_service
        .list_products(&mut *conn)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(products))
}

// GET /api/productos/{id}
#[utoipa::path(
    get,
    path = "/api/productos/{id}",
    tag = "Catalog",
    params(("id" = i32, Path, description = "ID do produto")),
    responses(
        (status = 200, body = Product),
        (status = 404, description = "Produto inexistente")
    )
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let product = app_state
        .catalog_service
        .get_product(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(product))
}

// GET /api/menu
#[utoipa::path(
    get,
    path = "/api/menu",
    tag = "Catalog",
    responses((status = 200, description = "Categorias com suas subcategorias", body = Vec<MenuCategory>))
)]
pub async fn menu(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let menu = app_state
        .catalog_service
        .menu(&mut *conn)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(menu))
}

// GET /api/categorias
#[utoipa::path(
    get,
    path = "/api/categorias",
    tag = "Catalog",
    responses((status = 200, body = Vec<Category>))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let categories = app_state
        .catalog_service
        .list_categories(&mut *conn)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(categories))
}

// GET /api/subcategorias
#[utoipa::path(
    get,
    path = "/api/subcategorias",
    tag = "Catalog",
    responses((status = 200, body = Vec<Subcategory>))
)]
pub async fn list_subcategories(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let subcategories = app_state
        .catalog_service
        .list_subcategories(&mut *conn)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(subcategories))
}

// GET /api/search-index
#[utoipa::path(
    get,
    path = "/api/search-index",
    tag = "Catalog",
    responses((status = 200, description = "Índice enxuto para a busca", body = Vec<SearchEntry>))
)]
pub async fn search_index(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let entries = app_state
        .catalog_service
        .search_index(&mut *conn)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(entries))
}

// =============================================================================
//  2. ADMIN: PRODUTOS
// =============================================================================

// POST /api/admin/productos
#[utoipa::path(
    post,
    path = "/api/admin/productos",
    tag = "Catalog Admin",
    request_body = ProductFields,
    responses(
        (status = 201, description = "Produto criado", body = Created),
        (status = 404, description = "Subcategoria inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<ProductFields>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let id = app_state
        .catalog_service
        .create_product(&mut *conn, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::CREATED,
        Json(Created { message: "Producto creado".to_string(), id }),
    ))
}

// PUT /api/admin/productos/{id}
#[utoipa::path(
    put,
    path = "/api/admin/productos/{id}",
    tag = "Catalog Admin",
    request_body = ProductFields,
    params(("id" = i32, Path, description = "ID do produto")),
    responses(
        (status = 200, body = Message),
        (status = 404, description = "Produto ou subcategoria inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ProductFields>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .catalog_service
        .update_product(&mut *conn, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Message::new("Producto actualizado")))
}

// DELETE /api/admin/productos/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/productos/{id}",
    tag = "Catalog Admin",
    params(("id" = i32, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto e seus movimentos removidos", body = Message),
        (status = 404, description = "Produto inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .catalog_service
        .delete_product(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Message::new("Producto eliminado")))
}

// =============================================================================
//  3. ADMIN: CATEGORIAS
// =============================================================================

// POST /api/admin/categorias
#[utoipa::path(
    post,
    path = "/api/admin/categorias",
    tag = "Catalog Admin",
    request_body = CategoryFields,
    responses((status = 201, description = "Categoria criada", body = Created)),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<CategoryFields>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let id = app_state
        .catalog_service
        .create_category(&mut *conn, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::CREATED,
        Json(Created { message: "Categoría creada".to_string(), id }),
    ))
}

// PUT /api/admin/categorias/{id}
#[utoipa::path(
    put,
    path = "/api/admin/categorias/{id}",
    tag = "Catalog Admin",
    request_body = CategoryFields,
    params(("id" = i32, Path, description = "ID da categoria")),
    responses(
        (status = 200, body = Message),
        (status = 404, description = "Categoria inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CategoryFields>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .catalog_service
        .update_category(&mut *conn, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Message::new("Categoría actualizada")))
}

// DELETE /api/admin/categorias/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/categorias/{id}",
    tag = "Catalog Admin",
    params(("id" = i32, Path, description = "ID da categoria")),
    responses(
        (status = 200, description = "Categoria, subcategorias, produtos e movimentos removidos", body = Message),
        (status = 404, description = "Categoria inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .catalog_service
        .delete_category(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Message::new("Categoría y sus dependencias eliminadas")))
}

// =============================================================================
//  4. ADMIN: SUBCATEGORIAS
// =============================================================================

// POST /api/admin/subcategorias
#[utoipa::path(
    post,
    path = "/api/admin/subcategorias",
    tag = "Catalog Admin",
    request_body = SubcategoryFields,
    responses(
        (status = 201, description = "Subcategoria criada", body = Created),
        (status = 404, description = "Categoria inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_subcategory(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<SubcategoryFields>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let id = app_state
        .catalog_service
        .create_subcategory(&mut *conn, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::CREATED,
        Json(Created { message: "Subcategoría creada".to_string(), id }),
    ))
}

// PUT /api/admin/subcategorias/{id}
#[utoipa::path(
    put,
    path = "/api/admin/subcategorias/{id}",
    tag = "Catalog Admin",
    request_body = SubcategoryFields,
    params(("id" = i32, Path, description = "ID da subcategoria")),
    responses(
        (status = 200, body = Message),
        (status = 404, description = "Subcategoria ou categoria inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_subcategory(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<SubcategoryFields>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .catalog_service
        .update_subcategory(&mut *conn, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Message::new("Subcategoría actualizada")))
}

// DELETE /api/admin/subcategorias/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/subcategorias/{id}",
    tag = "Catalog Admin",
    params(("id" = i32, Path, description = "ID da subcategoria")),
    responses(
        (status = 200, description = "Subcategoria e seus produtos removidos", body = Message),
        (status = 404, description = "Subcategoria inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_subcategory(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .catalog_service
        .delete_subcategory(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Message::new("Subcategoría eliminada")))
}
