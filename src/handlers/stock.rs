// src/handlers/stock.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::{
        db_utils::acquire_connection,
        error::{ApiError, AppError, AppJson},
        serde_utils::{lenient_i32, optional_datetime, query_date},
    },
    config::AppState,
    middleware::i18n::Locale,
    models::{
        catalog::Message,
        stock::{MovementKind, NewStockMovement, ProjectionDrift, StockReportRow},
    },
};

const DEFAULT_REASON: &str = "Manual";
const DEFAULT_ACTOR: &str = "Admin";

// ---
// Payload: movimento manual
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StockMovementPayload {
    #[serde(default, deserialize_with = "lenient_i32")]
    #[validate(required(message = "required"), range(min = 1, message = "min_one"))]
    #[schema(value_type = i32, example = 5)]
    pub id_producto: Option<i32>,

    #[serde(default)]
    #[validate(required(message = "required"))]
    #[schema(value_type = MovementKind, example = "entrada")]
    pub tipo: Option<MovementKind>,

    #[serde(default, deserialize_with = "lenient_i32")]
    #[validate(required(message = "required"), range(min = 1, message = "min_one"))]
    #[schema(value_type = i32, example = 50)]
    pub cantidad: Option<i32>,

    #[serde(default)]
    #[schema(example = "Compra proveedor")]
    pub motivo: Option<String>,

    #[serde(default)]
    pub usuario: Option<String>,

    /// Sobrescreve o horário do movimento (`AAAA-MM-DD` ou `AAAA-MM-DDTHH:MM[:SS]`).
    #[serde(default, deserialize_with = "optional_datetime")]
    #[schema(value_type = Option<String>, example = "2025-03-10T08:00")]
    pub fecha: Option<NaiveDateTime>,
}

impl StockMovementPayload {
    fn into_movement(self) -> Result<NewStockMovement, AppError> {
        Ok(NewStockMovement {
            product_id: self.id_producto.ok_or_else(|| AppError::missing_field("id_producto"))?,
            kind: self.tipo.ok_or_else(|| AppError::missing_field("tipo"))?,
            quantity: self.cantidad.ok_or_else(|| AppError::missing_field("cantidad"))?,
            reason: or_default(self.motivo, DEFAULT_REASON),
            actor: Some(or_default(self.usuario, DEFAULT_ACTOR)),
            occurred_at: self.fecha,
        })
    }
}

// Texto ausente ou em branco -> valor padrão.
fn or_default(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

// POST /api/admin/stock/movimiento
#[utoipa::path(
    post,
    path = "/api/admin/stock/movimiento",
    tag = "Stock",
    request_body = StockMovementPayload,
    responses(
        (status = 201, description = "Movimento registrado", body = Message),
        (status = 400, description = "Campos ausentes ou inválidos"),
        (status = 404, description = "Produto inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_movement(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<StockMovementPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let movement = payload
        .into_movement()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .stock_service
        .record_movement(&mut *conn, movement)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(Message::new("Movimiento registrado"))))
}

// ---
// Relatório diário
// ---
#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportQuery {
    /// Data do relatório (`AAAA-MM-DD`); padrão = hoje no fuso da loja.
    pub fecha: Option<String>,
}

// GET /api/admin/stock/report
#[utoipa::path(
    get,
    path = "/api/admin/stock/report",
    tag = "Stock",
    params(ReportQuery),
    responses(
        (status = 200, description = "Uma linha por produto", body = Vec<StockReportRow>),
        (status = 400, description = "Data inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn stock_report(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let date = query_date("fecha", query.fecha.as_deref())
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let report = app_state
        .stock_service
        .daily_report(&mut *conn, date)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(report))
}

// ---
// Manutenção da projeção de saldos
// ---
#[derive(Debug, Serialize, ToSchema)]
pub struct RebuildResult {
    pub message: String,
    #[schema(example = 42)]
    pub productos: u64,
}

// POST /api/admin/stock/rebuild
#[utoipa::path(
    post,
    path = "/api/admin/stock/rebuild",
    tag = "Stock",
    responses(
        (status = 200, description = "Saldos recalculados a partir do livro-razão", body = RebuildResult)
    ),
    security(("api_jwt" = []))
)]
pub async fn rebuild_projection(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let productos = app_state
        .stock_service
        .rebuild_projection(&mut *conn)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(RebuildResult {
        message: "Saldos recalculados".to_string(),
        productos,
    }))
}

// GET /api/admin/stock/verify
#[utoipa::path(
    get,
    path = "/api/admin/stock/verify",
    tag = "Stock",
    responses(
        (status = 200, description = "Produtos com saldo divergente (vazio = consistente)", body = Vec<ProjectionDrift>)
    ),
    security(("api_jwt" = []))
)]
pub async fn verify_projection(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let drift = app_state
        .stock_service
        .verify_projection(&mut *conn)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(drift))
}
