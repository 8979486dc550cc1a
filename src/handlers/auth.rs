// src/handlers/auth.rs

use axum::{extract::State, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError, AppJson},
    config::AppState,
    middleware::{auth::AuthenticatedAdmin, i18n::Locale},
    models::auth::{AdminUser, LoginPayload, LoginResponse},
};

// POST /api/login
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login do painel", body = LoginResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<LoginPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let token = app_state
        .auth_service
        .login(&payload.username, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(LoginResponse {
        message: "Login exitoso".to_string(),
        token,
        username: payload.username,
    }))
}

// Handler da rota protegida /api/admin/me
#[utoipa::path(
    get,
    path = "/api/admin/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Administrador do token", body = AdminUser),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn me(AuthenticatedAdmin(admin): AuthenticatedAdmin) -> Json<AdminUser> {
    Json(admin)
}
