// src/handlers/members.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{
        db_utils::acquire_connection,
        error::{ApiError, AppError, AppJson},
    },
    config::AppState,
    middleware::i18n::Locale,
    models::{
        catalog::Message,
        members::{FamilyMember, MemberFields},
    },
};

// O cadastro traz o DNI no corpo; no update ele vem do path.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterMemberPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "not_empty"))]
    #[schema(example = "30111222")]
    pub dni: String,

    #[serde(flatten)]
    #[validate(nested)]
    pub fields: MemberFields,
}

// GET /api/admin/miembros
#[utoipa::path(
    get,
    path = "/api/admin/miembros",
    tag = "Members",
    responses((status = 200, description = "Membros por sobrenome e nome", body = Vec<FamilyMember>)),
    security(("api_jwt" = []))
)]
pub async fn list_members(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let members = app_state
        .member_service
        .list(&mut *conn)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(members))
}

// GET /api/admin/miembros/{dni}
#[utoipa::path(
    get,
    path = "/api/admin/miembros/{dni}",
    tag = "Members",
    params(("dni" = String, Path, description = "DNI do membro")),
    responses(
        (status = 200, body = FamilyMember),
        (status = 404, description = "Membro inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_member(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(dni): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let member = app_state
        .member_service
        .get(&mut *conn, &dni)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(member))
}

// POST /api/admin/miembros
#[utoipa::path(
    post,
    path = "/api/admin/miembros",
    tag = "Members",
    request_body = RegisterMemberPayload,
    responses(
        (status = 201, body = Message),
        (status = 409, description = "DNI já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_member(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<RegisterMemberPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .member_service
        .register(&mut *conn, &payload.dni, &payload.fields)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(Message::new("Miembro agregado"))))
}

// PUT /api/admin/miembros/{dni}
#[utoipa::path(
    put,
    path = "/api/admin/miembros/{dni}",
    tag = "Members",
    request_body = MemberFields,
    params(("dni" = String, Path, description = "DNI do membro")),
    responses(
        (status = 200, body = Message),
        (status = 404, description = "Membro inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_member(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(dni): Path<String>,
    AppJson(payload): AppJson<MemberFields>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .member_service
        .update(&mut *conn, &dni, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Message::new("Miembro actualizado")))
}

// DELETE /api/admin/miembros/{dni}
#[utoipa::path(
    delete,
    path = "/api/admin/miembros/{dni}",
    tag = "Members",
    params(("dni" = String, Path, description = "DNI do membro")),
    responses(
        (status = 200, body = Message),
        (status = 404, description = "Membro inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_member(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(dni): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .member_service
        .delete(&mut *conn, &dni)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Message::new("Miembro eliminado")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn registration_flattens_member_fields() {
        let payload: RegisterMemberPayload = serde_json::from_str(
            r#"{"dni": "30111222", "nombre": "Ana", "apellido": "Pérez",
                "email": "", "fecha_nacimiento": "1985-07-21"}"#,
        )
        .unwrap();

        assert!(payload.validate().is_ok());
        assert_eq!(payload.fields.nombre, "Ana");
        assert_eq!(payload.fields.fecha_nacimiento, NaiveDate::from_ymd_opt(1985, 7, 21));
    }

    #[test]
    fn blank_names_fail_validation() {
        let payload: RegisterMemberPayload =
            serde_json::from_str(r#"{"dni": "30111222", "nombre": "", "apellido": "Pérez"}"#).unwrap();
        assert!(payload.validate().is_err());
    }
}
