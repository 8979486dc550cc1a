// src/common/error.rs

use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::{common::i18n::I18nStore, config::AppState, middleware::i18n::Locale};

// Erros de domínio/infra. Nunca saem da aplicação diretamente:
// o handler converte com `to_api_error` (que traduz a mensagem).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] ValidationErrors),

    #[error("Corpo JSON inválido: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Produto {0} não encontrado")]
    ProductNotFound(i32),

    #[error("Categoria {0} não encontrada")]
    CategoryNotFound(i32),

    #[error("Subcategoria {0} não encontrada")]
    SubcategoryNotFound(i32),

    #[error("Pedido {0} não encontrado")]
    OrderNotFound(Uuid),

    #[error("Membro {0} não encontrado")]
    MemberNotFound(String),

    #[error("Membro {0} já existe")]
    MemberAlreadyExists(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Monta um `ValidationError` para um único campo, no mesmo formato do `validator`.
    pub fn invalid_field(field: &'static str, code: &'static str) -> Self {
        let mut err = ValidationError::new(code);
        err.message = Some(code.into());
        let mut errors = ValidationErrors::new();
        errors.add(field, err);
        AppError::ValidationError(errors)
    }

    pub fn missing_field(field: &'static str) -> Self {
        Self::invalid_field(field, "required")
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            // 400 (sintaxe), 415 (content-type) ou 422 (tipos)
            AppError::InvalidBody(rejection) => rejection.status(),
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::ProductNotFound(_)
            | AppError::CategoryNotFound(_)
            | AppError::SubcategoryNotFound(_)
            | AppError::OrderNotFound(_)
            | AppError::MemberNotFound(_) => StatusCode::NOT_FOUND,
            AppError::MemberAlreadyExists(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro na resposta HTTP, com a mensagem no idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();
        let status = self.status();

        let (error, details) = match self {
            AppError::ValidationError(errors) => {
                let mut fields: HashMap<String, Vec<String>> = HashMap::new();
                collect_field_messages("", errors, lang, store, &mut fields);
                (store.translate(lang, "VALIDATION_ERROR", &[]), Some(json!(fields)))
            }
            AppError::InvalidBody(rejection) => (
                store.translate(lang, "INVALID_JSON", &[]),
                Some(json!({ "cause": rejection.body_text() })),
            ),
            AppError::InvalidCredentials => (store.translate(lang, "INVALID_CREDENTIALS", &[]), None),
            AppError::InvalidToken => (store.translate(lang, "INVALID_TOKEN", &[]), None),
            AppError::ProductNotFound(id) => {
                (store.translate(lang, "PRODUCT_NOT_FOUND", &[("id", id.to_string())]), None)
            }
            AppError::CategoryNotFound(id) => {
                (store.translate(lang, "CATEGORY_NOT_FOUND", &[("id", id.to_string())]), None)
            }
            AppError::SubcategoryNotFound(id) => {
                (store.translate(lang, "SUBCATEGORY_NOT_FOUND", &[("id", id.to_string())]), None)
            }
            AppError::OrderNotFound(id) => {
                (store.translate(lang, "ORDER_NOT_FOUND", &[("id", id.to_string())]), None)
            }
            AppError::MemberNotFound(dni) => {
                (store.translate(lang, "MEMBER_NOT_FOUND", &[("dni", dni.clone())]), None)
            }
            AppError::MemberAlreadyExists(dni) => {
                (store.translate(lang, "MEMBER_ALREADY_EXISTS", &[("dni", dni.clone())]), None)
            }
            // Falhas de banco/infra: mensagem genérica + causa original em `details`.
            AppError::DatabaseError(inner) => {
                tracing::error!("Erro de banco de dados: {}", inner);
                (
                    store.translate(lang, "DATABASE_ERROR", &[]),
                    Some(json!({ "cause": inner.to_string() })),
                )
            }
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    store.translate(lang, "INTERNAL_ERROR", &[]),
                    Some(json!({ "cause": e.to_string() })),
                )
            }
        };

        ApiError { status, error, details }
    }
}

// Achata erros aninhados (structs e listas) em caminhos como `cart_items[0].quantity`.
fn collect_field_messages(
    prefix: &str,
    errors: &ValidationErrors,
    lang: &str,
    store: &I18nStore,
    out: &mut HashMap<String, Vec<String>>,
) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors
                    .iter()
                    .map(|e| {
                        let key = e.message.as_deref().unwrap_or(e.code.as_ref());
                        store.translate(lang, key, &[])
                    })
                    .collect();
                out.insert(path, messages);
            }
            ValidationErrorsKind::Struct(inner) => {
                collect_field_messages(&path, inner, lang, store, out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_field_messages(&format!("{}[{}]", path, index), inner, lang, store, out);
                }
            }
        }
    }
}

// O erro "de fronteira": já traduzido, pronto para virar JSON.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// `Json` com a rejeição no nosso envelope, traduzida pelo Accept-Language.
#[derive(Debug)]
pub struct AppJson<T>(pub T);

impl<T> FromRequest<AppState> for AppJson<T>
where
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let Ok(locale) = Locale::from_request_parts(&mut parts, state).await;
        let req = Request::from_parts(parts, body);

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => {
                Err(AppError::InvalidBody(rejection).to_api_error(&locale, &state.i18n_store))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> I18nStore {
        I18nStore::load().unwrap()
    }

    #[test]
    fn missing_field_is_a_bad_request_with_field_details() {
        let api = AppError::missing_field("cantidad")
            .to_api_error(&Locale("es".into()), &store());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.unwrap();
        assert!(details.get("cantidad").is_some());
    }

    #[test]
    fn not_found_errors_map_to_404() {
        let api = AppError::ProductNotFound(5).to_api_error(&Locale("es".into()), &store());
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert!(api.error.contains('5'));
        assert!(api.details.is_none());
    }

    #[test]
    fn duplicate_member_is_a_conflict() {
        let api = AppError::MemberAlreadyExists("30111222".into())
            .to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert!(api.error.contains("30111222"));
    }

    #[test]
    fn database_errors_carry_the_underlying_cause() {
        let api = AppError::DatabaseError(sqlx::Error::RowNotFound)
            .to_api_error(&Locale("es".into()), &store());

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        let cause = api.details.unwrap()["cause"].as_str().unwrap().to_string();
        assert!(!cause.is_empty());
    }
}
