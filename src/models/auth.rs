// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Dados para login do painel
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "not_empty"))]
    #[schema(example = "admin")]
    pub username: String,
    #[validate(length(min = 1, message = "not_empty"))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    #[schema(example = "Login exitoso")]
    pub message: String,
    pub token: String,
    pub username: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (usuário administrador)
    pub exp: usize,  // Expiration time (quando o token expira)
    pub iat: usize,  // Issued At (quando o token foi criado)
}

// Administrador autenticado, colocado nas extensions pelo `auth_guard`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminUser {
    #[schema(example = "admin")]
    pub username: String,
}
