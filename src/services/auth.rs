// src/services/auth.rs

use bcrypt::verify;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    models::auth::{AdminUser, Claims},
};

// O painel tem um único administrador, definido na configuração.
#[derive(Clone)]
pub struct AuthService {
    admin_username: String,
    admin_password_hash: String,
    jwt_secret: String,
    ttl_hours: i64,
}

impl AuthService {
    pub fn new(
        admin_username: String,
        admin_password_hash: String,
        jwt_secret: String,
        ttl_hours: i64,
    ) -> Self {
        Self { admin_username, admin_password_hash, jwt_secret, ttl_hours }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        if username != self.admin_username {
            return Err(AppError::InvalidCredentials);
        }

        let password_clone = password.to_owned();
        let password_hash_clone = self.admin_password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            tracing::warn!("🔒 Tentativa de login inválida para '{}'", username);
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(username)
    }

    pub fn validate_token(&self, token: &str) -> Result<AdminUser, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        // Token de outro usuário (ex.: admin renomeado) não vale mais.
        if token_data.claims.sub != self.admin_username {
            return Err(AppError::InvalidToken);
        }

        Ok(AdminUser { username: token_data.claims.sub })
    }

    pub(crate) fn create_token(&self, username: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::hours(self.ttl_hours);

        let claims = Claims {
            sub: username.to_string(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
