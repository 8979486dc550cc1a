// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::{db_utils::configure_session, i18n::I18nStore},
    db::{CatalogRepository, MemberRepository, OrderRepository, StockRepository},
    services::{
        auth::AuthService, catalog_service::CatalogService, member_service::MemberService,
        order_service::OrderService, stock_service::StockService,
    },
};

const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_TIMEZONE: &str = "America/Argentina/Buenos_Aires";

// Configuração lida do ambiente (.env em desenvolvimento).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub admin_username: String,
    pub admin_password_hash: String,
    pub server_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub store_timezone: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Separado de `from_env` para poder testar sem mexer no ambiente do processo.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).with_context(|| format!("{} deve ser definida", key))
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            admin_password_hash: required("ADMIN_PASSWORD_HASH")?,
            admin_username: lookup("ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string()),
            server_addr: lookup("SERVER_ADDR").unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string()),
            store_timezone: lookup("STORE_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            jwt_ttl_hours: parse_or(&lookup, "JWT_TTL_HOURS", 12)?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout_secs: parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 3)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} inválida: '{}'", key, raw)),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: Arc<I18nStore>,
    pub auth_service: AuthService,
    pub catalog_service: CatalogService,
    pub stock_service: StockService,
    pub order_service: OrderService,
    pub member_service: MemberService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let timezone = config.store_timezone.clone();

        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
            .after_connect(move |conn, _meta| {
                let timezone = timezone.clone();
                Box::pin(async move { configure_session(conn, &timezone).await })
            })
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::with_pool(db_pool, config)
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(db_pool: PgPool, config: &Config) -> anyhow::Result<Self> {
        let stock_repo = StockRepository::new();

        let auth_service = AuthService::new(
            config.admin_username.clone(),
            config.admin_password_hash.clone(),
            config.jwt_secret.clone(),
            config.jwt_ttl_hours,
        );
        let stock_service = StockService::new(stock_repo.clone());
        let order_service = OrderService::new(OrderRepository::new(), stock_repo);

        Ok(Self {
            db_pool,
            i18n_store: Arc::new(I18nStore::load()?),
            auth_service,
            catalog_service: CatalogService::new(CatalogRepository::new()),
            stock_service,
            order_service,
            member_service: MemberService::new(MemberRepository::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const BASE: &[(&str, &str)] = &[
        ("DATABASE_URL", "postgres://localhost/gv"),
        ("JWT_SECRET", "segredo"),
        ("ADMIN_PASSWORD_HASH", "$2b$04$hash"),
    ];

    #[test]
    fn defaults_apply_when_optional_keys_are_absent() {
        let config = Config::from_lookup(lookup(BASE)).unwrap();
        assert_eq!(config.admin_username, "admin");
        assert_eq!(config.server_addr, "0.0.0.0:5000");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.jwt_ttl_hours, 12);
        assert_eq!(config.store_timezone, "America/Argentina/Buenos_Aires");
    }

    #[test]
    fn missing_required_key_is_named_in_the_error() {
        let err = Config::from_lookup(lookup(&BASE[..2])).unwrap_err();
        assert!(err.to_string().contains("ADMIN_PASSWORD_HASH"));
    }

    #[test]
    fn unparsable_numbers_fail() {
        let mut vars = BASE.to_vec();
        vars.push(("DB_MAX_CONNECTIONS", "muitas"));
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));
    }
}
