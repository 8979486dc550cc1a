// src/common/db_utils.rs

use chrono::NaiveDate;
use sqlx::{pool::PoolConnection, Executor, PgConnection, Postgres};

use crate::{common::error::AppError, config::AppState};

/// Cada requisição trabalha na sua própria conexão da pool.
pub(crate) async fn acquire_connection(
    app_state: &AppState,
) -> Result<PoolConnection<Postgres>, AppError> {
    let conn = app_state.db_pool.acquire().await?;
    Ok(conn)
}

/// Roda em toda conexão nova (`after_connect`): fixa o fuso da loja para que
/// `LOCALTIMESTAMP`, `CURRENT_DATE` e `fecha::date` usem o calendário local.
pub(crate) async fn configure_session(
    conn: &mut PgConnection,
    timezone: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT set_config('TimeZone', $1, false)")
        .bind(timezone)
        .execute(conn)
        .await?;
    Ok(())
}

/// "Hoje" segundo o banco (no fuso da sessão).
pub(crate) async fn store_today<'e, E>(executor: E) -> Result<NaiveDate, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let today: NaiveDate = sqlx::query_scalar("SELECT CURRENT_DATE")
        .fetch_one(executor)
        .await?;
    Ok(today)
}
