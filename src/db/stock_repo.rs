// src/db/stock_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::stock::{MovementKind, NewStockMovement, ProductStockTotals, ProjectionDrift, StockMovement},
};

#[derive(Clone, Default)]
pub struct StockRepository;

impl StockRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Escrita: livro-razão + projeção de saldos
    // ---
    // Sempre chamadas juntas, dentro da mesma transação (ver StockService/OrderService).

    /// Acrescenta um movimento ao livro-razão.
    pub async fn record_movement<'e, E>(
        &self,
        executor: E,
        movement: &NewStockMovement,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO movimientos_stock (id_producto, tipo, cantidad, motivo, usuario, fecha)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, LOCALTIMESTAMP))
            RETURNING id, id_producto, fecha, tipo, cantidad, motivo, usuario
            "#,
        )
        .bind(movement.product_id)
        .bind(movement.kind)
        .bind(movement.quantity)
        .bind(&movement.reason)
        .bind(movement.actor.as_deref())
        .bind(movement.occurred_at)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // FK -> produto inexistente
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::ProductNotFound(movement.product_id);
                }
            }
            e.into()
        })
    }

    /// Soma o movimento aos totais acumulados do produto (UPSERT atômico).
    pub async fn apply_to_projection<'e, E>(
        &self,
        executor: E,
        product_id: i32,
        kind: MovementKind,
        quantity: i64,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (entries, exits) = match kind {
            MovementKind::Entrada => (quantity, 0_i64),
            MovementKind::Salida => (0_i64, quantity),
        };

        sqlx::query(
            r#"
            INSERT INTO saldos_stock (id_producto, entradas_totales, salidas_totales)
            VALUES ($1, $2, $3)
            ON CONFLICT (id_producto)
            DO UPDATE SET
                entradas_totales = saldos_stock.entradas_totales + EXCLUDED.entradas_totales,
                salidas_totales  = saldos_stock.salidas_totales + EXCLUDED.salidas_totales,
                actualizado_en   = NOW()
            "#,
        )
        .bind(product_id)
        .bind(entries)
        .bind(exits)
        .execute(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::ProductNotFound(product_id);
                }
            }
            e.into()
        })?;

        Ok(())
    }

    pub async fn clear_projection<'e, E>(&self, executor: E) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM saldos_stock").execute(executor).await?;
        Ok(())
    }

    /// Recalcula os totais de todos os produtos a partir do livro-razão.
    /// Retorna quantos produtos foram gravados.
    pub async fn rebuild_projection_from_ledger<'e, E>(&self, executor: E) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO saldos_stock (id_producto, entradas_totales, salidas_totales)
            SELECT
                p.id_productos,
                COALESCE(SUM(m.cantidad) FILTER (WHERE m.tipo = 'entrada'), 0)::BIGINT,
                COALESCE(SUM(m.cantidad) FILTER (WHERE m.tipo = 'salida'), 0)::BIGINT
            FROM productos p
            LEFT JOIN movimientos_stock m ON m.id_producto = p.id_productos
            GROUP BY p.id_productos
            "#,
        )
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    // ---
    // Leitura
    // ---

    /// Produtos cuja projeção não bate com o livro-razão.
    pub async fn find_projection_drift<'e, E>(&self, executor: E) -> Result<Vec<ProjectionDrift>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, ProjectionDrift>(
            r#"
            WITH ledger AS (
                SELECT
                    id_producto,
                    COALESCE(SUM(cantidad) FILTER (WHERE tipo = 'entrada'), 0)::BIGINT AS entradas,
                    COALESCE(SUM(cantidad) FILTER (WHERE tipo = 'salida'), 0)::BIGINT AS salidas
                FROM movimientos_stock
                GROUP BY id_producto
            )
            SELECT
                p.id_productos                       AS id_producto,
                COALESCE(s.entradas_totales, 0)      AS entradas_proyectadas,
                COALESCE(s.salidas_totales, 0)       AS salidas_proyectadas,
                COALESCE(l.entradas, 0)::BIGINT      AS entradas_ledger,
                COALESCE(l.salidas, 0)::BIGINT       AS salidas_ledger
            FROM productos p
            LEFT JOIN saldos_stock s ON s.id_producto = p.id_productos
            LEFT JOIN ledger l       ON l.id_producto = p.id_productos
            WHERE COALESCE(s.entradas_totales, 0) <> COALESCE(l.entradas, 0)
               OR COALESCE(s.salidas_totales, 0)  <> COALESCE(l.salidas, 0)
            ORDER BY p.id_productos
            "#,
        )
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    /// Uma linha por produto do catálogo com tudo o que o relatório do dia `date` precisa:
    /// totais de sempre (da projeção), movimentos do dia, saídas comprometidas em pedidos
    /// com entrega posterior a `date` e saídas dos 30 dias que terminam em `date`.
    pub async fn report_totals<'e, E>(
        &self,
        executor: E,
        date: NaiveDate,
    ) -> Result<Vec<ProductStockTotals>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Pedidos antigos (sem id_producto) casam pelo nome do produto.
        let rows = sqlx::query_as::<_, ProductStockTotals>(
            r#"
            WITH dia AS (
                SELECT
                    id_producto,
                    COALESCE(SUM(cantidad) FILTER (WHERE tipo = 'entrada'), 0)::BIGINT AS entradas,
                    COALESCE(SUM(cantidad) FILTER (WHERE tipo = 'salida'), 0)::BIGINT  AS salidas
                FROM movimientos_stock
                WHERE fecha::date = $1::date
                GROUP BY id_producto
            ),
            consumo AS (
                SELECT id_producto, SUM(cantidad)::BIGINT AS salidas
                FROM movimientos_stock
                WHERE tipo = 'salida'
                  AND fecha >= ($1::date - 30)::timestamp
                  AND fecha <  ($1::date + 1)::timestamp
                GROUP BY id_producto
            ),
            futuras AS (
                SELECT p.id_productos AS id_producto, SUM(o.cantidad)::BIGINT AS salidas
                FROM pedidos o
                JOIN productos p
                  ON o.id_producto = p.id_productos
                  OR (o.id_producto IS NULL AND o.producto = p.nombres_productos)
                WHERE o.fecha_entrega > $1::date
                GROUP BY p.id_productos
            )
            SELECT
                p.id_productos                  AS id_producto,
                p.nombres_productos             AS producto,
                COALESCE(s.entradas_totales, 0) AS entradas_totales,
                COALESCE(s.salidas_totales, 0)  AS salidas_totales,
                COALESCE(d.entradas, 0)         AS entradas_dia,
                COALESCE(d.salidas, 0)          AS salidas_dia,
                COALESCE(f.salidas, 0)          AS salidas_futuras,
                COALESCE(c.salidas, 0)          AS salidas_30_dias
            FROM productos p
            LEFT JOIN saldos_stock s ON s.id_producto = p.id_productos
            LEFT JOIN dia d          ON d.id_producto = p.id_productos
            LEFT JOIN futuras f      ON f.id_producto = p.id_productos
            LEFT JOIN consumo c      ON c.id_producto = p.id_productos
            ORDER BY p.id_productos
            "#,
        )
        .bind(date)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }
}
