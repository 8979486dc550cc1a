// src/services/stock_service.rs

use chrono::NaiveDate;
use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::{db_utils::store_today, error::AppError},
    db::StockRepository,
    models::stock::{
        NewStockMovement, ProductStockTotals, ProjectionDrift, StockMovement, StockReportRow,
    },
};

/// Janela da média de consumo, em dias.
pub const CONSUMPTION_WINDOW_DAYS: i64 = 30;
/// Dias de cobertura do estoque de segurança.
pub const SAFETY_DAYS: f64 = 7.0;
/// Piso do estoque mínimo, independente do giro.
pub const MIN_STOCK_FLOOR: i64 = 10;
/// "Infinitas" semanas: há estoque e nenhum consumo recente.
pub const NO_CONSUMPTION_WEEKS: f64 = 99.0;

#[derive(Clone)]
pub struct StockService {
    stock_repo: StockRepository,
}

impl StockService {
    pub fn new(stock_repo: StockRepository) -> Self {
        Self { stock_repo }
    }

    // --- AJUSTE MANUAL (ENTRADA / SAÍDA) ---
    pub async fn record_movement<'e, E>(
        &self,
        executor: E,
        movement: NewStockMovement,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let recorded = self.stock_repo.record_movement(&mut *tx, &movement).await?;
        self.stock_repo
            .apply_to_projection(&mut *tx, recorded.id_producto, recorded.tipo, i64::from(recorded.cantidad))
            .await?;

        tx.commit().await?;

        tracing::info!(
            "📦 Movimento {:?} de {} un. registrado para o produto {} ({})",
            recorded.tipo,
            recorded.cantidad,
            recorded.id_producto,
            recorded.motivo
        );
        Ok(recorded)
    }

    // --- RELATÓRIO DIÁRIO ---
    /// `date = None` usa o "hoje" do banco. Tudo é lido num único snapshot.
    pub async fn daily_report<'e, E>(
        &self,
        executor: E,
        date: Option<NaiveDate>,
    ) -> Result<Vec<StockReportRow>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let date = match date {
            Some(d) => d,
            None => store_today(&mut *tx).await?,
        };

        let totals = self.stock_repo.report_totals(&mut *tx, date).await?;
        tx.commit().await?;

        Ok(totals.iter().map(|t| build_report_row(date, t)).collect())
    }

    // --- MANUTENÇÃO DA PROJEÇÃO ---
    /// Apaga e recalcula `saldos_stock` a partir do livro-razão. Retorna quantos produtos foram gravados.
    pub async fn rebuild_projection<'e, E>(&self, executor: E) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        self.stock_repo.clear_projection(&mut *tx).await?;
        let rebuilt = self.stock_repo.rebuild_projection_from_ledger(&mut *tx).await?;

        tx.commit().await?;

        tracing::info!("🔁 Projeção de saldos reconstruída para {} produtos", rebuilt);
        Ok(rebuilt)
    }

    pub async fn verify_projection<'e, E>(&self, executor: E) -> Result<Vec<ProjectionDrift>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let drift = self.stock_repo.find_projection_drift(executor).await?;
        if !drift.is_empty() {
            tracing::warn!("⚠️ {} produtos com saldo divergente do livro-razão", drift.len());
        }
        Ok(drift)
    }
}

// ---
// Cálculo puro de uma linha do relatório
// ---
pub fn build_report_row(fecha: NaiveDate, totals: &ProductStockTotals) -> StockReportRow {
    // Sem clamp: saldo negativo sinaliza erro de digitação/venda a descoberto.
    let stock_final = totals.entradas_totales - totals.salidas_totales;
    let stock_inicial = stock_final - totals.entradas_dia + totals.salidas_dia;
    let stock_disponible = stock_final - totals.salidas_futuras;

    let consumo_diario = totals.salidas_30_dias as f64 / CONSUMPTION_WINDOW_DAYS as f64;

    StockReportRow {
        fecha,
        id_producto: totals.id_producto,
        producto: totals.producto.clone(),
        stock_inicial,
        entradas_dia: totals.entradas_dia,
        salidas_dia: totals.salidas_dia,
        stock_final,
        salidas_futuras: totals.salidas_futuras,
        stock_disponible,
        consumo_diario,
        stock_minimo: minimum_stock(consumo_diario),
        semanas_stock: weeks_of_cover(stock_final, consumo_diario),
    }
}

pub fn minimum_stock(consumo_diario: f64) -> i64 {
    let safety = (consumo_diario * SAFETY_DAYS).round() as i64;
    safety.max(MIN_STOCK_FLOOR)
}

pub fn weeks_of_cover(stock: i64, consumo_diario: f64) -> f64 {
    if consumo_diario > 0.0 {
        let weeks = stock as f64 / (consumo_diario * SAFETY_DAYS);
        (weeks * 10.0).round() / 10.0
    } else if stock > 0 {
        NO_CONSUMPTION_WEEKS
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn totals(entradas: i64, salidas: i64) -> ProductStockTotals {
        ProductStockTotals {
            id_producto: 5,
            producto: "Empanada".into(),
            entradas_totales: entradas,
            salidas_totales: salidas,
            ..Default::default()
        }
    }

    #[test]
    fn empty_history_reports_zero_everywhere() {
        let row = build_report_row(day(), &totals(0, 0));
        assert_eq!(row.stock_final, 0);
        assert_eq!(row.stock_inicial, 0);
        assert_eq!(row.stock_disponible, 0);
        assert_eq!(row.consumo_diario, 0.0);
        assert_eq!(row.stock_minimo, 10);
        assert_eq!(row.semanas_stock, 0.0);
    }

    #[test]
    fn todays_movements_are_backed_out_of_the_opening_balance() {
        let t = ProductStockTotals {
            entradas_dia: 50,
            salidas_dia: 3,
            ..totals(120, 40)
        };
        let row = build_report_row(day(), &t);
        assert_eq!(row.stock_final, 80);
        assert_eq!(row.stock_inicial, 33);
        assert_eq!(row.entradas_dia, 50);
        assert_eq!(row.salidas_dia, 3);
    }

    #[test]
    fn committed_future_exits_reduce_available_stock() {
        let t = ProductStockTotals {
            salidas_futuras: 12,
            ..totals(30, 0)
        };
        let row = build_report_row(day(), &t);
        assert_eq!(row.stock_disponible, 18);
    }

    #[test]
    fn negative_stock_is_not_clamped() {
        let row = build_report_row(day(), &totals(2, 5));
        assert_eq!(row.stock_final, -3);
        assert_eq!(row.semanas_stock, 0.0);
    }

    #[test]
    fn stock_without_consumption_is_the_sentinel() {
        let row = build_report_row(day(), &totals(7, 0));
        assert_eq!(row.semanas_stock, 99.0);
    }

    #[test]
    fn safety_stock_follows_a_week_of_consumption() {
        // 90 saídas em 30 dias -> 3/dia -> 21 para 7 dias
        let t = ProductStockTotals {
            salidas_30_dias: 90,
            ..totals(200, 95)
        };
        let row = build_report_row(day(), &t);
        assert_eq!(row.consumo_diario, 3.0);
        assert_eq!(row.stock_minimo, 21);
        // 105 / 21 = 5.0
        assert_eq!(row.semanas_stock, 5.0);
    }

    #[test]
    fn slow_movers_keep_the_floor_of_ten() {
        assert_eq!(minimum_stock(0.0), 10);
        assert_eq!(minimum_stock(1.0), 10);
        assert_eq!(minimum_stock(1.5), 11);
    }

    #[test]
    fn weeks_of_cover_rounds_to_one_decimal() {
        // 10 / (1 * 7) = 1.428...
        assert_eq!(weeks_of_cover(10, 1.0), 1.4);
        // 11 / 7 = 1.571...
        assert_eq!(weeks_of_cover(11, 1.0), 1.6);
    }

    proptest! {
        #[test]
        fn report_identities_hold(
            entradas in 0i64..1_000_000,
            salidas in 0i64..1_000_000,
            entradas_dia in 0i64..10_000,
            salidas_dia in 0i64..10_000,
            futuras in 0i64..10_000,
            salidas_30 in 0i64..100_000,
        ) {
            let t = ProductStockTotals {
                id_producto: 1,
                producto: "x".into(),
                entradas_totales: entradas,
                salidas_totales: salidas,
                entradas_dia,
                salidas_dia,
                salidas_futuras: futuras,
                salidas_30_dias: salidas_30,
            };
            let row = build_report_row(day(), &t);

            prop_assert_eq!(row.stock_final, entradas - salidas);
            prop_assert_eq!(row.stock_inicial, row.stock_final - row.entradas_dia + row.salidas_dia);
            prop_assert_eq!(row.stock_disponible, row.stock_final - row.salidas_futuras);
            prop_assert!(row.stock_minimo >= 10);
            if row.stock_final == 0 {
                prop_assert_eq!(row.semanas_stock, 0.0);
            }
            if salidas_30 == 0 && row.stock_final > 0 {
                prop_assert_eq!(row.semanas_stock, 99.0);
            }
        }
    }
}
