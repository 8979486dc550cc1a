// src/models/stock.rs

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- Tipo de movimento ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_movimiento", rename_all = "lowercase")] // Banco
#[serde(rename_all = "lowercase")] // JSON
pub enum MovementKind {
    Entrada, // Vira "entrada"
    Salida,  // Vira "salida"
}

// --- Movimento do livro-razão (imutável depois de gravado) ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct StockMovement {
    pub id: i64,
    pub id_producto: i32,
    #[schema(value_type = String, example = "2025-03-10T09:15:00")]
    pub fecha: NaiveDateTime,
    pub tipo: MovementKind,
    #[schema(example = 3)]
    pub cantidad: i32,
    #[schema(example = "Venta Pedido 1a2b3c4d")]
    pub motivo: String,
    pub usuario: Option<String>,
}

// Dados para gravar um movimento novo.
#[derive(Debug, Clone)]
pub struct NewStockMovement {
    pub product_id: i32,
    pub kind: MovementKind,
    pub quantity: i32,
    pub reason: String,
    pub actor: Option<String>,
    /// `None` = horário da gravação (default do banco).
    pub occurred_at: Option<NaiveDateTime>,
}

// --- Entradas do relatório: uma linha por produto do catálogo ---
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct ProductStockTotals {
    pub id_producto: i32,
    pub producto: String,
    pub entradas_totales: i64,
    pub salidas_totales: i64,
    pub entradas_dia: i64,
    pub salidas_dia: i64,
    pub salidas_futuras: i64,
    pub salidas_30_dias: i64,
}

// --- Linha do relatório diário ---
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StockReportRow {
    #[schema(value_type = String, example = "2025-03-10")]
    pub fecha: NaiveDate,
    pub id_producto: i32,
    #[schema(example = "Empanada de carne")]
    pub producto: String,
    pub stock_inicial: i64,
    pub entradas_dia: i64,
    pub salidas_dia: i64,
    /// Saldo atual real (entradas - saídas de todo o histórico). Pode ser negativo.
    pub stock_final: i64,
    pub salidas_futuras: i64,
    pub stock_disponible: i64,
    pub consumo_diario: f64,
    pub stock_minimo: i64,
    pub semanas_stock: f64,
}

// Produto cujo saldo projetado diverge do livro-razão.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ProjectionDrift {
    pub id_producto: i32,
    pub entradas_proyectadas: i64,
    pub salidas_proyectadas: i64,
    pub entradas_ledger: i64,
    pub salidas_ledger: i64,
}
