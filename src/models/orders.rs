// src/models/orders.rs

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Estado de pagamento ("Si" / "No", como o painel espera) ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "estado_pago")]
pub enum PaidStatus {
    #[sqlx(rename = "Si")]
    #[serde(rename = "Si")]
    Paid,
    #[sqlx(rename = "No")]
    #[serde(rename = "No")]
    Unpaid,
}

impl PaidStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PaidStatus::Paid => "Pagado",
            PaidStatus::Unpaid => "No Pagado",
        }
    }
}

// --- Linha da tabela `pedidos`: uma por item do carrinho ---
// Os dados do cliente/pagamento/entrega se repetem em todas as linhas do mesmo `id`.
#[derive(Debug, Clone, FromRow)]
pub struct OrderLine {
    pub id_pedido: i64,
    /// Agrupa as linhas de um mesmo checkout.
    pub id: Uuid,
    pub dni: Option<String>,
    pub cliente: String,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub metodo_pago: Option<String>,
    pub monto: Option<Decimal>,
    pub pagado: PaidStatus,
    pub id_producto: Option<i32>,
    /// Nome do produto no momento da venda (só para exibição).
    pub producto: String,
    pub cantidad: i32,
    pub tipo_pedido: Option<String>,
    pub envio_domicilio: Option<String>,
    pub costo_envio: Option<Decimal>,
    pub observaciones: Option<String>,
    pub fecha_entrega: Option<NaiveDate>,
    pub horario_entrega: Option<String>,
    pub medio: Option<String>,
    pub fecha_ingreso: NaiveDateTime,
}

// --- Dados de entrada do checkout (já validados) ---
#[derive(Debug, Clone, Default)]
pub struct CustomerProfile {
    pub name: String,
    pub dni: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DeliverySpec {
    pub order_type: Option<String>,
    pub home_delivery: Option<String>,
    pub shipping_cost: Option<Decimal>,
    pub date: Option<NaiveDate>,
    pub window: Option<String>,
    pub notes: Option<String>,
    pub channel: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, Default)]
pub struct NewOrder {
    pub customer: CustomerProfile,
    pub payment_method: Option<String>,
    pub total_amount: Option<Decimal>,
    pub delivery: DeliverySpec,
    pub items: Vec<CartLine>,
}

// --- Filtros da listagem administrativa ---
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub customer: Option<String>,
    pub payment_method: Option<String>,
    pub paid: Option<PaidStatus>,
}

// --- Visão agrupada por pedido (painel) ---
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderItemSummary {
    #[serde(rename = "Producto")]
    pub product: String,
    #[serde(rename = "Cantidad")]
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct OrderSummary {
    #[serde(rename = "ID")]
    pub id: Uuid,
    pub cliente: String,
    #[serde(rename = "DNI")]
    pub dni: Option<String>,
    pub items: Vec<OrderItemSummary>,
    #[schema(value_type = Option<f64>, example = 4500.0)]
    pub total: Option<Decimal>,
    #[schema(value_type = String, example = "2025-03-10T09:15:00")]
    pub fecha: NaiveDateTime,
    pub pagado: PaidStatus,
    pub metodo_pago: Option<String>,
    pub envio: Option<String>,
    pub tipo_pedido: Option<String>,
    pub estado_envio: String,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    #[schema(value_type = Option<String>, example = "2025-03-12")]
    pub fecha_entrega: Option<NaiveDate>,
    pub horario_entrega: Option<String>,
    pub contacto: Option<String>,
    pub observaciones: Option<String>,
    pub medio: Option<String>,
}

impl OrderSummary {
    /// Cabeçalho do pedido a partir da primeira linha vista.
    pub fn from_line(line: &OrderLine) -> Self {
        let contacto = line
            .telefono
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| line.email.clone());

        Self {
            id: line.id,
            cliente: line.cliente.clone(),
            dni: line.dni.clone(),
            items: Vec::new(),
            total: line.monto,
            fecha: line.fecha_ingreso,
            pagado: line.pagado,
            metodo_pago: line.metodo_pago.clone(),
            envio: line.envio_domicilio.clone(),
            tipo_pedido: line.tipo_pedido.clone(),
            estado_envio: "Pendiente".to_string(),
            direccion: line.direccion.clone(),
            telefono: line.telefono.clone(),
            email: line.email.clone(),
            fecha_entrega: line.fecha_entrega,
            horario_entrega: line.horario_entrega.clone(),
            contacto,
            observaciones: line.observaciones.clone(),
            medio: line.medio.clone(),
        }
    }
}

// Resposta do checkout.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    #[schema(example = "Pedido creado con éxito")]
    pub message: String,
    pub order_id: Uuid,
}
