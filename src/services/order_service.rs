// src/services/order_service.rs

use std::collections::{BTreeMap, HashMap};

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OrderRepository, StockRepository},
    models::{
        orders::{CartLine, NewOrder, OrderFilter, OrderItemSummary, OrderLine, OrderSummary, PaidStatus},
        stock::{MovementKind, NewStockMovement},
    },
};

#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    stock_repo: StockRepository,
}

impl OrderService {
    pub fn new(order_repo: OrderRepository, stock_repo: StockRepository) -> Self {
        Self { order_repo, stock_repo }
    }

    /// Grava o pedido inteiro ou nada: linhas de `pedidos`, saídas no livro-razão
    /// e saldos, tudo na mesma transação.
    ///
    /// Os saldos são atualizados uma vez por produto, em ordem crescente de id:
    /// dois checkouts com os mesmos produtos em ordem diferente travam as linhas
    /// de `saldos_stock` na mesma sequência.
    pub async fn place_order<'e, E>(&self, executor: E, order: &NewOrder) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if order.items.is_empty() {
            return Err(AppError::invalid_field("cartItems", "empty_cart"));
        }

        let order_id = Uuid::new_v4();
        let reason = sale_reason(order_id);

        let mut tx = executor.begin().await?;

        for line in &order.items {
            self.order_repo
                .insert_line(&mut *tx, order_id, order, line)
                .await?;

            let movement = NewStockMovement {
                product_id: line.product_id,
                kind: MovementKind::Salida,
                quantity: line.quantity,
                reason: reason.clone(),
                actor: None,
                occurred_at: None,
            };
            self.stock_repo.record_movement(&mut *tx, &movement).await?;
        }

        for (product_id, quantity) in exits_by_product(&order.items) {
            self.stock_repo
                .apply_to_projection(&mut *tx, product_id, MovementKind::Salida, quantity)
                .await?;
        }

        // Qualquer `?` acima descarta `tx` sem commit -> rollback.
        tx.commit().await?;

        tracing::info!(
            "🛒 Pedido {} registrado com {} itens para '{}'",
            order_id,
            order.items.len(),
            order.customer.name
        );
        Ok(order_id)
    }

    pub async fn list_orders<'e, E>(
        &self,
        executor: E,
        filter: &OrderFilter,
    ) -> Result<Vec<OrderSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lines = self.order_repo.list_lines(executor, filter).await?;
        Ok(group_lines(&lines))
    }

    pub async fn set_paid<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        status: PaidStatus,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = self.order_repo.set_paid(executor, order_id, status).await?;
        if updated == 0 {
            return Err(AppError::OrderNotFound(order_id));
        }

        tracing::info!("💳 Pedido {} marcado como {} ({} linhas)", order_id, status.label(), updated);
        Ok(())
    }
}

/// "Venta Pedido " + os 8 primeiros caracteres do id.
fn sale_reason(order_id: Uuid) -> String {
    let id = order_id.simple().to_string();
    format!("Venta Pedido {}", &id[..8])
}

/// Saídas do carrinho somadas por produto, em ordem de id.
fn exits_by_product(items: &[CartLine]) -> BTreeMap<i32, i64> {
    let mut totals = BTreeMap::new();
    for line in items {
        *totals.entry(line.product_id).or_insert(0_i64) += i64::from(line.quantity);
    }
    totals
}

/// Agrupa as linhas por pedido, na ordem em que cada pedido aparece pela primeira vez.
fn group_lines(lines: &[OrderLine]) -> Vec<OrderSummary> {
    let mut orders: Vec<OrderSummary> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for line in lines {
        let pos = *index.entry(line.id).or_insert_with(|| {
            orders.push(OrderSummary::from_line(line));
            orders.len() - 1
        });
        orders[pos].items.push(OrderItemSummary {
            product: line.producto.clone(),
            quantity: line.cantidad,
        });
    }

    orders
}
