// src/db/order_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::orders::{CartLine, NewOrder, OrderFilter, OrderLine, PaidStatus},
};

#[derive(Clone, Default)]
pub struct OrderRepository;

impl OrderRepository {
    pub fn new() -> Self {
        Self
    }

    /// Grava uma linha de `pedidos` (um item do carrinho), sempre como não paga.
    pub async fn insert_line<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        order: &NewOrder,
        line: &CartLine,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = &order.customer;
        let delivery = &order.delivery;

        let id_pedido: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO pedidos (
                id, dni, cliente, direccion, telefono, email, metodo_pago, monto, pagado,
                id_producto, producto, cantidad,
                tipo_pedido, envio_domicilio, costo_envio, observaciones,
                fecha_entrega, horario_entrega, medio
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'No', $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING id_pedido
            "#,
        )
        .bind(order_id)
        .bind(customer.dni.as_deref())
        .bind(&customer.name)
        .bind(customer.address.as_deref())
        .bind(customer.phone.as_deref())
        .bind(customer.email.as_deref())
        .bind(order.payment_method.as_deref())
        .bind(order.total_amount)
        .bind(line.product_id)
        .bind(&line.product_name)
        .bind(line.quantity)
        .bind(delivery.order_type.as_deref())
        .bind(delivery.home_delivery.as_deref())
        .bind(delivery.shipping_cost)
        .bind(delivery.notes.as_deref())
        .bind(delivery.date)
        .bind(delivery.window.as_deref())
        .bind(delivery.channel.as_deref())
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::ProductNotFound(line.product_id);
                }
            }
            e.into()
        })?;

        Ok(id_pedido)
    }

    /// Linhas de pedido para o painel, mais recentes primeiro.
    /// Filtro ausente = não filtra.
    pub async fn list_lines<'e, E>(
        &self,
        executor: E,
        filter: &OrderFilter,
    ) -> Result<Vec<OrderLine>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer_pattern = filter
            .customer
            .as_deref()
            .map(contains_pattern);

        let lines = sqlx::query_as::<_, OrderLine>(
            r#"
            SELECT
                id_pedido, id, dni, cliente, direccion, telefono, email, metodo_pago, monto,
                pagado, id_producto, producto, cantidad, tipo_pedido, envio_domicilio,
                costo_envio, observaciones, fecha_entrega, horario_entrega, medio, fecha_ingreso
            FROM pedidos
            WHERE ($1::date IS NULL OR fecha_ingreso::date >= $1::date)
              AND ($2::date IS NULL OR fecha_ingreso::date <= $2::date)
              AND ($3::text IS NULL OR cliente ILIKE $3 ESCAPE '\' OR dni ILIKE $3 ESCAPE '\')
              AND ($4::text IS NULL OR metodo_pago = $4)
              AND ($5::estado_pago IS NULL OR pagado = $5)
            ORDER BY fecha_ingreso DESC, id_pedido DESC
            "#,
        )
        .bind(filter.date_from)
        .bind(filter.date_to)
        .bind(customer_pattern)
        .bind(filter.payment_method.as_deref())
        .bind(filter.paid)
        .fetch_all(executor)
        .await?;

        Ok(lines)
    }

    /// Marca todas as linhas do pedido. Retorna quantas linhas mudaram.
    pub async fn set_paid<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        status: PaidStatus,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE pedidos SET pagado = $1 WHERE id = $2")
            .bind(status)
            .bind(order_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}

// Busca por substring literal: `%`, `_` e `\` do termo não são curingas.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_terms_match_as_substrings() {
        assert_eq!(contains_pattern("Pérez"), "%Pérez%");
    }

    #[test]
    fn like_wildcards_in_the_term_are_taken_literally() {
        assert_eq!(contains_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(contains_pattern(r"a\b"), r"%a\\b%");
        assert_eq!(contains_pattern("%"), r"%\%%");
    }
}
