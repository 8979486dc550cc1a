// src/handlers/orders.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    common::{
        db_utils::acquire_connection,
        error::{ApiError, AppError, AppJson},
        serde_utils::{lenient_i32, optional_date, query_date},
    },
    config::AppState,
    middleware::i18n::Locale,
    models::{
        catalog::Message,
        orders::{
            CartLine, CustomerProfile, DeliverySpec, NewOrder, OrderCreated, OrderFilter,
            OrderSummary, PaidStatus,
        },
    },
};

// =============================================================================
//  1. CHECKOUT (PÚBLICO)
// =============================================================================

// `Serialize`: o `length` do validator sobre `Vec<CartItemPayload>` anexa o valor ao erro.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CartItemPayload {
    #[serde(rename = "idProductos", default, deserialize_with = "lenient_i32")]
    #[validate(required(message = "required"), range(min = 1, message = "min_one"))]
    #[schema(value_type = i32, example = 5)]
    pub id_productos: Option<i32>,

    #[serde(rename = "NombresProductos", default)]
    #[validate(length(min = 1, message = "not_empty"))]
    #[schema(example = "Empanada")]
    pub nombres_productos: String,

    #[serde(default, deserialize_with = "lenient_i32")]
    #[validate(required(message = "required"), range(min = 1, message = "min_one"))]
    #[schema(value_type = i32, example = 3)]
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "not_empty"))]
    #[schema(example = "Ana Pérez")]
    pub nombre: String,
    #[serde(default)]
    pub dni: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    #[schema(example = "Efectivo")]
    pub metodo_pago: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<f64>, example = 4500.0)]
    pub monto_total: Option<Decimal>,
    #[serde(default)]
    pub tipo_pedido: Option<String>,
    #[serde(default, deserialize_with = "optional_date")]
    #[schema(value_type = Option<String>, example = "2025-03-12")]
    pub fecha_entrega: Option<NaiveDate>,
    #[serde(default)]
    pub horario_entrega: Option<String>,
    #[serde(default)]
    pub envio_domicilio: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub costo_envio: Option<Decimal>,
    #[serde(default)]
    pub observaciones: Option<String>,
    #[serde(default)]
    #[schema(example = "Web")]
    pub medio: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, message = "empty_cart"), nested)]
    pub cart_items: Vec<CartItemPayload>,
}

impl CreateOrderPayload {
    // Valores monetários não podem ser negativos.
    fn validate_amounts(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for (field, value) in [("montoTotal", self.monto_total), ("costoEnvio", self.costo_envio)] {
            if value.is_some_and(|v| v.is_sign_negative() && !v.is_zero()) {
                let mut err = ValidationError::new("range");
                err.message = Some("not_negative".into());
                errors.add(field, err);
            }
        }

        if errors.errors().is_empty() { Ok(()) } else { Err(errors) }
    }

    fn into_order(self) -> Result<NewOrder, AppError> {
        let items = self
            .cart_items
            .into_iter()
            .map(|item| {
                Ok(CartLine {
                    product_id: item
                        .id_productos
                        .ok_or_else(|| AppError::missing_field("idProductos"))?,
                    product_name: item.nombres_productos,
                    quantity: item.quantity.ok_or_else(|| AppError::missing_field("quantity"))?,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(NewOrder {
            customer: CustomerProfile {
                name: self.nombre.trim().to_string(),
                dni: self.dni,
                address: self.direccion,
                phone: self.telefono,
                email: self.email,
            },
            payment_method: self.metodo_pago,
            total_amount: self.monto_total,
            delivery: DeliverySpec {
                order_type: self.tipo_pedido,
                home_delivery: self.envio_domicilio,
                shipping_cost: self.costo_envio,
                date: self.fecha_entrega,
                window: self.horario_entrega,
                notes: self.observaciones,
                channel: self.medio,
            },
            items,
        })
    }
}

// POST /api/orders
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Pedido registrado e estoque baixado", body = OrderCreated),
        (status = 400, description = "Carrinho vazio ou campos inválidos"),
        (status = 404, description = "Produto do carrinho inexistente (nada é gravado)")
    )
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<CreateOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    payload
        .validate_amounts()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let order = payload
        .into_order()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let order_id = app_state
        .order_service
        .place_order(&mut *conn, &order)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::CREATED,
        Json(OrderCreated {
            message: "Pedido creado con éxito".to_string(),
            order_id,
        }),
    ))
}

// =============================================================================
//  2. PAINEL (ADMIN)
// =============================================================================

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct OrderListQuery {
    /// Data de ingresso inicial, inclusiva (`AAAA-MM-DD`)
    pub fecha_inicio: Option<String>,
    /// Data de ingresso final, inclusiva (`AAAA-MM-DD`)
    pub fecha_fin: Option<String>,
    /// Parte do nome ou do DNI do cliente
    pub cliente: Option<String>,
    /// Meio de pagamento; `Todos` não filtra
    pub metodo_pago: Option<String>,
    /// `Si`, `No` ou `Todos`
    pub estado: Option<String>,
}

// "", "Todos" e ausente significam "sem filtro".
fn filter_value(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != "Todos")
}

impl OrderListQuery {
    fn into_filter(self) -> Result<OrderFilter, AppError> {
        let paid = match filter_value(self.estado).as_deref() {
            None => None,
            Some("Si") => Some(PaidStatus::Paid),
            Some("No") => Some(PaidStatus::Unpaid),
            Some(_) => return Err(AppError::invalid_field("estado", "invalid_value")),
        };

        Ok(OrderFilter {
            date_from: query_date("fecha_inicio", self.fecha_inicio.as_deref())?,
            date_to: query_date("fecha_fin", self.fecha_fin.as_deref())?,
            customer: filter_value(self.cliente),
            payment_method: filter_value(self.metodo_pago),
            paid,
        })
    }
}

// GET /api/admin/orders
#[utoipa::path(
    get,
    path = "/api/admin/orders",
    tag = "Orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Pedidos agrupados, mais recentes primeiro", body = Vec<OrderSummary>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<OrderListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = query
        .into_filter()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let orders = app_state
        .order_service
        .list_orders(&mut *conn, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(orders))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetPaidPayload {
    #[serde(default)]
    #[validate(required(message = "required"))]
    #[schema(value_type = PaidStatus, example = "Si")]
    pub pagado: Option<PaidStatus>,
}

// PUT /api/admin/orders/{order_id}/pay
#[utoipa::path(
    put,
    path = "/api/admin/orders/{order_id}/pay",
    tag = "Orders",
    request_body = SetPaidPayload,
    params(
        ("order_id" = Uuid, Path, description = "ID do pedido (agrupa as linhas)")
    ),
    responses(
        (status = 200, description = "Todas as linhas do pedido atualizadas", body = Message),
        (status = 404, description = "Pedido inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_paid(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(order_id): Path<String>,
    AppJson(payload): AppJson<SetPaidPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let order_id = Uuid::parse_str(order_id.trim()).map_err(|_| {
        AppError::invalid_field("order_id", "invalid_value").to_api_error(&locale, &app_state.i18n_store)
    })?;
    let status = payload.pagado.ok_or_else(|| {
        AppError::missing_field("pagado").to_api_error(&locale, &app_state.i18n_store)
    })?;

    let mut conn = acquire_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .order_service
        .set_paid(&mut *conn, order_id, status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Message::new(format!("Pedido marcado como {}", status.label()))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> CreateOrderPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn string_quantities_from_the_admin_form_are_accepted() {
        let p = payload(
            r#"{"nombre": "Ana", "metodoPago": "Efectivo", "fechaEntrega": "2025-03-12",
                "cartItems": [{"idProductos": "5", "NombresProductos": "Empanada", "quantity": "3"}]}"#,
        );
        assert!(p.validate().is_ok());

        let order = p.into_order().unwrap();
        assert_eq!(
            order.items,
            vec![CartLine { product_id: 5, product_name: "Empanada".into(), quantity: 3 }]
        );
        assert_eq!(order.delivery.date, NaiveDate::from_ymd_opt(2025, 3, 12));
        assert_eq!(order.payment_method.as_deref(), Some("Efectivo"));
    }

    #[test]
    fn empty_cart_is_a_validation_error() {
        let errors = payload(r#"{"nombre": "Ana", "cartItems": []}"#).validate().unwrap_err();
        // Só o carrinho falha; o nome está presente.
        assert_eq!(errors.errors().len(), 1);
    }

    #[test]
    fn bad_cart_line_is_reported_under_its_index() {
        use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

        let errors = payload(
            r#"{"nombre": "Ana", "cartItems": [
                {"idProductos": 5, "NombresProductos": "Empanada", "quantity": 1},
                {"idProductos": 6, "NombresProductos": "Humita", "quantity": 0}]}"#,
        )
        .validate()
        .unwrap_err();

        let api = AppError::ValidationError(errors)
            .to_api_error(&Locale("es".into()), &I18nStore::load().unwrap());
        let details = api.details.unwrap();
        let fields: Vec<&String> = details.as_object().unwrap().keys().collect();
        assert_eq!(fields.len(), 1);
        assert!(fields[0].ends_with("[1].quantity"));
    }

    #[test]
    fn items_without_quantity_are_rejected_instead_of_zeroed() {
        let p = payload(r#"{"nombre": "Ana", "cartItems": [{"idProductos": 5, "NombresProductos": "Empanada"}]}"#);
        assert!(p.validate().is_err());
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let p = payload(
            r#"{"nombre": "Ana", "montoTotal": -10,
                "cartItems": [{"idProductos": 5, "NombresProductos": "Empanada", "quantity": 1}]}"#,
        );
        let errors = p.validate_amounts().unwrap_err();
        assert!(errors.field_errors().contains_key("montoTotal"));
    }

    #[test]
    fn todos_and_blank_filters_are_ignored() {
        let filter = OrderListQuery {
            metodo_pago: Some("Todos".into()),
            estado: Some("Todos".into()),
            cliente: Some("  ".into()),
            fecha_inicio: Some("2025-03-01".into()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();

        assert!(filter.payment_method.is_none());
        assert!(filter.paid.is_none());
        assert!(filter.customer.is_none());
        assert_eq!(filter.date_from, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert!(filter.date_to.is_none());
    }

    #[test]
    fn paid_filter_accepts_only_si_or_no() {
        let paid = OrderListQuery { estado: Some("Si".into()), ..Default::default() }
            .into_filter()
            .unwrap()
            .paid;
        assert_eq!(paid, Some(PaidStatus::Paid));

        assert!(
            OrderListQuery { estado: Some("Quizas".into()), ..Default::default() }
                .into_filter()
                .is_err()
        );
    }
}
