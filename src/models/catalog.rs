// src/models/catalog.rs
//
// Os nomes JSON seguem o contrato da loja (idProductos, NombresProductos, ...).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::serde_utils::lenient_i32;

// --- Categorias ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Category {
    #[serde(rename = "idCategoria")]
    pub id_categoria: i32,
    #[schema(example = "Congelados")]
    pub nombre: String,
    pub imagen_url: Option<String>,
}

// --- Subcategorias (com o nome da categoria-mãe) ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Subcategory {
    #[serde(rename = "idSubcategoria")]
    pub id_subcategoria: i32,
    pub nombre: String,
    pub imagen_url: Option<String>,
    #[serde(rename = "idCategoria")]
    pub id_categoria: i32,
    pub nombre_categoria: Option<String>,
}

// Linha plana do JOIN categoria x subcategoria, usada para montar o menu.
#[derive(Debug, Clone, FromRow)]
pub struct MenuRow {
    pub id_categoria: i32,
    pub nombre_categoria: String,
    pub cat_img: Option<String>,
    pub id_subcategoria: Option<i32>,
    pub nombre_subcategoria: Option<String>,
    pub sub_img: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MenuSubcategory {
    #[serde(rename = "idSubcategoria")]
    pub id_subcategoria: i32,
    pub nombre: Option<String>,
    pub imagen_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MenuCategory {
    #[serde(rename = "idCategoria")]
    pub id_categoria: i32,
    pub nombre: String,
    pub imagen_url: Option<String>,
    pub subcategorias: Vec<MenuSubcategory>,
}

// --- Produto (com nomes de subcategoria/categoria) ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Product {
    #[serde(rename = "idProductos")]
    pub id_productos: i32,
    #[serde(rename = "NombresProductos")]
    #[schema(example = "Empanada de carne")]
    pub nombres_productos: String,
    #[serde(rename = "NombreSimple")]
    pub nombre_simple: Option<String>,
    #[serde(rename = "Precio")]
    #[schema(value_type = Option<f64>, example = 1500.0)]
    pub precio: Option<Decimal>,
    pub descripcion: Option<String>,
    #[serde(rename = "descripcionProducto")]
    pub descripcion_producto: Option<String>,
    pub marca: Option<String>,
    pub valor_propiedad_1: Option<String>,
    pub nombre_propiedad_1: Option<String>,
    pub tags: Option<String>,
    pub seo_descripcion: Option<String>,
    #[serde(rename = "IngredientesSugeridos")]
    pub ingredientes_sugeridos: Option<String>,
    #[serde(rename = "InstruccionesMantenimiento")]
    pub instrucciones_mantenimiento: Option<String>,
    #[serde(rename = "SugerenciasCoccion")]
    pub sugerencias_coccion: Option<String>,
    #[serde(rename = "EsUltracongelado")]
    pub es_ultracongelado: bool,
    #[serde(rename = "TieneSugerenciasCoccion")]
    pub tiene_sugerencias_coccion: bool,
    #[serde(rename = "Porcion")]
    pub porcion: Option<String>,
    pub barcode: Option<String>,
    pub slug: Option<String>,
    #[serde(rename = "UrlImagen")]
    pub url_imagen: Option<String>,
    #[serde(rename = "idSubcategoria")]
    pub id_subcategoria: Option<i32>,
    pub nombre_subcategoria: Option<String>,
    #[serde(rename = "idCategoria")]
    pub id_categoria: Option<i32>,
    pub nombre_categoria: Option<String>,
}

// Índice enxuto para a busca do front.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct SearchEntry {
    #[serde(rename = "idProductos")]
    pub id_productos: i32,
    pub nombre: String,
    pub categoria: Option<String>,
}

// --- Dados de escrita (create/update) ---
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct ProductFields {
    #[serde(rename = "NombresProductos")]
    #[validate(length(min = 1, message = "not_empty"))]
    pub nombres_productos: String,
    #[serde(rename = "NombreSimple")]
    pub nombre_simple: Option<String>,
    #[serde(rename = "Precio")]
    #[schema(value_type = Option<f64>)]
    pub precio: Option<Decimal>,
    pub descripcion: Option<String>,
    #[serde(rename = "descripcionProducto")]
    pub descripcion_producto: Option<String>,
    pub marca: Option<String>,
    pub valor_propiedad_1: Option<String>,
    pub nombre_propiedad_1: Option<String>,
    pub tags: Option<String>,
    pub seo_descripcion: Option<String>,
    #[serde(rename = "idSubcategoria", deserialize_with = "lenient_i32")]
    pub id_subcategoria: Option<i32>,
    #[serde(rename = "IngredientesSugeridos")]
    pub ingredientes_sugeridos: Option<String>,
    #[serde(rename = "InstruccionesMantenimiento")]
    pub instrucciones_mantenimiento: Option<String>,
    #[serde(rename = "SugerenciasCoccion")]
    pub sugerencias_coccion: Option<String>,
    #[serde(rename = "EsUltracongelado")]
    pub es_ultracongelado: bool,
    #[serde(rename = "TieneSugerenciasCoccion")]
    pub tiene_sugerencias_coccion: bool,
    #[serde(rename = "Porcion")]
    pub porcion: Option<String>,
    pub barcode: Option<String>,
    pub slug: Option<String>,
    #[serde(rename = "UrlImagen")]
    pub url_imagen: Option<String>,
}

impl ProductFields {
    /// Slug derivado do nome quando não informado: minúsculas, espaços viram '-'.
    pub fn slug_or_default(&self) -> String {
        match self.slug.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => self.nombres_productos.to_lowercase().replace(' ', "-"),
        }
    }

    /// Código de barras provisório quando não informado.
    pub fn barcode_or_generated(&self) -> String {
        match self.barcode.as_deref().map(str::trim) {
            Some(b) if !b.is_empty() => b.to_string(),
            _ => uuid::Uuid::new_v4().to_string()[..12].to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct CategoryFields {
    #[validate(length(min = 1, message = "not_empty"))]
    pub nombre: String,
    pub imagen_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct SubcategoryFields {
    #[validate(length(min = 1, message = "not_empty"))]
    pub nombre: String,
    #[serde(rename = "idCategoria", deserialize_with = "lenient_i32")]
    #[validate(required(message = "required"))]
    pub id_categoria: Option<i32>,
    pub imagen_url: Option<String>,
}

// Resposta de criação: `{message, id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct Created {
    pub message: String,
    pub id: i32,
}

// Resposta simples de update/delete.
#[derive(Debug, Serialize, ToSchema)]
pub struct Message {
    #[schema(example = "Producto actualizado")]
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
