// src/db/catalog_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::catalog::{
        Category, CategoryFields, MenuRow, Product, ProductFields, SearchEntry, Subcategory,
        SubcategoryFields,
    },
};

// Colunas de produto + nomes de subcategoria/categoria (LEFT JOIN: produto sem subcategoria também aparece).
const PRODUCT_SELECT: &str = r#"
    SELECT
        p.id_productos, p.nombres_productos, p.nombre_simple, p.precio, p.descripcion,
        p.descripcion_producto, p.marca, p.valor_propiedad_1, p.nombre_propiedad_1, p.tags,
        p.seo_descripcion, p.ingredientes_sugeridos, p.instrucciones_mantenimiento,
        p.sugerencias_coccion, p.es_ultracongelado, p.tiene_sugerencias_coccion, p.porcion,
        p.barcode, p.slug, p.url_imagen,
        p.id_subcategoria,
        s.nombre       AS nombre_subcategoria,
        c.id_categoria AS id_categoria,
        c.nombre       AS nombre_categoria
    FROM productos p
    LEFT JOIN subcategorias s ON s.id_subcategoria = p.id_subcategoria
    LEFT JOIN categorias c    ON c.id_categoria = s.id_categoria
"#;

#[derive(Clone, Default)]
pub struct CatalogRepository;

impl CatalogRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  PRODUTOS
    // =========================================================================

    pub async fn list_products<'e, E>(&self, executor: E) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{} ORDER BY p.id_productos", PRODUCT_SELECT);
        let products = sqlx::query_as::<_, Product>(&sql).fetch_all(executor).await?;
        Ok(products)
    }

    pub async fn find_product<'e, E>(&self, executor: E, id: i32) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{} WHERE p.id_productos = $1", PRODUCT_SELECT);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn search_index<'e, E>(&self, executor: E) -> Result<Vec<SearchEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entries = sqlx::query_as::<_, SearchEntry>(
            r#"
            SELECT p.id_productos, p.nombres_productos AS nombre, c.nombre AS categoria
            FROM productos p
            LEFT JOIN subcategorias s ON s.id_subcategoria = p.id_subcategoria
            LEFT JOIN categorias c    ON c.id_categoria = s.id_categoria
            ORDER BY p.id_productos
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(entries)
    }

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        fields: &ProductFields,
    ) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO productos (
                nombres_productos, nombre_simple, precio, descripcion, descripcion_producto,
                marca, valor_propiedad_1, nombre_propiedad_1, tags, seo_descripcion,
                id_subcategoria, ingredientes_sugeridos, instrucciones_mantenimiento,
                sugerencias_coccion, es_ultracongelado, tiene_sugerencias_coccion, porcion,
                barcode, slug, url_imagen
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            RETURNING id_productos
            "#,
        )
        .bind(&fields.nombres_productos)
        .bind(fields.nombre_simple.as_deref())
        .bind(fields.precio)
        .bind(fields.descripcion.as_deref())
        .bind(fields.descripcion_producto.as_deref())
        .bind(fields.marca.as_deref())
        .bind(fields.valor_propiedad_1.as_deref())
        .bind(fields.nombre_propiedad_1.as_deref())
        .bind(fields.tags.as_deref())
        .bind(fields.seo_descripcion.as_deref())
        .bind(fields.id_subcategoria)
        .bind(fields.ingredientes_sugeridos.as_deref())
        .bind(fields.instrucciones_mantenimiento.as_deref())
        .bind(fields.sugerencias_coccion.as_deref())
        .bind(fields.es_ultracongelado)
        .bind(fields.tiene_sugerencias_coccion)
        .bind(fields.porcion.as_deref())
        .bind(fields.barcode_or_generated())
        .bind(fields.slug_or_default())
        .bind(fields.url_imagen.as_deref())
        .fetch_one(executor)
        .await
        .map_err(|e| subcategory_fk(e, fields.id_subcategoria))?;

        Ok(id)
    }

    /// Retorna quantas linhas mudaram (0 = produto inexistente).
    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        id: i32,
        fields: &ProductFields,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE productos SET
                nombres_productos = $1, nombre_simple = $2, precio = $3, descripcion = $4,
                descripcion_producto = $5, marca = $6, valor_propiedad_1 = $7,
                nombre_propiedad_1 = $8, tags = $9, seo_descripcion = $10, id_subcategoria = $11,
                ingredientes_sugeridos = $12, instrucciones_mantenimiento = $13,
                sugerencias_coccion = $14, es_ultracongelado = $15,
                tiene_sugerencias_coccion = $16, porcion = $17, barcode = $18, slug = $19,
                url_imagen = $20
            WHERE id_productos = $21
            "#,
        )
        .bind(&fields.nombres_productos)
        .bind(fields.nombre_simple.as_deref())
        .bind(fields.precio)
        .bind(fields.descripcion.as_deref())
        .bind(fields.descripcion_producto.as_deref())
        .bind(fields.marca.as_deref())
        .bind(fields.valor_propiedad_1.as_deref())
        .bind(fields.nombre_propiedad_1.as_deref())
        .bind(fields.tags.as_deref())
        .bind(fields.seo_descripcion.as_deref())
        .bind(fields.id_subcategoria)
        .bind(fields.ingredientes_sugeridos.as_deref())
        .bind(fields.instrucciones_mantenimiento.as_deref())
        .bind(fields.sugerencias_coccion.as_deref())
        .bind(fields.es_ultracongelado)
        .bind(fields.tiene_sugerencias_coccion)
        .bind(fields.porcion.as_deref())
        .bind(fields.barcode.as_deref())
        .bind(fields.slug.as_deref())
        .bind(fields.url_imagen.as_deref())
        .bind(id)
        .execute(executor)
        .await
        .map_err(|e| subcategory_fk(e, fields.id_subcategoria))?;

        Ok(result.rows_affected())
    }

    /// Movimentos e saldo do produto caem junto (ON DELETE CASCADE).
    pub async fn delete_product<'e, E>(&self, executor: E, id: i32) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM productos WHERE id_productos = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    //  CATEGORIAS
    // =========================================================================

    pub async fn list_categories<'e, E>(&self, executor: E) -> Result<Vec<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id_categoria, nombre, imagen_url FROM categorias ORDER BY id_categoria",
        )
        .fetch_all(executor)
        .await?;
        Ok(categories)
    }

    /// Categorias x subcategorias, já ordenadas para montar o menu.
    pub async fn menu_rows<'e, E>(&self, executor: E) -> Result<Vec<MenuRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, MenuRow>(
            r#"
            SELECT
                c.id_categoria, c.nombre AS nombre_categoria, c.imagen_url AS cat_img,
                s.id_subcategoria, s.nombre AS nombre_subcategoria, s.imagen_url AS sub_img
            FROM categorias c
            LEFT JOIN subcategorias s ON s.id_categoria = c.id_categoria
            ORDER BY c.nombre, c.id_categoria, s.nombre
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn create_category<'e, E>(
        &self,
        executor: E,
        fields: &CategoryFields,
    ) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO categorias (nombre, imagen_url) VALUES ($1, $2) RETURNING id_categoria",
        )
        .bind(&fields.nombre)
        .bind(fields.imagen_url.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(id)
    }

    pub async fn update_category<'e, E>(
        &self,
        executor: E,
        id: i32,
        fields: &CategoryFields,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE categorias SET nombre = $1, imagen_url = $2 WHERE id_categoria = $3",
        )
        .bind(&fields.nombre)
        .bind(fields.imagen_url.as_deref())
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Leva subcategorias, produtos e movimentos em cascata.
    pub async fn delete_category<'e, E>(&self, executor: E, id: i32) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM categorias WHERE id_categoria = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    //  SUBCATEGORIAS
    // =========================================================================

    pub async fn list_subcategories<'e, E>(&self, executor: E) -> Result<Vec<Subcategory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let subcategories = sqlx::query_as::<_, Subcategory>(
            r#"
            SELECT s.id_subcategoria, s.nombre, s.imagen_url, s.id_categoria,
                   c.nombre AS nombre_categoria
            FROM subcategorias s
            LEFT JOIN categorias c ON c.id_categoria = s.id_categoria
            ORDER BY s.id_subcategoria
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(subcategories)
    }

    pub async fn create_subcategory<'e, E>(
        &self,
        executor: E,
        category_id: i32,
        fields: &SubcategoryFields,
    ) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO subcategorias (nombre, id_categoria, imagen_url)
            VALUES ($1, $2, $3)
            RETURNING id_subcategoria
            "#,
        )
        .bind(&fields.nombre)
        .bind(category_id)
        .bind(fields.imagen_url.as_deref())
        .fetch_one(executor)
        .await
        .map_err(|e| category_fk(e, category_id))?;
        Ok(id)
    }

    pub async fn update_subcategory<'e, E>(
        &self,
        executor: E,
        id: i32,
        category_id: i32,
        fields: &SubcategoryFields,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE subcategorias SET nombre = $1, id_categoria = $2, imagen_url = $3
            WHERE id_subcategoria = $4
            "#,
        )
        .bind(&fields.nombre)
        .bind(category_id)
        .bind(fields.imagen_url.as_deref())
        .bind(id)
        .execute(executor)
        .await
        .map_err(|e| category_fk(e, category_id))?;
        Ok(result.rows_affected())
    }

    /// Leva os produtos (e seus movimentos) em cascata.
    pub async fn delete_subcategory<'e, E>(&self, executor: E, id: i32) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM subcategorias WHERE id_subcategoria = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

// ---
// FK violada -> o "pai" informado não existe
// ---
fn subcategory_fk(e: sqlx::Error, id_subcategoria: Option<i32>) -> AppError {
    if let (sqlx::Error::Database(db_err), Some(id)) = (&e, id_subcategoria) {
        if db_err.is_foreign_key_violation() {
            return AppError::SubcategoryNotFound(id);
        }
    }
    e.into()
}

fn category_fk(e: sqlx::Error, id_categoria: i32) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            return AppError::CategoryNotFound(id_categoria);
        }
    }
    e.into()
}
