// src/services/catalog_service.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    db::CatalogRepository,
    models::catalog::{
        Category, CategoryFields, MenuCategory, MenuRow, MenuSubcategory, Product, ProductFields,
        SearchEntry, Subcategory, SubcategoryFields,
    },
};

#[derive(Clone)]
pub struct CatalogService {
    repo: CatalogRepository,
}

impl CatalogService {
    pub fn new(repo: CatalogRepository) -> Self {
        Self { repo }
    }

    // =========================================================================
    //  1. LEITURA PÚBLICA (LOJA)
    // =========================================================================

    pub async fn list_products<'e, E>(&self, executor: E) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_products(executor).await
    }

    pub async fn get_product<'e, E>(&self, executor: E, id: i32) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_product(executor, id)
            .await?
            .ok_or(AppError::ProductNotFound(id))
    }

    pub async fn list_categories<'e, E>(&self, executor: E) -> Result<Vec<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_categories(executor).await
    }

    pub async fn list_subcategories<'e, E>(&self, executor: E) -> Result<Vec<Subcategory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_subcategories(executor).await
    }

    pub async fn menu<'e, E>(&self, executor: E) -> Result<Vec<MenuCategory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = self.repo.menu_rows(executor).await?;
        Ok(build_menu(rows))
    }

    pub async fn search_index<'e, E>(&self, executor: E) -> Result<Vec<SearchEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.search_index(executor).await
    }

    // =========================================================================
    //  2. ADMINISTRAÇÃO
    // =========================================================================

    pub async fn create_product<'e, E>(&self, executor: E, fields: &ProductFields) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = self.repo.create_product(executor, fields).await?;
        tracing::info!("🆕 Produto {} criado: '{}'", id, fields.nombres_productos);
        Ok(id)
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        id: i32,
        fields: &ProductFields,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        match self.repo.update_product(executor, id, fields).await? {
            0 => Err(AppError::ProductNotFound(id)),
            _ => Ok(()),
        }
    }

    pub async fn delete_product<'e, E>(&self, executor: E, id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        match self.repo.delete_product(executor, id).await? {
            0 => Err(AppError::ProductNotFound(id)),
            _ => {
                tracing::info!("🗑️ Produto {} removido (com seus movimentos)", id);
                Ok(())
            }
        }
    }

    pub async fn create_category<'e, E>(&self, executor: E, fields: &CategoryFields) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.create_category(executor, fields).await
    }

    pub async fn update_category<'e, E>(
        &self,
        executor: E,
        id: i32,
        fields: &CategoryFields,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        match self.repo.update_category(executor, id, fields).await? {
            0 => Err(AppError::CategoryNotFound(id)),
            _ => Ok(()),
        }
    }

    pub async fn delete_category<'e, E>(&self, executor: E, id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        match self.repo.delete_category(executor, id).await? {
            0 => Err(AppError::CategoryNotFound(id)),
            _ => {
                tracing::info!("🗑️ Categoria {} removida em cascata", id);
                Ok(())
            }
        }
    }

    pub async fn create_subcategory<'e, E>(
        &self,
        executor: E,
        fields: &SubcategoryFields,
    ) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category_id = fields
            .id_categoria
            .ok_or_else(|| AppError::missing_field("idCategoria"))?;
        self.repo.create_subcategory(executor, category_id, fields).await
    }

    pub async fn update_subcategory<'e, E>(
        &self,
        executor: E,
        id: i32,
        fields: &SubcategoryFields,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category_id = fields
            .id_categoria
            .ok_or_else(|| AppError::missing_field("idCategoria"))?;
        match self.repo.update_subcategory(executor, id, category_id, fields).await? {
            0 => Err(AppError::SubcategoryNotFound(id)),
            _ => Ok(()),
        }
    }

    pub async fn delete_subcategory<'e, E>(&self, executor: E, id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        match self.repo.delete_subcategory(executor, id).await? {
            0 => Err(AppError::SubcategoryNotFound(id)),
            _ => {
                tracing::info!("🗑️ Subcategoria {} removida em cascata", id);
                Ok(())
            }
        }
    }
}

// Linhas já vêm ordenadas por categoria; categoria sem subcategoria aparece com lista vazia.
fn build_menu(rows: Vec<MenuRow>) -> Vec<MenuCategory> {
    let mut menu: Vec<MenuCategory> = Vec::new();

    for row in rows {
        let is_new = menu.last().map_or(true, |c| c.id_categoria != row.id_categoria);
        if is_new {
            menu.push(MenuCategory {
                id_categoria: row.id_categoria,
                nombre: row.nombre_categoria.clone(),
                imagen_url: row.cat_img.clone(),
                subcategorias: Vec::new(),
            });
        }

        if let (Some(id_subcategoria), Some(category)) = (row.id_subcategoria, menu.last_mut()) {
            category.subcategorias.push(MenuSubcategory {
                id_subcategoria,
                nombre: row.nombre_subcategoria,
                imagen_url: row.sub_img,
            });
        }
    }

    menu
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cat: i32, cat_name: &str, sub: Option<(i32, &str)>) -> MenuRow {
        MenuRow {
            id_categoria: cat,
            nombre_categoria: cat_name.into(),
            cat_img: None,
            id_subcategoria: sub.map(|(id, _)| id),
            nombre_subcategoria: sub.map(|(_, n)| n.to_string()),
            sub_img: None,
        }
    }

    #[test]
    fn menu_nests_subcategories_under_their_category() {
        let menu = build_menu(vec![
            row(2, "Congelados", Some((10, "Empanadas"))),
            row(2, "Congelados", Some((11, "Tartas"))),
            row(1, "Postres", None),
        ]);

        assert_eq!(menu.len(), 2);
        assert_eq!(menu[0].nombre, "Congelados");
        assert_eq!(menu[0].subcategorias.len(), 2);
        assert_eq!(menu[0].subcategorias[1].id_subcategoria, 11);
        assert!(menu[1].subcategorias.is_empty());
    }

    #[test]
    fn empty_catalog_has_an_empty_menu() {
        assert!(build_menu(Vec::new()).is_empty());
    }
}
