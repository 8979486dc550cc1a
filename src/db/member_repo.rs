// src/db/member_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::members::{FamilyMember, MemberFields},
};

#[derive(Clone, Default)]
pub struct MemberRepository;

impl MemberRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<FamilyMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let members = sqlx::query_as::<_, FamilyMember>(
            r#"
            SELECT dni, nombre, apellido, direccion, telefono, email, fecha_nacimiento, sexo, fecha_registro
            FROM miembros_familia
            ORDER BY apellido, nombre
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(members)
    }

    pub async fn find_by_dni<'e, E>(&self, executor: E, dni: &str) -> Result<Option<FamilyMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let member = sqlx::query_as::<_, FamilyMember>(
            r#"
            SELECT dni, nombre, apellido, direccion, telefono, email, fecha_nacimiento, sexo, fecha_registro
            FROM miembros_familia
            WHERE dni = $1
            "#,
        )
        .bind(dni)
        .fetch_optional(executor)
        .await?;
        Ok(member)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        dni: &str,
        fields: &MemberFields,
    ) -> Result<FamilyMember, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, FamilyMember>(
            r#"
            INSERT INTO miembros_familia (dni, nombre, apellido, direccion, telefono, email, fecha_nacimiento, sexo)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING dni, nombre, apellido, direccion, telefono, email, fecha_nacimiento, sexo, fecha_registro
            "#,
        )
        .bind(dni)
        .bind(&fields.nombre)
        .bind(&fields.apellido)
        .bind(fields.direccion.as_deref())
        .bind(fields.telefono.as_deref())
        .bind(fields.email.as_deref())
        .bind(fields.fecha_nacimiento)
        .bind(fields.sexo.as_deref())
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // Tratamento de DNI duplicado
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::MemberAlreadyExists(dni.to_string());
                }
            }
            e.into()
        })
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        dni: &str,
        fields: &MemberFields,
    ) -> Result<Option<FamilyMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let member = sqlx::query_as::<_, FamilyMember>(
            r#"
            UPDATE miembros_familia SET
                nombre = $2, apellido = $3, direccion = $4, telefono = $5, email = $6,
                fecha_nacimiento = $7, sexo = $8
            WHERE dni = $1
            RETURNING dni, nombre, apellido, direccion, telefono, email, fecha_nacimiento, sexo, fecha_registro
            "#,
        )
        .bind(dni)
        .bind(&fields.nombre)
        .bind(&fields.apellido)
        .bind(fields.direccion.as_deref())
        .bind(fields.telefono.as_deref())
        .bind(fields.email.as_deref())
        .bind(fields.fecha_nacimiento)
        .bind(fields.sexo.as_deref())
        .fetch_optional(executor)
        .await?;
        Ok(member)
    }

    pub async fn delete<'e, E>(&self, executor: E, dni: &str) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM miembros_familia WHERE dni = $1")
            .bind(dni)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
