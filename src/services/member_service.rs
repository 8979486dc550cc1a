// src/services/member_service.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    db::MemberRepository,
    models::members::{FamilyMember, MemberFields},
};

#[derive(Clone)]
pub struct MemberService {
    repo: MemberRepository,
}

impl MemberService {
    pub fn new(repo: MemberRepository) -> Self {
        Self { repo }
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<FamilyMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list(executor).await
    }

    pub async fn get<'e, E>(&self, executor: E, dni: &str) -> Result<FamilyMember, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_by_dni(executor, dni)
            .await?
            .ok_or_else(|| AppError::MemberNotFound(dni.to_string()))
    }

    pub async fn register<'e, E>(
        &self,
        executor: E,
        dni: &str,
        fields: &MemberFields,
    ) -> Result<FamilyMember, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let dni = dni.trim();
        if dni.is_empty() {
            return Err(AppError::missing_field("dni"));
        }

        let member = self.repo.create(executor, dni, fields).await?;
        tracing::info!("👪 Novo membro da família: {} {}", member.nombre, member.apellido);
        Ok(member)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        dni: &str,
        fields: &MemberFields,
    ) -> Result<FamilyMember, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update(executor, dni, fields)
            .await?
            .ok_or_else(|| AppError::MemberNotFound(dni.to_string()))
    }

    pub async fn delete<'e, E>(&self, executor: E, dni: &str) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        match self.repo.delete(executor, dni).await? {
            0 => Err(AppError::MemberNotFound(dni.to_string())),
            _ => Ok(()),
        }
    }
}
