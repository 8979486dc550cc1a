// src/models/members.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::serde_utils::optional_date;

// --- Membro da "família" (cliente fiel), identificado pelo DNI ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct FamilyMember {
    #[schema(example = "30111222")]
    pub dni: String,
    pub nombre: String,
    pub apellido: String,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    #[schema(value_type = Option<String>, example = "1985-07-21")]
    pub fecha_nacimiento: Option<NaiveDate>,
    pub sexo: Option<String>,
    pub fecha_registro: DateTime<Utc>,
}

// Campos editáveis (o DNI vem do path no update).
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct MemberFields {
    #[validate(length(min = 1, message = "not_empty"))]
    pub nombre: String,
    #[validate(length(min = 1, message = "not_empty"))]
    pub apellido: String,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    #[serde(deserialize_with = "optional_date")]
    #[schema(value_type = Option<String>, example = "1985-07-21")]
    pub fecha_nacimiento: Option<NaiveDate>,
    pub sexo: Option<String>,
}
