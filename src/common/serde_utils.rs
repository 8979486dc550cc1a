// src/common/serde_utils.rs
//
// Desserializadores "tolerantes" para os formulários do painel:
// o front manda números como string ("3") e campos vazios como "".

use chrono::{NaiveDate, NaiveDateTime};
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

use crate::common::error::AppError;

fn blank_to_none(value: Option<Value>) -> Option<Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        other => other,
    }
}

/// Inteiro opcional vindo como número JSON ou string numérica.
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = blank_to_none(Option::<Value>::deserialize(deserializer)?);
    match value {
        None => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("esperado um inteiro, recebido {}", n))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("esperado um inteiro, recebido '{}'", s))),
        Some(other) => Err(de::Error::custom(format!("esperado um inteiro, recebido {}", other))),
    }
}

/// Igual a `lenient_i64`, para identificadores `INT` do banco.
pub fn lenient_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match lenient_i64(deserializer)? {
        None => Ok(None),
        Some(n) => i32::try_from(n)
            .map(Some)
            .map_err(|_| de::Error::custom(format!("identificador fora do intervalo: {}", n))),
    }
}

/// Data opcional `AAAA-MM-DD`; string vazia conta como ausente.
pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = blank_to_none(Option::<Value>::deserialize(deserializer)?);
    match value {
        None => Ok(None),
        Some(Value::String(s)) => parse_date(s.trim())
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("data inválida: '{}'", s))),
        Some(other) => Err(de::Error::custom(format!("data inválida: {}", other))),
    }
}

/// Data/hora opcional. Uma data sem hora vira meia-noite.
pub fn optional_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = blank_to_none(Option::<Value>::deserialize(deserializer)?);
    match value {
        None => Ok(None),
        Some(Value::String(s)) => parse_datetime(s.trim())
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("data/hora inválida: '{}'", s))),
        Some(other) => Err(de::Error::custom(format!("data/hora inválida: {}", other))),
    }
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Data opcional vinda da query string (`?fecha=2025-03-10`); vazio conta como ausente.
pub fn query_date(field: &'static str, raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => parse_date(s)
            .map(Some)
            .ok_or_else(|| AppError::invalid_field(field, "invalid_date")),
    }
}

pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "lenient_i64")]
        cantidad: Option<i64>,
        #[serde(default, deserialize_with = "lenient_i32")]
        id: Option<i32>,
        #[serde(default, deserialize_with = "optional_date")]
        dia: Option<NaiveDate>,
        #[serde(default, deserialize_with = "optional_datetime")]
        fecha: Option<NaiveDateTime>,
    }

    fn form(json: &str) -> Result<Form, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn numbers_and_numeric_strings_are_accepted() {
        let f = form(r#"{"cantidad": "12", "id": 7}"#).unwrap();
        assert_eq!(f.cantidad, Some(12));
        assert_eq!(f.id, Some(7));
    }

    #[test]
    fn missing_null_and_blank_are_absent() {
        let f = form(r#"{"cantidad": "", "id": null}"#).unwrap();
        assert_eq!(f.cantidad, None);
        assert_eq!(f.id, None);
        assert_eq!(f.dia, None);
        assert_eq!(f.fecha, None);
    }

    #[test]
    fn garbage_numbers_are_rejected() {
        assert!(form(r#"{"cantidad": "tres"}"#).is_err());
        assert!(form(r#"{"cantidad": 2.5}"#).is_err());
        assert!(form(r#"{"id": 99999999999}"#).is_err());
    }

    #[test]
    fn dates_and_datetimes() {
        let f = form(r#"{"dia": "2025-03-10", "fecha": "2025-03-10"}"#).unwrap();
        assert_eq!(f.dia, NaiveDate::from_ymd_opt(2025, 3, 10));
        assert_eq!(
            f.fecha,
            NaiveDate::from_ymd_opt(2025, 3, 10).and_then(|d| d.and_hms_opt(0, 0, 0))
        );

        let f = form(r#"{"fecha": "2025-03-10T14:30"}"#).unwrap();
        assert_eq!(
            f.fecha,
            NaiveDate::from_ymd_opt(2025, 3, 10).and_then(|d| d.and_hms_opt(14, 30, 0))
        );

        assert!(form(r#"{"dia": "10/03/2025"}"#).is_err());
    }

    #[test]
    fn query_dates_are_optional_but_strict() {
        assert_eq!(query_date("fecha", None).unwrap(), None);
        assert_eq!(query_date("fecha", Some(" ")).unwrap(), None);
        assert_eq!(
            query_date("fecha", Some("2025-03-10")).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 10)
        );
        assert!(matches!(
            query_date("fecha", Some("ayer")),
            Err(AppError::ValidationError(_))
        ));
    }
}
