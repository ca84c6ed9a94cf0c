#![forbid(unsafe_code)]

pub(crate) mod clients;
pub(crate) mod email;
pub(crate) mod forms;
pub(crate) mod pages;
pub(crate) mod uploads;

use crate::ApiError;
use axum::extract::rejection::JsonRejection;
use ob_core::ids::ClientId;
use ob_storage::{ClientOrder, ListClientsRequest};
use serde::Deserialize;
use serde_json::Value;

/// `?incluir_inactivos=true&orden=alfabetico|recientes` on client listings.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default)]
    incluir_inactivos: bool,
    orden: Option<String>,
}

impl ListQuery {
    pub(crate) fn to_request(&self) -> Result<ListClientsRequest, ApiError> {
        let order = match self.orden.as_deref().map(str::trim) {
            None | Some("") | Some("recientes") => ClientOrder::Newest,
            Some("alfabetico") => ClientOrder::Alphabetical,
            Some(other) => {
                return Err(ApiError::bad_request(format!("orden no válido: {other}")));
            }
        };
        Ok(ListClientsRequest {
            include_inactive: self.incluir_inactivos,
            order,
        })
    }
}

/// Client ids arrive as path segments, JSON numbers or form text.
pub(crate) fn parse_client_id(raw: &str) -> Result<ClientId, ApiError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(ClientId::new(id)),
        _ => Err(ApiError::bad_request(format!("cliente_id no válido: {raw}"))),
    }
}

/// Positive integer from a JSON number or numeric string. `None` for
/// missing, null, zero or empty values.
pub(crate) fn json_positive_int(value: Option<&Value>) -> Result<Option<i64>, ()> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => match number.as_i64() {
            Some(0) => Ok(None),
            Some(raw) => Ok(Some(raw)),
            None => Err(()),
        },
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => text.trim().parse::<i64>().map(Some).map_err(|_| ()),
        Some(_) => Err(()),
    }
}

pub(crate) fn json_body(body: Result<axum::Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match body {
        Ok(axum::Json(value)) => Ok(value),
        Err(rejection) => Err(ApiError::bad_request(format!(
            "JSON no válido: {}",
            rejection.body_text()
        ))),
    }
}
