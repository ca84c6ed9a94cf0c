#![forbid(unsafe_code)]

use super::json_body;
use crate::ApiError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use ob_core::schema::is_truthy;
use serde_json::{Value, json};

const REQUIRED_FIELDS: [&str; 3] = ["servidor_saliente", "puerto", "usuario_email"];

fn port_of(value: &Value) -> Option<u16> {
    let port = match value {
        Value::Number(number) => number.as_u64().and_then(|port| u16::try_from(port).ok()),
        Value::String(text) => text.trim().parse::<u16>().ok(),
        _ => None,
    };
    port.filter(|port| *port != 0)
}

/// Checks the mail settings without opening a connection. Incomplete
/// settings are a 400; an unusable port is reported as a failed test.
pub(crate) async fn test_email(
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = json_body(body)?;
    let complete = REQUIRED_FIELDS
        .iter()
        .all(|field| body.get(*field).is_some_and(is_truthy));
    if !complete {
        return Err(ApiError::bad_request("Configuración incompleta"));
    }

    let server = body["servidor_saliente"].as_str().unwrap_or_default().trim();
    match port_of(&body["puerto"]) {
        Some(port) if !server.is_empty() => {
            tracing::info!(server, port, "mail settings check passed");
            Ok(Json(json!({
                "success": true,
                "mensaje": "Conexión exitosa al servidor de correo",
            })))
        }
        _ => Ok(Json(json!({
            "success": false,
            "error": "No se pudo conectar al servidor. Verifique la configuración.",
        }))),
    }
}
