#![forbid(unsafe_code)]

use super::{json_body, json_positive_int, parse_client_id};
use crate::{ApiError, AppState, views};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use ob_core::StepData;
use ob_core::ids::ClientId;
use ob_storage::SaveStepRequest;
use serde_json::{Value, json};

const INCOMPLETE_PAYLOAD: &str = "Datos incompletos (cliente_id, paso o datos faltantes)";

#[derive(Debug, PartialEq)]
struct SavePayload {
    client_id: ClientId,
    step: i64,
    data: StepData,
}

fn parse_save_payload(body: Value) -> Result<SavePayload, ApiError> {
    let Value::Object(mut body) = body else {
        return Err(ApiError::bad_request(INCOMPLETE_PAYLOAD));
    };

    let client_id = json_positive_int(body.get("cliente_id"))
        .map_err(|_| ApiError::bad_request("cliente_id debe ser un entero"))?;
    let step = json_positive_int(body.get("paso"))
        .map_err(|_| ApiError::bad_request("paso debe ser un entero"))?;
    let data = body.remove("datos");

    let (Some(client_id), Some(step), Some(data)) = (client_id, step, data) else {
        return Err(ApiError::bad_request(INCOMPLETE_PAYLOAD));
    };
    let data = match data {
        Value::Object(map) => map,
        Value::Null => return Err(ApiError::bad_request(INCOMPLETE_PAYLOAD)),
        _ => return Err(ApiError::bad_request("datos debe ser un objeto")),
    };
    if client_id <= 0 {
        return Err(ApiError::bad_request("cliente_id no válido"));
    }

    Ok(SavePayload {
        client_id: ClientId::new(client_id),
        step,
        data,
    })
}

/// Saves one step and answers with the recomputed percentage and the full
/// updated record.
pub(crate) async fn save_step(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let payload = parse_save_payload(json_body(body)?)?;
    let step = payload.step;

    let (percentage, record) = state.with_store(|store| {
        let form = store.form_save_step(SaveStepRequest {
            client_id: payload.client_id,
            step: payload.step,
            data: payload.data,
        })?;
        let attachments = store.attachment_list(form.client_id)?;
        Ok((
            form.completion_percentage,
            views::form_json(store.schema(), &form, &attachments),
        ))
    })?;

    tracing::info!(
        client_id = %payload.client_id,
        step,
        percentage,
        "form step saved"
    );
    Ok(Json(json!({
        "success": true,
        "porcentaje": percentage,
        "mensaje": "Datos guardados correctamente",
        "formulario_data_actualizada": record,
    })))
}

pub(crate) async fn snapshot(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let client_id = parse_client_id(&raw_id)?;
    let record = state.with_store(|store| {
        let Some(form) = store.form_get_by_client(client_id)? else {
            return Ok(None);
        };
        let attachments = store.attachment_list(client_id)?;
        Ok(Some(views::form_json(store.schema(), &form, &attachments)))
    })?;
    record
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Formulario no encontrado"))
}

/// Administrative override: forces 100% and marks the client completed,
/// whatever the step payloads contain.
pub(crate) async fn complete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let client_id = parse_client_id(&raw_id)?;
    let form = state.with_store(|store| store.form_mark_completed(client_id))?;

    tracing::info!(client_id = %client_id, "form marked completed");
    Ok(Json(json!({
        "success": true,
        "porcentaje": form.completion_percentage,
        "mensaje": "Formulario completado exitosamente",
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn save_payload_requires_all_three_fields() {
        for body in [
            json!({ "paso": 1, "datos": {} }),
            json!({ "cliente_id": 1, "datos": {} }),
            json!({ "cliente_id": 1, "paso": 1 }),
            json!({ "cliente_id": 1, "paso": 1, "datos": null }),
            json!({ "cliente_id": 0, "paso": 1, "datos": {} }),
            json!([1, 2, 3]),
        ] {
            let err = parse_save_payload(body).expect_err("incomplete");
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn save_payload_accepts_empty_data_and_numeric_strings() {
        let payload = parse_save_payload(json!({ "cliente_id": "5", "paso": 2, "datos": {} }))
            .expect("valid");
        assert_eq!(payload.client_id, ClientId::new(5));
        assert_eq!(payload.step, 2);
        assert!(payload.data.is_empty());
    }

    #[test]
    fn save_payload_rejects_non_object_data() {
        let err = parse_save_payload(json!({ "cliente_id": 1, "paso": 1, "datos": [1] }))
            .expect_err("array data");
        assert_eq!(err.message(), "datos debe ser un objeto");
    }
}
