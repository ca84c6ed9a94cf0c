#![forbid(unsafe_code)]

use super::{ListQuery, json_body, parse_client_id};
use crate::{ApiError, AppState, views};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use ob_storage::CreateClientRequest;
use serde_json::{Value, json};

pub(crate) async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let request = query.to_request()?;
    let summaries = state.with_store(|store| store.client_summaries(request))?;
    let clientes: Vec<Value> = summaries.iter().map(views::summary_json).collect();
    Ok(Json(json!({ "clientes": clientes })))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let body = json_body(body)?;
    let display_name = body
        .get("nombre")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::bad_request("nombre es obligatorio"))?
        .to_string();
    let slug = match body.get("slug") {
        None | Some(Value::Null) => None,
        Some(Value::String(slug)) => Some(slug.clone()),
        Some(_) => return Err(ApiError::bad_request("slug debe ser texto")),
    };

    let client = state.with_store(|store| {
        let client = store.client_create(CreateClientRequest { display_name, slug })?;
        store.form_create_for_client(client.id)?;
        Ok(client)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "cliente": views::client_json(&client),
        })),
    ))
}

/// Deactivates the client; its form and attachments are kept.
pub(crate) async fn soft_delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let client_id = parse_client_id(&raw_id)?;
    let client = state.with_store(|store| store.client_soft_delete(client_id))?;
    Ok(Json(json!({
        "success": true,
        "cliente": views::client_json(&client),
    })))
}
