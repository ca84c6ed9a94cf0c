#![forbid(unsafe_code)]

use super::parse_client_id;
use crate::timefmt::{now_ms_of, upload_stamp};
use crate::{ApiError, AppState, views};
use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use ob_core::StepNumber;
use ob_core::ids::ClientId;
use ob_core::uploads::{
    DEFAULT_ATTACHMENT_TYPE, extension, is_allowed_file, secure_filename, stored_filename,
};
use ob_storage::RecordAttachmentRequest;
use serde_json::{Value, json};
use sha2::Digest as _;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path as FsPath;
use time::OffsetDateTime;

const DIGEST_HEX_CHARS: usize = 8;

#[derive(Debug, Default)]
struct UploadForm {
    file: Option<(String, Bytes)>,
    client_id: Option<String>,
    attachment_type: Option<String>,
    step: Option<String>,
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("El archivo supera el tamaño máximo permitido")
    } else {
        ApiError::bad_request(err.body_text())
    }
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                form.file = Some((filename, bytes));
            }
            "cliente_id" => form.client_id = Some(field.text().await.map_err(multipart_error)?),
            "tipo" => form.attachment_type = Some(field.text().await.map_err(multipart_error)?),
            "paso" => form.step = Some(field.text().await.map_err(multipart_error)?),
            _ => {}
        }
    }
    Ok(form)
}

/// First hex characters of SHA-256 over the content and the upload instant,
/// so identical files uploaded in the same second still get distinct names.
fn short_digest(content: &[u8], now: OffsetDateTime) -> String {
    let mut hasher = sha2::Sha256::new();
    hasher.update(content);
    hasher.update(now.unix_timestamp_nanos().to_le_bytes());
    let digest = hasher.finalize();

    let mut out = String::with_capacity(DIGEST_HEX_CHARS);
    for b in digest.iter().take(DIGEST_HEX_CHARS / 2) {
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

fn write_new_file(path: &FsPath, content: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;
    file.write_all(content)?;
    file.sync_all()
}

fn parse_step(raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => Ok(None),
        Some(raw) => {
            let step = raw
                .parse::<i64>()
                .map_err(|_| ApiError::bad_request("paso debe ser un entero"))?;
            StepNumber::try_new(step).map_err(|err| ApiError::bad_request(err.to_string()))?;
            Ok(Some(step))
        }
    }
}

pub(crate) async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let form = read_upload_form(multipart).await?;

    let Some((original_name, content)) = form.file else {
        return Err(ApiError::bad_request("No se encontró archivo"));
    };
    let original_name = original_name.trim().to_string();
    if original_name.is_empty() {
        return Err(ApiError::bad_request("No se seleccionó archivo"));
    }
    let client_id = match form.client_id.as_deref() {
        Some(raw) if !raw.trim().is_empty() => parse_client_id(raw)?,
        _ => return Err(ApiError::bad_request("cliente_id es obligatorio")),
    };
    if !is_allowed_file(&original_name) {
        return Err(ApiError::bad_request("Tipo de archivo no permitido"));
    }
    let uploads = state.uploads();
    if content.len() > uploads.max_bytes {
        return Err(ApiError::payload_too_large(
            "El archivo supera el tamaño máximo permitido",
        ));
    }
    let step = parse_step(form.step.as_deref())?;
    let attachment_type = form
        .attachment_type
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .unwrap_or_else(|| DEFAULT_ATTACHMENT_TYPE.to_string());

    if state.with_store(|store| store.client_get(client_id))?.is_none() {
        return Err(ApiError::not_found("Cliente no encontrado"));
    }

    let now = OffsetDateTime::now_utc();
    let safe_name = match secure_filename(&original_name) {
        name if extension(&name).is_some() => name,
        _ => format!(
            "archivo.{}",
            extension(&original_name).unwrap_or_default()
        ),
    };
    let stored = stored_filename(
        client_id,
        &attachment_type,
        &upload_stamp(now),
        &short_digest(&content, now),
        &safe_name,
    );
    let path = uploads.dir.join(&stored);
    write_new_file(&path, &content).map_err(|err| {
        ApiError::internal(format!("writing upload {}: {err}", path.display()))
    })?;

    let size_bytes = content.len() as u64;
    let recorded = state.with_store(|store| {
        store.attachment_record(RecordAttachmentRequest {
            client_id,
            original_filename: safe_name.clone(),
            stored_filename: stored.clone(),
            attachment_type,
            storage_path: path.display().to_string(),
            size_bytes,
            step,
            uploaded_at_ms: now_ms_of(now),
        })
    });
    if let Err(err) = recorded {
        if let Err(remove_err) = std::fs::remove_file(&path) {
            tracing::warn!(path = %path.display(), error = %remove_err, "orphaned upload left on disk");
        }
        return Err(err);
    }

    Ok(Json(json!({
        "success": true,
        "filename": stored,
        "original_name": safe_name,
        "mensaje": "Archivo subido correctamente",
    })))
}

pub(crate) async fn list_files(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let client_id: ClientId = parse_client_id(&raw_id)?;
    let attachments = state.with_store(|store| {
        if store.client_get(client_id)?.is_none() {
            return Ok(None);
        }
        store.attachment_list(client_id).map(Some)
    })?;
    let Some(attachments) = attachments else {
        return Err(ApiError::not_found("Cliente no encontrado"));
    };
    let archivos: Vec<Value> = attachments.iter().map(views::attachment_json).collect();
    Ok(Json(json!({ "archivos": archivos })))
}
