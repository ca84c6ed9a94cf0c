#![forbid(unsafe_code)]

//! JSON shapes returned to the browser. Keys stay in Spanish because the
//! form front end reads them directly.

use crate::timefmt::ts_ms_to_rfc3339;
use ob_core::{
    Attachment, Client, ClientSummary, FormRecord, STEP_COUNT, StepNumber, StepSchema,
};
use serde_json::{Map, Value, json};

pub(crate) fn client_json(client: &Client) -> Value {
    json!({
        "id": client.id.get(),
        "nombre_cliente": client.display_name,
        "slug": client.slug,
        "activo": client.active,
        "estado": client.status.as_str(),
        "fecha_creacion": ts_ms_to_rfc3339(client.created_at_ms),
        "fecha_actualizacion": ts_ms_to_rfc3339(client.updated_at_ms),
    })
}

pub(crate) fn summary_json(summary: &ClientSummary) -> Value {
    let client = &summary.client;
    json!({
        "id": client.id.get(),
        "nombre_cliente": client.display_name,
        "slug": client.slug,
        "estado": client.status.as_str(),
        "activo": client.active,
        "paso_actual": summary.current_step.get(),
        "porcentaje_completado": summary.completion_percentage,
        "completado": summary.form_completed,
        "fecha_creacion": ts_ms_to_rfc3339(client.created_at_ms),
        "ultima_actualizacion": ts_ms_to_rfc3339(summary.last_updated_ms),
    })
}

pub(crate) fn attachment_json(attachment: &Attachment) -> Value {
    json!({
        "id": attachment.id,
        "nombre_original": attachment.original_filename,
        "nombre_archivo": attachment.stored_filename,
        "tipo_archivo": attachment.attachment_type,
        "paso": attachment.step.map(StepNumber::get),
        "tamano_bytes": attachment.size_bytes,
        "fecha_subida": ts_ms_to_rfc3339(attachment.uploaded_at_ms),
    })
}

/// Full form record, with each step payload under its slot name.
pub(crate) fn form_json(
    schema: &StepSchema,
    form: &FormRecord,
    attachments: &[Attachment],
) -> Value {
    let mut out = Map::new();
    out.insert("id".to_string(), json!(form.id));
    out.insert("cliente_id".to_string(), json!(form.client_id.get()));
    out.insert("paso_actual".to_string(), json!(form.current_step.get()));
    out.insert(
        "porcentaje_completado".to_string(),
        json!(form.completion_percentage),
    );
    for (slot, (_, data)) in schema.slots().into_iter().zip(form.steps.iter()) {
        out.insert(slot.to_string(), Value::Object(data.clone()));
    }
    out.insert("completado".to_string(), json!(form.completed));
    out.insert("completo".to_string(), json!(form.is_complete()));
    out.insert(
        "fecha_creacion".to_string(),
        json!(ts_ms_to_rfc3339(form.created_at_ms)),
    );
    out.insert(
        "fecha_actualizacion".to_string(),
        json!(ts_ms_to_rfc3339(form.updated_at_ms)),
    );
    out.insert(
        "fecha_completado".to_string(),
        json!(form.completed_at_ms.map(ts_ms_to_rfc3339)),
    );
    out.insert(
        "archivos".to_string(),
        Value::Array(attachments.iter().map(attachment_json).collect()),
    );
    Value::Object(out)
}

/// Bootstrap data embedded in the form page. A client without a form yet
/// reports step 1, 0% and empty steps.
pub(crate) fn page_data(schema: &StepSchema, client: &Client, form: Option<&FormRecord>) -> Value {
    let mut steps = Map::new();
    for step in StepNumber::all() {
        let data = form
            .map(|form| form.steps.get(step).clone())
            .unwrap_or_default();
        steps.insert(format!("paso_{}", step.get()), Value::Object(data));
    }
    let current_step = form.map_or(StepNumber::FIRST, |form| form.current_step);
    let percentage = form.map_or(0, |form| form.completion_percentage);

    json!({
        "clienteId": client.id.get(),
        "nombreCliente": client.display_name,
        "slug": client.slug,
        "pasoActual": current_step.get(),
        "totalPasos": STEP_COUNT,
        "porcentajeCompletado": percentage,
        "porcentajeCompletadoStyled": format!("{percentage}%"),
        "completado": form.is_some_and(|form| form.completed),
        "stepNames": schema.step_names(),
        "datosFormulario": steps,
    })
}
