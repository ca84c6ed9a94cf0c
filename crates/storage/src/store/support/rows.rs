#![forbid(unsafe_code)]

use super::super::StoreError;
use ob_core::ids::ClientId;
use ob_core::{
    Attachment, Client, ClientStatus, ClientSummary, FormRecord, FormSteps, STEP_COUNT, StepData,
    StepNumber,
};
use rusqlite::Row;
use serde_json::Value;

pub(in crate::store) const CLIENT_COLUMNS: &str =
    "c.id, c.display_name, c.slug, c.active, c.status, c.created_at_ms, c.updated_at_ms";

pub(in crate::store) const FORM_COLUMNS: &str = "id, client_id, \
     step1_json, step2_json, step3_json, step4_json, step5_json, step6_json, \
     current_step, completion_percentage, completed, completed_at_ms, created_at_ms, updated_at_ms";

pub(in crate::store) const ATTACHMENT_COLUMNS: &str = "id, client_id, original_filename, \
     stored_filename, attachment_type, storage_path, size_bytes, step, uploaded_at_ms";

pub(in crate::store) struct ClientRow {
    id: i64,
    display_name: String,
    slug: String,
    active: i64,
    status: String,
    created_at_ms: i64,
    updated_at_ms: i64,
}

impl ClientRow {
    /// Reads the seven `CLIENT_COLUMNS` starting at `offset`.
    pub(in crate::store) fn read(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(offset)?,
            display_name: row.get(offset + 1)?,
            slug: row.get(offset + 2)?,
            active: row.get(offset + 3)?,
            status: row.get(offset + 4)?,
            created_at_ms: row.get(offset + 5)?,
            updated_at_ms: row.get(offset + 6)?,
        })
    }

    pub(in crate::store) fn into_client(self) -> Result<Client, StoreError> {
        let status = ClientStatus::parse(&self.status)
            .ok_or(StoreError::CorruptRow("unknown client status"))?;
        Ok(Client {
            id: ClientId::new(self.id),
            display_name: self.display_name,
            slug: self.slug,
            active: self.active != 0,
            status,
            created_at_ms: self.created_at_ms,
            updated_at_ms: self.updated_at_ms,
        })
    }
}

pub(in crate::store) struct SummaryRow {
    client: ClientRow,
    current_step: i64,
    completion_percentage: i64,
    completed: i64,
    last_updated_ms: i64,
}

impl SummaryRow {
    pub(in crate::store) fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            client: ClientRow::read(row, 0)?,
            current_step: row.get(7)?,
            completion_percentage: row.get(8)?,
            completed: row.get(9)?,
            last_updated_ms: row.get(10)?,
        })
    }

    pub(in crate::store) fn into_summary(self) -> Result<ClientSummary, StoreError> {
        Ok(ClientSummary {
            client: self.client.into_client()?,
            current_step: stored_step(self.current_step)?,
            completion_percentage: stored_percentage(self.completion_percentage)?,
            form_completed: self.completed != 0,
            last_updated_ms: self.last_updated_ms,
        })
    }
}

pub(in crate::store) struct FormRow {
    id: i64,
    client_id: i64,
    slots: [Option<String>; STEP_COUNT],
    current_step: i64,
    completion_percentage: i64,
    completed: i64,
    completed_at_ms: Option<i64>,
    created_at_ms: i64,
    updated_at_ms: i64,
}

impl FormRow {
    pub(in crate::store) fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            client_id: row.get(1)?,
            slots: [
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
            ],
            current_step: row.get(8)?,
            completion_percentage: row.get(9)?,
            completed: row.get(10)?,
            completed_at_ms: row.get(11)?,
            created_at_ms: row.get(12)?,
            updated_at_ms: row.get(13)?,
        })
    }

    pub(in crate::store) fn into_record(self) -> Result<FormRecord, StoreError> {
        let [s1, s2, s3, s4, s5, s6] = self.slots;
        let slots = [
            parse_slot(s1)?,
            parse_slot(s2)?,
            parse_slot(s3)?,
            parse_slot(s4)?,
            parse_slot(s5)?,
            parse_slot(s6)?,
        ];
        Ok(FormRecord {
            id: self.id,
            client_id: ClientId::new(self.client_id),
            steps: FormSteps::from_slots(slots),
            current_step: stored_step(self.current_step)?,
            completion_percentage: stored_percentage(self.completion_percentage)?,
            completed: self.completed != 0,
            completed_at_ms: self.completed_at_ms,
            created_at_ms: self.created_at_ms,
            updated_at_ms: self.updated_at_ms,
        })
    }
}

pub(in crate::store) struct AttachmentRow {
    id: i64,
    client_id: i64,
    original_filename: String,
    stored_filename: String,
    attachment_type: String,
    storage_path: String,
    size_bytes: i64,
    step: Option<i64>,
    uploaded_at_ms: i64,
}

impl AttachmentRow {
    pub(in crate::store) fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            client_id: row.get(1)?,
            original_filename: row.get(2)?,
            stored_filename: row.get(3)?,
            attachment_type: row.get(4)?,
            storage_path: row.get(5)?,
            size_bytes: row.get(6)?,
            step: row.get(7)?,
            uploaded_at_ms: row.get(8)?,
        })
    }

    pub(in crate::store) fn into_attachment(self) -> Result<Attachment, StoreError> {
        Ok(Attachment {
            id: self.id,
            client_id: ClientId::new(self.client_id),
            original_filename: self.original_filename,
            stored_filename: self.stored_filename,
            attachment_type: self.attachment_type,
            storage_path: self.storage_path,
            size_bytes: u64::try_from(self.size_bytes)
                .map_err(|_| StoreError::CorruptRow("negative attachment size"))?,
            step: self.step.map(stored_step).transpose()?,
            uploaded_at_ms: self.uploaded_at_ms,
        })
    }
}

pub(in crate::store) fn encode_slot(data: &StepData) -> Result<String, StoreError> {
    Ok(serde_json::to_string(data)?)
}

fn parse_slot(raw: Option<String>) -> Result<StepData, StoreError> {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return Ok(StepData::new());
    };
    match serde_json::from_str::<Value>(&raw)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(StepData::new()),
        _ => Err(StoreError::CorruptRow("step payload is not a JSON object")),
    }
}

fn stored_step(raw: i64) -> Result<StepNumber, StoreError> {
    StepNumber::try_new(raw).map_err(|_| StoreError::CorruptRow("step out of range"))
}

fn stored_percentage(raw: i64) -> Result<u8, StoreError> {
    u8::try_from(raw)
        .ok()
        .filter(|value| *value <= 100)
        .ok_or(StoreError::CorruptRow("percentage out of range"))
}
