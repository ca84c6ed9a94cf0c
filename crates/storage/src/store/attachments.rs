#![forbid(unsafe_code)]

use super::*;
use ob_core::uploads::DEFAULT_ATTACHMENT_TYPE;
use ob_core::{Attachment, StepNumber};

impl SqliteStore {
    /// Stores metadata for a file that has already been written to disk.
    pub fn attachment_record(
        &mut self,
        request: RecordAttachmentRequest,
    ) -> Result<Attachment, StoreError> {
        let RecordAttachmentRequest {
            client_id,
            original_filename,
            stored_filename,
            attachment_type,
            storage_path,
            size_bytes,
            step,
            uploaded_at_ms,
        } = request;

        if original_filename.trim().is_empty() {
            return Err(StoreError::InvalidInput("original_filename must not be empty"));
        }
        if stored_filename.trim().is_empty() {
            return Err(StoreError::InvalidInput("stored_filename must not be empty"));
        }
        let attachment_type = match attachment_type.trim() {
            "" => DEFAULT_ATTACHMENT_TYPE.to_string(),
            tag => tag.to_string(),
        };
        let step = step
            .map(|raw| StepNumber::try_new(raw).map_err(|_| StoreError::InvalidStep(raw)))
            .transpose()?;
        let size = to_sqlite_i64(size_bytes)?;

        let tx = write_tx(&mut self.conn)?;
        ensure_client_exists(&tx, client_id)?;
        tx.execute(
            "INSERT INTO attachments(client_id, original_filename, stored_filename, attachment_type, storage_path, size_bytes, step, uploaded_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                client_id.get(),
                original_filename,
                stored_filename,
                attachment_type,
                storage_path,
                size,
                step.map(|step| i64::from(step.get())),
                uploaded_at_ms,
            ],
        )
        .map_err(|err| {
            map_insert_conflict(err, || StoreError::DuplicateAttachment(stored_filename.clone()))
        })?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::info!(
            client_id = %client_id,
            stored_filename = %stored_filename,
            size_bytes,
            "attachment recorded"
        );
        Ok(Attachment {
            id,
            client_id,
            original_filename,
            stored_filename,
            attachment_type,
            storage_path,
            size_bytes,
            step,
            uploaded_at_ms,
        })
    }

    /// Newest first.
    pub fn attachment_list(&self, client_id: ClientId) -> Result<Vec<Attachment>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ATTACHMENT_COLUMNS} FROM attachments \
             WHERE client_id=?1 \
             ORDER BY uploaded_at_ms DESC, id DESC"
        ))?;
        let mut rows = stmt.query(params![client_id.get()])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(AttachmentRow::read(row)?.into_attachment()?);
        }
        Ok(out)
    }
}
