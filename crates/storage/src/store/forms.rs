#![forbid(unsafe_code)]

use super::*;
use ob_core::{ClientStatus, FormRecord, StepNumber};

impl SqliteStore {
    /// Inserts an empty form. A client has at most one form; a second call
    /// fails with `DuplicateForm` and leaves the existing row alone.
    pub fn form_create_for_client(&mut self, client_id: ClientId) -> Result<FormRecord, StoreError> {
        let tx = write_tx(&mut self.conn)?;
        ensure_client_exists(&tx, client_id)?;
        let form = insert_form(&tx, client_id, now_ms())?;
        tx.commit()?;
        Ok(form)
    }

    pub fn form_get_by_client(&self, client_id: ClientId) -> Result<Option<FormRecord>, StoreError> {
        form_by_client(&self.conn, client_id)
    }

    pub fn form_get_or_create(&mut self, client_id: ClientId) -> Result<FormRecord, StoreError> {
        let tx = write_tx(&mut self.conn)?;
        ensure_client_exists(&tx, client_id)?;
        if let Some(form) = form_by_client(&tx, client_id)? {
            return Ok(form);
        }
        let form = insert_form(&tx, client_id, now_ms())?;
        tx.commit()?;
        Ok(form)
    }

    /// Replaces one step's payload, advances the step pointer and stores the
    /// recomputed percentage in a single write.
    pub fn form_save_step(&mut self, request: SaveStepRequest) -> Result<FormRecord, StoreError> {
        let SaveStepRequest {
            client_id,
            step,
            data,
        } = request;
        let step = StepNumber::try_new(step).map_err(|_| StoreError::InvalidStep(step))?;

        let now_ms = now_ms();
        let tx = write_tx(&mut self.conn)?;
        ensure_client_exists(&tx, client_id)?;

        let mut form = match form_by_client(&tx, client_id)? {
            Some(form) => form,
            None => insert_form(&tx, client_id, now_ms)?,
        };
        form.apply_step(&self.schema, step, data);
        form.updated_at_ms = now_ms;
        update_form(&tx, &form)?;
        tx.commit()?;

        tracing::debug!(
            client_id = %client_id,
            step = %step,
            current_step = %form.current_step,
            percentage = form.completion_percentage,
            "form step saved"
        );
        Ok(form)
    }

    /// Administrative override: forces 100% and moves the client to
    /// `completed` regardless of the step payloads.
    pub fn form_mark_completed(&mut self, client_id: ClientId) -> Result<FormRecord, StoreError> {
        let now_ms = now_ms();
        let tx = write_tx(&mut self.conn)?;
        ensure_client_exists(&tx, client_id)?;

        let mut form = match form_by_client(&tx, client_id)? {
            Some(form) => form,
            None => insert_form(&tx, client_id, now_ms)?,
        };
        form.mark_completed(now_ms);
        update_form(&tx, &form)?;
        super::clients::set_client_status(&tx, client_id, ClientStatus::Completed, now_ms)?;
        tx.commit()?;

        tracing::info!(client_id = %client_id, "form marked completed");
        Ok(form)
    }
}

pub(super) fn insert_form(
    conn: &Connection,
    client_id: ClientId,
    now_ms: i64,
) -> Result<FormRecord, StoreError> {
    conn.execute(
        "INSERT INTO forms(client_id, current_step, completion_percentage, completed, created_at_ms, updated_at_ms) \
         VALUES (?1, 1, 0, 0, ?2, ?2)",
        params![client_id.get(), now_ms],
    )
    .map_err(|err| map_insert_conflict(err, || StoreError::DuplicateForm(client_id)))?;

    Ok(FormRecord::empty(conn.last_insert_rowid(), client_id, now_ms))
}

fn form_by_client(conn: &Connection, client_id: ClientId) -> Result<Option<FormRecord>, StoreError> {
    let row = conn
        .query_row(
            &format!("SELECT {FORM_COLUMNS} FROM forms WHERE client_id=?1"),
            params![client_id.get()],
            FormRow::read,
        )
        .optional()?;
    row.map(FormRow::into_record).transpose()
}

fn update_form(conn: &Connection, form: &FormRecord) -> Result<(), StoreError> {
    let slots = form
        .steps
        .iter()
        .map(|(_, data)| encode_slot(data))
        .collect::<Result<Vec<_>, _>>()?;

    conn.execute(
        "UPDATE forms SET \
           step1_json=?2, step2_json=?3, step3_json=?4, step4_json=?5, step5_json=?6, step6_json=?7, \
           current_step=?8, completion_percentage=?9, completed=?10, completed_at_ms=?11, updated_at_ms=?12 \
         WHERE id=?1",
        params![
            form.id,
            slots[0],
            slots[1],
            slots[2],
            slots[3],
            slots[4],
            slots[5],
            i64::from(form.current_step.get()),
            i64::from(form.completion_percentage),
            form.completed,
            form.completed_at_ms,
            form.updated_at_ms,
        ],
    )?;
    Ok(())
}
