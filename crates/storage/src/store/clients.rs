#![forbid(unsafe_code)]

use super::*;
use ob_core::{Client, ClientStatus, ClientSummary, FormRecord, Slug};

const PLACEHOLDER_NAME: &str = "Nueva Empresa";
const PLACEHOLDER_SLUG: &str = "nueva-empresa";

impl SqliteStore {
    pub fn client_create(&mut self, request: CreateClientRequest) -> Result<Client, StoreError> {
        let display_name = request.display_name.trim();
        if display_name.is_empty() {
            return Err(StoreError::InvalidInput("display_name must not be empty"));
        }
        let slug = match request.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => Slug::try_new(slug)?,
            _ => Slug::from_display_name(display_name)?,
        };

        let tx = write_tx(&mut self.conn)?;
        let client = insert_client(&tx, display_name, &slug, now_ms())?;
        tx.commit()?;

        tracing::info!(client_id = %client.id, slug = %client.slug, "client created");
        Ok(client)
    }

    pub fn client_get(&self, client_id: ClientId) -> Result<Option<Client>, StoreError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {CLIENT_COLUMNS} FROM clients c WHERE c.id=?1"),
                params![client_id.get()],
                |row| ClientRow::read(row, 0),
            )
            .optional()?;
        row.map(ClientRow::into_client).transpose()
    }

    /// Looks up an active client by slug; soft-deleted clients are invisible.
    pub fn client_get_by_slug(&self, slug: &str) -> Result<Option<Client>, StoreError> {
        client_by_slug(&self.conn, slug)
    }

    /// Returns the active client for `slug`, creating it (named after the
    /// slug) on first access.
    pub fn client_get_or_create_by_slug(&mut self, slug: &str) -> Result<Client, StoreError> {
        let slug = Slug::try_new(slug.trim())?;

        let tx = write_tx(&mut self.conn)?;
        if let Some(existing) = client_by_slug(&tx, slug.as_str())? {
            return Ok(existing);
        }
        let client = insert_client(&tx, &slug.display_name(), &slug, now_ms())?;
        tx.commit()?;

        tracing::info!(client_id = %client.id, slug = %client.slug, "client created from slug");
        Ok(client)
    }

    /// Creates `Nueva Empresa N` with the next free number together with its
    /// empty form.
    pub fn client_create_placeholder(&mut self) -> Result<(Client, FormRecord), StoreError> {
        let now_ms = now_ms();
        let tx = write_tx(&mut self.conn)?;

        let existing = tx.query_row(
            "SELECT COUNT(1) FROM clients WHERE display_name LIKE ?1",
            params![format!("{PLACEHOLDER_NAME}%")],
            |row| row.get::<_, i64>(0),
        )?;

        let mut ordinal = existing.saturating_add(1);
        let slug = loop {
            let candidate = Slug::try_new(format!("{PLACEHOLDER_SLUG}-{ordinal}"))?;
            if client_by_slug(&tx, candidate.as_str())?.is_none() {
                break candidate;
            }
            ordinal = ordinal.saturating_add(1);
        };

        let client = insert_client(&tx, &format!("{PLACEHOLDER_NAME} {ordinal}"), &slug, now_ms)?;
        let form = super::forms::insert_form(&tx, client.id, now_ms)?;
        tx.commit()?;

        tracing::info!(client_id = %client.id, slug = %client.slug, "placeholder client created");
        Ok((client, form))
    }

    pub fn client_list(&self, request: ListClientsRequest) -> Result<Vec<Client>, StoreError> {
        let filter = active_filter(request.include_inactive);
        let order = order_clause(request.order);

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients c {filter} ORDER BY {order}"
        ))?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(ClientRow::read(row, 0)?.into_client()?);
        }
        Ok(out)
    }

    /// Clients joined with their form progress. Clients without a form
    /// report step 1 and 0%.
    pub fn client_summaries(
        &self,
        request: ListClientsRequest,
    ) -> Result<Vec<ClientSummary>, StoreError> {
        let filter = active_filter(request.include_inactive);
        let order = order_clause(request.order);

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CLIENT_COLUMNS}, \
                    COALESCE(f.current_step, 1), \
                    COALESCE(f.completion_percentage, 0), \
                    COALESCE(f.completed, 0), \
                    COALESCE(f.updated_at_ms, c.updated_at_ms) \
             FROM clients c \
             LEFT JOIN forms f ON f.client_id = c.id \
             {filter} \
             ORDER BY {order}"
        ))?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(SummaryRow::read(row)?.into_summary()?);
        }
        Ok(out)
    }

    /// Marks the client inactive. Its form and attachments stay untouched.
    pub fn client_soft_delete(&mut self, client_id: ClientId) -> Result<Client, StoreError> {
        let now_ms = now_ms();
        let tx = write_tx(&mut self.conn)?;
        let updated = tx.execute(
            "UPDATE clients SET active=0, updated_at_ms=?2 WHERE id=?1",
            params![client_id.get(), now_ms],
        )?;
        if updated == 0 {
            return Err(StoreError::UnknownClient(client_id));
        }
        tx.commit()?;

        tracing::info!(client_id = %client_id, "client soft-deleted");
        self.client_get(client_id)?
            .ok_or(StoreError::UnknownClient(client_id))
    }
}

pub(super) fn set_client_status(
    conn: &Connection,
    client_id: ClientId,
    status: ClientStatus,
    now_ms: i64,
) -> Result<(), StoreError> {
    let updated = conn.execute(
        "UPDATE clients SET status=?2, updated_at_ms=?3 WHERE id=?1",
        params![client_id.get(), status.as_str(), now_ms],
    )?;
    if updated == 0 {
        return Err(StoreError::UnknownClient(client_id));
    }
    Ok(())
}

fn client_by_slug(conn: &Connection, slug: &str) -> Result<Option<Client>, StoreError> {
    let row = conn
        .query_row(
            &format!("SELECT {CLIENT_COLUMNS} FROM clients c WHERE c.slug=?1 AND c.active=1"),
            params![slug],
            |row| ClientRow::read(row, 0),
        )
        .optional()?;
    row.map(ClientRow::into_client).transpose()
}

fn insert_client(
    conn: &Connection,
    display_name: &str,
    slug: &Slug,
    now_ms: i64,
) -> Result<Client, StoreError> {
    let status = ClientStatus::default();
    conn.execute(
        "INSERT INTO clients(display_name, slug, active, status, created_at_ms, updated_at_ms) \
         VALUES (?1, ?2, 1, ?3, ?4, ?4)",
        params![display_name, slug.as_str(), status.as_str(), now_ms],
    )
    .map_err(|err| map_insert_conflict(err, || StoreError::DuplicateSlug(slug.to_string())))?;

    Ok(Client {
        id: ClientId::new(conn.last_insert_rowid()),
        display_name: display_name.to_string(),
        slug: slug.to_string(),
        active: true,
        status,
        created_at_ms: now_ms,
        updated_at_ms: now_ms,
    })
}

fn active_filter(include_inactive: bool) -> &'static str {
    if include_inactive {
        ""
    } else {
        "WHERE c.active = 1"
    }
}

fn order_clause(order: ClientOrder) -> &'static str {
    match order {
        ClientOrder::Newest => "c.created_at_ms DESC, c.id DESC",
        ClientOrder::Alphabetical => "c.display_name COLLATE NOCASE ASC, c.id ASC",
    }
}
