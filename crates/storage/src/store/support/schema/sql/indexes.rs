#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE UNIQUE INDEX IF NOT EXISTS idx_clients_active_slug ON clients(slug) WHERE active = 1;
        CREATE INDEX IF NOT EXISTS idx_clients_created ON clients(created_at_ms, id);
        CREATE INDEX IF NOT EXISTS idx_attachments_client ON attachments(client_id, uploaded_at_ms);
"#;
