#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS attachments (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          client_id INTEGER NOT NULL REFERENCES clients(id),
          original_filename TEXT NOT NULL,
          stored_filename TEXT NOT NULL UNIQUE,
          attachment_type TEXT NOT NULL DEFAULT 'general',
          storage_path TEXT NOT NULL,
          size_bytes INTEGER NOT NULL,
          step INTEGER CHECK (step IS NULL OR step BETWEEN 1 AND 6),
          uploaded_at_ms INTEGER NOT NULL
        );
"#;
