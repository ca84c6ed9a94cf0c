#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        -- One row per client. Step payloads are JSON objects, one column per step.
        CREATE TABLE IF NOT EXISTS forms (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          client_id INTEGER NOT NULL UNIQUE REFERENCES clients(id),
          step1_json TEXT NOT NULL DEFAULT '{}',
          step2_json TEXT NOT NULL DEFAULT '{}',
          step3_json TEXT NOT NULL DEFAULT '{}',
          step4_json TEXT NOT NULL DEFAULT '{}',
          step5_json TEXT NOT NULL DEFAULT '{}',
          step6_json TEXT NOT NULL DEFAULT '{}',
          current_step INTEGER NOT NULL DEFAULT 1 CHECK (current_step BETWEEN 1 AND 6),
          completion_percentage INTEGER NOT NULL DEFAULT 0 CHECK (completion_percentage BETWEEN 0 AND 100),
          completed INTEGER NOT NULL DEFAULT 0 CHECK (completed IN (0, 1)),
          completed_at_ms INTEGER,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );
"#;
