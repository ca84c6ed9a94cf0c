use super::*;
use crate::ids::ClientId;
use crate::progress::{compute_percentage, completed_steps, is_form_complete, percentage_for};
use crate::schema::is_truthy;
use crate::text::{slugify, title_case};
use crate::uploads::{is_allowed_file, secure_filename, stored_filename};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn data(value: Value) -> StepData {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn step(raw: i64) -> StepNumber {
    StepNumber::try_new(raw).expect("valid step")
}

fn complete_payload(step: StepNumber) -> StepData {
    match step.get() {
        1 => data(json!({
            "nombre": "Trasteros Norte SL",
            "nif": "B12345678",
            "direccion": "Calle Mayor 1",
            "codigo_postal": "28001",
            "provincia": "Madrid",
            "telefono": "600123123",
            "email": "info@norte.es",
        })),
        2 => data(json!({ "trasteros": [{ "numero": "A1", "metros": 4 }] })),
        3 => data(json!({ "usuarios": [{ "nombre": "Ana" }] })),
        4 => data(json!({
            "servidor_saliente": "smtp.norte.es",
            "direccion_servidor": "mail.norte.es",
            "usuario_email": "avisos@norte.es",
            "puerto": 587,
        })),
        5 => data(json!({ "niveles": ["admin"] })),
        _ => StepData::new(),
    }
}

/// Exactly `k` complete steps (k >= 1): the optional documentation step
/// always counts, so only the first `k - 1` steps get real payloads.
fn steps_with_k_complete(k: usize) -> FormSteps {
    let mut steps = FormSteps::default();
    for number in StepNumber::all().take(k.saturating_sub(1)) {
        steps.replace(number, complete_payload(number));
    }
    steps
}

#[test]
fn step_number_bounds() {
    assert_eq!(
        StepNumber::try_new(0).unwrap_err(),
        StepNumberError::OutOfRange(0)
    );
    assert_eq!(
        StepNumber::try_new(7).unwrap_err(),
        StepNumberError::OutOfRange(7)
    );
    assert_eq!(
        StepNumber::try_new(-1).unwrap_err(),
        StepNumberError::OutOfRange(-1)
    );
    assert_eq!(step(1), StepNumber::FIRST);
    assert_eq!(step(6), StepNumber::LAST);
    assert_eq!(StepNumber::all().count(), STEP_COUNT);
}

#[test]
fn truthiness_matches_form_semantics() {
    assert!(!is_truthy(&Value::Null));
    assert!(!is_truthy(&json!(false)));
    assert!(!is_truthy(&json!(0)));
    assert!(!is_truthy(&json!(0.0)));
    assert!(!is_truthy(&json!("")));
    assert!(!is_truthy(&json!([])));
    assert!(!is_truthy(&json!({})));
    assert!(is_truthy(&json!(true)));
    assert!(is_truthy(&json!(587)));
    assert!(is_truthy(&json!(" ")));
    assert!(is_truthy(&json!(["x"])));
}

#[test]
fn complete_payloads_satisfy_steps_one_to_five() {
    let schema = StepSchema::onboarding();
    for number in StepNumber::all().take(5) {
        assert!(
            schema.is_step_complete(number, &complete_payload(number)),
            "step {number} should be complete"
        );
    }
}

#[test]
fn omitting_any_required_field_makes_step_incomplete() {
    let schema = StepSchema::onboarding();
    for (number, rule) in schema.rules().take(5) {
        let fields = rule
            .required_fields
            .iter()
            .chain(rule.list_field.iter())
            .cloned()
            .collect::<Vec<_>>();
        assert!(!fields.is_empty(), "step {number} has no rules");

        for field in fields {
            let mut payload = complete_payload(number);
            payload.remove(&field);
            assert!(
                !schema.is_step_complete(number, &payload),
                "step {number} without {field} should be incomplete"
            );

            let mut blanked = complete_payload(number);
            blanked.insert(field.clone(), json!(""));
            assert!(
                !schema.is_step_complete(number, &blanked),
                "step {number} with blank {field} should be incomplete"
            );
        }
    }
}

#[test]
fn list_fields_must_be_non_empty_arrays() {
    let schema = StepSchema::onboarding();
    let cases = [(2, "trasteros"), (3, "usuarios"), (5, "niveles")];
    for (raw, field) in cases {
        let number = step(raw);
        assert!(!schema.is_step_complete(number, &data(json!({ field: [] }))));
        assert!(!schema.is_step_complete(number, &data(json!({ field: "yes" }))));
        assert!(!schema.is_step_complete(number, &data(json!({ field: { "a": 1 } }))));
        assert!(schema.is_step_complete(number, &data(json!({ field: [1] }))));
    }
}

#[test]
fn documentation_step_is_always_complete() {
    let schema = StepSchema::onboarding();
    assert!(schema.is_step_complete(StepNumber::LAST, &StepData::new()));
    assert!(schema.is_step_complete(
        StepNumber::LAST,
        &data(json!({ "anything": null }))
    ));
}

#[test]
fn schema_exposes_titles_and_slots() {
    let schema = StepSchema::onboarding();
    assert_eq!(schema.step_names()[0], "Datos de la Empresa");
    assert_eq!(schema.step_names()[5], "Documentación");
    assert_eq!(
        schema.slots(),
        [
            "datos_empresa",
            "info_trasteros",
            "usuarios_app",
            "config_correo",
            "niveles_acceso",
            "documentacion",
        ]
    );
}

#[test]
fn percentage_truncates_instead_of_rounding() {
    let expected = [0u8, 16, 33, 50, 66, 83, 100];
    for (k, want) in expected.iter().enumerate() {
        assert_eq!(percentage_for(k), *want, "k={k}");
    }
    assert_eq!(percentage_for(9), 100);
}

#[test]
fn compute_percentage_counts_complete_steps() {
    let schema = StepSchema::onboarding();
    let empty = FormSteps::default();
    // Only the optional documentation step counts on an empty form.
    assert_eq!(completed_steps(&schema, &empty), 1);
    assert_eq!(compute_percentage(&schema, &empty), 16);

    let expected = [(1usize, 16u8), (2, 33), (3, 50), (4, 66), (5, 83), (6, 100)];
    for (k, want) in expected {
        let steps = steps_with_k_complete(k);
        assert_eq!(completed_steps(&schema, &steps), k, "k={k}");
        assert_eq!(compute_percentage(&schema, &steps), want, "k={k}");
    }
}

#[test]
fn apply_step_replaces_payload_and_never_rewinds() {
    let schema = StepSchema::onboarding();
    let mut record = FormRecord::empty(1, ClientId::new(7), 0);

    record.apply_step(&schema, step(3), data(json!({ "a": 1 })));
    assert_eq!(record.current_step, step(3));

    record.apply_step(&schema, step(1), data(json!({ "b": 2 })));
    assert_eq!(record.current_step, step(3));

    record.apply_step(&schema, step(1), data(json!({ "c": 3 })));
    assert_eq!(record.steps.get(step(1)), &data(json!({ "c": 3 })));

    record.apply_step(&schema, step(5), complete_payload(step(5)));
    assert_eq!(record.current_step, step(5));
    assert_eq!(record.completion_percentage, 33);
    assert!(!is_form_complete(&record));
}

#[test]
fn mark_completed_overrides_percentage() {
    let mut record = FormRecord::empty(1, ClientId::new(7), 0);
    record.mark_completed(42);
    assert!(record.is_complete());
    assert!(record.completed);
    assert_eq!(record.completed_at_ms, Some(42));
}

#[test]
fn slugify_follows_display_name() {
    assert_eq!(slugify("Acme Corp"), "acme-corp");
    assert_eq!(slugify("  Trasteros   del Norte, S.L.  "), "trasteros-del-norte-sl");
    assert_eq!(slugify("Café 24h"), "caf-24h");
    assert_eq!(slugify("a-b\tc"), "a-b-c");
    assert_eq!(
        Slug::from_display_name("Acme Corp").unwrap().as_str(),
        "acme-corp"
    );
    assert_eq!(Slug::from_display_name("¡¿?!").unwrap_err(), SlugError::Empty);
}

#[test]
fn slug_validation() {
    assert_eq!(Slug::try_new("").unwrap_err(), SlugError::Empty);
    assert_eq!(Slug::try_new("---").unwrap_err(), SlugError::Empty);
    assert_eq!(
        Slug::try_new("Acme").unwrap_err(),
        SlugError::InvalidChar { ch: 'A', index: 0 }
    );
    assert_eq!(
        Slug::try_new("x".repeat(129)).unwrap_err(),
        SlugError::TooLong
    );
    assert!(Slug::try_new("nueva-empresa-3").is_ok());
}

#[test]
fn display_name_from_slug_is_title_cased() {
    assert_eq!(Slug::try_new("acme-corp").unwrap().display_name(), "Acme Corp");
    assert_eq!(Slug::try_new("3m-iberia").unwrap().display_name(), "3M Iberia");
    assert_eq!(title_case("hELLO wORLD"), "Hello World");
}

#[test]
fn client_status_round_trips_through_storage_text() {
    for status in [ClientStatus::InProgress, ClientStatus::Completed] {
        assert_eq!(ClientStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(ClientStatus::parse("completado"), None);
    assert_eq!(ClientStatus::default(), ClientStatus::InProgress);
}

#[test]
fn upload_extension_allow_list() {
    assert!(is_allowed_file("contrato.PDF"));
    assert!(is_allowed_file("notas.txt"));
    assert!(is_allowed_file("plano.docx"));
    assert!(!is_allowed_file("script.sh"));
    assert!(!is_allowed_file("sin_extension"));
    assert!(!is_allowed_file("punto."));
}

#[test]
fn secure_filename_flattens_paths() {
    assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
    assert_eq!(secure_filename("My Contract (v2).pdf"), "My_Contract_v2.pdf");
    assert_eq!(secure_filename("C:\\docs\\plano.png"), "C_docs_plano.png");
    assert_eq!(secure_filename("..."), "");
}

#[test]
fn stored_filename_encodes_client_tag_and_time() {
    let name = stored_filename(
        ClientId::new(12),
        "general",
        "20250101_093000",
        "ab12cd34",
        "plano.png",
    );
    assert_eq!(name, "12_general_20250101_093000_ab12cd34_plano.png");

    let name = stored_filename(ClientId::new(1), "../x", "t", "d", "f.txt");
    assert_eq!(name, "1_x_t_d_f.txt");

    let name = stored_filename(ClientId::new(1), "", "t", "d", "f.txt");
    assert_eq!(name, "1_general_t_d_f.txt");
}
