#![forbid(unsafe_code)]

//! Static description of the six onboarding steps and the completeness rule
//! applied to each step's payload.

use serde_json::Value;

pub const STEP_COUNT: usize = 6;

/// Payload of one step: a schema-free JSON object.
pub type StepData = serde_json::Map<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StepNumber(u8);

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StepNumberError {
    #[error("step must be between 1 and {STEP_COUNT} (got {0})")]
    OutOfRange(i64),
}

impl StepNumber {
    pub const FIRST: Self = Self(1);
    pub const LAST: Self = Self(STEP_COUNT as u8);

    pub fn try_new(raw: i64) -> Result<Self, StepNumberError> {
        match u8::try_from(raw) {
            Ok(value) if (1..=Self::LAST.0).contains(&value) => Ok(Self(value)),
            _ => Err(StepNumberError::OutOfRange(raw)),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based position, always below `STEP_COUNT`.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (Self::FIRST.0..=Self::LAST.0).map(Self)
    }
}

impl std::fmt::Display for StepNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepRule {
    pub title: String,
    /// Key under which this step's payload appears in form snapshots.
    pub slot: String,
    pub required_fields: Vec<String>,
    /// Field that must hold a non-empty array for the step to count.
    pub list_field: Option<String>,
    /// Optional steps always count as complete.
    pub optional: bool,
}

impl StepRule {
    fn new(title: &str, slot: &str, required_fields: &[&str], list_field: Option<&str>) -> Self {
        Self {
            title: title.to_string(),
            slot: slot.to_string(),
            required_fields: required_fields.iter().map(|f| f.to_string()).collect(),
            list_field: list_field.map(str::to_string),
            optional: false,
        }
    }

    fn optional(title: &str, slot: &str) -> Self {
        Self {
            optional: true,
            ..Self::new(title, slot, &[], None)
        }
    }

    pub fn is_complete(&self, data: &StepData) -> bool {
        if self.optional {
            return true;
        }

        let scalars_present = self
            .required_fields
            .iter()
            .all(|field| data.get(field).is_some_and(is_truthy));
        if !scalars_present {
            return false;
        }

        match self.list_field.as_deref() {
            Some(field) => data
                .get(field)
                .and_then(Value::as_array)
                .is_some_and(|items| !items.is_empty()),
            None => true,
        }
    }
}

/// Immutable step table. Built once at startup and handed to whoever needs it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepSchema {
    steps: [StepRule; STEP_COUNT],
}

impl StepSchema {
    pub fn new(steps: [StepRule; STEP_COUNT]) -> Self {
        Self { steps }
    }

    /// The rule set used by the client onboarding form.
    pub fn onboarding() -> Self {
        Self::new([
            StepRule::new(
                "Datos de la Empresa",
                "datos_empresa",
                &[
                    "nombre",
                    "nif",
                    "direccion",
                    "codigo_postal",
                    "provincia",
                    "telefono",
                    "email",
                ],
                None,
            ),
            StepRule::new(
                "Información de Trasteros",
                "info_trasteros",
                &[],
                Some("trasteros"),
            ),
            StepRule::new(
                "Usuarios de la Aplicación",
                "usuarios_app",
                &[],
                Some("usuarios"),
            ),
            StepRule::new(
                "Configuración de Correo",
                "config_correo",
                &[
                    "servidor_saliente",
                    "direccion_servidor",
                    "usuario_email",
                    "puerto",
                ],
                None,
            ),
            StepRule::new("Niveles de Acceso", "niveles_acceso", &[], Some("niveles")),
            StepRule::optional("Documentación", "documentacion"),
        ])
    }

    pub fn rule(&self, step: StepNumber) -> &StepRule {
        &self.steps[step.index()]
    }

    pub fn rules(&self) -> impl Iterator<Item = (StepNumber, &StepRule)> {
        StepNumber::all().zip(self.steps.iter())
    }

    pub fn is_step_complete(&self, step: StepNumber, data: &StepData) -> bool {
        self.rule(step).is_complete(data)
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|rule| rule.title.as_str()).collect()
    }

    pub fn slots(&self) -> [&str; STEP_COUNT] {
        self.steps.each_ref().map(|rule| rule.slot.as_str())
    }
}

impl Default for StepSchema {
    fn default() -> Self {
        Self::onboarding()
    }
}

/// Loose truthiness: null, `false`, zero and empty strings/arrays/objects are
/// all treated as "not filled in".
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|v| v != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}
