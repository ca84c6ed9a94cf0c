#![forbid(unsafe_code)]

use crate::ids::ClientId;
use crate::progress;
use crate::schema::{STEP_COUNT, StepData, StepNumber, StepSchema};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ClientStatus {
    #[default]
    InProgress,
    Completed,
}

impl ClientStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Client {
    pub id: ClientId,
    pub display_name: String,
    pub slug: String,
    pub active: bool,
    pub status: ClientStatus,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

/// The six step payloads of a form, indexed by step number.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormSteps([StepData; STEP_COUNT]);

impl FormSteps {
    pub fn from_slots(slots: [StepData; STEP_COUNT]) -> Self {
        Self(slots)
    }

    pub fn get(&self, step: StepNumber) -> &StepData {
        &self.0[step.index()]
    }

    /// Swaps in `data` for the whole step and returns what was there before.
    pub fn replace(&mut self, step: StepNumber, data: StepData) -> StepData {
        std::mem::replace(&mut self.0[step.index()], data)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StepNumber, &StepData)> {
        StepNumber::all().zip(self.0.iter())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FormRecord {
    pub id: i64,
    pub client_id: ClientId,
    pub steps: FormSteps,
    pub current_step: StepNumber,
    /// Derived from `steps`; only the completion override writes it directly.
    pub completion_percentage: u8,
    pub completed: bool,
    pub completed_at_ms: Option<i64>,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

impl FormRecord {
    pub fn empty(id: i64, client_id: ClientId, now_ms: i64) -> Self {
        Self {
            id,
            client_id,
            steps: FormSteps::default(),
            current_step: StepNumber::FIRST,
            completion_percentage: 0,
            completed: false,
            completed_at_ms: None,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        }
    }

    /// Overwrites one step, moves the step pointer forward if needed and
    /// recomputes the completion percentage.
    pub fn apply_step(&mut self, schema: &StepSchema, step: StepNumber, data: StepData) {
        self.steps.replace(step, data);
        if step > self.current_step {
            self.current_step = step;
        }
        self.completion_percentage = progress::compute_percentage(schema, &self.steps);
    }

    pub fn mark_completed(&mut self, now_ms: i64) {
        self.completion_percentage = 100;
        self.completed = true;
        self.completed_at_ms = Some(now_ms);
        self.updated_at_ms = now_ms;
    }

    pub fn is_complete(&self) -> bool {
        progress::is_form_complete(self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub id: i64,
    pub client_id: ClientId,
    pub original_filename: String,
    pub stored_filename: String,
    pub attachment_type: String,
    pub storage_path: String,
    pub size_bytes: u64,
    pub step: Option<StepNumber>,
    pub uploaded_at_ms: i64,
}

/// A client together with the progress of its form (defaults when no form
/// has been created yet).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientSummary {
    pub client: Client,
    pub current_step: StepNumber,
    pub completion_percentage: u8,
    pub form_completed: bool,
    pub last_updated_ms: i64,
}
