#![forbid(unsafe_code)]

use crate::model::{FormRecord, FormSteps};
use crate::schema::{STEP_COUNT, StepSchema};

pub fn completed_steps(schema: &StepSchema, steps: &FormSteps) -> usize {
    steps
        .iter()
        .filter(|(step, data)| schema.is_step_complete(*step, data))
        .count()
}

/// Percentage of complete steps. Integer division truncates: 1 of 6 is 16,
/// not 17.
pub fn compute_percentage(schema: &StepSchema, steps: &FormSteps) -> u8 {
    percentage_for(completed_steps(schema, steps))
}

pub fn percentage_for(completed: usize) -> u8 {
    let completed = completed.min(STEP_COUNT);
    u8::try_from(completed * 100 / STEP_COUNT).unwrap_or(100)
}

pub fn is_form_complete(record: &FormRecord) -> bool {
    record.completion_percentage == 100
}
