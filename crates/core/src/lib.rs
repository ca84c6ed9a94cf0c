#![forbid(unsafe_code)]

pub mod model;
pub mod progress;
pub mod schema;
pub mod text;
pub mod uploads;

pub use model::{Attachment, Client, ClientStatus, ClientSummary, FormRecord, FormSteps};
pub use schema::{STEP_COUNT, StepData, StepNumber, StepNumberError, StepRule, StepSchema};
pub use text::{Slug, SlugError};

pub mod ids {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct ClientId(i64);

    impl ClientId {
        pub const fn new(raw: i64) -> Self {
            Self(raw)
        }

        pub fn get(self) -> i64 {
            self.0
        }
    }

    impl std::fmt::Display for ClientId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0)
        }
    }
}

pub mod clock {
    /// Wall clock in unix milliseconds, clamped to the `i64` range.
    pub fn now_ms() -> i64 {
        use std::time::{SystemTime, UNIX_EPOCH};

        let now = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(duration) => duration,
            Err(_) => return 0,
        };

        i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
mod tests;
