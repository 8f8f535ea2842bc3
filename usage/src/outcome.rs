use serde::Serialize;

/// Result of a best-effort operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Every step succeeded.
    Completed(T),
    /// At least one step failed; `value` holds whatever could be gathered.
    Degraded { value: T, issues: Vec<String> },
    /// Nothing to do: no store configured or no identity supplied.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Completed,
    Degraded,
    Skipped,
}

impl<T> Outcome<T> {
    /// `Completed` when `issues` is empty, `Degraded` otherwise.
    pub fn from_parts(value: T, issues: Vec<String>) -> Self {
        if issues.is_empty() {
            Outcome::Completed(value)
        } else {
            Outcome::Degraded { value, issues }
        }
    }

    pub fn status(&self) -> OutcomeStatus {
        match self {
            Outcome::Completed(_) => OutcomeStatus::Completed,
            Outcome::Degraded { .. } => OutcomeStatus::Degraded,
            Outcome::Skipped => OutcomeStatus::Skipped,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Completed(value) | Outcome::Degraded { value, .. } => Some(value),
            Outcome::Skipped => None,
        }
    }

    pub fn issues(&self) -> &[String] {
        match self {
            Outcome::Degraded { issues, .. } => issues,
            _ => &[],
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped)
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Completed(value) | Outcome::Degraded { value, .. } => Some(value),
            Outcome::Skipped => None,
        }
    }

    pub fn value_or_default(self) -> T
    where
        T: Default,
    {
        self.into_value().unwrap_or_default()
    }
}
