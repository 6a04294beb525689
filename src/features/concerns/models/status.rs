use thiserror::Error;

/// Built-in workflow used when nothing is configured
pub const DEFAULT_STATUSES: [&str; 4] = ["New", "In Review", "Duplicate", "Closed"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusError {
    #[error("at least one status is required")]
    Empty,

    #[error("status names cannot be blank")]
    Blank,

    #[error("status '{0}' is listed more than once")]
    Duplicate(String),

    #[error("'{value}' is not one of the available choices ({choices})")]
    Unknown { value: String, choices: String },
}

/// The ordered set of statuses a concern may be in. The first entry is the
/// status every new concern starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcernStatuses {
    values: Vec<String>,
}

/// A status that has been checked against a [`ConcernStatuses`] set.
///
/// Only obtainable through [`ConcernStatuses::parse`] or
/// [`ConcernStatuses::default_status`], so writes can never carry an
/// unconfigured value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcernStatus(String);

impl ConcernStatuses {
    pub fn new<I, S>(values: I) -> Result<Self, StatusError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut checked: Vec<String> = Vec::new();
        for value in values {
            let value = value.into();
            if value.trim().is_empty() {
                return Err(StatusError::Blank);
            }
            if checked.contains(&value) {
                return Err(StatusError::Duplicate(value));
            }
            checked.push(value);
        }

        if checked.is_empty() {
            return Err(StatusError::Empty);
        }

        Ok(Self { values: checked })
    }

    pub fn default_status(&self) -> ConcernStatus {
        ConcernStatus(self.values[0].clone())
    }

    /// Exact, case-sensitive membership check
    pub fn parse(&self, value: &str) -> Result<ConcernStatus, StatusError> {
        if self.values.iter().any(|v| v == value) {
            Ok(ConcernStatus(value.to_string()))
        } else {
            Err(StatusError::Unknown {
                value: value.to_string(),
                choices: self.values.join(", "),
            })
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = ConcernStatus> + '_ {
        self.values.iter().cloned().map(ConcernStatus)
    }
}

impl Default for ConcernStatuses {
    fn default() -> Self {
        Self {
            values: DEFAULT_STATUSES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ConcernStatus {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConcernStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
