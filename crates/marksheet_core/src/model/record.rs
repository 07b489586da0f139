//! Customer marks record model and form validation.
//!
//! # Responsibility
//! - Define the persisted `Record` shape and the `NewRecord` write input.
//! - Validate raw form input before any store interaction.
//!
//! # Invariants
//! - `NewRecord::name` is trimmed and never empty.
//! - `id` and `created_at` are assigned by the store, never by callers.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-generated primary key.
pub type RecordId = i64;

/// One persisted name/marks entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: RecordId,
    /// Insert time in epoch milliseconds.
    pub created_at: i64,
    pub name: String,
    pub marks: i64,
}

/// Raw write-form fields as submitted by the client; absent fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordForm {
    pub name: String,
    pub marks: String,
}

/// Validation error for write-form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `name` is empty after trimming.
    NameRequired,
    /// `marks` does not parse as an integer.
    MarksNotInteger { value: String },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameRequired => write!(f, "Name is required."),
            Self::MarksNotInteger { .. } => write!(f, "Marks must be an integer."),
        }
    }
}

impl Error for ValidationError {}

impl ValidationError {
    /// Stable code for logs; never carries user input.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NameRequired => "name_required",
            Self::MarksNotInteger { .. } => "marks_not_integer",
        }
    }
}

/// Validated write input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    name: String,
    marks: i64,
}

impl NewRecord {
    /// Builds a validated record from typed values.
    ///
    /// # Errors
    /// - `ValidationError::NameRequired` when `name` is blank.
    pub fn new(name: &str, marks: i64) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::NameRequired);
        }
        Ok(Self {
            name: name.to_string(),
            marks,
        })
    }

    /// Validates raw form fields.
    ///
    /// Name is checked first, so a form with both fields invalid reports the
    /// missing name.
    pub fn from_form(form: &RecordForm) -> Result<Self, ValidationError> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(ValidationError::NameRequired);
        }
        let marks_raw = form.marks.trim();
        let marks = marks_raw
            .parse::<i64>()
            .map_err(|_| ValidationError::MarksNotInteger {
                value: marks_raw.to_string(),
            })?;
        Self::new(name, marks)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn marks(&self) -> i64 {
        self.marks
    }
}
