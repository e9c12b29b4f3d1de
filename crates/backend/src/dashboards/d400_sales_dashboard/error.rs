use thiserror::Error;

use crate::shared::excel::SheetError;

/// Фатальные ошибки загрузки: дашборд не рендерится, пока файл не исправят
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LoadError {
    #[error("Required column '{column}' is missing from the loaded range")]
    MissingColumn { column: String },

    #[error("Source {path} is unavailable: {reason}")]
    SourceUnavailable { path: String, reason: String },

    #[error("Invalid column range '{0}', expected letters like \"B:R\"")]
    InvalidColumnRange(String),

    #[error("Loader task failed: {0}")]
    Internal(String),
}

impl LoadError {
    /// Stable code for the error body
    pub fn code(&self) -> &'static str {
        match self {
            LoadError::MissingColumn { .. } => "missing_column",
            LoadError::SourceUnavailable { .. } => "source_unavailable",
            LoadError::InvalidColumnRange(_) => "invalid_column_range",
            LoadError::Internal(_) => "internal",
        }
    }
}

impl From<SheetError> for LoadError {
    fn from(err: SheetError) -> Self {
        match err {
            SheetError::InvalidColumnRange(range) => LoadError::InvalidColumnRange(range),
            SheetError::Open { path, reason } => LoadError::SourceUnavailable { path, reason },
            SheetError::SheetNotFound { path, sheet, .. } => LoadError::SourceUnavailable {
                reason: format!("sheet '{}' not found", sheet),
                path,
            },
        }
    }
}

/// Ошибка отдельной строки: строка отбрасывается, загрузка продолжается
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RowError {
    #[error("Malformed timestamp '{value}': expected \"date time\"")]
    MalformedTimestamp { value: String },

    #[error("Column '{column}' is blank")]
    MissingValue { column: String },

    #[error("Column '{column}' has non-numeric value '{value}'")]
    InvalidNumber { column: String, value: String },
}
