//! Чтение прямоугольного окна листа Excel через calamine.

pub mod range;
pub mod reader;

pub use range::ColumnRange;
pub use reader::{CellValue, RawRow, RawSheet};

use thiserror::Error;

/// Ошибки открытия книги и разбора диапазона
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SheetError {
    #[error("Invalid column range '{0}', expected letters like \"B:R\"")]
    InvalidColumnRange(String),

    #[error("Cannot open workbook {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("Sheet '{sheet}' not found in {path} (available: {available})")]
    SheetNotFound {
        path: String,
        sheet: String,
        available: String,
    },
}
