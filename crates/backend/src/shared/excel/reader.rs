use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use super::{ColumnRange, SheetError};

/// Значение ячейки, приведённое к небольшому набору типов
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn from_data(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) if s.trim().is_empty() => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(value) => CellValue::DateTime(value),
                None => CellValue::Number(dt.as_f64()),
            },
            Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .map(CellValue::DateTime)
                .unwrap_or_else(|_| CellValue::Text(s.clone())),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Text(e.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Text rendering used for category columns; `None` for blank cells
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(s.trim().to_string()),
            other => Some(other.to_string()),
        }
    }

    /// Numeric value; text is accepted with `,` or `.` as decimal separator
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => {
                let cleaned: String = s
                    .trim()
                    .chars()
                    .filter(|c| !c.is_whitespace() && *c != '\u{00a0}')
                    .map(|c| if c == ',' { '.' } else { c })
                    .collect();
                cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
            }
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based row number as shown in Excel
    pub sheet_row: u32,
    pub cells: Vec<CellValue>,
}

/// Окно листа: строка заголовков и строки данных
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    /// Non-empty rows existed below the row cap
    pub truncated: bool,
}

impl RawSheet {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Открывает книгу и возвращает используемый диапазон листа
pub fn open_sheet(path: &Path, sheet: &str) -> Result<Range<Data>, SheetError> {
    let path_display = path.display().to_string();
    let mut workbook = open_workbook_auto(path).map_err(|e| SheetError::Open {
        path: path_display.clone(),
        reason: e.to_string(),
    })?;

    let names = workbook.sheet_names();
    if !names.iter().any(|n| n == sheet) {
        return Err(SheetError::SheetNotFound {
            path: path_display,
            sheet: sheet.to_string(),
            available: names.join(", "),
        });
    }

    workbook
        .worksheet_range(sheet)
        .map_err(|e| SheetError::Open {
            path: path_display,
            reason: e.to_string(),
        })
}

/// Вырезает окно из диапазона листа.
///
/// Позиции абсолютные: заголовок это строка `skip_rows` (0-based), далее не
/// более `max_rows` строк данных. Полностью пустые строки пропускаются.
pub fn extract_window(
    range: &Range<Data>,
    skip_rows: u32,
    columns: ColumnRange,
    max_rows: u32,
) -> RawSheet {
    let cell = |row: u32, col: u32| {
        range
            .get_value((row, col))
            .map(CellValue::from_data)
            .unwrap_or(CellValue::Empty)
    };

    let headers = build_headers(columns.columns().map(|col| cell(skip_rows, col)).collect());

    let Some((last_row, _)) = range.end() else {
        return RawSheet {
            headers,
            rows: Vec::new(),
            truncated: false,
        };
    };

    let first_data_row = skip_rows + 1;
    let window_end = first_data_row.saturating_add(max_rows);
    let mut rows = Vec::new();

    for row in first_data_row..window_end.min(last_row.saturating_add(1)) {
        let cells: Vec<CellValue> = columns.columns().map(|col| cell(row, col)).collect();
        if cells.iter().all(CellValue::is_empty) {
            continue;
        }
        rows.push(RawRow {
            sheet_row: row + 1,
            cells,
        });
    }

    let truncated = (window_end..=last_row)
        .any(|row| columns.columns().any(|col| !cell(row, col).is_empty()));

    RawSheet {
        headers,
        rows,
        truncated,
    }
}

/// Blank headers become `Unnamed: N`, duplicates get `.1`, `.2` suffixes
fn build_headers(cells: Vec<CellValue>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    cells
        .into_iter()
        .enumerate()
        .map(|(i, cell)| {
            let base = cell.as_text().unwrap_or_else(|| format!("Unnamed: {}", i));
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet_with(cells: &[((u32, u32), Data)]) -> Range<Data> {
        let mut range = Range::new((0, 0), (0, 0));
        for (pos, value) in cells {
            range.set_value(*pos, value.clone());
        }
        range
    }

    #[test]
    fn test_cell_value_conversions() {
        assert_eq!(CellValue::from_data(&Data::String("  ".into())), CellValue::Empty);
        assert_eq!(CellValue::from_data(&Data::Int(3)), CellValue::Number(3.0));
        assert_eq!(CellValue::Number(3.0).to_string(), "3");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Text("1 234,5".into()).as_number(), Some(1234.5));
        assert_eq!(CellValue::Text("abc".into()).as_number(), None);
        assert_eq!(CellValue::Empty.as_text(), None);
        assert_eq!(
            CellValue::from_data(&Data::DateTimeIso("2022-01-01T10:15:00".into())).to_string(),
            "2022-01-01 10:15:00"
        );
    }

    #[test]
    fn test_extract_window_uses_absolute_positions() {
        let range = sheet_with(&[
            ((0, 0), Data::String("title".into())),
            ((3, 1), Data::String("a".into())),
            ((3, 2), Data::String("b".into())),
            ((4, 1), Data::Int(1)),
            ((4, 2), Data::Int(2)),
            ((5, 0), Data::String("outside".into())),
            ((6, 1), Data::Int(3)),
        ]);
        let columns: ColumnRange = "B:C".parse().unwrap();
        let raw = extract_window(&range, 3, columns, 10);

        assert_eq!(raw.headers, vec!["a", "b"]);
        // row 5 has data only outside the column window
        assert_eq!(raw.rows.len(), 2);
        assert_eq!(raw.rows[0].sheet_row, 5);
        assert_eq!(raw.rows[1].sheet_row, 7);
        assert_eq!(raw.rows[1].cells[0], CellValue::Number(3.0));
        assert_eq!(raw.rows[1].cells[1], CellValue::Empty);
        assert!(!raw.truncated);
    }

    #[test]
    fn test_extract_window_truncates_at_row_cap() {
        let mut cells = vec![((0, 0), Data::String("n".into()))];
        for row in 1..=5u32 {
            cells.push(((row, 0), Data::Int(row as i64)));
        }
        let range = sheet_with(&cells);
        let raw = extract_window(&range, 0, "A".parse().unwrap(), 3);

        assert_eq!(raw.rows.len(), 3);
        assert_eq!(raw.rows.last().unwrap().cells[0], CellValue::Number(3.0));
        assert!(raw.truncated);
    }

    #[test]
    fn test_headers_blank_and_duplicate() {
        let headers = build_headers(vec![
            CellValue::Text("Total".into()),
            CellValue::Empty,
            CellValue::Text("Total".into()),
        ]);
        assert_eq!(headers, vec!["Total", "Unnamed: 1", "Total.1"]);
    }

    #[test]
    fn test_open_sheet_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_sheet(&dir.path().join("nope.xlsx"), "Sheet1").unwrap_err();
        assert!(matches!(err, SheetError::Open { .. }));
    }
}
