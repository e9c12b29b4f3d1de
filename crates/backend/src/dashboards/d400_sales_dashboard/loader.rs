use calamine::{Data, Range};
use chrono::Utc;
use std::path::PathBuf;

use super::error::{LoadError, RowError};
use super::table::{
    LoadReport, LoadedTable, RejectedRow, SalesRow, SalesTable, DATE_COLUMN, HOUR_COLUMN,
    SOURCE_MEDIUM_COLUMN, TIME_COLUMN,
};
use crate::shared::config::{resolve_source_path, ColumnNames, SourceConfig};
use crate::shared::excel::reader::{extract_window, open_sheet};
use crate::shared::excel::{CellValue, ColumnRange, RawSheet};

/// Placeholder for blank category cells
const BLANK_CATEGORY: &str = "(blank)";

/// Параметры загрузки; они же ключ кэша
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadParams {
    pub path: PathBuf,
    pub sheet: String,
    pub skip_rows: u32,
    pub columns: ColumnRange,
    pub max_rows: u32,
    pub column_names: ColumnNames,
}

impl LoadParams {
    pub fn from_source(source: &SourceConfig) -> Result<Self, LoadError> {
        Ok(Self {
            path: resolve_source_path(source),
            sheet: source.sheet.clone(),
            skip_rows: source.skip_rows,
            columns: source.columns.parse::<ColumnRange>()?,
            max_rows: source.max_rows,
            column_names: source.column_names.clone(),
        })
    }
}

/// Читает лист с диска и строит таблицу продаж
pub fn load_sales_table(params: &LoadParams) -> Result<LoadedTable, LoadError> {
    tracing::info!(
        "D400 Loader: reading {} [{}] {} skip={} max_rows={}",
        params.path.display(),
        params.sheet,
        params.columns,
        params.skip_rows,
        params.max_rows
    );
    let range = open_sheet(&params.path, &params.sheet)?;
    load_from_range(&range, params)
}

pub fn load_from_range(range: &Range<Data>, params: &LoadParams) -> Result<LoadedTable, LoadError> {
    let raw = extract_window(range, params.skip_rows, params.columns, params.max_rows);
    if raw.truncated {
        tracing::debug!(
            "D400 Loader: sheet has rows past the {} row cap, ignoring them",
            params.max_rows
        );
    }
    build_table(raw, params)
}

/// Positions of the required columns inside the window
struct ColumnIndex {
    utm_source: usize,
    utm_medium: usize,
    timestamp: usize,
    quantity: usize,
    unit_price: usize,
    total: usize,
    product_line: usize,
    customer_type: usize,
    gender: usize,
}

impl ColumnIndex {
    /// Source/medium inputs are checked first, then the timestamp, then the rest
    fn resolve(raw: &RawSheet, names: &ColumnNames) -> Result<Self, LoadError> {
        let find = |name: &String| {
            raw.column_index(name).ok_or_else(|| LoadError::MissingColumn {
                column: name.clone(),
            })
        };
        Ok(Self {
            utm_source: find(&names.utm_source)?,
            utm_medium: find(&names.utm_medium)?,
            timestamp: find(&names.timestamp)?,
            quantity: find(&names.quantity)?,
            unit_price: find(&names.unit_price)?,
            total: find(&names.total)?,
            product_line: find(&names.product_line)?,
            customer_type: find(&names.customer_type)?,
            gender: find(&names.gender)?,
        })
    }
}

/// Производные колонки: source/medium, затем date/time из временной метки.
/// Битые строки отбрасываются с предупреждением.
pub fn build_table(raw: RawSheet, params: &LoadParams) -> Result<LoadedTable, LoadError> {
    let names = &params.column_names;
    let index = ColumnIndex::resolve(&raw, names)?;

    let mut columns: Vec<String> = raw
        .headers
        .iter()
        .filter(|h| **h != names.timestamp)
        .cloned()
        .collect();
    columns.extend(
        [SOURCE_MEDIUM_COLUMN, DATE_COLUMN, TIME_COLUMN, HOUR_COLUMN]
            .iter()
            .map(|c| c.to_string()),
    );

    let rows_read = raw.rows.len();
    let mut rows = Vec::with_capacity(rows_read);
    let mut rejected = Vec::new();

    for raw_row in &raw.rows {
        match parse_row(raw_row.sheet_row, &raw_row.cells, &index, names) {
            Ok(row) => rows.push(row),
            Err(error) => {
                tracing::warn!(
                    "D400 Loader: row {} rejected: {}",
                    raw_row.sheet_row,
                    error
                );
                rejected.push(RejectedRow {
                    sheet_row: raw_row.sheet_row,
                    error,
                });
            }
        }
    }

    tracing::info!(
        "D400 Loader: {} rows read, {} kept, {} rejected",
        rows_read,
        rows.len(),
        rejected.len()
    );

    Ok(LoadedTable {
        table: SalesTable { columns, rows },
        report: LoadReport {
            source_path: params.path.clone(),
            sheet: params.sheet.clone(),
            rows_read,
            rejected,
            truncated: raw.truncated,
            loaded_at: Utc::now(),
        },
    })
}

fn parse_row(
    sheet_row: u32,
    cells: &[CellValue],
    index: &ColumnIndex,
    names: &ColumnNames,
) -> Result<SalesRow, RowError> {
    let required_text = |i: usize, column: &String| {
        cells[i].as_text().ok_or_else(|| RowError::MissingValue {
            column: column.clone(),
        })
    };
    let category = |i: usize| {
        cells[i]
            .as_text()
            .unwrap_or_else(|| BLANK_CATEGORY.to_string())
    };

    let utm_source = required_text(index.utm_source, &names.utm_source)?;
    let utm_medium = required_text(index.utm_medium, &names.utm_medium)?;
    let source_medium = format!("{}/{}", utm_source, utm_medium);

    let timestamp = required_text(index.timestamp, &names.timestamp)?;
    let (date, time) = split_timestamp(&timestamp)?;
    let hour = hour_of(&time);

    Ok(SalesRow {
        sheet_row,
        unit_price: number(&cells[index.unit_price], &names.unit_price)?,
        quantity: number(&cells[index.quantity], &names.quantity)?,
        total: number(&cells[index.total], &names.total)?,
        product_line: category(index.product_line),
        customer_type: category(index.customer_type),
        gender: category(index.gender),
        utm_source,
        utm_medium,
        source_medium,
        date,
        time,
        hour,
    })
}

fn number(cell: &CellValue, column: &str) -> Result<f64, RowError> {
    if cell.is_empty() {
        return Err(RowError::MissingValue {
            column: column.to_string(),
        });
    }
    cell.as_number().ok_or_else(|| RowError::InvalidNumber {
        column: column.to_string(),
        value: cell.to_string(),
    })
}

/// "2022-01-01 10:15:00" → ("2022-01-01", "10:15:00"); splits on the first space
pub fn split_timestamp(value: &str) -> Result<(String, String), RowError> {
    value
        .trim()
        .split_once(' ')
        .map(|(date, time)| (date.to_string(), time.to_string()))
        .ok_or_else(|| RowError::MalformedTimestamp {
            value: value.to_string(),
        })
}

/// Two-digit hour from "H:MM[:SS]"; anything unparsable is kept as-is
fn hour_of(time: &str) -> String {
    let prefix = time.split(':').next().unwrap_or(time).trim();
    match prefix.parse::<u32>() {
        Ok(hour) => format!("{:02}", hour),
        Err(_) => prefix.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d400_sales_dashboard::aggregate::compute_kpis;
    use crate::shared::config::default_config;
    use crate::shared::excel::RawRow;

    fn params() -> LoadParams {
        let mut source = default_config().unwrap().source;
        source.path = "/data/SALES_2022.xlsx".to_string();
        LoadParams::from_source(&source).unwrap()
    }

    fn headers() -> Vec<String> {
        let names = params().column_names;
        vec![
            "№".to_string(),
            names.timestamp,
            names.utm_source,
            names.utm_medium,
            names.quantity,
            names.unit_price,
            names.total,
            names.product_line,
            names.customer_type,
            names.gender,
        ]
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn sale(
        sheet_row: u32,
        timestamp: CellValue,
        source: &str,
        qty: f64,
        price: f64,
        total: f64,
        line: &str,
    ) -> RawRow {
        RawRow {
            sheet_row,
            cells: vec![
                CellValue::Number(sheet_row as f64),
                timestamp,
                text(source),
                text("cpc"),
                CellValue::Number(qty),
                CellValue::Number(price),
                CellValue::Number(total),
                text(line),
                text("Member"),
                text("Male"),
            ],
        }
    }

    fn raw(rows: Vec<RawRow>) -> RawSheet {
        RawSheet {
            headers: headers(),
            rows,
            truncated: false,
        }
    }

    #[test]
    fn test_derived_columns() {
        let loaded = build_table(
            raw(vec![sale(
                5,
                text("2022-01-01 09:30:00"),
                "yandex",
                2.0,
                10.0,
                20.0,
                "A",
            )]),
            &params(),
        )
        .unwrap();

        let row = &loaded.table.rows[0];
        assert_eq!(row.source_medium, "yandex/cpc");
        assert_eq!(row.source_medium, format!("{}/{}", row.utm_source, row.utm_medium));
        assert_eq!(row.date, "2022-01-01");
        assert_eq!(row.time, "09:30:00");
        assert_eq!(row.hour, "09");
        assert_eq!(row.quantity, 2.0);
        assert_eq!(loaded.report.rows_read, 1);
        assert!(loaded.report.rejected.is_empty());
    }

    #[test]
    fn test_timestamp_column_is_dropped_and_derived_appended() {
        let loaded = build_table(raw(vec![]), &params()).unwrap();
        let columns = &loaded.table.columns;
        assert!(!columns.contains(&params().column_names.timestamp));
        assert_eq!(
            &columns[columns.len() - 4..],
            &["source/medium", "date", "time", "hour"]
        );
    }

    #[test]
    fn test_native_datetime_cells_split() {
        let dt = chrono::NaiveDate::from_ymd_opt(2022, 3, 4)
            .unwrap()
            .and_hms_opt(7, 5, 0)
            .unwrap();
        let loaded = build_table(
            raw(vec![sale(5, CellValue::DateTime(dt), "vk", 1.0, 1.0, 1.0, "A")]),
            &params(),
        )
        .unwrap();
        assert_eq!(loaded.table.rows[0].date, "2022-03-04");
        assert_eq!(loaded.table.rows[0].time, "07:05:00");
    }

    #[test]
    fn test_malformed_timestamp_rejects_only_that_row() {
        let loaded = build_table(
            raw(vec![
                sale(5, text("2022-01-01"), "yandex", 1.0, 1.0, 1.0, "A"),
                sale(6, text("2022-01-02 11:00"), "google", 3.0, 5.0, 15.0, "B"),
            ]),
            &params(),
        )
        .unwrap();

        assert_eq!(loaded.table.len(), 1);
        assert_eq!(loaded.table.rows[0].product_line, "B");
        assert_eq!(
            loaded.report.rejected,
            vec![RejectedRow {
                sheet_row: 5,
                error: RowError::MalformedTimestamp {
                    value: "2022-01-01".to_string()
                },
            }]
        );
    }

    #[test]
    fn test_blank_utm_value_rejects_row() {
        let mut row = sale(5, text("2022-01-01 10:00"), "yandex", 1.0, 1.0, 1.0, "A");
        row.cells[3] = CellValue::Empty;
        let loaded = build_table(raw(vec![row]), &params()).unwrap();

        assert!(loaded.table.is_empty());
        assert_eq!(
            loaded.report.rejected[0].error,
            RowError::MissingValue {
                column: "utm_medium".to_string()
            }
        );
    }

    #[test]
    fn test_fractional_quantity_is_kept() {
        let mut fractional = sale(5, text("2022-01-01 10:00"), "a", 1.5, 1.0, 10.0, "A");
        fractional.cells[5] = text("12,5");
        let whole = sale(6, text("2022-01-01 11:00"), "b", 2.0, 4.0, 8.0, "B");
        let loaded = build_table(raw(vec![fractional, whole]), &params()).unwrap();

        assert!(loaded.report.rejected.is_empty());
        assert_eq!(loaded.table.rows[0].quantity, 1.5);
        assert_eq!(loaded.table.rows[0].unit_price, 12.5);

        let rows: Vec<&SalesRow> = loaded.table.rows.iter().collect();
        let kpis = compute_kpis(&rows);
        assert_eq!(kpis.total_sales, 3);
        assert_eq!(kpis.average_sale_per_transaction, Some(9.0));
    }

    #[test]
    fn test_invalid_numbers_reject_row() {
        let mut garbage = sale(6, text("2022-01-01 10:00"), "a", 1.0, 1.0, 1.0, "A");
        garbage.cells[6] = text("n/a");
        let mut blank_quantity = sale(7, text("2022-01-01 10:00"), "a", 1.0, 1.0, 1.0, "A");
        blank_quantity.cells[4] = CellValue::Empty;
        let loaded = build_table(raw(vec![garbage, blank_quantity]), &params()).unwrap();

        assert!(loaded.table.is_empty());
        assert!(matches!(
            loaded.report.rejected[0].error,
            RowError::InvalidNumber { ref value, .. } if value == "n/a"
        ));
        assert!(matches!(
            loaded.report.rejected[1].error,
            RowError::MissingValue { ref column } if column == "Количество единиц услуги"
        ));
    }

    #[test]
    fn test_missing_column_fails_load() {
        let names = params().column_names;
        for missing in [names.utm_source, names.utm_medium, names.timestamp] {
            let mut sheet = raw(vec![]);
            sheet.headers.retain(|h| *h != missing);
            let err = build_table(sheet, &params()).unwrap_err();
            assert_eq!(err, LoadError::MissingColumn { column: missing });
        }
    }

    #[test]
    fn test_load_from_range_is_deterministic() {
        let p = params();
        let mut range: Range<Data> = Range::new((0, 0), (0, 0));
        // header at row index 3, columns B..
        for (i, name) in headers().iter().enumerate() {
            range.set_value((3, 1 + i as u32), Data::String(name.clone()));
        }
        let values = [
            Data::Int(1),
            Data::String("2022-01-01 10:00:00".into()),
            Data::String("yandex".into()),
            Data::String("cpc".into()),
            Data::Int(2),
            Data::Float(10.0),
            Data::Float(20.0),
            Data::String("A".into()),
            Data::String("Normal".into()),
            Data::String("Female".into()),
        ];
        for (i, value) in values.iter().enumerate() {
            range.set_value((4, 1 + i as u32), value.clone());
        }

        let first = load_from_range(&range, &p).unwrap();
        let second = load_from_range(&range, &p).unwrap();
        assert_eq!(first.table, second.table);
        assert_eq!(first.table.len(), 1);
        assert_eq!(first.table.rows[0].sheet_row, 5);
        assert_eq!(first.table.rows[0].customer_type, "Normal");
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let mut p = params();
        p.path = PathBuf::from("/definitely/not/here/SALES_2022.xlsx");
        let err = load_sales_table(&p).unwrap_err();
        assert_eq!(err.code(), "source_unavailable");
    }

    #[test]
    fn test_hour_of() {
        assert_eq!(hour_of("9:05"), "09");
        assert_eq!(hour_of("23:59:59"), "23");
        assert_eq!(hour_of("утро"), "утро");
    }
}
