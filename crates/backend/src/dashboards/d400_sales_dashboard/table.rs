use chrono::{DateTime, Utc};
use contracts::dashboards::d400_sales_dashboard::{
    FilterOptions, LoadReportDto, PeriodGrouping, RejectedRowDto,
};
use std::collections::HashSet;
use std::path::PathBuf;

use super::error::RowError;

/// Derived column names appended after load
pub const SOURCE_MEDIUM_COLUMN: &str = "source/medium";
pub const DATE_COLUMN: &str = "date";
pub const TIME_COLUMN: &str = "time";
pub const HOUR_COLUMN: &str = "hour";

/// Одна продажа из листа, с производными колонками
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRow {
    /// 1-based row in the spreadsheet
    pub sheet_row: u32,
    pub unit_price: f64,
    /// Kept as read; only the KPI sum is truncated
    pub quantity: f64,
    pub total: f64,
    pub product_line: String,
    pub customer_type: String,
    pub gender: String,
    pub utm_source: String,
    pub utm_medium: String,
    /// `utm_source + "/" + utm_medium`
    pub source_medium: String,
    pub date: String,
    pub time: String,
    /// Two-digit hour taken from `time`
    pub hour: String,
}

impl SalesRow {
    pub fn period_key(&self, grouping: PeriodGrouping) -> &str {
        match grouping {
            PeriodGrouping::Day => &self.date,
            PeriodGrouping::Hour => &self.hour,
        }
    }
}

/// Таблица продаж после загрузки. Не меняется после создания.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesTable {
    /// Columns visible downstream: sheet headers without the raw timestamp,
    /// then the derived columns
    pub columns: Vec<String>,
    pub rows: Vec<SalesRow>,
}

impl SalesTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct values per filter dimension, in first-seen order
    pub fn filter_options(&self) -> FilterOptions {
        fn distinct<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
            let mut seen = HashSet::new();
            let mut result = Vec::new();
            for value in values {
                if seen.insert(value.as_str()) {
                    result.push(value.clone());
                }
            }
            result
        }

        FilterOptions {
            dates: distinct(self.rows.iter().map(|r| &r.date)),
            source_mediums: distinct(self.rows.iter().map(|r| &r.source_medium)),
            traffic_sources: distinct(self.rows.iter().map(|r| &r.utm_source)),
            product_lines: distinct(self.rows.iter().map(|r| &r.product_line)),
            customer_types: distinct(self.rows.iter().map(|r| &r.customer_type)),
            genders: distinct(self.rows.iter().map(|r| &r.gender)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    pub sheet_row: u32,
    pub error: RowError,
}

/// Итоги одной загрузки
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub source_path: PathBuf,
    pub sheet: String,
    pub rows_read: usize,
    pub rejected: Vec<RejectedRow>,
    pub truncated: bool,
    pub loaded_at: DateTime<Utc>,
}

/// Table plus the report of the load that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable {
    pub table: SalesTable,
    pub report: LoadReport,
}

impl LoadedTable {
    pub fn report_dto(&self) -> LoadReportDto {
        LoadReportDto {
            source_path: self.report.source_path.display().to_string(),
            sheet: self.report.sheet.clone(),
            columns: self.table.columns.clone(),
            rows_read: self.report.rows_read,
            rows_kept: self.table.len(),
            rejected: self
                .report
                .rejected
                .iter()
                .map(|r| RejectedRowDto {
                    sheet_row: r.sheet_row,
                    reason: r.error.to_string(),
                })
                .collect(),
            truncated: self.report.truncated,
            loaded_at: self.report.loaded_at,
        }
    }
}
