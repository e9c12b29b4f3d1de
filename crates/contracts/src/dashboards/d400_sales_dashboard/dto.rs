use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::indicators::KpiPanel;

/// Выбранные значения фильтров боковой панели.
///
/// `None` в измерении означает "выбраны все значения" (фильтр не применяется),
/// `Some(vec![])` означает "не выбрано ничего", результат пустой.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// Derived `date` column
    pub dates: Option<Vec<String>>,
    /// Derived `source/medium` column
    pub source_mediums: Option<Vec<String>>,
    /// `utm_source` column
    pub traffic_sources: Option<Vec<String>>,
    pub product_lines: Option<Vec<String>>,
    pub customer_types: Option<Vec<String>>,
    pub genders: Option<Vec<String>>,
}

impl FilterCriteria {
    /// Criteria that retain every row
    pub fn all() -> Self {
        Self::default()
    }

    /// Number of dimensions that actually narrow the table
    pub fn active_dimensions(&self) -> usize {
        [
            &self.dates,
            &self.source_mediums,
            &self.traffic_sources,
            &self.product_lines,
            &self.customer_types,
            &self.genders,
        ]
        .iter()
        .filter(|d| d.is_some())
        .count()
    }

    /// Turns a selection equal to the full option list back into `None`,
    /// so the request body stays small when nothing is deselected.
    pub fn normalized(mut self, options: &FilterOptions) -> Self {
        fn collapse(selected: &mut Option<Vec<String>>, all: &[String]) {
            if let Some(values) = selected {
                if values.len() == all.len() && all.iter().all(|v| values.contains(v)) {
                    *selected = None;
                }
            }
        }
        collapse(&mut self.dates, &options.dates);
        collapse(&mut self.source_mediums, &options.source_mediums);
        collapse(&mut self.traffic_sources, &options.traffic_sources);
        collapse(&mut self.product_lines, &options.product_lines);
        collapse(&mut self.customer_types, &options.customer_types);
        collapse(&mut self.genders, &options.genders);
        self
    }
}

/// Группировка графика продаж по периоду
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodGrouping {
    /// Group by the derived `date` column
    #[default]
    Day,
    /// Group by the hour prefix of the derived `time` column
    Hour,
}

impl PeriodGrouping {
    pub fn chart_title(&self) -> &'static str {
        match self {
            PeriodGrouping::Day => "Sales by day",
            PeriodGrouping::Hour => "Sales by hour",
        }
    }
}

/// POST /api/d400/sales_dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesDashboardRequest {
    #[serde(default)]
    pub filter: FilterCriteria,
    /// Falls back to the configured grouping when absent
    #[serde(default)]
    pub period_grouping: Option<PeriodGrouping>,
}

/// Scalar KPIs over the filtered rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesKpis {
    /// Sum of quantity, truncated
    pub total_sales: i64,
    /// Mean unit price, 1 decimal; `None` for an empty selection
    pub average_rating: Option<f64>,
    /// Mean total, 2 decimals; `None` for an empty selection
    pub average_sale_per_transaction: Option<f64>,
    pub transactions: usize,
}

/// One bar of an aggregate: grouping key and the summed `Total`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub key: String,
    pub total: f64,
}

impl AggregateRow {
    pub fn new(key: impl Into<String>, total: f64) -> Self {
        Self {
            key: key.into(),
            total,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartOrientation {
    /// Bars grow along x, keys on y
    Horizontal,
    /// Bars grow along y, keys on x
    Vertical,
}

/// Static chart configuration plus the data it plots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub id: String,
    pub title: String,
    pub orientation: ChartOrientation,
    pub bar_color: String,
    pub plot_background: String,
    pub show_x_grid: bool,
    pub show_y_grid: bool,
    /// Every key gets its own tick label
    pub linear_ticks: bool,
    pub bars: Vec<AggregateRow>,
}

/// Options for the sidebar multi-selects (distinct values, first-seen order)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub dates: Vec<String>,
    pub source_mediums: Vec<String>,
    pub traffic_sources: Vec<String>,
    pub product_lines: Vec<String>,
    pub customer_types: Vec<String>,
    pub genders: Vec<String>,
}

/// Response for the sales dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesDashboardResponse {
    pub kpis: SalesKpis,
    /// KPI panels in display order
    pub panels: Vec<KpiPanel>,
    /// Ascending by summed total
    pub sales_by_product_line: Vec<AggregateRow>,
    /// Ascending by period key
    pub sales_by_period: Vec<AggregateRow>,
    pub period_grouping: PeriodGrouping,
    /// Period chart first, product line chart second
    pub charts: Vec<ChartSpec>,
    pub total_rows: usize,
    pub filtered_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRowDto {
    /// 1-based row number as shown in the spreadsheet
    pub sheet_row: u32,
    pub reason: String,
}

/// GET /api/d400/load_report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadReportDto {
    pub source_path: String,
    pub sheet: String,
    pub columns: Vec<String>,
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rejected: Vec<RejectedRowDto>,
    /// The sheet had rows past the configured cap
    pub truncated: bool,
    pub loaded_at: DateTime<Utc>,
}

/// POST /api/d400/reload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub rows_kept: usize,
    pub rows_rejected: usize,
    pub loaded_at: DateTime<Utc>,
}

/// Error body for every failing dashboard endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}
