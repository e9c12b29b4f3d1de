use contracts::dashboards::d400_sales_dashboard::{
    FilterCriteria, FilterOptions, LoadReportDto, PeriodGrouping, ReloadResponse,
    SalesDashboardRequest, SalesDashboardResponse, SalesKpis,
};
use contracts::shared::indicators::{KpiPanel, ValueFormat};
use std::sync::Arc;

use super::aggregate::{compute_kpis, sales_by_period, sales_by_product_line};
use super::cache::TableCache;
use super::charts::{period_chart, product_line_chart};
use super::error::LoadError;
use super::filter::filter_rows;
use super::loader::{load_sales_table, LoadParams};
use super::table::{LoadedTable, SalesTable};
use crate::shared::config::{Config, DashboardConfig, SourceConfig};

/// Состояние дашборда, общее для всех запросов.
/// Таблица в кэше только читается; фильтры живут в рамках одного запроса.
pub struct SalesDashboardService {
    source: SourceConfig,
    dashboard: DashboardConfig,
    cache: TableCache,
}

impl SalesDashboardService {
    pub fn new(config: &Config) -> Self {
        Self {
            source: config.source.clone(),
            dashboard: config.dashboard.clone(),
            cache: TableCache::new(),
        }
    }

    /// Cached table, reloading from disk when the file changed
    pub async fn table(self: &Arc<Self>) -> Result<Arc<LoadedTable>, LoadError> {
        let this = Arc::clone(self);
        tokio::task::spawn_blocking(move || {
            let params = LoadParams::from_source(&this.source)?;
            this.cache.get_or_load(&params, load_sales_table)
        })
        .await
        .map_err(|e| LoadError::Internal(e.to_string()))?
    }

    pub async fn get_sales_dashboard(
        self: &Arc<Self>,
        request: SalesDashboardRequest,
    ) -> Result<SalesDashboardResponse, LoadError> {
        let loaded = self.table().await?;
        let grouping = request
            .period_grouping
            .unwrap_or(self.dashboard.period_grouping);
        Ok(build_response(
            &loaded.table,
            &request.filter,
            grouping,
            &self.dashboard,
        ))
    }

    pub async fn get_filter_options(self: &Arc<Self>) -> Result<FilterOptions, LoadError> {
        Ok(self.table().await?.table.filter_options())
    }

    pub async fn get_load_report(self: &Arc<Self>) -> Result<LoadReportDto, LoadError> {
        Ok(self.table().await?.report_dto())
    }

    /// Manual refresh: drop the cached table and load it again
    pub async fn reload(self: &Arc<Self>) -> Result<ReloadResponse, LoadError> {
        self.cache.invalidate();
        let loaded = self.table().await?;
        Ok(ReloadResponse {
            rows_kept: loaded.table.len(),
            rows_rejected: loaded.report.rejected.len(),
            loaded_at: loaded.report.loaded_at,
        })
    }
}

/// Фильтр → KPI → агрегаты → графики. Чистая функция.
pub fn build_response(
    table: &SalesTable,
    criteria: &FilterCriteria,
    grouping: PeriodGrouping,
    dashboard: &DashboardConfig,
) -> SalesDashboardResponse {
    let rows = filter_rows(table, criteria);
    let kpis = compute_kpis(&rows);
    let by_product_line = sales_by_product_line(&rows);
    let by_period = sales_by_period(&rows, grouping);

    tracing::debug!(
        "D400 Dashboard: {} of {} rows after {} active filters",
        rows.len(),
        table.len(),
        criteria.active_dimensions()
    );

    SalesDashboardResponse {
        panels: build_panels(&kpis, &dashboard.currency),
        charts: vec![
            period_chart(by_period.clone(), grouping, &dashboard.bar_color),
            product_line_chart(by_product_line.clone(), &dashboard.bar_color),
        ],
        kpis,
        sales_by_product_line: by_product_line,
        sales_by_period: by_period,
        period_grouping: grouping,
        total_rows: table.len(),
        filtered_rows: rows.len(),
    }
}

fn build_panels(kpis: &SalesKpis, currency: &str) -> Vec<KpiPanel> {
    vec![
        KpiPanel {
            id: "total_sales".to_string(),
            label: "Total Sales:".to_string(),
            value: Some(kpis.total_sales as f64),
            format: ValueFormat::Money {
                currency: currency.to_string(),
                decimals: 0,
            },
            subtitle: Some(format!("{} transactions", kpis.transactions)),
        },
        KpiPanel {
            id: "average_rating".to_string(),
            label: "Average Rating:".to_string(),
            value: kpis.average_rating,
            format: ValueFormat::Number { decimals: 1 },
            subtitle: None,
        },
        KpiPanel {
            id: "average_sale_per_transaction".to_string(),
            label: "Average Sales Per Transaction:".to_string(),
            value: kpis.average_sale_per_transaction,
            format: ValueFormat::Money {
                currency: currency.to_string(),
                decimals: 2,
            },
            subtitle: None,
        },
    ]
}
