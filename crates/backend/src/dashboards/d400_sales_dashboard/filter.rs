use contracts::dashboards::d400_sales_dashboard::FilterCriteria;
use std::collections::HashSet;

use super::table::{SalesRow, SalesTable};

type Accessor = fn(&SalesRow) -> &str;

/// One narrowing dimension: accepted values and how to read them from a row
struct Dimension<'c> {
    accepted: HashSet<&'c str>,
    value: Accessor,
}

/// Предикат строк, собранный из выбранных значений фильтров.
/// Измерение без выбора (`None`) не сужает таблицу; пустой выбор отсекает всё.
pub struct RowFilter<'c> {
    dimensions: Vec<Dimension<'c>>,
}

impl<'c> RowFilter<'c> {
    pub fn new(criteria: &'c FilterCriteria) -> Self {
        let dimensions = [
            dimension(&criteria.dates, |r| r.date.as_str()),
            dimension(&criteria.source_mediums, |r| r.source_medium.as_str()),
            dimension(&criteria.traffic_sources, |r| r.utm_source.as_str()),
            dimension(&criteria.product_lines, |r| r.product_line.as_str()),
            dimension(&criteria.customer_types, |r| r.customer_type.as_str()),
            dimension(&criteria.genders, |r| r.gender.as_str()),
        ]
        .into_iter()
        .flatten()
        .collect();
        Self { dimensions }
    }

    pub fn matches(&self, row: &SalesRow) -> bool {
        self.dimensions
            .iter()
            .all(|d| d.accepted.contains((d.value)(row)))
    }

    /// Some dimension has nothing selected, so no row can pass
    pub fn rejects_everything(&self) -> bool {
        self.dimensions.iter().any(|d| d.accepted.is_empty())
    }
}

fn dimension<'c>(selected: &'c Option<Vec<String>>, value: Accessor) -> Option<Dimension<'c>> {
    selected.as_ref().map(|values| Dimension {
        accepted: values.iter().map(String::as_str).collect(),
        value,
    })
}

/// Rows of `table` retained by `criteria`, in table order
pub fn filter_rows<'t>(table: &'t SalesTable, criteria: &FilterCriteria) -> Vec<&'t SalesRow> {
    let filter = RowFilter::new(criteria);
    if filter.rejects_everything() {
        tracing::debug!("D400 Filter: empty selection in at least one dimension");
        return Vec::new();
    }
    table.rows.iter().filter(|row| filter.matches(row)).collect()
}
