use contracts::dashboards::d400_sales_dashboard::{AggregateRow, PeriodGrouping, SalesKpis};
use std::collections::BTreeMap;

use super::table::SalesRow;

/// KPI по отфильтрованным строкам.
/// На пустой выборке суммы равны нулю, средние равны `None`.
pub fn compute_kpis(rows: &[&SalesRow]) -> SalesKpis {
    let total_quantity: f64 = rows.iter().map(|r| r.quantity).sum();

    SalesKpis {
        total_sales: truncate_to_i64(total_quantity),
        average_rating: mean(rows.iter().map(|r| r.unit_price)).map(|m| round_to(m, 1)),
        average_sale_per_transaction: mean(rows.iter().map(|r| r.total)).map(|m| round_to(m, 2)),
        transactions: rows.len(),
    }
}

/// Sum of `Total` per product line, ascending by the sum (ties by name)
pub fn sales_by_product_line(rows: &[&SalesRow]) -> Vec<AggregateRow> {
    let mut result: Vec<AggregateRow> = sum_by(rows, |r| r.product_line.as_str())
        .into_iter()
        .map(|(key, total)| AggregateRow::new(key, total))
        .collect();
    result.sort_by(|a, b| a.total.total_cmp(&b.total).then_with(|| a.key.cmp(&b.key)));
    result
}

/// Sum of `Total` per day or hour, ascending by period key
pub fn sales_by_period(rows: &[&SalesRow], grouping: PeriodGrouping) -> Vec<AggregateRow> {
    sum_by(rows, |r| r.period_key(grouping))
        .into_iter()
        .map(|(key, total)| AggregateRow::new(key, total))
        .collect()
}

fn sum_by<'r, F>(rows: &[&'r SalesRow], key: F) -> BTreeMap<&'r str, f64>
where
    F: Fn(&'r SalesRow) -> &'r str,
{
    let mut groups: BTreeMap<&'r str, f64> = BTreeMap::new();
    for row in rows {
        *groups.entry(key(*row)).or_insert(0.0) += row.total;
    }
    groups
}

/// Drops the fraction; `as` saturates at the i64 bounds and maps NaN to 0
fn truncate_to_i64(value: f64) -> i64 {
    value.trunc() as i64
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Half away from zero
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
