use contracts::dashboards::d400_sales_dashboard::{
    AggregateRow, ChartOrientation, ChartSpec, PeriodGrouping,
};

pub const PRODUCT_LINE_CHART_ID: &str = "sales_by_product_line";
pub const PERIOD_CHART_ID: &str = "sales_by_period";

const TRANSPARENT: &str = "rgba(0,0,0,0)";

/// Horizontal bars, no vertical gridlines
pub fn product_line_chart(bars: Vec<AggregateRow>, bar_color: &str) -> ChartSpec {
    ChartSpec {
        id: PRODUCT_LINE_CHART_ID.to_string(),
        title: "Sales by Product Line".to_string(),
        orientation: ChartOrientation::Horizontal,
        bar_color: bar_color.to_string(),
        plot_background: TRANSPARENT.to_string(),
        show_x_grid: false,
        show_y_grid: true,
        linear_ticks: false,
        bars,
    }
}

/// Vertical bars, one tick per period, no horizontal gridlines.
/// Title follows the grouping actually applied.
pub fn period_chart(bars: Vec<AggregateRow>, grouping: PeriodGrouping, bar_color: &str) -> ChartSpec {
    ChartSpec {
        id: PERIOD_CHART_ID.to_string(),
        title: grouping.chart_title().to_string(),
        orientation: ChartOrientation::Vertical,
        bar_color: bar_color.to_string(),
        plot_background: TRANSPARENT.to_string(),
        show_x_grid: true,
        show_y_grid: false,
        linear_ticks: true,
        bars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_chart_title_follows_grouping() {
        let chart = period_chart(vec![], PeriodGrouping::Hour, "#0083B8");
        assert_eq!(chart.title, "Sales by hour");
        assert_eq!(chart.orientation, ChartOrientation::Vertical);
        assert!(!chart.show_y_grid);
        assert!(chart.linear_ticks);
    }

    #[test]
    fn test_product_chart_styling() {
        let chart = product_line_chart(vec![AggregateRow::new("A", 1.0)], "#0083B8");
        assert_eq!(chart.orientation, ChartOrientation::Horizontal);
        assert_eq!(chart.bar_color, "#0083B8");
        assert_eq!(chart.plot_background, "rgba(0,0,0,0)");
        assert!(!chart.show_x_grid);
        assert_eq!(chart.bars.len(), 1);
    }
}
