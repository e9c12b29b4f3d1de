use crate::shared::format::format_grouped;
use contracts::dashboards::d400_sales_dashboard::{ChartOrientation, ChartSpec};
use leptos::prelude::*;

pub const CHART_WIDTH: f64 = 560.0;
pub const CHART_HEIGHT: f64 = 360.0;

/// Доля полосы категории, занятая столбиком
const BAR_FILL: f64 = 0.8;
/// Ticks on the value axis
const VALUE_TICKS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct PlotArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarRect {
    pub key: String,
    pub total: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Center of the bar along the category axis
    pub label_at: f64,
    pub show_label: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub plot: PlotArea,
    pub bars: Vec<BarRect>,
    /// Value axis ticks, the last one is the axis maximum
    pub ticks: Vec<f64>,
}

/// Геометрия столбиков в координатах SVG.
///
/// Горизонтальный график: первая строка внизу, значения по оси x.
/// Вертикальный: первая строка слева, значения по оси y.
pub fn layout(spec: &ChartSpec, width: f64, height: f64) -> ChartLayout {
    let plot = match spec.orientation {
        ChartOrientation::Horizontal => PlotArea {
            x: 130.0,
            y: 40.0,
            width: width - 150.0,
            height: height - 70.0,
        },
        ChartOrientation::Vertical => PlotArea {
            x: 60.0,
            y: 40.0,
            width: width - 80.0,
            height: height - 100.0,
        },
    };

    let max = spec.bars.iter().map(|b| b.total).fold(0.0, f64::max);
    let ticks = value_ticks(max, VALUE_TICKS);
    let axis_max = ticks.last().copied().unwrap_or(0.0);
    let scale = |total: f64| {
        if axis_max > 0.0 {
            total.max(0.0) / axis_max
        } else {
            0.0
        }
    };

    let count = spec.bars.len();
    let label_step = if spec.linear_ticks {
        1
    } else {
        count.div_ceil(10).max(1)
    };

    let bars = spec
        .bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let show_label = i % label_step == 0;
            match spec.orientation {
                ChartOrientation::Horizontal => {
                    let band = plot.height / count as f64;
                    let band_top = plot.y + plot.height - (i + 1) as f64 * band;
                    BarRect {
                        key: bar.key.clone(),
                        total: bar.total,
                        x: plot.x,
                        y: band_top + band * (1.0 - BAR_FILL) / 2.0,
                        width: scale(bar.total) * plot.width,
                        height: band * BAR_FILL,
                        label_at: band_top + band / 2.0,
                        show_label,
                    }
                }
                ChartOrientation::Vertical => {
                    let band = plot.width / count as f64;
                    let band_left = plot.x + i as f64 * band;
                    let bar_height = scale(bar.total) * plot.height;
                    BarRect {
                        key: bar.key.clone(),
                        total: bar.total,
                        x: band_left + band * (1.0 - BAR_FILL) / 2.0,
                        y: plot.y + plot.height - bar_height,
                        width: band * BAR_FILL,
                        height: bar_height,
                        label_at: band_left + band / 2.0,
                        show_label,
                    }
                }
            }
        })
        .collect();

    ChartLayout { plot, bars, ticks }
}

/// Round tick step (1, 2 or 5 times a power of ten) covering `max`
pub fn value_ticks(max: f64, target: usize) -> Vec<f64> {
    if max <= 0.0 || !max.is_finite() || target == 0 {
        return vec![0.0];
    }
    let raw = max / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);
    let count = (max / step).ceil() as usize;
    (0..=count).map(|i| i as f64 * step).collect()
}

#[component]
pub fn BarChart(spec: ChartSpec) -> impl IntoView {
    let chart = layout(&spec, CHART_WIDTH, CHART_HEIGHT);
    let plot = chart.plot.clone();
    let axis_max = chart.ticks.last().copied().unwrap_or(0.0);
    let horizontal = spec.orientation == ChartOrientation::Horizontal;
    let show_value_grid = if horizontal {
        spec.show_x_grid
    } else {
        spec.show_y_grid
    };

    let ticks_view = chart
        .ticks
        .iter()
        .map(|tick| {
            let fraction = if axis_max > 0.0 { tick / axis_max } else { 0.0 };
            let label = format_grouped(*tick, 0);
            if horizontal {
                let x = plot.x + fraction * plot.width;
                view! {
                    <g class="bar-chart__tick">
                        {show_value_grid.then(|| view! {
                            <line class="bar-chart__grid"
                                x1=x y1=plot.y x2=x y2=plot.y + plot.height />
                        })}
                        <text x=x y=plot.y + plot.height + 16.0 text-anchor="middle">{label}</text>
                    </g>
                }
                .into_any()
            } else {
                let y = plot.y + plot.height - fraction * plot.height;
                view! {
                    <g class="bar-chart__tick">
                        {show_value_grid.then(|| view! {
                            <line class="bar-chart__grid"
                                x1=plot.x y1=y x2=plot.x + plot.width y2=y />
                        })}
                        <text x=plot.x - 6.0 y=y + 4.0 text-anchor="end">{label}</text>
                    </g>
                }
                .into_any()
            }
        })
        .collect_view();

    let bar_color = spec.bar_color.clone();
    let bars_view = chart
        .bars
        .into_iter()
        .map(|bar| {
            let tooltip = format!("{}: {}", bar.key, format_grouped(bar.total, 2));
            let label = bar.show_label.then(|| {
                if horizontal {
                    view! {
                        <text class="bar-chart__category" x=plot.x - 6.0 y=bar.label_at + 4.0
                            text-anchor="end">{bar.key.clone()}</text>
                    }
                    .into_any()
                } else {
                    let y = plot.y + plot.height + 14.0;
                    view! {
                        <text class="bar-chart__category" x=bar.label_at y=y text-anchor="end"
                            transform=format!("rotate(-45 {} {})", bar.label_at, y)>
                            {bar.key.clone()}
                        </text>
                    }
                    .into_any()
                }
            });
            view! {
                <g class="bar-chart__bar">
                    <rect x=bar.x y=bar.y width=bar.width height=bar.height fill=bar_color.clone()>
                        <title>{tooltip}</title>
                    </rect>
                    {label}
                </g>
            }
        })
        .collect_view();

    let empty = spec.bars.is_empty();

    view! {
        <div class="bar-chart" id=format!("bar-chart--{}", spec.id)>
            <svg
                viewBox=format!("0 0 {} {}", CHART_WIDTH, CHART_HEIGHT)
                preserveAspectRatio="xMidYMid meet"
                role="img"
            >
                <text class="bar-chart__title" x=CHART_WIDTH / 2.0 y=20.0 text-anchor="middle">
                    {spec.title.clone()}
                </text>
                <rect
                    class="bar-chart__plot"
                    x=plot.x
                    y=plot.y
                    width=plot.width
                    height=plot.height
                    fill=spec.plot_background.clone()
                />
                {ticks_view}
                {bars_view}
                {empty.then(|| view! {
                    <text class="bar-chart__empty" x=CHART_WIDTH / 2.0 y=CHART_HEIGHT / 2.0
                        text-anchor="middle">"No data"</text>
                })}
            </svg>
        </div>
    }
}
