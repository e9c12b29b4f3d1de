use crate::dashboards::d400_sales_dashboard::api;
use crate::shared::components::bar_chart::BarChart;
use crate::shared::components::multi_select::MultiSelect;
use crate::shared::components::stat_card::StatCard;
use contracts::dashboards::d400_sales_dashboard::{
    FilterCriteria, FilterOptions, PeriodGrouping, SalesDashboardRequest, SalesDashboardResponse,
};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// Выбор пользователя по каждому измерению фильтра
#[derive(Clone, Copy)]
struct Selections {
    dates: RwSignal<Vec<String>>,
    source_mediums: RwSignal<Vec<String>>,
    traffic_sources: RwSignal<Vec<String>>,
    product_lines: RwSignal<Vec<String>>,
    customer_types: RwSignal<Vec<String>>,
    genders: RwSignal<Vec<String>>,
}

impl Selections {
    fn new() -> Self {
        Self {
            dates: RwSignal::new(Vec::new()),
            source_mediums: RwSignal::new(Vec::new()),
            traffic_sources: RwSignal::new(Vec::new()),
            product_lines: RwSignal::new(Vec::new()),
            customer_types: RwSignal::new(Vec::new()),
            genders: RwSignal::new(Vec::new()),
        }
    }

    /// По умолчанию выбраны все значения
    fn select_all(&self, options: &FilterOptions) {
        self.dates.set(options.dates.clone());
        self.source_mediums.set(options.source_mediums.clone());
        self.traffic_sources.set(options.traffic_sources.clone());
        self.product_lines.set(options.product_lines.clone());
        self.customer_types.set(options.customer_types.clone());
        self.genders.set(options.genders.clone());
    }

    fn criteria(&self, options: &FilterOptions) -> FilterCriteria {
        FilterCriteria {
            dates: Some(self.dates.get()),
            source_mediums: Some(self.source_mediums.get()),
            traffic_sources: Some(self.traffic_sources.get()),
            product_lines: Some(self.product_lines.get()),
            customer_types: Some(self.customer_types.get()),
            genders: Some(self.genders.get()),
        }
        .normalized(options)
    }
}

fn parse_grouping(value: &str) -> Option<PeriodGrouping> {
    match value {
        "day" => Some(PeriodGrouping::Day),
        "hour" => Some(PeriodGrouping::Hour),
        _ => None,
    }
}

/// Sales Dashboard component
#[component]
pub fn SalesDashboard() -> impl IntoView {
    let options = RwSignal::new(None::<FilterOptions>);
    let selections = Selections::new();
    // None = grouping from the backend config
    let grouping = RwSignal::new(None::<PeriodGrouping>);

    let data = RwSignal::new(None::<SalesDashboardResponse>);
    let loading = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);
    let reload_info = RwSignal::new(None::<String>);
    // Only the latest request may write its response
    let generation = StoredValue::new(0u64);

    let load_options = move || {
        spawn_local(async move {
            match api::get_filter_options().await {
                Ok(loaded) => {
                    selections.select_all(&loaded);
                    options.set(Some(loaded));
                }
                Err(e) => {
                    log::error!("Failed to load D400 filter options: {}", e);
                    loading.set(false);
                    error.set(Some(e));
                }
            }
        });
    };

    // Load filter options on mount
    Effect::new(move |_| {
        loading.set(true);
        load_options();
    });

    // Rebuild dashboard when filters or grouping change
    Effect::new(move |_| {
        let Some(current_options) = options.get() else {
            return;
        };
        let request = SalesDashboardRequest {
            filter: selections.criteria(&current_options),
            period_grouping: grouping.get(),
        };

        generation.update_value(|g| *g += 1);
        let current = generation.get_value();
        loading.set(true);

        spawn_local(async move {
            let result = api::get_sales_dashboard(&request).await;
            if generation.get_value() != current {
                return;
            }
            match result {
                Ok(response) => {
                    error.set(None);
                    data.set(Some(response));
                }
                Err(e) => {
                    log::error!("Failed to load D400 sales dashboard: {}", e);
                    error.set(Some(e));
                }
            }
            loading.set(false);
        });
    });

    let on_reload = move |_| {
        reload_info.set(None);
        loading.set(true);
        spawn_local(async move {
            match api::reload().await {
                Ok(response) => {
                    reload_info.set(Some(format!(
                        "Loaded {} rows ({} rejected) at {}",
                        response.rows_kept,
                        response.rows_rejected,
                        response.loaded_at.format("%Y-%m-%d %H:%M:%S UTC")
                    )));
                    error.set(None);
                    load_options();
                }
                Err(e) => {
                    log::error!("D400 reload failed: {}", e);
                    loading.set(false);
                    error.set(Some(e));
                }
            }
        });
    };

    let option_list = move |pick: fn(&FilterOptions) -> &Vec<String>| {
        Signal::derive(move || {
            options.with(|o| o.as_ref().map(|o| pick(o).clone()).unwrap_or_default())
        })
    };

    view! {
        <div id="d400_sales_dashboard--dashboard" class="sales-dashboard">
            <aside class="sales-dashboard__sidebar">
                <h2 class="sales-dashboard__sidebar-title">"Please Filter Here:"</h2>
                <MultiSelect
                    label="Select the Date:"
                    options=option_list(|o| &o.dates)
                    selected=selections.dates
                />
                <MultiSelect
                    label="Select the Source/Medium Type:"
                    options=option_list(|o| &o.source_mediums)
                    selected=selections.source_mediums
                />
                <MultiSelect
                    label="Sort by traffic:"
                    options=option_list(|o| &o.traffic_sources)
                    selected=selections.traffic_sources
                />
                <MultiSelect
                    label="Select the Product Line:"
                    options=option_list(|o| &o.product_lines)
                    selected=selections.product_lines
                />
                <MultiSelect
                    label="Select the Customer Type:"
                    options=option_list(|o| &o.customer_types)
                    selected=selections.customer_types
                />
                <MultiSelect
                    label="Select the Gender:"
                    options=option_list(|o| &o.genders)
                    selected=selections.genders
                />
                <div class="sales-dashboard__grouping">
                    <label for="d400-period-grouping">"Group sales by:"</label>
                    <select
                        id="d400-period-grouping"
                        class="form__select"
                        on:change=move |ev| grouping.set(parse_grouping(&event_target_value(&ev)))
                    >
                        <option value="">"Default"</option>
                        <option value="day">"Day"</option>
                        <option value="hour">"Hour"</option>
                    </select>
                </div>
                <button class="button button--primary" on:click=on_reload>
                    "Reload data"
                </button>
                {move || reload_info.get().map(|info| view! {
                    <div class="sales-dashboard__reload-info">{info}</div>
                })}
            </aside>

            <main class="sales-dashboard__main">
                <h1 class="sales-dashboard__title">"📊 Sales Dashboard"</h1>

                {move || {
                    if loading.get() {
                        view! {
                            <div class="d400-loading">
                                <span>"Loading..."</span>
                            </div>
                        }.into_any()
                    } else {
                        view! { <></> }.into_any()
                    }
                }}

                {move || {
                    if let Some(err) = error.get() {
                        view! {
                            <div class="d400-error">
                                <strong>"⚠ Error: "</strong>
                                {err}
                            </div>
                        }.into_any()
                    } else {
                        view! { <></> }.into_any()
                    }
                }}

                {move || data.get().map(|response| {
                    let rows_info = format!(
                        "{} of {} rows",
                        response.filtered_rows,
                        response.total_rows
                    );
                    view! {
                        <div class="sales-dashboard__kpis">
                            {response
                                .panels
                                .into_iter()
                                .map(|panel| view! { <StatCard panel=panel /> })
                                .collect_view()}
                        </div>
                        <div class="sales-dashboard__rows-info">{rows_info}</div>
                        <hr />
                        <div class="sales-dashboard__charts">
                            {response
                                .charts
                                .into_iter()
                                .map(|spec| view! { <BarChart spec=spec /> })
                                .collect_view()}
                        </div>
                    }
                })}
            </main>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grouping() {
        assert_eq!(parse_grouping("day"), Some(PeriodGrouping::Day));
        assert_eq!(parse_grouping("hour"), Some(PeriodGrouping::Hour));
        assert_eq!(parse_grouping(""), None);
    }
}
