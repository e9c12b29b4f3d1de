use crate::shared::format::format_value;
use contracts::shared::indicators::KpiPanel;
use leptos::prelude::*;

/// Карточка одного KPI: подпись, значение, необязательный подзаголовок
#[component]
pub fn StatCard(panel: KpiPanel) -> impl IntoView {
    let formatted = format_value(panel.value, &panel.format);
    let value_class = if panel.value.is_some() {
        "stat-card__value"
    } else {
        "stat-card__value stat-card__value--empty"
    };

    let subtitle_view = panel.subtitle.map(|s| {
        view! { <div class="stat-card__subtitle">{s}</div> }
    });

    view! {
        <div class="stat-card" id=format!("stat-card--{}", panel.id)>
            <div class="stat-card__content">
                <div class="stat-card__label">{panel.label}</div>
                <div class=value_class>{formatted}</div>
                {subtitle_view}
            </div>
        </div>
    }
}
