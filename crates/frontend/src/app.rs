use crate::dashboards::SalesDashboard;
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    view! {
        <SalesDashboard />
    }
}
