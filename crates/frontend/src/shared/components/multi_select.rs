use leptos::prelude::*;

/// Список чекбоксов с кнопками "All" / "None"
///
/// Пустой `selected` означает, что не выбрано ничего.
#[component]
pub fn MultiSelect(
    /// Label text above the options
    label: &'static str,
    /// Available values, in display order
    #[prop(into)]
    options: Signal<Vec<String>>,
    /// Currently selected values
    selected: RwSignal<Vec<String>>,
) -> impl IntoView {
    let toggle = move |value: String, checked: bool| {
        selected.update(|s| {
            if checked {
                if !s.contains(&value) {
                    s.push(value);
                }
            } else {
                s.retain(|v| v != &value);
            }
        });
    };

    let summary = move || {
        format!(
            "{} / {}",
            selected.with(|s| s.len()),
            options.with(|o| o.len())
        )
    };

    view! {
        <div class="multi-select">
            <div class="multi-select__header">
                <span class="multi-select__label">{label}</span>
                <span class="multi-select__summary">{summary}</span>
            </div>
            <div class="multi-select__actions">
                <button
                    class="button button--ghost button--small"
                    on:click=move |_| selected.set(options.get())
                >
                    "All"
                </button>
                <button
                    class="button button--ghost button--small"
                    on:click=move |_| selected.set(Vec::new())
                >
                    "None"
                </button>
            </div>
            <div class="multi-select__options">
                {move || {
                    options
                        .get()
                        .into_iter()
                        .map(|value| {
                            let checked_value = value.clone();
                            let toggle_value = value.clone();
                            view! {
                                <label class="multi-select__option">
                                    <input
                                        type="checkbox"
                                        class="form__checkbox"
                                        prop:checked=move || {
                                            selected.with(|s| s.contains(&checked_value))
                                        }
                                        on:change=move |ev| {
                                            toggle(toggle_value.clone(), event_target_checked(&ev))
                                        }
                                    />
                                    <span>{value}</span>
                                </label>
                            }
                        })
                        .collect_view()
                }}
            </div>
        </div>
    }
}
