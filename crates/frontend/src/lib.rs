pub mod app;
pub mod dashboards;
pub mod shared;

use wasm_bindgen::prelude::wasm_bindgen;

/// Точка входа wasm: логирование в консоль браузера и монтирование `App`
#[wasm_bindgen(start)]
pub fn start() {
    _ = console_log::init_with_level(log::Level::Info);
    console_error_panic_hook::set_once();
    log::info!("Sales dashboard frontend starting");

    leptos::mount::mount_to_body(app::App);
}
