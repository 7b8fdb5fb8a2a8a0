use chrono::NaiveDate;
use dioxus::prelude::*;

use grafoman_common::app_state::AppState;
use grafoman_common::config::DesignerConfig;

use super::storage::browser_store;

/// Create the session state from whatever the browser remembered.
pub fn load_designer_state() -> AppState {
    AppState::load(browser_store(), today(), DesignerConfig::default())
}

/// Designer state shared through context.
pub fn use_designer_state() -> Signal<AppState> {
    use_context::<Signal<AppState>>()
}

pub fn today() -> NaiveDate {
    grafoman_common::date_range::today()
}

/// Milliseconds on a monotonic-enough clock, for wheel debouncing.
pub fn now_ms() -> u64 {
    #[cfg(target_family = "wasm")]
    {
        js_sys::Date::now() as u64
    }
    #[cfg(not(target_family = "wasm"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}
