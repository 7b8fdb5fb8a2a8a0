use dioxus::prelude::*;

use grafoman_common::export::ExportStatus;
use grafoman_common::sheet::{workspace_scale, SHEET_HEIGHT_PX, SHEET_WIDTH_PX};

use super::capture::{start_export, CAPTURE_TARGET_ID};
use super::cell_editor::CellEditor;
use super::designer_state::{load_designer_state, now_ms, today, use_designer_state};
use super::sheet_view::SheetView;

const MAIN_CSS: Asset = asset!("/assets/main.css");

#[component]
pub fn App() -> Element {
    use_context_provider(|| Signal::new(load_designer_state()));

    rsx! {
        document::Stylesheet { href: MAIN_CSS }
        Designer {}
    }
}

#[component]
fn Designer() -> Element {
    let mut state = use_designer_state();
    let mut viewport = use_signal(window_size);

    use_hook(move || {
        #[cfg(target_family = "wasm")]
        wasm::on_resize(move || viewport.set(window_size()));
    });

    let s = state.read();
    let start_text = s.start_text().to_string();
    let end_text = s.end_text().to_string();
    let current = s.pager().current();
    let total = s.pager().total();
    let can_prev = s.pager().can_prev();
    let can_next = s.pager().can_next();
    let exporting = s.is_exporting();
    let status = s.export_status().clone();
    let last_error = s.last_error().map(str::to_string);
    let editing = s.editing();
    let sheet = s.current_sheet();
    drop(s);
    let capture_sheet = sheet.clone();

    let (width, height) = viewport();
    let scale = workspace_scale(width, height);
    let frame_width = SHEET_WIDTH_PX * scale;
    let frame_height = SHEET_HEIGHT_PX * scale;
    let sheet_number = current + 1;

    rsx! {
        div { class: "designer",
            header { class: "toolbar",
                h1 { "График A3" }
                div { class: "date-fields",
                    label { "С"
                        input {
                            r#type: "date",
                            value: "{start_text}",
                            disabled: exporting,
                            oninput: move |evt| state.write().set_start_text(evt.value(), today()),
                        }
                    }
                    label { "По"
                        input {
                            r#type: "date",
                            value: "{end_text}",
                            disabled: exporting,
                            oninput: move |evt| state.write().set_end_text(evt.value(), today()),
                        }
                    }
                }
                div { class: "pager",
                    button {
                        disabled: exporting || !can_prev,
                        onclick: move |_| {
                            state.write().prev_sheet();
                        },
                        "‹"
                    }
                    span { class: "pager-label", "Лист {sheet_number} из {total}" }
                    button {
                        disabled: exporting || !can_next,
                        onclick: move |_| {
                            state.write().next_sheet();
                        },
                        "›"
                    }
                }
                button {
                    class: "primary export-btn",
                    disabled: exporting,
                    onclick: move |_| start_export(state),
                    if exporting { "Экспорт..." } else { "Скачать PDF" }
                }
            }

            if let Some(message) = last_error {
                div { class: "error-banner",
                    span { "Не удалось сохранить PDF: {message}" }
                    button { onclick: move |_| state.write().dismiss_error(), "×" }
                }
            }

            main {
                class: "workspace",
                onwheel: move |evt| {
                    let delta_y = evt.delta().strip_units().y;
                    state.write().wheel(delta_y, now_ms());
                },
                div {
                    class: "sheet-frame",
                    style: "width: {frame_width}px; height: {frame_height}px;",
                    div {
                        style: "transform: scale({scale}); transform-origin: 0 0;",
                        SheetView { sheet, interactive: !exporting }
                    }
                }
            }

            // Rasterized at natural size, never scaled.
            div { class: "capture-host", "aria-hidden": "true",
                div { id: CAPTURE_TARGET_ID,
                    SheetView { sheet: capture_sheet, interactive: false }
                }
            }

            if let ExportStatus::Exporting { progress, text, .. } = status {
                div { class: "export-overlay",
                    div { class: "export-card",
                        p { "{text}" }
                        div { class: "progress",
                            div { class: "progress-bar", style: "width: {progress}%;" }
                        }
                        span { class: "progress-label", "{progress}%" }
                    }
                }
            }

            if let Some(cell) = editing {
                CellEditor { cell }
            }
        }
    }
}

fn window_size() -> (f64, f64) {
    #[cfg(target_family = "wasm")]
    {
        wasm::inner_size().unwrap_or((SHEET_WIDTH_PX, SHEET_HEIGHT_PX))
    }
    #[cfg(not(target_family = "wasm"))]
    {
        (SHEET_WIDTH_PX + 100.0, SHEET_HEIGHT_PX + 180.0)
    }
}

#[cfg(target_family = "wasm")]
mod wasm {
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    pub fn inner_size() -> Option<(f64, f64)> {
        let window = web_sys::window()?;
        let width = window.inner_width().ok()?.as_f64()?;
        let height = window.inner_height().ok()?.as_f64()?;
        Some((width, height))
    }

    /// Call `handler` on every window resize for the life of the page.
    pub fn on_resize(mut handler: impl FnMut() + 'static) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let callback = Closure::wrap(Box::new(move |_: JsValue| handler()) as Box<dyn FnMut(JsValue)>);
        if let Err(e) =
            window.add_event_listener_with_callback("resize", callback.as_ref().unchecked_ref())
        {
            tracing::warn!("could not watch window size: {:?}", e);
        }
        callback.forget();
    }
}
