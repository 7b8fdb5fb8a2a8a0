use dioxus::prelude::*;

use grafoman_common::avatar::MODAL_THUMB_PX;
use grafoman_common::date_range::format_long_day;
use grafoman_common::schedule::ScheduleKey;

use super::avatar_editor::AvatarEditor;
use super::designer_state::use_designer_state;
use super::sheet_view::AvatarThumb;

/// Modal for the staff of one cell: who is placed there, plus the staff bank
/// to place from and the editor to add someone new.
#[component]
pub fn CellEditor(cell: ScheduleKey) -> Element {
    let mut state = use_designer_state();
    let mut adding = use_signal(|| false);

    let s = state.read();
    let placed = s.editing_assignments().to_vec();
    let bank = s.bank().entries().to_vec();
    drop(s);
    let nobody_placed = placed.is_empty();
    let bank_empty = bank.is_empty();

    let title = format_long_day(cell.date);
    let slot_label = cell.slot.label();

    rsx! {
        div { class: "modal-backdrop",
            onclick: move |_| state.write().close_cell(),
            div { class: "modal",
                onclick: move |evt| evt.stop_propagation(),
                header { class: "modal-header",
                    div {
                        h3 { "{title}" }
                        span { class: "modal-subtitle", "Смена {slot_label}" }
                    }
                    button { class: "close-btn", onclick: move |_| state.write().close_cell(), "×" }
                }

                section { class: "placed",
                    h4 { "В смене" }
                    if nobody_placed {
                        p { class: "empty-note", "Никого нет" }
                    }
                    div { class: "thumb-row",
                        for (idx, assignment) in placed.into_iter().enumerate() {
                            {
                                let id = assignment.id.to_string();
                                rsx! {
                                    div { key: "{id}", class: "thumb-slot",
                                        AvatarThumb { assignment, size: MODAL_THUMB_PX }
                                        button {
                                            class: "remove-btn",
                                            title: "Убрать из смены",
                                            onclick: move |_| {
                                                state.write().remove_from_cell(idx);
                                            },
                                            "×"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                if adding() {
                    AvatarEditor {
                        on_save: move |edit| {
                            state.write().add_new_staff(edit);
                            adding.set(false);
                        },
                        on_cancel: move |_| adding.set(false),
                    }
                } else {
                    button { class: "add-btn", onclick: move |_| adding.set(true), "+ Новый сотрудник" }
                }

                section { class: "bank",
                    h4 { "Недавние" }
                    if bank_empty {
                        p { class: "empty-note", "Здесь появятся добавленные сотрудники" }
                    }
                    div { class: "thumb-row",
                        for entry in bank.into_iter() {
                            {
                                let id = entry.id.to_string();
                                let place_id = entry.id.clone();
                                let forget_id = entry.id.clone();
                                rsx! {
                                    div { key: "{id}", class: "thumb-slot",
                                        button {
                                            class: "bank-entry",
                                            title: "Добавить в смену",
                                            onclick: move |_| {
                                                state.write().place_from_bank(&place_id);
                                            },
                                            AvatarThumb { assignment: entry, size: MODAL_THUMB_PX }
                                        }
                                        button {
                                            class: "remove-btn",
                                            title: "Удалить из списка",
                                            onclick: move |_| {
                                                state.write().remove_from_bank(&forget_id);
                                            },
                                            "×"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
