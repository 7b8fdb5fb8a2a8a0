use dioxus::prelude::*;

use grafoman_common::avatar::{AvatarTransform, CELL_THUMB_PX};
use grafoman_common::schedule::StaffAssignment;
use grafoman_common::sheet::{
    SheetCell, SheetGeometry, SheetLayout, ShiftRow, WeekBlock, DAY_HEADER_HEIGHT_PX,
    ROW_HEADER_WIDTH_PX, SHEET_HEIGHT_PX, SHEET_PADDING_PX, SHEET_WIDTH_PX,
};

use super::designer_state::use_designer_state;

/// One A3 sheet at its natural pixel size.
///
/// The same component draws the on-screen sheet (scaled by the parent) and
/// the off-screen capture target; only the on-screen one is `interactive`.
/// Every box is placed from [`SheetLayout`], so both render pixel-identical.
#[component]
pub fn SheetView(sheet: SheetGeometry, interactive: bool) -> Element {
    let footer = sheet.footer();
    let layout = SheetLayout::standard();
    let footer_top = SHEET_HEIGHT_PX - SHEET_PADDING_PX;

    rsx! {
        div {
            class: "sheet",
            style: "width: {SHEET_WIDTH_PX}px; height: {SHEET_HEIGHT_PX}px;",
            for (index, week) in sheet.weeks.iter().cloned().enumerate() {
                WeekView {
                    key: "{week.monday}",
                    top: layout.week_top(index),
                    week,
                    layout: layout.clone(),
                    interactive,
                }
            }
            div {
                class: "sheet-footer",
                style: "top: {footer_top}px; right: {SHEET_PADDING_PX}px;",
                "{footer}"
            }
        }
    }
}

#[component]
fn WeekView(week: WeekBlock, top: f64, layout: SheetLayout, interactive: bool) -> Element {
    let width = layout.week_width();
    let height = layout.week_height;

    rsx! {
        div {
            class: "week",
            style: "top: {top}px; left: {SHEET_PADDING_PX}px; width: {width}px; height: {height}px;",
            div { class: "week-header", style: "height: {DAY_HEADER_HEIGHT_PX}px;",
                div { class: "row-header corner", style: "width: {ROW_HEADER_WIDTH_PX}px;" }
                for day in week.days.iter() {
                    {
                        let column_width = layout.columns[day.column].width;
                        let color = day.header_color();
                        let text_class = if day.in_range { "day-header" } else { "day-header muted" };
                        let name = day.weekday_name();
                        let label = day.date_label();
                        rsx! {
                            div {
                                key: "{day.date}",
                                class: "{text_class}",
                                style: "width: {column_width}px; background: {color};",
                                span { class: "weekday", "{name}" }
                                if let Some(label) = label {
                                    span { class: "date", "{label}" }
                                }
                            }
                        }
                    }
                }
            }
            for row in week.rows.iter().cloned() {
                ShiftRowView { key: "{row.slot}", row, layout: layout.clone(), interactive }
            }
        }
    }
}

#[component]
fn ShiftRowView(row: ShiftRow, layout: SheetLayout, interactive: bool) -> Element {
    let slot = row.slot;
    let label = slot.label();
    let height = layout.row_height;

    rsx! {
        div { class: "shift-row", style: "height: {height}px;",
            div { class: "row-header", style: "width: {ROW_HEADER_WIDTH_PX}px;",
                if let Some(icon) = slot.icon() {
                    span { class: "row-icon", "{icon}" }
                } else {
                    span { class: "row-label", "{label}" }
                }
                if let Some((from, to)) = slot.time_range() {
                    span { class: "row-time", "{from}" }
                    span { class: "row-time", "{to}" }
                }
            }
            for cell in row.cells.iter().cloned() {
                CellView { key: "{cell.key}", width: layout.columns[cell.column].width, cell, interactive }
            }
        }
    }
}

#[component]
fn CellView(cell: SheetCell, width: f64, interactive: bool) -> Element {
    let mut state = use_designer_state();
    let key = cell.key;
    let clickable = interactive && !cell.is_masked();
    let class = match (cell.is_masked(), clickable) {
        (true, _) => "cell masked",
        (false, true) => "cell clickable",
        (false, false) => "cell",
    };
    let background = cell.background();
    let overlay = cell.overlay();
    let placeholder = cell.placeholder();

    rsx! {
        div {
            class: "{class}",
            style: "width: {width}px; background: {background};",
            onclick: move |_| {
                if clickable {
                    state.write().open_cell(key);
                }
            },
            if let Some(tint) = overlay {
                div { class: "cell-overlay", style: "background: {tint};" }
            }
            div { class: "cell-avatars",
                for assignment in cell.assignments().iter().cloned() {
                    AvatarThumb { key: "{assignment.id}", assignment, size: CELL_THUMB_PX }
                }
            }
            if let Some(text) = placeholder {
                span { class: "cell-placeholder", "{text}" }
            }
        }
    }
}

/// Circular crop of an avatar, reproducing the editor framing at `size`.
#[component]
pub fn AvatarThumb(assignment: StaffAssignment, size: f64) -> Element {
    let transform = AvatarTransform::for_thumbnail(assignment.scale, assignment.offset, size).css();
    let src = assignment.avatar.as_str().to_string();

    rsx! {
        div {
            class: "avatar-thumb",
            style: "width: {size}px; height: {size}px;",
            title: "{assignment.name}",
            img {
                src: "{src}",
                draggable: false,
                style: "max-width: none; transform-origin: 0 0; transform: {transform};",
            }
        }
    }
}
