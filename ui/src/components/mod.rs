pub mod app;
pub mod avatar_editor;
pub mod capture;
pub mod cell_editor;
pub mod designer_state;
pub mod sheet_view;
pub mod storage;
