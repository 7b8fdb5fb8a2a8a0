pub mod app_state;
pub mod avatar;
pub mod config;
pub mod date_range;
pub mod error;
pub mod export;
pub mod pagination;
pub mod schedule;
pub mod sheet;
pub mod shift;
pub mod staff_bank;
