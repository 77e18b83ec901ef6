//! Geographic dashboard of UK & Ireland hotel reservations.
//!
//! The data layer ([`data`]) is independent of the UI and can be used on its
//! own, e.g. [`data::eligibility::colorable_columns`] to decide which columns
//! of a loaded [`data::model::Table`] can drive a colour encoding.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod state;
pub mod ui;
