//! Rendering: side/top panels and the reservation maps.

pub mod panels;
pub mod plot;
