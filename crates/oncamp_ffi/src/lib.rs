//! Flutter-facing bridge for OnCamp core.

pub mod api;
