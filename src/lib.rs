//! Research-paper metadata explorer.
//!
//! Load → clean → analyze → present, each stage a plain function over
//! [`data::model::Table`]. The dashboard reruns only the filter-and-render
//! pass ([`view::render`]) when its filter state changes.

pub mod app;
pub mod charts;
pub mod cli;
pub mod color;
pub mod config;
pub mod data;
pub mod report;
pub mod state;
pub mod ui;
pub mod view;
