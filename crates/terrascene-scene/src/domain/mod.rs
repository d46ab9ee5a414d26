//! Domain types for scenes.

pub mod cluster;
pub mod commands;
pub mod events;
pub mod lock;
pub mod plugins;
pub mod scene;
pub mod widget_align;
pub mod widgets;
