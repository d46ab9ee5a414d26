//! Terrascene Core — shared domain abstractions.
//!
//! This crate defines the identifiers, error taxonomy, and infrastructure
//! seams (clock, transactions, authorization) that every bounded context
//! depends on. It contains no storage code.

pub mod clock;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod id;
pub mod operator;
pub mod plugin_id;
pub mod transaction;
