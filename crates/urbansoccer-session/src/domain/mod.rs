//! Domain layer for the turn session: state, transitions and events.

pub mod aggregates;
pub mod commands;
pub mod events;
