//! Application layer for the turn session.

pub mod engine;
pub mod exit;
pub mod listeners;
pub mod view;
