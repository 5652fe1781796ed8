//! Urban Soccer Core — shared model and collaborator seams.
//!
//! This crate defines the campaign and turn model plus the traits the turn
//! engine uses to reach its collaborators (campaign backend, speech
//! synthesis, identity, cached selection). It contains no infrastructure code.

pub mod backend;
pub mod cache;
pub mod campaign;
pub mod clock;
pub mod error;
pub mod event;
pub mod identity;
pub mod turn;
