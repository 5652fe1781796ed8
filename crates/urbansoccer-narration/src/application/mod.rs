//! Narration orchestration over the channel ports.

pub mod player;
