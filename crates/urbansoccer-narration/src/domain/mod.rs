//! Playback state and channel ports.

pub mod channels;
pub mod playback;
