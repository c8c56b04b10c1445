//! Per-feature decoders and encoders.
//!
//! Each module exposes a `decode` function returning `Ok(None)` for
//! commands outside its feature or with an unknown command id, so new
//! firmware commands are dropped without error. Enum fields decode to
//! `None` when the raw value is unknown.

pub mod calibration;
pub mod camera;
pub mod gauge_updater;
pub mod motors;
pub mod security;
pub mod settings;
pub mod sound;
