use serde::Serialize;

/// Audible alert of the drone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Beeper {
    /// The drone is currently playing the alert sound.
    pub alerting: bool,
}
