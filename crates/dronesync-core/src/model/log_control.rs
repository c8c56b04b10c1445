use serde::Serialize;

/// On-board log storage control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogControl {
    /// `None` until the drone reports its log storage state.
    pub logs_enabled: Option<bool>,
    pub can_deactivate_logs: bool,
}
