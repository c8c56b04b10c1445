use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    #[default]
    None,
    Success,
    Interrupted,
}

/// Flight log download from the drone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlightLogDownloader {
    pub downloading: bool,
    /// Logs downloaded during the current or last run.
    pub downloaded_count: u32,
    /// Status of the last finished run.
    pub completion: CompletionStatus,
}
