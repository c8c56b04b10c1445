use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadState {
    Uploading,
    Success,
    Failed,
}

/// Certificate upload to the drone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CertificateUploader {
    /// `None` when no upload was requested during this connection.
    pub state: Option<UploadState>,
}
