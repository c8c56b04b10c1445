// Certificate upload endpoint

use std::path::Path;

use tracing::debug;

use crate::error::Error;
use crate::http::client::DroneClient;

impl DroneClient {
    /// Upload a certificate file.
    ///
    /// `PUT /api/v1/upload/certificate`
    pub async fn upload_certificate(&self, certificate: &Path) -> Result<(), Error> {
        let url = self.api_url("api/v1/upload/certificate")?;
        debug!(file = %certificate.display(), "uploading certificate");
        self.put_file(url, certificate).await
    }
}
