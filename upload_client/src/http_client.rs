use reqwest::Client;

use crate::error::Result;

/// Builds the reqwest client used for upload submissions. No timeout is set
/// on the request itself; the transport's own defaults apply.
pub fn build_http_client() -> Result<Client> {
    Ok(Client::builder().build()?)
}
