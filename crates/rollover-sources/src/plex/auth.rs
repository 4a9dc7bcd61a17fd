use crate::plex::api::{PlexHttpClient, PLEX_TV_BASE_URL};
use crate::SourceError;
use anyhow::Result;
use std::time::Duration;
use tracing::info;

/// Verify that a token is valid by making an API call.
///
/// `Ok(false)` means plex.tv rejected the token; transport problems are errors.
pub async fn verify_token(token: &str) -> Result<bool> {
    verify_token_at(token, PLEX_TV_BASE_URL).await
}

pub async fn verify_token_at(token: &str, plex_tv_base_url: &str) -> Result<bool> {
    let client = PlexHttpClient::new(token, Duration::from_secs(15))?
        .with_plex_tv_base_url(plex_tv_base_url);

    match client.authenticate().await {
        Ok(()) => {
            info!("Plex token verified");
            Ok(true)
        }
        Err(SourceError::Status { status, .. }) if status.is_client_error() => Ok(false),
        Err(e) => Err(e.into()),
    }
}
