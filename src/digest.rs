use reqwest::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use reqwest::{Response, StatusCode, Url};
use tracing::debug;

use crate::envoy::Envoy;
use crate::error::EnvoyError;

impl Envoy {
    /// Sends a GET with HTTP digest authentication using the installer credentials.
    ///
    /// The first request goes out bare. If the device answers 401 its challenge is
    /// answered once; any other status is handed back unchanged.
    pub(crate) async fn get_with_digest(&self, url: &str) -> Result<Response, EnvoyError> {
        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let challenge = response
            .headers()
            .get(WWW_AUTHENTICATE)
            .ok_or_else(|| EnvoyError::Auth("401 without a WWW-Authenticate challenge".into()))?
            .to_str()
            .map_err(|e| EnvoyError::Auth(format!("unreadable challenge: {e}")))?
            .to_string();
        debug!(%challenge, "answering digest challenge");

        let authorization = self.digest_authorization(url, &challenge)?;
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, authorization)
            .send()
            .await?;
        Ok(response)
    }

    fn digest_authorization(&self, url: &str, challenge: &str) -> Result<String, EnvoyError> {
        let uri = request_uri(url)?;
        let mut prompt = digest_auth::parse(challenge)
            .map_err(|e| EnvoyError::Auth(format!("bad challenge `{challenge}`: {e}")))?;
        let context = digest_auth::AuthContext::new(
            self.installer_username.as_str(),
            self.installer_password.as_str(),
            uri.as_str(),
        );
        let answer = prompt
            .respond(&context)
            .map_err(|e| EnvoyError::Auth(e.to_string()))?;
        Ok(answer.to_header_string())
    }
}

/// Path and query of `url`, as digest auth hashes it
fn request_uri(url: &str) -> Result<String, EnvoyError> {
    let parsed = Url::parse(url).map_err(|e| EnvoyError::Auth(format!("bad url `{url}`: {e}")))?;
    Ok(match parsed.query() {
        Some(query) => format!("{}?{}", parsed.path(), query),
        None => parsed.path().to_string(),
    })
}
