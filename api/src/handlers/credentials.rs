//! HTTP Basic client credentials.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use cts_core::errors::OAuth2Error;

/// Extract `client_id:client_secret` from an `Authorization: Basic` header
///
/// # Returns
/// * `Ok(None)` - No Basic credentials were presented
/// * `Ok(Some((id, secret)))` - Decoded credentials
/// * `Err(OAuth2Error::InvalidClient)` - A Basic header that cannot be decoded
pub fn basic_credentials(headers: &HeaderMap) -> Result<Option<(String, String)>, OAuth2Error> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| OAuth2Error::invalid_client("Malformed Authorization header"))?;

    let Some((scheme, encoded)) = value.trim().split_once(' ') else {
        return Ok(None);
    };
    if !scheme.eq_ignore_ascii_case("basic") {
        return Ok(None);
    }

    let decoded = STANDARD
        .decode(encoded.trim())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| OAuth2Error::invalid_client("Malformed Basic credentials"))?;

    let (client_id, client_secret) = decoded
        .split_once(':')
        .ok_or_else(|| OAuth2Error::invalid_client("Malformed Basic credentials"))?;

    Ok(Some((client_id.to_string(), client_secret.to_string())))
}
