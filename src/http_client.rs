use std::time::Duration;

use anyhow::{bail, Result};
use embedded_svc::http::client::Client;
use embedded_svc::http::Method;
use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
use log::info;

use crate::error::FetchError;

const READ_CHUNK: usize = 1024;

/// HTTPS GET against the bundled CA store. The body must be JSON (start
/// with `{`) and no larger than `max_bytes`.
pub fn https_get(url: &str, timeout: Duration, max_bytes: usize) -> Result<String> {
    let config = Configuration {
        timeout: Some(timeout),
        use_global_ca_store: true,
        crt_bundle_attach: Some(esp_idf_sys::esp_crt_bundle_attach),
        buffer_size: Some(READ_CHUNK * 2),
        ..Default::default()
    };

    let connection = EspHttpConnection::new(&config)?;
    let mut client = Client::wrap(connection);

    let headers = [("accept", "application/json")];
    let mut response = client.request(Method::Get, url, &headers)?.submit()?;

    let status = response.status();
    info!("HTTP GET {} -> status {}", url.chars().take(80).collect::<String>(), status);

    if status == 429 {
        bail!("API rate limited (HTTP 429)");
    }
    if status != 200 {
        bail!("HTTP error: status {}", status);
    }

    let mut body: Vec<u8> = Vec::new();
    let mut buf = [0u8; READ_CHUNK];
    loop {
        let n = response.read(&mut buf)?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buf[..n]);
        if body.len() > max_bytes {
            bail!("Response too large (>{} bytes)", max_bytes);
        }
    }

    let text = String::from_utf8(body)?;
    if !text.trim_start().starts_with('{') {
        bail!("Response is not JSON");
    }
    info!("HTTP body {} bytes", text.len());

    Ok(text)
}

/// Same as [`https_get`] with failures folded into the retryable class.
pub fn fetch_json(url: &str, timeout: Duration, max_bytes: usize) -> Result<String, FetchError> {
    https_get(url, timeout, max_bytes).map_err(|e| FetchError::Network(format!("{:#}", e)))
}
