/*!
 * Shared HTTP plumbing for the concrete adapters: one owned reqwest
 * client per adapter, uniform mapping from transport and status failures
 * to the adapter error taxonomy.
 */

use std::time::Duration;

use log::error;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::AdapterError;

/// Client with the adapter's timeout applied to every request
pub(crate) fn build_client(timeout: Duration) -> Client {
    Client::builder().timeout(timeout).build().unwrap_or_default()
}

/// POST a JSON body and parse a JSON response, mapping transport errors,
/// timeouts and non-success statuses to `AdapterError`.
pub(crate) async fn post_json<Req, Resp>(
    client: &Client,
    url: &str,
    body: &Req,
    timeout: Duration,
) -> Result<Resp, AdapterError>
where
    Req: Serialize + ?Sized,
    Resp: DeserializeOwned,
{
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| map_send_error(e, timeout))?;

    read_json(response, timeout).await
}

/// GET a URL and parse a JSON response with the same error mapping
pub(crate) async fn get_json<Resp: DeserializeOwned>(
    client: &Client,
    url: &str,
    query: &[(&str, &str)],
    timeout: Duration,
) -> Result<Resp, AdapterError> {
    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| map_send_error(e, timeout))?;

    read_json(response, timeout).await
}

async fn read_json<Resp: DeserializeOwned>(
    response: reqwest::Response,
    timeout: Duration,
) -> Result<Resp, AdapterError> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "failed to read error body".to_string());
        error!("Upstream error ({}): {}", status, truncate(&message));
        return Err(AdapterError::UpstreamError {
            status_code: status.as_u16(),
            message: truncate(&message),
        });
    }

    let text = response.text().await.map_err(|e| map_send_error(e, timeout))?;
    serde_json::from_str(&text).map_err(|e| {
        error!("Failed to parse upstream response: {}. Raw (first 500 chars): {}", e, truncate(&text));
        AdapterError::UpstreamError {
            status_code: status.as_u16(),
            message: format!("invalid response body: {}", e),
        }
    })
}

fn map_send_error(error: reqwest::Error, timeout: Duration) -> AdapterError {
    if error.is_timeout() {
        AdapterError::Timeout(timeout)
    } else {
        AdapterError::UpstreamUnavailable(error.to_string())
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() > 500 {
        text.chars().take(500).collect()
    } else {
        text.to_string()
    }
}
