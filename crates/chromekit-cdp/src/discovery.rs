//! CDP target discovery via Chrome's HTTP debugging endpoint.
//!
//! `GET http://{host}:{port}/json` returns the list of inspectable targets;
//! each target's `webSocketDebuggerUrl` is the transport the session attaches
//! to.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::error::CdpError;

/// Default timeout for the discovery HTTP request.
const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// One entry of the `/json` target list.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub target_type: String,
    pub title: String,
    pub url: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: String,
}

/// List every target currently exposed by Chrome's debugging endpoint.
///
/// # Errors
///
/// Returns an error if the endpoint cannot be reached or the response is not
/// a JSON array of targets.
#[instrument(level = "info")]
pub async fn list_targets(host: &str, port: u16) -> Result<Vec<TargetInfo>, CdpError> {
    let url = format!("http://{host}:{port}/json");
    debug!(%url, "enumerating CDP targets");

    let client = reqwest::Client::builder()
        .timeout(DEFAULT_DISCOVERY_TIMEOUT)
        .build()
        .map_err(|e| CdpError::HttpRequestFailed(e.to_string()))?;

    let response = client.get(&url).send().await.map_err(|e| {
        if e.is_timeout() {
            CdpError::ConnectionTimeout(url.clone())
        } else {
            CdpError::HttpRequestFailed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(CdpError::DiscoveryFailed {
            url,
            reason: format!("HTTP status {}", response.status()),
        });
    }

    response
        .json::<Vec<TargetInfo>>()
        .await
        .map_err(|e| CdpError::DiscoveryFailed {
            url,
            reason: format!("failed to parse target list: {e}"),
        })
}

/// Discover a single target to attach to.
///
/// When `tab` names a target id, returns that target exactly. Otherwise
/// returns the first `page`-typed target, which is Chrome's "currently
/// focused tab" by listing convention.
///
/// # Errors
///
/// Returns an error if discovery fails or no matching target is found.
#[instrument(level = "info", skip(tab))]
pub async fn discover_target(
    host: &str,
    port: u16,
    tab: Option<&str>,
) -> Result<TargetInfo, CdpError> {
    let targets = list_targets(host, port).await?;

    if let Some(tab_id) = tab {
        let found = targets.into_iter().find(|t| t.id == tab_id);
        return found.ok_or_else(|| CdpError::DiscoveryFailed {
            url: format!("http://{host}:{port}/json"),
            reason: format!("no target with id {tab_id}"),
        });
    }

    let found = targets.into_iter().find(|t| t.target_type == "page");
    let target = found.ok_or_else(|| CdpError::DiscoveryFailed {
        url: format!("http://{host}:{port}/json"),
        reason: "no page target available".to_string(),
    })?;

    info!(target_id = %target.id, url = %target.url, "attaching to target");
    Ok(target)
}

/// Open a new tab via `PUT /json/new?{url}`, returning its target info.
///
/// # Errors
///
/// Returns an error if the endpoint cannot be reached or the response is not
/// a single JSON target entry.
#[instrument(level = "info")]
pub async fn create_target(host: &str, port: u16, url: Option<&str>) -> Result<TargetInfo, CdpError> {
    let endpoint = match url {
        Some(url) => format!("http://{host}:{port}/json/new?{url}"),
        None => format!("http://{host}:{port}/json/new"),
    };
    debug!(%endpoint, "creating new target");

    let client = reqwest::Client::builder()
        .timeout(DEFAULT_DISCOVERY_TIMEOUT)
        .build()
        .map_err(|e| CdpError::HttpRequestFailed(e.to_string()))?;

    let response = client.put(&endpoint).send().await.map_err(|e| {
        if e.is_timeout() {
            CdpError::ConnectionTimeout(endpoint.clone())
        } else {
            CdpError::HttpRequestFailed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(CdpError::DiscoveryFailed {
            url: endpoint,
            reason: format!("HTTP status {}", response.status()),
        });
    }

    response.json::<TargetInfo>().await.map_err(|e| CdpError::DiscoveryFailed {
        url: endpoint,
        reason: format!("failed to parse new target: {e}"),
    })
}

/// Close a tab via `GET /json/close/{target_id}`.
///
/// # Errors
///
/// Returns an error if the endpoint cannot be reached or rejects the id.
#[instrument(level = "info")]
pub async fn close_target(host: &str, port: u16, target_id: &str) -> Result<(), CdpError> {
    let endpoint = format!("http://{host}:{port}/json/close/{target_id}");
    debug!(%endpoint, "closing target");

    let client = reqwest::Client::builder()
        .timeout(DEFAULT_DISCOVERY_TIMEOUT)
        .build()
        .map_err(|e| CdpError::HttpRequestFailed(e.to_string()))?;

    let response = client.get(&endpoint).send().await.map_err(|e| {
        if e.is_timeout() {
            CdpError::ConnectionTimeout(endpoint.clone())
        } else {
            CdpError::HttpRequestFailed(e.to_string())
        }
    })?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(CdpError::DiscoveryFailed {
            url: endpoint,
            reason: format!("HTTP status {}", response.status()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_info_deserializes_from_json_list_entry() {
        let raw = r#"{
            "id": "ABCD1234",
            "type": "page",
            "title": "Example",
            "url": "https://example.org/",
            "webSocketDebuggerUrl": "ws://localhost:9222/devtools/page/ABCD1234"
        }"#;
        let target: TargetInfo = serde_json::from_str(raw).unwrap();
        assert_eq!(target.id, "ABCD1234");
        assert_eq!(target.target_type, "page");
    }
}
