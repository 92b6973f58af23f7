//! Request forwarding
//!
//! Streams a matched request to its upstream origin and the upstream's
//! response back to the caller. Each request is attempted exactly once;
//! an unreachable upstream surfaces as 502 without affecting the server.

use axum::{
    body::Body,
    extract::Request,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use devserve_config::ConfigError;
use devserve_core::{is_hop_by_hop, HOP_BY_HOP_HEADERS};
use thiserror::Error;
use tracing::{debug, error};
use url::Url;
use uuid::Uuid;

use crate::service::{ProxyService, RuleMatch};

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Configuration error: {0}")]
    Config(ConfigError),

    #[error("Failed to build HTTP client for prefix '{prefix}': {source}")]
    ClientBuild {
        prefix: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Upstream request to {upstream} failed: {source}")]
    Upstream {
        upstream: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to assemble response: {0}")]
    Response(#[from] axum::http::Error),
}

impl ProxyService {
    /// Forward a matched request to its upstream.
    ///
    /// Upstream failures map to 502 Bad Gateway; the request is never
    /// retried.
    pub async fn forward(&self, rule_match: RuleMatch<'_>, req: Request) -> Response {
        let upstream = rule_match.upstream().to_string();
        match self.forward_inner(rule_match, req).await {
            Ok(response) => response,
            Err(e) => {
                error!("Upstream request failed: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    [(header::CONTENT_TYPE, "text/plain")],
                    format!("Bad gateway: upstream {} is unreachable", upstream),
                )
                    .into_response()
            }
        }
    }

    async fn forward_inner(
        &self,
        rule_match: RuleMatch<'_>,
        req: Request,
    ) -> Result<Response, ProxyError> {
        let request_id = Uuid::new_v4().to_string();
        let url = upstream_url(rule_match.upstream(), &rule_match.path, req.uri().query());
        let entry = rule_match.entry;

        debug!(
            request_id = %request_id,
            method = %req.method(),
            path = %req.uri().path(),
            upstream = %url,
            "forwarding request"
        );

        let (parts, body) = req.into_parts();

        // Body framing headers tell us whether the inbound request
        // carries a body at all
        let has_body = parts.headers.contains_key(header::CONTENT_LENGTH)
            || parts.headers.contains_key(header::TRANSFER_ENCODING);

        let mut headers = parts.headers.clone();
        headers.remove(header::HOST);
        for name in HOP_BY_HOP_HEADERS {
            headers.remove(name);
        }
        if !entry.rule.change_origin {
            // Preserve the caller's Host; with change_origin the client
            // derives Host from the upstream URL instead
            if let Some(host) = parts.headers.get(header::HOST) {
                headers.insert(header::HOST, host.clone());
            }
        }

        let mut builder = entry
            .client
            .request(parts.method.clone(), url.clone())
            .headers(headers);
        if has_body {
            builder = builder.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        let upstream_response = builder.send().await.map_err(|e| ProxyError::Upstream {
            upstream: url.to_string(),
            source: e,
        })?;

        let status = upstream_response.status();
        debug!(request_id = %request_id, status = %status, "upstream responded");

        let mut response = Response::builder().status(status);
        if let Some(headers) = response.headers_mut() {
            // append, not insert, so repeated headers like set-cookie
            // survive the copy
            for (name, value) in upstream_response.headers() {
                if is_hop_by_hop(name.as_str()) {
                    continue;
                }
                headers.append(name.clone(), value.clone());
            }
        }
        let response = response.body(Body::from_stream(upstream_response.bytes_stream()))?;
        Ok(response)
    }
}

/// Assemble the forwarded URL: upstream origin + rewritten path, with the
/// inbound query string preserved verbatim
fn upstream_url(base: &Url, path: &str, query: Option<&str>) -> Url {
    let mut url = base.clone();
    let base_path = url.path().trim_end_matches('/').to_string();
    if base_path.is_empty() {
        url.set_path(path);
    } else {
        url.set_path(&format!("{base_path}{path}"));
    }
    url.set_query(query);
    url
}
