// src/probe/http.rs
use super::{ProbeOutcome, Server, ServerCheck};
use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Cap on how much of a response body is carried into a condition message.
const MAX_MESSAGE_BYTES: usize = 4 * 1024;

/// Probes a backend over HTTP: 2xx is `Success`, any other status is
/// `Failure`, and a transport error or timeout is `Unknown`.
pub struct HttpServer {
    url: Url,
    path: String,
    client: Client,
}

impl HttpServer {
    pub fn new(url: Url, path: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url,
            path: path.into(),
            client,
        })
    }
}

#[async_trait]
impl Server for HttpServer {
    async fn do_server_check(&self) -> ServerCheck {
        let url = match self.url.join(&self.path) {
            Ok(url) => url,
            Err(e) => {
                return ServerCheck::new(ProbeOutcome::Unknown, "")
                    .with_error(anyhow!("invalid check path {:?}: {}", self.path, e))
            }
        };

        debug!(%url, "probing backend");

        match self.client.get(url.as_str()).send().await {
            Ok(response) => {
                let status = response.status();
                match response.text().await {
                    Ok(body) => {
                        let message = truncate_message(body);
                        if status.is_success() {
                            ServerCheck::new(ProbeOutcome::Success, message)
                        } else {
                            ServerCheck::new(ProbeOutcome::Failure, message)
                                .with_error(anyhow!("HTTP {}", status))
                        }
                    }
                    // The status line still decides the outcome; the broken
                    // body read is surfaced as the error.
                    Err(e) => {
                        let outcome = if status.is_success() {
                            ProbeOutcome::Success
                        } else {
                            ProbeOutcome::Failure
                        };
                        ServerCheck::new(outcome, "")
                            .with_error(anyhow!("failed to read response body: {e}"))
                    }
                }
            }
            Err(e) => ServerCheck::new(ProbeOutcome::Unknown, "").with_error(e.into()),
        }
    }
}

fn truncate_message(mut body: String) -> String {
    if body.len() > MAX_MESSAGE_BYTES {
        let mut end = MAX_MESSAGE_BYTES;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}
