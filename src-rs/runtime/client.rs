use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::RuntimeConfig;
use crate::error::InvokeError;
use crate::runtime::body::{prefers_incremental, CompletionBody, SnapshotStream};
use crate::runtime::identity::IdentitySource;
use crate::runtime::trace::generate_trace_id;

pub const SESSION_HEADER: &str = "X-Amzn-Bedrock-AgentCore-Runtime-Session-Id";
pub const TRACE_HEADER: &str = "X-Amzn-Trace-Id";

#[derive(Debug, Serialize)]
struct InvocationRequest<'a> {
    prompt: &'a str,
    #[serde(rename = "runtimeSessionId")]
    runtime_session_id: &'a str,
    #[serde(rename = "userId")]
    user_id: &'a str,
}

/// Minimal percent-encoding for the ARN path segment (everything outside the
/// RFC 3986 unreserved set, which is what the runtime endpoint expects).
fn url_encode(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(b as char);
            }
            _ => {
                result.push('%');
                result.push_str(&format!("{:02X}", b));
            }
        }
    }
    result
}

/// Streams completions from a deployed agent runtime.
///
/// Configuration is injected at construction; independently configured
/// clients can coexist. Invocations are independent of each other: two
/// concurrent calls on the same session id both go out, and strict ordering
/// is the caller's job.
pub struct RuntimeClient {
    config: RuntimeConfig,
    identity: Arc<dyn IdentitySource>,
}

impl RuntimeClient {
    pub fn new(config: RuntimeConfig, identity: Arc<dyn IdentitySource>) -> Self {
        Self { config, identity }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Invokes the agent and drives `on_update` with the full completion text
    /// accumulated so far after every decoded chunk. Resolves with the final
    /// text once the stream ends. Runs to completion or failure; callers
    /// wanting to stop early should use [`RuntimeClient::invoke_stream`].
    pub async fn invoke<F>(
        &self,
        prompt: &str,
        session_id: &str,
        mut on_update: F,
    ) -> Result<String, InvokeError>
    where
        F: FnMut(&str),
    {
        let mut snapshots = self.invoke_stream(prompt, session_id).await?;
        let mut text = String::new();
        while let Some(snapshot) = tokio_stream::StreamExt::next(&mut snapshots).await {
            let snapshot = snapshot?;
            on_update(&snapshot);
            text = snapshot;
        }
        Ok(text)
    }

    /// Snapshot-stream form of [`RuntimeClient::invoke`]. Preconditions and
    /// the HTTP exchange happen before this returns; the stream then yields
    /// growing full-text snapshots. Dropping the stream abandons the request.
    pub async fn invoke_stream(
        &self,
        prompt: &str,
        session_id: &str,
    ) -> Result<SnapshotStream, InvokeError> {
        let user_id = self
            .identity
            .user_id()
            .await
            .map_err(|e| InvokeError::Authentication(format!("no user id available: {e}")))?;
        if user_id.trim().is_empty() {
            return Err(InvokeError::Authentication(
                "identity source returned an empty user id".to_string(),
            ));
        }

        let token = self
            .identity
            .bearer_token()
            .await
            .map_err(|e| InvokeError::Authentication(format!("no bearer token available: {e}")))?;
        if token.trim().is_empty() {
            return Err(InvokeError::Authentication(
                "identity source returned an empty bearer token".to_string(),
            ));
        }

        let arn = self.config.agent_runtime_arn.trim();
        if arn.is_empty() {
            return Err(InvokeError::Configuration(
                "agent_runtime_arn is not set".to_string(),
            ));
        }

        let url = format!(
            "{}/runtimes/{}/invocations?qualifier={}",
            self.config.endpoint_url(),
            url_encode(arn),
            url_encode(&self.config.qualifier),
        );
        let trace_id = generate_trace_id();
        let payload = InvocationRequest {
            prompt,
            runtime_session_id: session_id,
            user_id: &user_id,
        };

        // reqwest's timeout() only covers the initial exchange, not stream
        // reads; those get a per-chunk timeout below.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        log::debug!("invoking agent runtime at {} (trace {})", url, trace_id);

        let response = client
            .post(&url)
            .header("authorization", format!("Bearer {}", token))
            .header(TRACE_HEADER, &trace_id)
            .header(SESSION_HEADER, session_id)
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("agent runtime error ({}): {}", status, body);
            return Err(InvokeError::Protocol {
                status: status.as_u16(),
                body,
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        log::debug!(
            "agent runtime answered {} with content-type {:?}",
            status,
            content_type
        );

        let body = if prefers_incremental(content_type.as_deref()) {
            let chunk_timeout = Duration::from_secs(self.config.chunk_timeout_secs.max(1));
            let stream = response.bytes_stream();
            CompletionBody::Streamed(Box::pin(async_stream::stream! {
                let mut byte_stream = Box::pin(stream);
                let mut chunk_num = 0u64;
                loop {
                    match tokio::time::timeout(
                        chunk_timeout,
                        tokio_stream::StreamExt::next(&mut byte_stream),
                    )
                    .await
                    {
                        Ok(Some(Ok(bytes))) => {
                            chunk_num += 1;
                            log::trace!("received chunk #{}: {} bytes", chunk_num, bytes.len());
                            yield Ok(bytes.to_vec());
                        }
                        Ok(Some(Err(e))) => {
                            log::error!("stream read error on chunk #{}: {}", chunk_num + 1, e);
                            yield Err(InvokeError::from(e));
                            break;
                        }
                        Ok(None) => {
                            log::debug!("stream ended after {} chunks", chunk_num);
                            break;
                        }
                        Err(_) => {
                            log::error!(
                                "stream stalled for {}s waiting for chunk #{}",
                                chunk_timeout.as_secs(),
                                chunk_num + 1
                            );
                            yield Err(InvokeError::Transport(format!(
                                "stream read timed out after {}s",
                                chunk_timeout.as_secs()
                            )));
                            break;
                        }
                    }
                }
            }))
        } else {
            CompletionBody::Whole(response.bytes().await?.to_vec())
        };

        Ok(body.snapshots())
    }
}
