use std::time::Duration;

use reqwest::Response;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::envoy::{DecodePolicy, Envoy};
use crate::error::EnvoyError;
use crate::handlers::print_meter_summary;
use crate::readings::MeterPayload;

const METER_STREAM_PATH: &str = "/stream/meter";
const DATA_PREFIX: &str = "data: ";
/// Longest unterminated line kept while waiting for its newline
const MAX_LINE_BYTES: usize = 1024 * 1024;

impl Envoy {
    /// Reads `/stream/meter` until the connection fails, calling `handler` once per
    /// decoded event in arrival order.
    ///
    /// Only returns with an error. Reconnecting is left to the caller.
    pub async fn stream<H>(&self, handler: H) -> Result<(), EnvoyError>
    where
        H: FnMut(&MeterPayload),
    {
        self.stream_until(handler, CancellationToken::new()).await
    }

    /// [`Envoy::stream`] with the one-line summary printer as handler
    pub async fn stream_to_stdout(&self) -> Result<(), EnvoyError> {
        self.stream(print_meter_summary).await
    }

    /// Like [`Envoy::stream`], but returns `Ok(())` once `cancel` fires.
    ///
    /// The token is raced against every read and checked again before each line,
    /// so a handler may cancel and no further events are delivered.
    #[instrument(skip_all, fields(url = %self.url))]
    pub async fn stream_until<H>(
        &self,
        mut handler: H,
        cancel: CancellationToken,
    ) -> Result<(), EnvoyError>
    where
        H: FnMut(&MeterPayload),
    {
        let url = self.endpoint(METER_STREAM_PATH);
        let request_timeout = self.options.request_timeout;
        let mut response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            response = tokio::time::timeout(request_timeout, self.get_with_digest(&url)) => {
                response.map_err(|_| EnvoyError::Timeout(request_timeout))??
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(EnvoyError::Status { url, status });
        }
        info!("meter stream open");

        let mut lines = LineBuffer::default();
        let mut events = 0u64;
        loop {
            while let Some(line) = lines.next_line() {
                if cancel.is_cancelled() {
                    return Ok(());
                }
                let Some(json) = extract_payload(&line) else {
                    continue;
                };
                match decode_payload(json) {
                    Ok(payload) => {
                        events += 1;
                        handler(&payload);
                    }
                    Err(e) => match self.options.decode_policy {
                        DecodePolicy::Abort => return Err(e),
                        DecodePolicy::Skip => warn!("skipping meter event: {e}"),
                    },
                }
            }

            let chunk = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(()),
                chunk = next_chunk(&mut response, self.options.idle_timeout) => chunk?,
            };
            match chunk {
                Some(bytes) => lines.push(&bytes)?,
                None => {
                    debug!(events, "meter stream ended");
                    return Err(EnvoyError::StreamClosed);
                }
            }
        }
    }
}

async fn next_chunk(
    response: &mut Response,
    idle_timeout: Option<Duration>,
) -> Result<Option<impl AsRef<[u8]>>, EnvoyError> {
    let chunk = match idle_timeout {
        Some(limit) => tokio::time::timeout(limit, response.chunk())
            .await
            .map_err(|_| EnvoyError::Timeout(limit))??,
        None => response.chunk().await?,
    };
    Ok(chunk)
}

/// Returns the text after the first `data: ` on the line, if any.
///
/// Blank lines, comments and `event:` lines carry no payload.
pub fn extract_payload(line: &str) -> Option<&str> {
    line.find(DATA_PREFIX)
        .map(|start| &line[start + DATA_PREFIX.len()..])
}

/// Decodes the first JSON value of `json`. Anything after it is ignored.
pub fn decode_payload(json: &str) -> Result<MeterPayload, EnvoyError> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    MeterPayload::deserialize(&mut deserializer).map_err(|source| EnvoyError::Decode {
        payload: json.to_string(),
        source,
    })
}

/// Splits a chunked body into `\n` terminated lines.
/// Bytes after the last newline wait for the next chunk, up to `limit`.
struct LineBuffer {
    pending: Vec<u8>,
    limit: usize,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::with_limit(MAX_LINE_BYTES)
    }
}

impl LineBuffer {
    fn with_limit(limit: usize) -> Self {
        Self {
            pending: Vec::new(),
            limit,
        }
    }

    fn push(&mut self, chunk: &impl AsRef<[u8]>) -> Result<(), EnvoyError> {
        self.pending.extend_from_slice(chunk.as_ref());
        let unterminated = match self.pending.iter().rposition(|&b| b == b'\n') {
            Some(end) => self.pending.len() - end - 1,
            None => self.pending.len(),
        };
        if unterminated > self.limit {
            return Err(EnvoyError::LineTooLong(self.limit));
        }
        Ok(())
    }

    fn next_line(&mut self) -> Option<String> {
        let end = self.pending.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.pending.drain(..=end).collect();
        Some(String::from_utf8_lossy(&line[..end]).into_owned())
    }
}
