use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use spark_app_core::{PlanTransport, TransportEvent, TransportSink};
use spark_config::{HEALTH_ENDPOINT, HEALTH_TIMEOUT_SECS, PLAN_ENDPOINT};
use spark_core::PlanRequest;
use tracing::{debug, info, warn};

use crate::error::TransportError;
use crate::sse::StreamDecoder;

/// Plan transport over HTTP: one POST per plan, answered with an event stream.
#[derive(Debug, Clone)]
pub struct SseTransport {
    client: Client,
    base: Url,
}

impl SseTransport {
    pub fn new(server_url: &str) -> Result<Self, TransportError> {
        let client = Client::builder().build()?;
        Self::with_client(client, server_url)
    }

    pub fn with_client(client: Client, server_url: &str) -> Result<Self, TransportError> {
        let base = Url::parse(server_url.trim()).map_err(|e| TransportError::InvalidUrl {
            url: server_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(TransportError::InvalidUrl {
                url: server_url.to_string(),
                reason: format!("unsupported scheme {}", base.scheme()),
            });
        }
        Ok(Self { client, base })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base.as_str().trim_end_matches('/'), path)
    }

    async fn stream_plan(
        &self,
        request: &PlanRequest,
        sink: &TransportSink,
    ) -> Result<(), TransportError> {
        let url = self.endpoint(PLAN_ENDPOINT);
        info!("Starting plan stream at {url}");

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        if !sink.emit(TransportEvent::Connected).await {
            return Ok(());
        }

        let mut decoder = StreamDecoder::new(&request.goal);
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            for ev in decoder.push(&chunk) {
                if !sink.emit(ev).await {
                    debug!("Receiver dropped; abandoning plan stream");
                    return Ok(());
                }
            }
            if decoder.is_finished() {
                break;
            }
        }

        for ev in decoder.finish() {
            if !sink.emit(ev).await {
                return Ok(());
            }
        }

        if decoder.is_finished() {
            info!("Plan stream finished");
            Ok(())
        } else {
            warn!("Plan stream closed before a terminal frame");
            Err(TransportError::Incomplete)
        }
    }
}

#[async_trait]
impl PlanTransport for SseTransport {
    async fn connect(&self) -> anyhow::Result<()> {
        let url = self.endpoint(HEALTH_ENDPOINT);
        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(HEALTH_TIMEOUT_SECS))
            .send()
            .await
            .map_err(TransportError::from)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }
            .into());
        }
        info!("Planner reachable at {}", self.base);
        Ok(())
    }

    async fn disconnect(&self) -> anyhow::Result<()> {
        // Streams are per request; nothing stays open between plans.
        debug!("Disconnect requested");
        Ok(())
    }

    async fn run_plan(&self, request: PlanRequest, sink: TransportSink) -> anyhow::Result<()> {
        self.stream_plan(&request, &sink).await.map_err(|e| {
            warn!(kind = ?e.kind(), "Plan stream failed: {e}");
            anyhow::Error::new(e)
        })
    }
}
