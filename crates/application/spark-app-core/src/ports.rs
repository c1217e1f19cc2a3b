use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::app_core::{DomainEvent, TransportEvent};
use crate::domain::{AppSettings, StudentProfile};
use crate::progress::RunId;
use spark_core::PlanRequest;

pub trait ProfileRepo: Send + Sync + 'static {
    fn load(&self) -> anyhow::Result<StudentProfile>;
    fn save(&self, profile: &StudentProfile) -> anyhow::Result<()>;
}

pub trait SettingsRepo: Send + Sync + 'static {
    fn load(&self) -> anyhow::Result<AppSettings>;
    fn save(&self, settings: &AppSettings) -> anyhow::Result<()>;
}

/// Streams one plan from the backend.
///
/// `run_plan` reports everything it sees through the sink and returns once
/// the stream is finished. An `Err` means the run ended without a terminal
/// event; the caller surfaces it as a transport error.
#[async_trait]
pub trait PlanTransport: Send + Sync + 'static {
    async fn connect(&self) -> anyhow::Result<()>;
    async fn disconnect(&self) -> anyhow::Result<()>;
    async fn run_plan(&self, request: PlanRequest, sink: TransportSink) -> anyhow::Result<()>;
}

/// Run-tagged handle a transport posts its events into.
#[derive(Debug, Clone)]
pub struct TransportSink {
    run_id: RunId,
    tx: mpsc::Sender<DomainEvent>,
}

impl TransportSink {
    pub fn new(run_id: RunId, tx: mpsc::Sender<DomainEvent>) -> Self {
        Self { run_id, tx }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Returns `false` once the receiving side is gone.
    pub async fn emit(&self, ev: TransportEvent) -> bool {
        self.tx
            .send(DomainEvent::Transport {
                run_id: self.run_id,
                ev,
            })
            .await
            .is_ok()
    }
}
