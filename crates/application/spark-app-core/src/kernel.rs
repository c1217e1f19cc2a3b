use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::app_core::{AppCommand, AppStore, DomainEvent, TransportEvent};
use crate::domain::{AppSettings, ConnectionState, StudentProfile};
use crate::ports::{PlanTransport, ProfileRepo, SettingsRepo, TransportSink};
use crate::progress::RunId;

/// Owns the ports and turns commands into events.
///
/// Background work posts into one queue; [`AppKernel::tick`] drains it on
/// the caller's thread so the store only ever has one writer.
pub struct AppKernel<T, P, S> {
    pub store: AppStore,
    transport: Arc<T>,
    profiles: Arc<P>,
    settings: Arc<S>,
    cancel: Option<CancellationToken>,

    tx: mpsc::Sender<DomainEvent>,
    rx: mpsc::Receiver<DomainEvent>,
}

impl<T, P, S> AppKernel<T, P, S>
where
    T: PlanTransport,
    P: ProfileRepo,
    S: SettingsRepo,
{
    pub fn new(store: AppStore, transport: T, profiles: P, settings: S) -> Self {
        let (tx, rx) = mpsc::channel(spark_config::EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            transport: Arc::new(transport),
            profiles: Arc::new(profiles),
            settings: Arc::new(settings),
            cancel: None,
            tx,
            rx,
        }
    }

    pub fn dispatch(&mut self, cmd: AppCommand) {
        match cmd {
            AppCommand::LoadInitialState => {
                self.store.apply(DomainEvent::BootLoadingStarted);
                let profiles = self.profiles.clone();
                let settings = self.settings.clone();
                self.spawn_blocking("spark-load-initial-state", move |tx| {
                    let res: anyhow::Result<(StudentProfile, AppSettings)> = (|| {
                        let p = profiles.load()?;
                        let s = settings.load()?;
                        Ok((p, s))
                    })();

                    let ev = match res {
                        Ok((profile, settings)) => {
                            DomainEvent::InitialStateLoaded { profile, settings }
                        }
                        Err(e) => DomainEvent::BootFailed {
                            message: format!("{e:#}"),
                        },
                    };
                    let _ = tx.blocking_send(ev);
                });
            }

            AppCommand::Connect => {
                let transport = self.transport.clone();
                self.spawn_async("spark-connect", move |tx| async move {
                    let ev = match transport.connect().await {
                        Ok(()) => DomainEvent::ConnectionChanged(ConnectionState::Connected),
                        Err(e) => DomainEvent::UserError(format!("Failed to connect: {e:#}")),
                    };
                    let _ = tx.send(ev).await;
                });
            }

            AppCommand::Disconnect => {
                if let Some(run_id) = self.cancel_current_run() {
                    self.store.apply(DomainEvent::PlanCancelled { run_id });
                }
                let transport = self.transport.clone();
                self.spawn_async("spark-disconnect", move |tx| async move {
                    if let Err(e) = transport.disconnect().await {
                        warn!("transport disconnect failed: {e:#}");
                    }
                    let _ = tx
                        .send(DomainEvent::ConnectionChanged(ConnectionState::Disconnected))
                        .await;
                });
            }

            AppCommand::StartPlan { goal } => {
                if goal.trim().is_empty() {
                    self.store
                        .apply(DomainEvent::UserError("Goal is required".into()));
                    return;
                }
                self.start_plan(&goal);
            }

            AppCommand::CancelPlan => {
                if let Some(run_id) = self.cancel_current_run() {
                    self.store.apply(DomainEvent::PlanCancelled { run_id });
                }
            }

            AppCommand::ClearHistory => {
                self.cancel_current_run();
                self.store.apply(DomainEvent::HistoryCleared);
            }

            AppCommand::SaveProfile(mut profile) => {
                profile.updated_at = Some(Utc::now());
                self.store.apply(DomainEvent::ProfileSaved(profile.clone()));
                let repo = self.profiles.clone();
                self.spawn_blocking("spark-save-profile", move |tx| {
                    if let Err(e) = repo.save(&profile) {
                        let _ = tx.blocking_send(DomainEvent::UserError(format!("{e:#}")));
                    }
                });
            }

            AppCommand::SaveSettings(settings) => {
                self.store
                    .apply(DomainEvent::SettingsSaved(settings.clone()));
                let repo = self.settings.clone();
                self.spawn_blocking("spark-save-settings", move |tx| {
                    if let Err(e) = repo.save(&settings) {
                        let _ = tx.blocking_send(DomainEvent::UserError(format!("{e:#}")));
                    }
                });
            }
        }
    }

    fn start_plan(&mut self, goal: &str) {
        self.cancel_current_run();
        let token = CancellationToken::new();
        self.cancel = Some(token.clone());

        let run_id: RunId = uuid::Uuid::new_v4();
        let request = self.store.read(|s| s.plan_request(goal));
        self.store.apply(DomainEvent::PlanStarted {
            run_id,
            request: request.clone(),
        });
        info!(%run_id, "starting plan run");

        let transport = self.transport.clone();
        self.spawn_async("spark-plan-run", move |tx| async move {
            let sink = TransportSink::new(run_id, tx);
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(%run_id, "plan run cancelled");
                }
                res = transport.run_plan(request, sink.clone()) => {
                    if let Err(e) = res {
                        warn!(%run_id, "plan run failed: {e:#}");
                        sink.emit(TransportEvent::Error { message: format!("{e:#}") }).await;
                    }
                }
            }
        });
    }

    /// Cancels the in-flight transport task, returning its run if one was
    /// still running.
    fn cancel_current_run(&mut self) -> Option<RunId> {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        self.store
            .read(|s| s.run.is_running().then_some(s.run.run_id).flatten())
    }

    fn spawn_blocking<F>(&self, name: &str, job: F)
    where
        F: FnOnce(mpsc::Sender<DomainEvent>) + Send + 'static,
    {
        let tx = self.tx.clone();
        let spawn_res = std::thread::Builder::new()
            .name(name.into())
            .spawn(move || job(tx));
        if let Err(e) = spawn_res {
            self.store.apply(DomainEvent::UserError(format!(
                "Failed to start {name} worker thread: {e}"
            )));
        }
    }

    fn spawn_async<F, Fut>(&self, name: &str, job: F)
    where
        F: FnOnce(mpsc::Sender<DomainEvent>) -> Fut + Send + 'static,
        Fut: Future<Output = ()>,
    {
        self.spawn_blocking(name, move |tx| {
            let rt = match crate::async_runtime::runtime() {
                Ok(rt) => rt,
                Err(e) => {
                    let _ = tx.blocking_send(DomainEvent::UserError(format!(
                        "Failed to start async runtime: {e}"
                    )));
                    return;
                }
            };
            rt.block_on(job(tx));
        });
    }

    /// Applies queued background events, dropping those of superseded runs.
    pub fn tick(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(ev) = self.rx.try_recv() {
            if let DomainEvent::Transport { run_id, .. } = &ev {
                let current = self.store.read(|s| s.run.run_id);
                if current != Some(*run_id) {
                    debug!(%run_id, "dropping stale transport event");
                    continue;
                }
            }
            self.store.apply(ev);
            applied += 1;
        }
        applied
    }

    pub fn sender(&self) -> mpsc::Sender<DomainEvent> {
        self.tx.clone()
    }
}
