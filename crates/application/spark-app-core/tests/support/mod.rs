#![allow(dead_code)]

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use spark_app_core::{
    AppKernel, AppSettings, AppState, PlanTransport, ProfileRepo, SettingsRepo, StudentProfile,
    TransportEvent, TransportSink,
};
use spark_core::{AgentName, AgentProgressEvent, AgentStatus, PlanRequest};

pub enum Ending {
    Finish,
    Hang,
    Fail(&'static str),
}

/// Replays a fixed list of events for every plan it is asked to run.
pub struct ScriptedTransport {
    pub script: Vec<TransportEvent>,
    pub ending: Ending,
    pub requests: Mutex<Vec<PlanRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<TransportEvent>, ending: Ending) -> Self {
        Self {
            script,
            ending,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PlanTransport for ScriptedTransport {
    async fn connect(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn disconnect(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn run_plan(&self, request: PlanRequest, sink: TransportSink) -> anyhow::Result<()> {
        self.requests.lock().unwrap().push(request);
        for ev in &self.script {
            sink.emit(ev.clone()).await;
        }
        match self.ending {
            Ending::Finish => Ok(()),
            Ending::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
            Ending::Fail(message) => Err(anyhow::anyhow!(message)),
        }
    }
}

#[derive(Default)]
pub struct MemoryRepo {
    pub profile: Mutex<StudentProfile>,
    pub settings: Mutex<AppSettings>,
}

impl ProfileRepo for MemoryRepo {
    fn load(&self) -> anyhow::Result<StudentProfile> {
        Ok(self.profile.lock().unwrap().clone())
    }
    fn save(&self, profile: &StudentProfile) -> anyhow::Result<()> {
        *self.profile.lock().unwrap() = profile.clone();
        Ok(())
    }
}

impl SettingsRepo for MemoryRepo {
    fn load(&self) -> anyhow::Result<AppSettings> {
        Ok(self.settings.lock().unwrap().clone())
    }
    fn save(&self, settings: &AppSettings) -> anyhow::Result<()> {
        *self.settings.lock().unwrap() = settings.clone();
        Ok(())
    }
}

pub fn agent_event(
    agent: AgentName,
    call_id: &str,
    status: AgentStatus,
    label: &str,
) -> AgentProgressEvent {
    AgentProgressEvent::new(agent, call_id, status, label)
}

pub fn progress(agent: AgentName, call_id: &str, status: AgentStatus, label: &str) -> TransportEvent {
    TransportEvent::AgentProgress(agent_event(agent, call_id, status, label))
}

/// Ticks the kernel until `done` holds, failing after a few seconds.
pub fn pump_until<T, P, S>(
    kernel: &mut AppKernel<T, P, S>,
    mut done: impl FnMut(&AppState) -> bool,
) -> AppState
where
    T: PlanTransport,
    P: ProfileRepo,
    S: SettingsRepo,
{
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        kernel.tick();
        let state = kernel.store.state();
        if done(&state) {
            return state;
        }
        if Instant::now() > deadline {
            panic!("timed out waiting for state; run = {:?}", state.run);
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}
