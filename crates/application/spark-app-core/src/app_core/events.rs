use crate::domain::{AppSettings, ConnectionState, StudentProfile};
use crate::progress::RunId;
use spark_core::{AgentProgressEvent, PlanRequest, PlanResult};

/// What a transport reports back for one run.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The stream for the run is open.
    Connected,
    AgentProgress(AgentProgressEvent),
    PlanComplete(PlanResult),
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum DomainEvent {
    // Boot state
    BootLoadingStarted,
    InitialStateLoaded {
        profile: StudentProfile,
        settings: AppSettings,
    },
    BootFailed {
        message: String,
    },

    ConnectionChanged(ConnectionState),

    // Planning
    PlanStarted {
        run_id: RunId,
        request: PlanRequest,
    },
    Transport {
        run_id: RunId,
        ev: TransportEvent,
    },
    PlanCancelled {
        run_id: RunId,
    },
    HistoryCleared,

    // Persistence
    ProfileSaved(StudentProfile),
    SettingsSaved(AppSettings),

    // User-visible errors
    UserError(String),
}
