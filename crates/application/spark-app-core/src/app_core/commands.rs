use crate::domain::{AppSettings, StudentProfile};

#[derive(Debug, Clone)]
pub enum AppCommand {
    // Boot
    LoadInitialState,

    // Transport lifecycle
    Connect,
    Disconnect,

    // Planning
    StartPlan { goal: String },
    CancelPlan,
    ClearHistory,

    // Persistence
    SaveProfile(StudentProfile),
    SaveSettings(AppSettings),
}
