use tracing::debug;

use crate::domain::{AppState, BootState};
use crate::progress::{reduce_run, RunEvent, RunPhase, RunState};

use super::events::{DomainEvent, TransportEvent};

pub fn reduce(mut state: AppState, ev: DomainEvent) -> AppState {
    match ev {
        DomainEvent::BootLoadingStarted => {
            state.boot = BootState::Loading;
        }

        DomainEvent::InitialStateLoaded { profile, settings } => {
            state.profile = profile;
            state.settings = settings;
            state.boot = BootState::Ready;
        }

        DomainEvent::BootFailed { message } => {
            state.boot = BootState::Failed(message);
        }

        DomainEvent::ConnectionChanged(c) => state.connection = c,

        DomainEvent::PlanStarted { run_id, request } => {
            state.run = RunState::starting(run_id);
            state.result = None;
            state.user_error = None;
            state.chat.push_user(&request.goal);
            state.last_request = Some(request);
        }

        DomainEvent::Transport { run_id, ev } => {
            if state.run.run_id != Some(run_id) {
                debug!(%run_id, "ignoring transport event from superseded run");
                return state;
            }
            apply_transport_event(&mut state, ev);
        }

        DomainEvent::PlanCancelled { run_id } => {
            if state.run.run_id == Some(run_id) && state.run.is_running() {
                state.run = reduce_run(
                    std::mem::take(&mut state.run),
                    RunEvent::Failed("Plan cancelled".into()),
                );
            }
        }

        DomainEvent::HistoryCleared => {
            state.chat.clear();
            state.run = RunState::idle();
            state.result = None;
            state.session_id = None;
            state.last_request = None;
            state.user_error = None;
        }

        DomainEvent::ProfileSaved(p) => state.profile = p,
        DomainEvent::SettingsSaved(s) => state.settings = s,

        DomainEvent::UserError(msg) => {
            state.user_error = Some(msg);
        }
    }
    state
}

fn apply_transport_event(state: &mut AppState, ev: TransportEvent) {
    let run = std::mem::take(&mut state.run);
    match ev {
        TransportEvent::Connected => {
            state.run = reduce_run(run, RunEvent::Connected);
        }

        TransportEvent::AgentProgress(event) => {
            let accepted = !run.is_terminal();
            state.run = reduce_run(run, RunEvent::Agent(event.clone()));
            if accepted {
                state.chat.apply_progress(&event);
            }
        }

        TransportEvent::PlanComplete(result) => {
            if run.phase == RunPhase::Error {
                state.run = run;
                return;
            }
            state.run = reduce_run(run, RunEvent::PlanComplete);
            if !result.session_id.trim().is_empty() {
                state.session_id = Some(result.session_id.clone());
            }
            if !result.final_plan.trim().is_empty() {
                state.chat.push_system(result.final_plan.trim());
            }
            state.result = Some(result);
        }

        TransportEvent::Error { message } => {
            let was_terminal = run.is_terminal();
            state.run = reduce_run(run, RunEvent::Failed(message.clone()));
            if !was_terminal {
                state.chat.push_error(&message);
            }
        }
    }
}
