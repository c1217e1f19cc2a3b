mod support;

use spark_app_core::{progress_percent, reduce_run, ChatHistory, RunEvent, RunPhase, RunState};
use spark_core::{AgentName, AgentProgressEvent, AgentStatus};
use support::agent_event;

fn fold(state: RunState, events: &[AgentProgressEvent]) -> RunState {
    events
        .iter()
        .cloned()
        .fold(state, |s, e| reduce_run(s, RunEvent::Agent(e)))
}

#[test]
fn started_progress_completed_leaves_one_finished_message() {
    let events = vec![
        agent_event(AgentName::JobMarket, "1", AgentStatus::Started, ""),
        agent_event(AgentName::JobMarket, "1", AgentStatus::Progress, "thinking"),
        agent_event(AgentName::JobMarket, "1", AgentStatus::Completed, "Completed"),
    ];

    let after_two = fold(RunState::idle(), &events[..2]);
    assert!(after_two.running_agents.contains(&AgentName::JobMarket));
    assert_eq!(after_two.phase, RunPhase::Running);

    let state = fold(RunState::idle(), &events);
    assert!(state.running_agents.is_empty());
    assert_eq!(state.progress_log.len(), 3);

    let chat = ChatHistory::from_log(&events);
    assert_eq!(chat.len(), 1);
    let meta = chat.messages()[0].meta.as_ref().unwrap();
    assert_eq!(meta.progress_updates, vec!["thinking".to_string()]);
    assert_eq!(meta.status, AgentStatus::Completed);
}

#[test]
fn plan_complete_clears_agents_still_running() {
    let state = fold(
        RunState::idle(),
        &[
            agent_event(AgentName::JobMarket, "a", AgentStatus::Started, ""),
            agent_event(AgentName::CourseCatalog, "b", AgentStatus::Started, ""),
            agent_event(AgentName::JobMarket, "a", AgentStatus::Completed, "done"),
        ],
    );
    assert_eq!(
        state.running_agents.iter().collect::<Vec<_>>(),
        vec![&AgentName::CourseCatalog]
    );

    let state = reduce_run(state, RunEvent::PlanComplete);
    assert!(state.running_agents.is_empty());
    assert_eq!(state.phase, RunPhase::Completed);
}

#[test]
fn started_is_idempotent_and_completion_needs_no_start() {
    let state = fold(
        RunState::idle(),
        &[
            agent_event(AgentName::ProjectAdvisor, "p", AgentStatus::Started, ""),
            agent_event(AgentName::ProjectAdvisor, "p", AgentStatus::Started, ""),
        ],
    );
    assert_eq!(state.running_agents.len(), 1);

    let state = fold(
        RunState::idle(),
        &[agent_event(AgentName::CareerPlanner, "x", AgentStatus::Completed, "")],
    );
    assert!(state.running_agents.is_empty());
    assert_eq!(state.calls["x"].status, AgentStatus::Completed);
}

#[test]
fn completed_flag_wins_over_status() {
    let mut done = agent_event(AgentName::JobMarket, "1", AgentStatus::Progress, "wrapping up");
    done.completed = Some(true);
    let state = fold(
        RunState::idle(),
        &[agent_event(AgentName::JobMarket, "1", AgentStatus::Started, ""), done],
    );
    assert!(state.running_agents.is_empty());
}

#[test]
fn late_progress_does_not_reopen_a_finished_call() {
    let state = fold(
        RunState::idle(),
        &[
            agent_event(AgentName::JobMarket, "1", AgentStatus::Completed, "Completed"),
            agent_event(AgentName::JobMarket, "1", AgentStatus::Progress, "straggler"),
        ],
    );
    assert!(state.running_agents.is_empty());
    assert_eq!(state.calls["1"].status, AgentStatus::Completed);
    assert_eq!(state.calls["1"].label, "straggler");
}

#[test]
fn error_is_terminal_and_later_events_are_ignored() {
    let state = fold(
        RunState::idle(),
        &[agent_event(AgentName::JobMarket, "1", AgentStatus::Started, "")],
    );
    let state = reduce_run(state, RunEvent::Failed("boom".into()));
    assert_eq!(state.phase, RunPhase::Error);
    assert!(state.running_agents.is_empty());

    let state = reduce_run(state, RunEvent::Failed("second".into()));
    assert_eq!(state.error.as_deref(), Some("boom"));

    let state = fold(
        state,
        &[agent_event(AgentName::CourseCatalog, "2", AgentStatus::Started, "")],
    );
    assert!(state.running_agents.is_empty());
    assert_eq!(state.progress_log.len(), 1);

    let state = reduce_run(state, RunEvent::PlanComplete);
    assert_eq!(state.phase, RunPhase::Error);
}

#[test]
fn progress_heuristic_counts_completion_words() {
    let events: Vec<_> = [
        "Completed",
        "Report generated",
        "thinking",
        "analysis completed",
    ]
    .iter()
    .enumerate()
    .map(|(i, label)| {
        agent_event(
            AgentName::JobMarket,
            &i.to_string(),
            AgentStatus::Progress,
            label,
        )
    })
    .collect();
    let state = fold(RunState::idle(), &events);
    // 3 signals over 4 agents * 2
    assert_eq!(progress_percent(&state), 38);

    let many: Vec<_> = (0..20)
        .map(|i| agent_event(AgentName::JobMarket, &i.to_string(), AgentStatus::Progress, "Completed"))
        .collect();
    assert_eq!(progress_percent(&fold(RunState::idle(), &many)), 100);
    assert_eq!(progress_percent(&RunState::idle()), 0);
}

#[test]
fn error_after_completion_is_ignored() {
    let state = reduce_run(RunState::starting(uuid::Uuid::new_v4()), RunEvent::PlanComplete);
    let state = reduce_run(state, RunEvent::Failed("stream reset".into()));
    assert_eq!(state.phase, RunPhase::Completed);
    assert_eq!(state.error, None);
}
