mod support;

use spark_app_core::{chat_vm, reduce, AppState, ChatHistory, DomainEvent, TransportEvent};
use spark_core::{AgentName, AgentStatus, PlanRequest, PlanResult, ToolCall, ToolCallStatus};
use support::{agent_event, progress};
use uuid::Uuid;

fn tool(name: &str, status: ToolCallStatus) -> ToolCall {
    ToolCall {
        name: name.to_string(),
        function: Some("search".to_string()),
        status,
        result: serde_json::Value::Null,
        parameters: None,
        execution_time_ms: None,
        query: None,
        references_count: None,
        api_path: None,
        verb: None,
    }
}

fn started_state(goal: &str) -> (AppState, Uuid) {
    let run_id = Uuid::new_v4();
    let state = reduce(
        AppState::default(),
        DomainEvent::PlanStarted {
            run_id,
            request: PlanRequest {
                goal: goal.to_string(),
                ..Default::default()
            },
        },
    );
    (state, run_id)
}

#[test]
fn user_message_is_appended_without_meta() {
    let (state, _) = started_state("Help me become a data engineer");
    let messages = state.chat.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].is_user);
    assert!(messages[0].meta.is_none());
    assert_eq!(messages[0].text, "Help me become a data engineer");
}

#[test]
fn events_for_one_call_update_the_same_message_in_place() {
    let mut chat = ChatHistory::default();
    chat.push_user("goal");
    chat.apply_progress(&agent_event(AgentName::JobMarket, "c1", AgentStatus::Started, ""));
    chat.apply_progress(&agent_event(AgentName::CourseCatalog, "c2", AgentStatus::Started, ""));
    chat.apply_progress(&agent_event(AgentName::JobMarket, "c1", AgentStatus::Progress, "searching"));
    chat.apply_progress(&agent_event(AgentName::JobMarket, "c1", AgentStatus::Progress, "searching"));
    chat.apply_progress(&agent_event(AgentName::JobMarket, "c1", AgentStatus::Progress, "ranking"));
    chat.apply_progress(
        &agent_event(AgentName::JobMarket, "c1", AgentStatus::Completed, "Completed")
            .with_output("=== JOB LISTINGS ==="),
    );

    let messages = chat.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].id, "msg-2");

    let meta = messages[1].meta.as_ref().unwrap();
    assert_eq!(meta.call_id, "c1");
    assert_eq!(meta.progress_updates, vec!["searching", "ranking"]);
    assert_eq!(meta.status, AgentStatus::Completed);
    assert_eq!(messages[1].text, "=== JOB LISTINGS ===");

    let other = messages[2].meta.as_ref().unwrap();
    assert_eq!(other.agent, AgentName::CourseCatalog);
    assert_eq!(other.status, AgentStatus::Started);
}

#[test]
fn tool_calls_merge_by_name_and_function() {
    let mut chat = ChatHistory::default();
    chat.apply_progress(
        &agent_event(AgentName::JobMarket, "c1", AgentStatus::Progress, "calling")
            .with_tool_calls(vec![tool("jobs_api", ToolCallStatus::Calling)]),
    );
    chat.apply_progress(
        &agent_event(AgentName::JobMarket, "c1", AgentStatus::Progress, "calling")
            .with_tool_calls(vec![
                tool("jobs_api", ToolCallStatus::Completed),
                tool("kb", ToolCallStatus::Calling),
            ]),
    );
    let meta = chat.messages()[0].meta.as_ref().unwrap();
    assert_eq!(meta.tool_calls.len(), 2);
    assert_eq!(meta.tool_calls[0].status, ToolCallStatus::Completed);
}

#[test]
fn transport_error_appends_one_message() {
    let (state, run_id) = started_state("goal");
    let state = reduce(
        state,
        DomainEvent::Transport {
            run_id,
            ev: TransportEvent::Error {
                message: "connection reset".into(),
            },
        },
    );
    let state = reduce(
        state,
        DomainEvent::Transport {
            run_id,
            ev: TransportEvent::Error {
                message: "again".into(),
            },
        },
    );
    let state = reduce(
        state,
        DomainEvent::Transport {
            run_id,
            ev: progress(AgentName::JobMarket, "late", AgentStatus::Started, ""),
        },
    );

    let messages = state.chat.messages();
    assert_eq!(messages.len(), 2);
    assert!(!messages[1].is_user);
    assert!(messages[1].meta.is_none());
    assert!(messages[1].text.contains("connection reset"));
    assert_eq!(state.run.error.as_deref(), Some("connection reset"));
}

#[test]
fn plan_complete_keeps_session_and_posts_final_plan() {
    let (state, run_id) = started_state("goal");
    let state = reduce(
        state,
        DomainEvent::Transport {
            run_id,
            ev: TransportEvent::PlanComplete(PlanResult {
                goal: "goal".into(),
                session_id: "session-42".into(),
                final_plan: "Take CS 3345 next fall.".into(),
                ..Default::default()
            }),
        },
    );
    assert_eq!(state.session_id.as_deref(), Some("session-42"));
    assert_eq!(state.chat.len(), 2);
    assert_eq!(state.plan_request("next?").session_id.as_deref(), Some("session-42"));

    let vm = chat_vm(&state.chat);
    assert_eq!(vm.rows[1].text, "Take CS 3345 next fall.");
    assert_eq!(vm.rows[1].agent_label, None);
}

#[test]
fn clearing_history_discards_messages_log_and_run() {
    let (state, run_id) = started_state("goal");
    let state = reduce(
        state,
        DomainEvent::Transport {
            run_id,
            ev: progress(AgentName::JobMarket, "1", AgentStatus::Started, ""),
        },
    );
    assert!(!state.run.progress_log.is_empty());

    let state = reduce(state, DomainEvent::HistoryCleared);
    assert!(state.chat.is_empty());
    assert!(state.run.progress_log.is_empty());
    assert!(state.run.running_agents.is_empty());
    assert!(state.run.run_id.is_none());
    assert!(state.result.is_none());
}

#[test]
fn chat_rows_carry_agent_label_and_badge() {
    let chat = ChatHistory::from_log(&[
        agent_event(AgentName::ProjectAdvisor, "p", AgentStatus::Started, ""),
        agent_event(AgentName::from_label("Collaborator: mystery-agent"), "m", AgentStatus::Progress, "looking"),
    ]);
    let vm = chat_vm(&chat);
    assert_eq!(vm.rows[0].agent_label.as_deref(), Some("Project Advisor"));
    assert_eq!(vm.rows[0].status_badge, Some("started"));
    assert_eq!(vm.rows[0].text, "Project Advisor is working");
    assert_eq!(vm.rows[1].agent_label.as_deref(), Some("Collaborator: mystery-agent"));
    assert_eq!(vm.rows[1].progress_updates, vec!["looking"]);
}

#[test]
fn reused_call_id_in_a_new_run_gets_its_own_message() {
    let (state, first) = started_state("first goal");
    let transport = |state: AppState, run_id: Uuid, ev: TransportEvent| {
        reduce(state, DomainEvent::Transport { run_id, ev })
    };
    let state = transport(
        state,
        first,
        progress(AgentName::JobMarket, "job_market-1", AgentStatus::Started, "Started"),
    );
    let state = transport(
        state,
        first,
        TransportEvent::AgentProgress(
            agent_event(AgentName::JobMarket, "job_market-1", AgentStatus::Completed, "Completed")
                .with_output("run one output"),
        ),
    );
    let state = transport(state, first, TransportEvent::PlanComplete(PlanResult::default()));

    let second = Uuid::new_v4();
    let state = reduce(
        state,
        DomainEvent::PlanStarted {
            run_id: second,
            request: PlanRequest {
                goal: "second goal".into(),
                ..Default::default()
            },
        },
    );
    let state = transport(
        state,
        second,
        progress(AgentName::JobMarket, "job_market-1", AgentStatus::Progress, "thinking again"),
    );

    let agent_messages: Vec<_> = state
        .chat
        .messages()
        .iter()
        .filter_map(|m| m.meta.as_ref().map(|meta| (m, meta)))
        .collect();
    assert_eq!(agent_messages.len(), 2);

    let (old, old_meta) = agent_messages[0];
    assert_eq!(old.text, "run one output");
    assert_eq!(old_meta.status, AgentStatus::Completed);
    assert!(old_meta.progress_updates.is_empty());

    let (new, new_meta) = agent_messages[1];
    assert_eq!(new.text, "thinking again");
    assert_eq!(new_meta.status, AgentStatus::Progress);
    assert_eq!(new_meta.progress_updates, vec!["thinking again"]);
}
