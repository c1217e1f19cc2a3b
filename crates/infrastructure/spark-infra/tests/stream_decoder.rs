use spark_app_core::TransportEvent;
use spark_core::{AgentName, AgentStatus};
use spark_infra::StreamDecoder;

fn frame(json: &str) -> String {
    format!("data: {json}\n\n")
}

fn agent_events(events: &[TransportEvent]) -> Vec<(AgentName, String, AgentStatus)> {
    events
        .iter()
        .filter_map(|ev| match ev {
            TransportEvent::AgentProgress(p) => {
                Some((p.agent.clone(), p.call_id.clone(), p.lifecycle()))
            }
            _ => None,
        })
        .collect()
}

#[test]
fn backend_trace_stream_becomes_agent_lifecycle() {
    let mut decoder = StreamDecoder::new("Become a data engineer");
    let mut events = Vec::new();
    for json in [
        r#"{"type": "session", "session_id": "abc"}"#,
        r#"{"type": "trace", "session_id": "abc", "data": {"agent": "Supervisor", "reasoning": "Look at the market first."}}"#,
        r#"{"type": "trace", "session_id": "abc", "data": {"agent": "Supervisor", "calling_collaborator": "job-market-agent", "input_text": "data engineer"}}"#,
        r#"{"type": "trace", "session_id": "abc", "data": {"agent": "Collaborator: job-market-agent", "reasoning": "Querying listings"}}"#,
        r#"{"type": "trace", "session_id": "abc", "data": {"agent": "Supervisor", "collaborator_response": {"agent": "job-market-agent", "output": "=== JOB LISTINGS ===\nJob #1:\nTitle: Data Engineer\nCompany: Acme\n"}}}"#,
        r#"{"type": "chunk", "text": "Start with SQL. ", "session_id": "abc"}"#,
        r#"{"type": "chunk", "text": "Then Spark.", "session_id": "abc"}"#,
        r#"{"type": "done"}"#,
    ] {
        events.extend(decoder.push(frame(json).as_bytes()));
    }

    assert!(decoder.is_finished());
    assert_eq!(
        agent_events(&events),
        vec![
            (AgentName::CareerPlanner, "career_planner-1".into(), AgentStatus::Progress),
            (AgentName::JobMarket, "job_market-1".into(), AgentStatus::Started),
            (AgentName::JobMarket, "job_market-1".into(), AgentStatus::Progress),
            (AgentName::JobMarket, "job_market-1".into(), AgentStatus::Completed),
        ]
    );

    let Some(TransportEvent::PlanComplete(result)) = events.last() else {
        panic!("expected plan_complete, got {events:?}");
    };
    assert_eq!(result.goal, "Become a data engineer");
    assert_eq!(result.session_id, "abc");
    assert_eq!(result.final_plan, "Start with SQL. Then Spark.");
    assert!(result.job_market.as_deref().unwrap().contains("Data Engineer"));
    assert!(result.course_plan.is_none());
    assert_eq!(result.trace.len(), 4);
}

#[test]
fn frames_split_across_chunks_are_reassembled() {
    let mut decoder = StreamDecoder::new("g");
    let body = "data: {\"type\": \"error\",\r\ndata:  \"message\": \"boom\"}\r\n\r\n";
    let (a, b) = body.as_bytes().split_at(17);

    assert!(decoder.push(a).is_empty());
    let events = decoder.push(b);
    assert_eq!(
        events,
        vec![TransportEvent::Error {
            message: "boom".into()
        }]
    );
    assert!(decoder.is_finished());
}

#[test]
fn typed_frames_pass_through() {
    let mut decoder = StreamDecoder::new("g");
    let mut events = decoder.push(
        frame(
            r#"{"type": "agent_progress", "data": {"agent": "course_catalog", "call_id": "c-9", "event": "Searching catalog", "status": "progress", "toolCalls": [{"name": "catalog", "status": "calling"}]}}"#,
        )
        .as_bytes(),
    );
    events.extend(decoder.push(
        frame(r#"{"type": "plan_complete", "data": {"goal": "g", "session_id": "s-2", "final_plan": "ok"}}"#)
            .as_bytes(),
    ));

    match &events[0] {
        TransportEvent::AgentProgress(p) => {
            assert_eq!(p.agent, AgentName::CourseCatalog);
            assert_eq!(p.call_id, "c-9");
            assert_eq!(p.tool_calls.len(), 1);
        }
        other => panic!("unexpected {other:?}"),
    }
    match &events[1] {
        TransportEvent::PlanComplete(r) => assert_eq!(r.session_id, "s-2"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn garbage_and_unknown_frames_are_skipped() {
    let mut decoder = StreamDecoder::new("g");
    let body = format!(
        ": keep-alive\n\n{}{}{}",
        frame("not json"),
        frame(r#"{"type": "heartbeat"}"#),
        frame(r#"{"type": "chunk", "text": "hi"}"#),
    );
    assert!(decoder.push(body.as_bytes()).is_empty());
    assert!(!decoder.is_finished());
}

#[test]
fn trailing_frame_without_blank_line_is_flushed() {
    let mut decoder = StreamDecoder::new("g");
    assert!(decoder.push(br#"data: {"type": "done"}"#).is_empty());
    let events = decoder.finish();
    assert!(matches!(events.as_slice(), [TransportEvent::PlanComplete(_)]));
    assert!(decoder.is_finished());
}

#[test]
fn frames_after_the_end_are_ignored() {
    let mut decoder = StreamDecoder::new("g");
    decoder.push(frame(r#"{"type": "done"}"#).as_bytes());
    let late = decoder.push(frame(r#"{"type": "error", "message": "late"}"#).as_bytes());
    assert!(late.is_empty());
}

#[test]
fn replayed_lines_decode_without_sse_framing() {
    let mut decoder = StreamDecoder::new("g");
    let events = decoder.decode_frame(
        r#"{"type": "trace", "data": {"agent": "Collaborator: project-advisor", "collaborator_response": {"output": "=== PROJECT RECOMMENDATIONS ==="}}}"#,
    );
    assert_eq!(
        agent_events(&events),
        vec![(AgentName::ProjectAdvisor, "project_advisor-1".into(), AgentStatus::Completed)]
    );
    let events = decoder.decode_frame(r#"{"type": "done"}"#);
    let Some(TransportEvent::PlanComplete(result)) = events.first() else {
        panic!("expected plan_complete");
    };
    assert!(result.project_recommendations.is_some());
}
