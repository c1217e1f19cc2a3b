use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use indicatif::{ProgressBar, ProgressStyle};
use spark_app_core::{
    chat_vm, reduce, results_vm, run_vm, AppCommand, AppKernel, AppState, AppStore, BootState,
    DomainEvent, FilePersistence, RunPhase, TransportEvent,
};
use spark_config::PLAN_TIMEOUT_SECS;
use spark_core::formats::{
    parse_course_plan, parse_job_market, parse_projects, validate, FormatReport, RecordKind,
};
use spark_core::stats::{extract, StatItem};
use spark_core::PlanRequest;
use spark_infra::{SseTransport, StreamDecoder, TransportError};
use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::CliRecordKind;

/// Parsed record as JSON plus its stats, or `None` when the blob holds no data.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub record: serde_json::Value,
    pub stats: Vec<StatItem>,
}

fn read_input(path: &Utf8PathBuf) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))
}

pub fn parse_blob(kind: CliRecordKind, text: &str) -> Result<Option<ParseOutcome>> {
    let outcome = match RecordKind::from(kind) {
        RecordKind::JobMarket => parse_job_market(text)
            .map(|r| Ok::<_, serde_json::Error>((serde_json::to_value(&r)?, extract(&r))))
            .transpose()?,
        RecordKind::Course => parse_course_plan(text)
            .map(|r| Ok::<_, serde_json::Error>((serde_json::to_value(&r)?, extract(&r))))
            .transpose()?,
        RecordKind::Project => parse_projects(text)
            .map(|r| Ok::<_, serde_json::Error>((serde_json::to_value(&r)?, extract(&r))))
            .transpose()?,
    };
    Ok(outcome.map(|(record, stats)| ParseOutcome { record, stats }))
}

pub fn cmd_parse(kind: CliRecordKind, path: Utf8PathBuf) -> Result<Option<ParseOutcome>> {
    let text = read_input(&path)?;
    let outcome = parse_blob(kind, &text)?;

    match &outcome {
        Some(parsed) => {
            println!("{}", serde_json::to_string_pretty(&parsed.record)?);
            println!("\n:: Stats");
            print_stats(&parsed.stats);
        }
        None => println!(":: No {} data found in {}", RecordKind::from(kind).label(), path),
    }
    Ok(outcome)
}

pub fn cmd_validate(kind: CliRecordKind, path: Utf8PathBuf) -> Result<FormatReport> {
    let text = read_input(&path)?;
    let report = validate(kind.into(), &text);

    println!(":: {}", report.summary());
    for e in &report.errors {
        println!("   error:   {e}");
    }
    for w in &report.warnings {
        println!("   warning: {w}");
    }
    Ok(report)
}

/// Folds recorded frames (one JSON payload per line) through the decoder and
/// the reducer, as if they had arrived live.
pub fn replay_frames(goal: &str, frames: &str) -> AppState {
    let run_id = uuid::Uuid::new_v4();
    let request = PlanRequest {
        goal: goal.to_string(),
        ..Default::default()
    };
    let mut state = reduce(
        AppState {
            boot: BootState::Ready,
            ..Default::default()
        },
        DomainEvent::PlanStarted { run_id, request },
    );

    let mut decoder = StreamDecoder::new(goal);
    let mut events = vec![TransportEvent::Connected];
    for line in frames.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let payload = line.strip_prefix("data:").map(str::trim).unwrap_or(line);
        events.extend(decoder.decode_frame(payload));
    }
    if !decoder.is_finished() {
        events.push(TransportEvent::Error {
            message: TransportError::Incomplete.to_string(),
        });
    }

    for ev in events {
        state = reduce(state, DomainEvent::Transport { run_id, ev });
    }
    state
}

pub fn cmd_replay(path: Utf8PathBuf, goal: String) -> Result<AppState> {
    let frames = read_input(&path)?;
    let state = replay_frames(&goal, &frames);
    print_transcript(&state);
    print_run(&state);
    print_results(&state);
    Ok(state)
}

pub async fn cmd_plan(
    goal: String,
    server: Option<String>,
    persistence: FilePersistence,
    timeout: Option<Duration>,
) -> Result<AppState> {
    let profile = persistence.load_profile()?;
    let settings = persistence.load_settings()?;
    let server_url = server.unwrap_or_else(|| settings.server_url.clone());

    println!(":: Planning");
    println!("   Goal:   {}", goal);
    println!("   Server: {}", server_url);

    let transport = SseTransport::new(&server_url).context("Failed to configure transport")?;
    let state = AppState {
        boot: BootState::Ready,
        profile,
        settings,
        ..Default::default()
    };
    let mut kernel = AppKernel::new(
        AppStore::new(state),
        transport,
        persistence.clone(),
        persistence,
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("Invalid spinner template")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    kernel.dispatch(AppCommand::StartPlan { goal });
    let timeout = timeout.unwrap_or(Duration::from_secs(PLAN_TIMEOUT_SECS));
    let deadline = Instant::now() + timeout;
    let mut printed = HashSet::new();

    let state = loop {
        kernel.tick();
        let state = kernel.store.state();
        let vm = run_vm(&state);
        pb.set_message(format!("{} ({}%)", vm.status_label, vm.percent));

        for row in chat_vm(&state.chat).rows {
            let settled = row.agent_label.is_none() || row.status_badge == Some("done");
            if settled && printed.insert(row.id.clone()) {
                pb.println(format_row(&row));
            }
        }

        if state.run.is_terminal() {
            break state;
        }
        if Instant::now() >= deadline {
            kernel.dispatch(AppCommand::CancelPlan);
            pb.abandon_with_message("Timed out");
            anyhow::bail!("Plan did not finish within {}s", timeout.as_secs());
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    };

    match state.run.phase {
        RunPhase::Completed => pb.finish_with_message("Plan complete."),
        _ => pb.abandon_with_message("Plan failed."),
    }
    print_results(&state);

    if let Some(err) = &state.run.error {
        anyhow::bail!("Plan failed: {err}");
    }
    Ok(state)
}

fn format_row(row: &spark_app_core::ChatRowVm) -> String {
    let who = match (&row.agent_label, row.is_user) {
        (_, true) => "you".to_string(),
        (Some(label), false) => label.clone(),
        (None, false) => "planner".to_string(),
    };
    let mut out = format!("[{who}] {}", row.text.trim());
    for update in &row.progress_updates {
        out.push_str(&format!("\n    - {update}"));
    }
    out
}

fn print_transcript(state: &AppState) {
    println!(":: Transcript");
    for row in chat_vm(&state.chat).rows {
        println!("{}", format_row(&row));
    }
}

fn print_run(state: &AppState) {
    let vm = run_vm(state);
    println!("\n:: Run");
    println!("   Status:   {}", vm.status_label);
    println!("   Progress: {}%", vm.percent);
    if let Some(err) = vm.error {
        println!("   Error:    {err}");
    }
}

fn print_results(state: &AppState) {
    let Some(result) = &state.result else {
        return;
    };
    let vm = results_vm(result);
    if vm.is_empty() {
        println!("\n:: No structured results");
        return;
    }
    if let Some(panel) = &vm.job_market {
        println!("\n:: {}", RecordKind::JobMarket.label());
        print_stats(&panel.stats);
    }
    if let Some(panel) = &vm.course_plan {
        println!("\n:: {}", RecordKind::Course.label());
        print_stats(&panel.stats);
    }
    if let Some(panel) = &vm.projects {
        println!("\n:: {}", RecordKind::Project.label());
        print_stats(&panel.stats);
    }
}

fn print_stats(stats: &[StatItem]) {
    for s in stats {
        let trend = s
            .trend
            .as_ref()
            .map(|t| format!(" ({})", format!("{t:?}").to_lowercase()))
            .unwrap_or_default();
        println!("   {:<20} {}{}", s.label, s.value, trend);
    }
}
