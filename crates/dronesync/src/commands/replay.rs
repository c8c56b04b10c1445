//! Trace replay: feeds a JSON-lines trace through a `DeviceSession`.
//!
//! Each non-empty line is one entry:
//!
//! ```text
//! {"link": {"event": "did_connect"}}
//! {"command": {"feature": 292, "id": 0, "args": [{"enum": 1}]}}
//! {"intent": {"beeper": "stop_alert_sound"}}
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tabled::Tabled;
use tracing::{debug, info};

use dronesync_api::ProtocolCommand;
use dronesync_core::{
    ComponentSet, DeviceSession, DeviceStore, FileDeviceStore, Intent, LinkEvent,
    MemoryDeviceStore, PeripheralKind, RecordingSink, RequestOutcome,
};

use crate::cli::{GlobalOpts, OutputFormat, ReplayArgs};
use crate::error::CliError;
use crate::output;

use super::config_cmd::load;

// ── Trace entries ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TraceEntry {
    Link(LinkEvent),
    Command(ProtocolCommand),
    Intent(Intent),
}

/// Parse a trace, keeping 1-based line numbers.
fn parse_trace(text: &str) -> Result<Vec<(usize, TraceEntry)>, CliError> {
    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line, entry)| {
            serde_json::from_str(entry)
                .map(|parsed| (line, parsed))
                .map_err(|source| CliError::TraceEntry { line, source })
        })
        .collect()
}

// ── Report ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct IntentRecord {
    line: usize,
    intent: Intent,
    #[serde(flatten)]
    outcome: RequestOutcome,
}

#[derive(Debug, Serialize)]
struct ReplayReport {
    device_uid: String,
    peripherals: BTreeMap<PeripheralKind, serde_json::Value>,
    commands: Vec<ProtocolCommand>,
    intents: Vec<IntentRecord>,
}

#[derive(Tabled)]
struct PeripheralRow {
    #[tabled(rename = "Peripheral")]
    kind: String,
    #[tabled(rename = "State")]
    state: String,
}

#[derive(Tabled)]
struct CommandRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Feature")]
    feature: String,
    #[tabled(rename = "ID")]
    id: u16,
    #[tabled(rename = "Args")]
    args: String,
}

#[derive(Tabled)]
struct IntentRow {
    #[tabled(rename = "Line")]
    line: usize,
    #[tabled(rename = "Intent")]
    intent: String,
    #[tabled(rename = "Outcome")]
    outcome: String,
}

fn compact(value: &impl Serialize) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn render_tables(report: &ReplayReport, color: bool) -> String {
    let peripherals: Vec<PeripheralRow> = report
        .peripherals
        .iter()
        .map(|(kind, state)| PeripheralRow {
            kind: kind.to_string(),
            state: compact(state),
        })
        .collect();
    let commands: Vec<CommandRow> = report
        .commands
        .iter()
        .enumerate()
        .map(|(index, command)| CommandRow {
            index: index + 1,
            feature: command.feature.to_string(),
            id: command.id,
            args: compact(&command.args),
        })
        .collect();
    let intents: Vec<IntentRow> = report
        .intents
        .iter()
        .map(|record| IntentRow {
            line: record.line,
            intent: compact(&record.intent),
            outcome: output::outcome_label(record.outcome, color),
        })
        .collect();

    [
        (format!("Peripherals ({})", report.device_uid), output::render_table(&peripherals)),
        ("Outbound commands".to_string(), output::render_table(&commands)),
        ("Intents".to_string(), output::render_table(&intents)),
    ]
    .into_iter()
    .map(|(title, table)| format!("{}\n{table}", output::heading(&title, color)))
    .collect::<Vec<_>>()
    .join("\n\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ReplayArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let text = std::fs::read_to_string(&args.trace).map_err(|source| CliError::TraceRead {
        path: args.trace.display().to_string(),
        source,
    })?;
    let entries = parse_trace(&text)?;

    let mut config = load(global)?;
    if let Some(uid) = args.device_uid {
        config.device_uid = uid;
    }
    if args.offline {
        config.offline_settings = true;
    }
    let session_config = config.to_session_config()?;

    let file_store = if args.persist {
        Some(Arc::new(FileDeviceStore::for_device(
            &config.device_store_dir(),
            &session_config.device_uid,
        )?))
    } else {
        None
    };
    let store: Arc<dyn DeviceStore> = match &file_store {
        Some(file_store) => file_store.clone(),
        None => Arc::new(MemoryDeviceStore::new()),
    };
    let sink = RecordingSink::new();
    let components = ComponentSet::drone(&session_config, Arc::new(sink.clone()), store)?;
    let session = DeviceSession::start(components);

    info!(
        trace = %args.trace.display(),
        entries = entries.len(),
        "replaying trace"
    );
    let intents = replay(&session, entries).await;
    session.flush().await?;
    if let Some(file_store) = &file_store {
        file_store.sync().await;
    }

    let report = ReplayReport {
        device_uid: session_config.device_uid,
        peripherals: session.peripherals().snapshot_json(),
        commands: sink.sent(),
        intents,
    };
    session.shutdown().await;

    let color = matches!(global.output, OutputFormat::Table) && output::should_color(&global.color);
    let rendered = output::render_single(&global.output, &report, |r| Ok(render_tables(r, color)))?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}

async fn replay(session: &DeviceSession, entries: Vec<(usize, TraceEntry)>) -> Vec<IntentRecord> {
    let mut records = Vec::new();
    for (line, entry) in entries {
        let result = match entry {
            TraceEntry::Link(event) => session.link_event(event).await,
            TraceEntry::Command(command) => session.receive_command(command).await,
            TraceEntry::Intent(intent) => match session.execute(intent.clone()).await {
                Ok(outcome) => {
                    debug!(line, %outcome, "intent replayed");
                    records.push(IntentRecord { line, intent, outcome });
                    Ok(())
                }
                Err(e) => Err(e),
            },
        };
        if let Err(e) = result {
            debug!(line, error = %e, "session closed during replay");
            break;
        }
    }
    records
}
