use std::path::{Path, PathBuf};

use crate::cli::{HistoryArgs, HistoryCommand};
use crate::error::{RhttpError, Result};
use crate::history::{HistoryRecord, HistoryStore, ListQuery, RecordMode};

use super::http::{send_and_record, HttpOptions};

pub fn run_history(store: &HistoryStore, args: &HistoryArgs, default_limit: usize, http: &HttpOptions) -> Result<()> {
    match args.command.as_ref().unwrap_or(&HistoryCommand::List) {
        HistoryCommand::List => run_history_list(store, &list_query(args, default_limit)),
        HistoryCommand::Detail { index } => run_history_detail(store, index.as_deref()),
        HistoryCommand::Replay { index, output } => {
            run_history_replay(store, index.as_deref(), output.clone(), http).map(|_| ())
        }
        HistoryCommand::Save { index, path } => run_history_save(store, index.as_deref(), path.as_deref()),
    }
}

/// Builds the listing query; unusable skip/limit values fall back to defaults.
pub fn list_query(args: &HistoryArgs, default_limit: usize) -> ListQuery {
    let limit = args
        .limit
        .as_deref()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|limit| *limit >= 1)
        .unwrap_or(default_limit);
    let skip = args
        .skip
        .as_deref()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .unwrap_or(0);

    ListQuery {
        skip,
        limit,
        find: args.find.clone().unwrap_or_default(),
        case_insensitive: args.insensitive,
    }
}

pub fn run_history_list(store: &HistoryStore, query: &ListQuery) -> Result<()> {
    log::debug!("Listing history with {:?}", query);
    let listing = store.list(query)?;
    print!("{listing}");
    Ok(())
}

pub fn run_history_detail(store: &HistoryStore, index: Option<&str>) -> Result<()> {
    let record = store.load_by_index(parse_index(index)?)?;
    print!("{}", render_detail(&record));
    Ok(())
}

/// Sends record `index` again and stores the result as a new record.
pub fn run_history_replay(
    store: &HistoryStore,
    index: Option<&str>,
    output: Option<PathBuf>,
    http: &HttpOptions,
) -> Result<PathBuf> {
    let original = store.load_by_index(parse_index(index)?)?;
    log::info!(
        "Replaying {} {}",
        original.request.method,
        original.request.url
    );
    send_and_record(store, original.request, RecordMode::Replay, None, output, http)
}

pub fn run_history_save(store: &HistoryStore, index: Option<&str>, path: Option<&Path>) -> Result<()> {
    let index = parse_index(index)?;
    let path = path.ok_or_else(|| RhttpError::InvalidArgs("Missing output file path.".to_string()))?;
    let written = store.save_body(index, path)?;
    println!("Saved {} bytes to {}", written, path.display());
    Ok(())
}

fn parse_index(raw: Option<&str>) -> Result<i64> {
    let raw = raw.ok_or_else(|| RhttpError::InvalidArgs("Missing history record index.".to_string()))?;
    raw.trim()
        .parse()
        .map_err(|_| RhttpError::InvalidHistoryIndex(raw.to_string()))
}

fn display_path(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string()).unwrap_or_default()
}

pub fn render_detail(record: &HistoryRecord) -> String {
    let request = &record.request;
    let response = &record.response;
    let lines = [
        ("Name", record.name.clone()),
        ("Version", record.version.clone()),
        ("Args", format!("{:?}", record.args)),
        ("Mode", record.mode.to_string()),
        ("Start Time", record.start_time.to_rfc3339()),
        ("End Time", record.end_time.to_rfc3339()),
        ("Duration", format!("{}ms", record.duration_ms)),
        ("Input File Path", display_path(record.input_file_path.as_deref())),
        ("Output File Path", display_path(record.output_file_path.as_deref())),
        ("Request Method", request.method.clone()),
        ("Request URL", request.url.clone()),
        ("Request Timeout", request.timeout.to_string()),
        ("Request Content Type", request.content_type.clone()),
        ("Request Accept", request.accept.clone()),
        ("Request Content Length", request.content_length.to_string()),
        ("Response Status", response.status.to_string()),
        ("Response Content Type", response.content_type.clone()),
        ("Response Content Length", response.content_length.to_string()),
    ];

    let mut out = String::new();
    for (label, value) in lines {
        out.push_str(label);
        out.push_str(": ");
        out.push_str(&value);
        out.push('\n');
    }
    out
}
