use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use chrono::Local;

use crate::error::Result;
use crate::files::write_output;
use crate::history::{HistoryRecord, HistoryStore, RecordMode};
use crate::http::{execute, PreparedRequest, RequestRecord, ResponseRecord};

pub struct HttpOptions {
    /// Arguments of this invocation, stored with the record.
    pub args: Vec<String>,
    /// Largest body echoed to stdout; `None` for no limit.
    pub print_limit: Option<usize>,
}

pub fn run_http(store: &HistoryStore, prepared: PreparedRequest, options: &HttpOptions) -> Result<PathBuf> {
    send_and_record(
        store,
        prepared.request,
        RecordMode::Http,
        prepared.input_file_path,
        prepared.output_file_path,
        options,
    )
}

/// Sends `request`, delivers the body, and appends a fresh history record.
pub(crate) fn send_and_record(
    store: &HistoryStore,
    request: RequestRecord,
    mode: RecordMode,
    input_file_path: Option<PathBuf>,
    output_file_path: Option<PathBuf>,
    options: &HttpOptions,
) -> Result<PathBuf> {
    let start_time = Local::now();
    let started = Instant::now();

    let response = execute(&request)?;
    match output_file_path.as_deref() {
        Some(path) => write_output(path, &response.body)?,
        None => echo_body(&response, options.print_limit)?,
    }

    let record = HistoryRecord {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        args: options.args.clone(),
        mode,
        start_time,
        end_time: Local::now(),
        duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        input_file_path,
        output_file_path,
        request,
        response,
    };
    store.append(&record)
}

fn echo_body(response: &ResponseRecord, print_limit: Option<usize>) -> Result<()> {
    if response.body.is_empty() {
        return Ok(());
    }
    if let Some(limit) = print_limit {
        if response.body.len() > limit {
            log::warn!(
                "Response body is {} bytes (print limit {}); use --output to save it",
                response.body.len(),
                limit
            );
            return Ok(());
        }
    }
    let mut out = io::stdout().lock();
    out.write_all(&response.body)?;
    if !response.body.ends_with(b"\n") {
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}
