mod help;
mod history;
mod http;

pub use help::{run_help, run_version, version_line};
pub use history::{
    list_query, render_detail, run_history, run_history_detail, run_history_list,
    run_history_replay, run_history_save,
};
pub use http::{run_http, HttpOptions};

use crate::cli::{HistoryArgs, HttpArgs, Invocation, Mode};
use crate::config::{home_dir, load_config, ResolvedConfig};
use crate::error::Result;
use crate::history::HistoryStore;
use crate::http::build_request;

/// Runs one invocation end to end.
pub fn run(invocation: Invocation) -> Result<()> {
    match invocation.mode {
        Mode::Help => {
            run_help();
            return Ok(());
        }
        Mode::Version => {
            run_version();
            return Ok(());
        }
        Mode::History | Mode::Http => {}
    }

    let config = load_config(invocation.config_path.as_deref())?;
    let resolved = ResolvedConfig::from_config(&config, home_dir().as_deref())?;
    log::debug!("Resolved config: {:?}", resolved);

    let store = HistoryStore::open(&resolved.history.dir)?;
    let http_options = HttpOptions {
        args: invocation.args.clone(),
        print_limit: resolved.http.print_limit,
    };

    if invocation.mode == Mode::History {
        let args = HistoryArgs::parse_tokens(&invocation.args)?;
        return run_history(&store, &args, resolved.history.limit, &http_options);
    }

    log::info!("Parsing arguments...");
    let args = HttpArgs::parse_tokens(&invocation.args)?;
    let prepared = build_request(&args, &resolved.http)?;
    run_http(&store, prepared, &http_options).map(|_| ())
}
