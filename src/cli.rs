use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::args::{flag_is_active, get_option, strip_option, CONFIG, HELP, VERSION};
use crate::error::{RhttpError, Result};

pub const BIN_NAME: &str = "rhttp";

/// What a single invocation is going to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Help,
    Version,
    History,
    Http,
}

/// Raw arguments after the boundary has pulled out what it needs.
#[derive(Debug)]
pub struct Invocation {
    pub mode: Mode,
    pub config_path: Option<PathBuf>,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn from_args(raw: Vec<String>) -> Self {
        let config_path = get_option(&raw, CONFIG, None).map(PathBuf::from);
        let args = strip_option(&raw, CONFIG);
        let mode = resolve_mode(&args);
        Self {
            mode,
            config_path,
            args,
        }
    }
}

/// Converts process arguments to strings, rejecting any that are not UTF-8.
pub fn utf8_args<I: IntoIterator<Item = OsString>>(raw: I) -> Result<Vec<String>> {
    raw.into_iter()
        .map(|arg| {
            arg.into_string().map_err(|bad| {
                RhttpError::InvalidArgs(format!(
                    "Argument '{}' is not valid UTF-8.",
                    bad.to_string_lossy()
                ))
            })
        })
        .collect()
}

pub fn resolve_mode<S: AsRef<str>>(args: &[S]) -> Mode {
    let Some(first) = args.first() else {
        return Mode::Help;
    };
    if flag_is_active(args, HELP) {
        return Mode::Help;
    }
    if flag_is_active(args, VERSION) {
        return Mode::Version;
    }
    match first.as_ref().to_lowercase().as_str() {
        "help" => Mode::Help,
        "version" => Mode::Version,
        "history" => Mode::History,
        _ => Mode::Http,
    }
}

/// Options for sending a request: `rhttp [METHOD] URL [FLAGS]`.
#[derive(Parser, Debug, Default)]
#[command(
    name = BIN_NAME,
    disable_help_flag = true,
    disable_version_flag = true,
    args_override_self = true
)]
pub struct HttpArgs {
    /// Optional HTTP method followed by the URL
    #[arg(value_name = "TARGET")]
    pub target: Vec<String>,

    /// Send the body as application/json
    #[arg(short, long)]
    pub json: bool,

    /// Content-Type header value
    #[arg(short, long)]
    pub content_type: Option<String>,

    /// Accept header value
    #[arg(short, long)]
    pub accept: Option<String>,

    /// Request timeout in seconds
    #[arg(short, long, allow_hyphen_values = true)]
    pub timeout: Option<String>,

    /// Read the request body from this file
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Write the response body to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Inline request body
    #[arg(short, long, allow_hyphen_values = true)]
    pub data: Option<String>,
}

impl HttpArgs {
    pub fn parse_tokens(args: &[String]) -> Result<Self> {
        Self::try_parse_from(with_bin_name(args)).map_err(usage_error)
    }
}

/// Options for `rhttp history [list|detail N|replay N|save N PATH]`.
#[derive(Parser, Debug)]
#[command(
    name = BIN_NAME,
    disable_help_flag = true,
    disable_version_flag = true,
    disable_help_subcommand = true,
    args_override_self = true
)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: Option<HistoryCommand>,

    /// Only show records whose file name contains this text
    #[arg(short, long, global = true, allow_hyphen_values = true)]
    pub find: Option<String>,

    /// Match --find case-insensitively
    #[arg(short, long, global = true)]
    pub insensitive: bool,

    /// Maximum number of records to show
    #[arg(short, long, global = true, allow_hyphen_values = true)]
    pub limit: Option<String>,

    /// Number of records to skip before collecting
    #[arg(short, long, global = true, allow_hyphen_values = true)]
    pub skip: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum HistoryCommand {
    /// List records newest first
    List,

    /// Show the stored request and response metadata of one record
    Detail {
        #[arg(allow_hyphen_values = true)]
        index: Option<String>,
    },

    /// Send a stored request again and record the new response
    Replay {
        #[arg(allow_hyphen_values = true)]
        index: Option<String>,

        /// Write the fresh response body to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Copy a stored response body to a file
    Save {
        #[arg(allow_hyphen_values = true)]
        index: Option<String>,

        path: Option<PathBuf>,
    },
}

const HISTORY_MODES: &[&str] = &["list", "detail", "replay", "save"];

impl HistoryArgs {
    /// Parses everything after the leading `history` token.
    ///
    /// A leading word that is not a known sub-mode means `list`.
    pub fn parse_tokens(args: &[String]) -> Result<Self> {
        let mut rest: Vec<String> = args.iter().skip(1).cloned().collect();
        if let Some(first) = rest.first_mut().filter(|first| !first.starts_with('-')) {
            let lower = first.to_lowercase();
            *first = if HISTORY_MODES.contains(&lower.as_str()) {
                lower
            } else {
                log::debug!("Unknown history mode '{}', listing", first);
                "list".to_string()
            };
        }
        Self::try_parse_from(with_bin_name(&rest)).map_err(usage_error)
    }
}

fn with_bin_name(args: &[String]) -> impl Iterator<Item = &str> {
    std::iter::once(BIN_NAME).chain(args.iter().map(String::as_str))
}

fn usage_error(err: clap::Error) -> RhttpError {
    let rendered = err.to_string();
    let detail = rendered
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ")
        .to_string();
    RhttpError::InvalidArgs(format!(
        "Invalid arguments ({detail}). Try '{BIN_NAME} help' for usage details."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_arguments_means_help() {
        let args: Vec<String> = Vec::new();
        assert_eq!(resolve_mode(&args), Mode::Help);
    }

    #[test]
    fn help_flag_wins_anywhere() {
        assert_eq!(resolve_mode(&tokens(&["get", "http://x", "--help"])), Mode::Help);
        assert_eq!(resolve_mode(&tokens(&["history", "-h", "-v"])), Mode::Help);
    }

    #[test]
    fn version_flag_before_history() {
        assert_eq!(resolve_mode(&tokens(&["history", "-v"])), Mode::Version);
        assert_eq!(resolve_mode(&tokens(&["version"])), Mode::Version);
    }

    #[test]
    fn history_is_case_insensitive() {
        assert_eq!(resolve_mode(&tokens(&["HiStOrY"])), Mode::History);
    }

    #[test]
    fn anything_else_is_http() {
        assert_eq!(resolve_mode(&tokens(&["http://example.com"])), Mode::Http);
        assert_eq!(resolve_mode(&tokens(&["post", "http://example.com"])), Mode::Http);
    }

    #[test]
    fn invocation_extracts_config_path() {
        let inv = Invocation::from_args(tokens(&["--config", "x.toml", "history", "list"]));
        assert_eq!(inv.mode, Mode::History);
        assert_eq!(inv.config_path, Some(PathBuf::from("x.toml")));
        assert_eq!(inv.args, tokens(&["history", "list"]));
    }

    #[test]
    fn http_args_parse_flags() {
        let args = HttpArgs::parse_tokens(&tokens(&[
            "post",
            "http://example.com/a",
            "-j",
            "-d",
            r#"{"x":1}"#,
            "-t",
            "5",
        ]))
        .unwrap();
        assert_eq!(args.target, tokens(&["post", "http://example.com/a"]));
        assert!(args.json);
        assert_eq!(args.data.as_deref(), Some(r#"{"x":1}"#));
        assert_eq!(args.timeout.as_deref(), Some("5"));
    }

    #[test]
    fn http_args_last_occurrence_wins() {
        let args = HttpArgs::parse_tokens(&tokens(&["http://x", "-a", "text/plain", "--accept", "text/html"]))
            .unwrap();
        assert_eq!(args.accept.as_deref(), Some("text/html"));
    }

    #[test]
    fn http_args_reject_unknown_flag() {
        let err = HttpArgs::parse_tokens(&tokens(&["http://x", "--bogus"])).unwrap_err();
        assert!(err.to_string().contains("rhttp help"));
    }

    #[test]
    fn history_defaults_to_no_subcommand() {
        let args = HistoryArgs::parse_tokens(&tokens(&["history", "-f", "GET", "-i"])).unwrap();
        assert_eq!(args.command, None);
        assert_eq!(args.find.as_deref(), Some("GET"));
        assert!(args.insensitive);
    }

    #[test]
    fn history_subcommand_case_insensitive() {
        let args = HistoryArgs::parse_tokens(&tokens(&["history", "DETAIL", "3"])).unwrap();
        assert_eq!(
            args.command,
            Some(HistoryCommand::Detail {
                index: Some("3".to_string())
            })
        );
    }

    #[test]
    fn history_flags_after_subcommand() {
        let args = HistoryArgs::parse_tokens(&tokens(&["history", "list", "--limit", "2", "-s", "1"])).unwrap();
        assert_eq!(args.command, Some(HistoryCommand::List));
        assert_eq!(args.limit.as_deref(), Some("2"));
        assert_eq!(args.skip.as_deref(), Some("1"));
    }

    #[test]
    fn unknown_history_mode_lists() {
        let args = HistoryArgs::parse_tokens(&tokens(&["history", "bogus", "-l", "3"])).unwrap();
        assert_eq!(args.command, Some(HistoryCommand::List));
        assert_eq!(args.limit.as_deref(), Some("3"));
    }

    #[test]
    fn leading_flag_is_not_a_mode() {
        let args = HistoryArgs::parse_tokens(&tokens(&["history", "-s", "2"])).unwrap();
        assert_eq!(args.command, None);
        assert_eq!(args.skip.as_deref(), Some("2"));
    }

    #[test]
    fn utf8_args_pass_through() {
        let raw = vec![OsString::from("get"), OsString::from("http://x")];
        assert_eq!(utf8_args(raw).unwrap(), tokens(&["get", "http://x"]));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_arg_is_invalid() {
        use std::os::unix::ffi::OsStringExt;

        let raw = vec![OsString::from_vec(b"http://x/\xff".to_vec())];
        let err = utf8_args(raw).unwrap_err();
        assert!(matches!(err, RhttpError::InvalidArgs(_)));
        assert!(err.to_string().contains("not valid UTF-8"));
    }

    #[test]
    fn history_save_takes_index_and_path() {
        let args = HistoryArgs::parse_tokens(&tokens(&["history", "save", "2", "out/body.json"])).unwrap();
        assert_eq!(
            args.command,
            Some(HistoryCommand::Save {
                index: Some("2".to_string()),
                path: Some(PathBuf::from("out/body.json")),
            })
        );
    }
}
