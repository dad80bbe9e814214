use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::cli::{HttpArgs, BIN_NAME};
use crate::config::ResolvedHttpConfig;
use crate::error::{RhttpError, Result};

pub const METHODS: &[&str] = &["GET", "HEAD", "POST", "PUT", "PATCH", "DELETE"];

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

/// Everything needed to send (or resend) one request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub method: String,
    pub url: String,
    /// Seconds.
    pub timeout: u64,
    pub content_type: String,
    pub accept: String,
    pub content_length: usize,
    #[serde(with = "super::body")]
    pub body: Vec<u8>,
}

/// A request plus the local files the invocation touched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedRequest {
    pub request: RequestRecord,
    pub input_file_path: Option<PathBuf>,
    pub output_file_path: Option<PathBuf>,
}

pub fn build_request(args: &HttpArgs, defaults: &ResolvedHttpConfig) -> Result<PreparedRequest> {
    let (method, raw_url) = split_target(&args.target)?;
    let url = normalize_url(raw_url)?;
    let timeout = resolve_timeout(args.timeout.as_deref(), defaults.timeout);

    let data = args.data.as_deref().filter(|data| !data.is_empty());
    let mut input_file_path = None;
    let body = if accepts_body(&method) {
        match (data, args.input.as_ref()) {
            (Some(data), _) => data.as_bytes().to_vec(),
            (None, Some(path)) => match fs::read(path) {
                Ok(bytes) => {
                    input_file_path = Some(path.clone());
                    bytes
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    log::warn!("Input file {} not found, sending an empty body", path.display());
                    Vec::new()
                }
                Err(err) => return Err(err.into()),
            },
            (None, None) => Vec::new(),
        }
    } else if data.is_some() {
        return Err(RhttpError::InvalidArgs(
            "Data flag is only valid for POST, PATCH, and PUT requests.".to_string(),
        ));
    } else {
        Vec::new()
    };

    let explicit_content_type = args.content_type.as_deref().filter(|ct| !ct.is_empty());
    let content_type = if args.json {
        JSON.to_string()
    } else if let Some(ct) = explicit_content_type {
        ct.to_string()
    } else if accepts_body(&method) {
        JSON.to_string()
    } else {
        FORM.to_string()
    };

    let accept = args
        .accept
        .as_deref()
        .filter(|accept| !accept.is_empty())
        .unwrap_or(&defaults.accept)
        .to_string();

    Ok(PreparedRequest {
        request: RequestRecord {
            method,
            url: url.to_string(),
            timeout,
            content_type,
            accept,
            content_length: body.len(),
            body,
        },
        input_file_path,
        output_file_path: args.output.clone(),
    })
}

fn accepts_body(method: &str) -> bool {
    matches!(method, "POST" | "PATCH" | "PUT")
}

/// Splits `[METHOD] URL`; a first token that is not a known verb is the URL.
fn split_target(target: &[String]) -> Result<(String, &str)> {
    let missing = || {
        RhttpError::InvalidArgs(format!(
            "Invalid arguments. Try '{BIN_NAME} help' for usage details."
        ))
    };

    let first = target.first().ok_or_else(missing)?;
    let upper = first.to_uppercase();
    let (method, url, rest) = if METHODS.contains(&upper.as_str()) {
        let url = target.get(1).ok_or_else(missing)?;
        (upper, url.as_str(), &target[2..])
    } else {
        ("GET".to_string(), first.as_str(), &target[1..])
    };

    if let Some(extra) = rest.first() {
        return Err(RhttpError::InvalidArgs(format!(
            "Unexpected argument '{extra}'. Try '{BIN_NAME} help' for usage details."
        )));
    }
    Ok((method, url))
}

/// Parses the URL and re-encodes its query string with pairs sorted by key.
fn normalize_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if url.query().is_some() {
        let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        if pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }
    }
    Ok(url)
}

fn resolve_timeout(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|secs| *secs >= 1)
        .and_then(|secs| u64::try_from(secs).ok())
        .unwrap_or(default)
}
