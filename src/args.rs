//! Position-independent scanning of raw command line tokens.
//!
//! The dispatcher needs a handful of answers before any mode-specific
//! parsing happens (is `--help` anywhere? which config file?). These helpers
//! answer them directly from the token list; everything else is parsed once
//! into [`crate::cli::HttpArgs`] or [`crate::cli::HistoryArgs`].

pub const HELP: &[&str] = &["-h", "--help"];
pub const VERSION: &[&str] = &["-v", "--version"];
pub const CONFIG: &[&str] = &["--config"];

/// Returns true if any alias appears anywhere in `args`.
pub fn flag_is_active<S: AsRef<str>>(args: &[S], aliases: &[&str]) -> bool {
    args.iter().any(|arg| aliases.contains(&arg.as_ref()))
}

/// Returns the token following the last occurrence of any alias.
///
/// Falls back to `default` when no alias is present, or when the last alias
/// is the final token and so has no value.
pub fn get_option<S: AsRef<str>>(args: &[S], aliases: &[&str], default: Option<&str>) -> Option<String> {
    let last = args
        .iter()
        .rposition(|arg| aliases.contains(&arg.as_ref()));

    match last.and_then(|idx| args.get(idx + 1)) {
        Some(value) => Some(value.as_ref().to_string()),
        None => default.map(str::to_string),
    }
}

/// Removes every alias occurrence together with the value that follows it.
pub fn strip_option(args: &[String], aliases: &[&str]) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if aliases.contains(&arg.as_str()) {
            iter.next();
            continue;
        }
        out.push(arg.clone());
    }
    out
}
