use crate::cli::BIN_NAME;

const USAGE: &str = "\
Usage:
    rhttp COMMAND OPTIONS

Commands:
    help
    version
    history [list] FLAGS
    history detail N
    history replay N [(-o | --output) /path/to/output/file.json]
    history save N /path/to/output/file.json
    URL FLAGS
    get URL FLAGS
    head URL FLAGS
    post URL FLAGS
    put URL FLAGS
    patch URL FLAGS
    delete URL FLAGS

History Flags:
    (-f | --find) GET
    (-i | --insensitive)
    (-l | --limit) 10
    (-s | --skip) 10

HTTP Flags:
    (-j | --json)
    (-c | --content-type) application/json
    (-a | --accept) application/json
    (-t | --timeout) 60
    (-i | --input) /path/to/input/file.json
    (-o | --output) /path/to/output/file.json
    (-d | --data) '{\"key\": \"value\"}'

Global Flags:
    --config /path/to/rhttp.toml
";

pub fn run_help() {
    print!("{USAGE}");
}

pub fn version_line() -> String {
    format!("{} version {}", BIN_NAME, env!("CARGO_PKG_VERSION"))
}

pub fn run_version() {
    println!("{}", version_line());
}
