use std::env;
use std::process;

use rhttp::cli::{utf8_args, Invocation};
use rhttp::commands;

fn main() {
    env_logger::init_from_env(env_logger::Env::new().filter_or("RHTTP_LOG", "warn"));

    let result = utf8_args(env::args_os().skip(1))
        .map(Invocation::from_args)
        .and_then(commands::run);
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
