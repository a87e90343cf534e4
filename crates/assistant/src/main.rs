#![forbid(unsafe_code)]

mod commands;
mod entry;
mod handlers;
mod server;
mod support;
mod tools;

pub(crate) use support::*;

pub(crate) use dbl_core::ids::TeamId;
use dbl_storage::SqliteStore;
use std::fmt::Write as _;
use std::path::PathBuf;

// Protocol negotiation: kept at the widely deployed MCP baseline; behavior
// stays forward-compatible.
const MCP_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "doable-assistant";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub(crate) struct AssistantServer {
    initialized: bool,
    store: SqliteStore,
    default_team: Option<String>,
}

fn usage() -> &'static str {
    "dbl_assistant — Doable conversational tool-call server (stdio JSON-RPC)\n\n\
USAGE:\n\
  dbl_assistant [--storage-dir DIR] [--team TEAM]\n\
\n\
FLAGS:\n\
  -h, --help       Print this help and exit\n\
  -V, --version    Print version and exit\n\
\n\
NOTES:\n\
  - Store default: ./.doable (override with --storage-dir or DBL_STORAGE_DIR)\n\
  - --team / DBL_TEAM sets the team used when a tool call omits one\n"
}

fn version_line() -> String {
    let profile = if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    };
    format!("dbl_assistant {SERVER_VERSION} ({profile})")
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    let index = args.iter().position(|arg| arg == flag)?;
    args.get(index + 1)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_storage_dir(args: &[String]) -> PathBuf {
    flag_value(args, "--storage-dir")
        .or_else(|| env_var("DBL_STORAGE_DIR"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".doable"))
}

fn parse_default_team(args: &[String]) -> Option<String> {
    flag_value(args, "--team").or_else(|| env_var("DBL_TEAM"))
}

fn write_last_crash(storage_dir: &std::path::Path, kind: &str, detail: &str) {
    // Best-effort crash record. stdout belongs to the protocol, so transport
    // and panic failures land in a bounded file next to the store instead.
    let _ = std::fs::create_dir_all(storage_dir);
    let path = storage_dir.join("doable_assistant_last_crash.txt");

    let mut out = String::new();
    let ts_ms = crate::support::now_ms_i64();
    let _ = writeln!(out, "ts={}", crate::support::ts_ms_to_rfc3339(ts_ms));
    let _ = writeln!(out, "pid={}", std::process::id());
    let _ = writeln!(out, "kind={kind}");
    let _ = writeln!(out, "version={}", version_line());
    let _ = writeln!(out, "detail={detail}");

    let _ = std::fs::write(path, out);
}

fn install_crash_reporter(storage_dir: PathBuf) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let mut detail = info.to_string();
        let backtrace = std::backtrace::Backtrace::force_capture();
        let _ = write!(&mut detail, "\nbacktrace:\n{backtrace}");
        write_last_crash(&storage_dir, "panic", &detail);
        default_hook(info);
    }));
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = std::env::args().collect::<Vec<_>>();
    if args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-h" | "--help"))
    {
        print!("{}", usage());
        return Ok(());
    }
    if args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-V" | "--version"))
    {
        println!("{}", version_line());
        return Ok(());
    }

    let storage_dir = parse_storage_dir(&args);
    install_crash_reporter(storage_dir.clone());
    let default_team = parse_default_team(&args);

    let store = match SqliteStore::open(&storage_dir) {
        Ok(store) => store,
        Err(err) => {
            write_last_crash(&storage_dir, "store_open", &err.to_string());
            return Err(Box::new(err));
        }
    };

    let mut server = AssistantServer::new(store, default_team);
    if let Err(err) = entry::run_stdio(&mut server) {
        write_last_crash(&storage_dir, "stdio", &err.to_string());
        return Err(err);
    }
    Ok(())
}
