// Mon Feb 09 2026 - Alex

use clap::Parser;
use lazy_static::lazy_static;
use memscan::config::AppConfig;
use memscan::scan::types::CancelToken;
use memscan::ui::message;
use memscan::ui::repl::Repl;
use memscan::utils::logging;
use memscan::utils::process;

#[derive(Parser, Debug)]
#[command(name = "memscan")]
#[command(author = "Alex")]
#[command(version)]
#[command(about = "Interactive memory scanner for running processes", long_about = None)]
struct Args {
    /// Target process id
    #[arg(value_name = "PID")]
    pid: Option<i32>,

    /// Target process id (alternative to the positional form)
    #[arg(short = 'p', long = "pid", value_name = "PID")]
    pid_option: Option<i32>,

    /// Verbose diagnostics
    #[arg(short, long)]
    debug: bool,

    /// Machine-readable output, no prompts
    #[arg(short, long)]
    backend: bool,
}

lazy_static! {
    static ref SCAN_CANCEL: CancelToken = CancelToken::new();
}

extern "C" fn on_sigint(_signal: libc::c_int) {
    SCAN_CANCEL.cancel();
}

fn install_sigint_handler() {
    let handler = on_sigint as extern "C" fn(libc::c_int);
    unsafe {
        libc::signal(libc::SIGINT, handler as libc::sighandler_t);
    }
}

fn main() {
    let args = Args::parse();
    let config = AppConfig {
        pid: args.pid_option.or(args.pid),
        debug: args.debug,
        backend: args.backend,
    };

    message::set_backend_mode(config.backend);
    message::set_debug_mode(config.debug);
    logging::init_logger(logging::level_from_debug(config.debug));

    let Some(pid) = config.pid else {
        eprintln!("error: no target pid; run with <PID> or --pid <PID>");
        std::process::exit(2);
    };
    if pid <= 0 {
        eprintln!("error: invalid pid: {}", pid);
        std::process::exit(2);
    }
    if !process::is_running(pid) {
        message::error(&format!("process {} not found", pid));
        std::process::exit(1);
    }
    if let Some(comm) = process::process_comm(pid) {
        message::info(&format!("target is {} ({})", pid, comm));
    }

    install_sigint_handler();
    let mut repl = Repl::new(&config, pid, SCAN_CANCEL.clone());
    std::process::exit(repl.run());
}
