use std::io::{self, Write};
use std::process;
use bootcore::app::{self, Core};
use bootcore::command::{builtin, UnitRegistry};
use bootcore::{cli, logging};

fn main() {
    let args = cli::parse_args();

    let logging_ready = cli::validate_args(&args)
        .and_then(|_| app::configure_logging(&args))
        .and_then(logging::init_logger);
    if let Err(e) = logging_ready {
        let _ = writeln!(io::stderr(), "Error: {:#}", e);
        process::exit(2);
    }

    let mut core = Core::new(app::core_options(&args), UnitRegistry::new());
    core.register_units(builtin::builtin_units());

    let guard = core.interceptor().shutdown_guard("bootstrap");
    let outcome = if args.list_commands {
        app::list_commands(&mut core)
    } else {
        app::bootstrap(&mut core)
    };
    guard.complete();

    if let Err(e) = outcome {
        let code = core.interceptor().on_exception(&e);
        process::exit(code);
    }
}
