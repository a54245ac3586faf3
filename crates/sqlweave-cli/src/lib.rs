mod cli;
mod commands;
mod config;

use tracing_subscriber::EnvFilter;

pub fn run(args: Vec<String>) -> anyhow::Result<()> {
    let cmd = cli::parse_args(&args)?;
    match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Bind(args) => {
            init_tracing(args.global.verbose);
            commands::run_bind(args)
        }
        cli::Command::Inject(args) => {
            init_tracing(args.global.verbose);
            commands::run_inject(args)
        }
        cli::Command::Where(args) => {
            init_tracing(args.global.verbose);
            commands::run_where(args)
        }
    }
}

/// Log to stderr so stdout stays machine-readable. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "sqlweave=debug,sqlweave_cli=debug" } else { "warn" })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
