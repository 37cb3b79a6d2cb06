mod cli;
mod commands;
mod formatting;
mod settings;

use std::process::ExitCode;

use cli::Commands;
use commands::{run_convert, run_package, run_process, run_reset, run_upload, GlobalArgs};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let args = cli::parse();
    init_tracing(args.verbose);

    let globals = GlobalArgs {
        config: args.config,
        store_dir: args.store_dir,
        verbose: args.verbose,
        format: args.format,
    };

    match args.command {
        Commands::Upload { file } => run_upload(globals, file).await,
        Commands::Process { transform } => run_process(globals, transform).await,
        Commands::Package { output } => run_package(globals, output).await,
        Commands::Convert {
            file,
            transform,
            output,
        } => run_convert(globals, file, transform, output).await,
        Commands::Reset => run_reset(globals).await,
    }
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "qmlbridge=debug,qmlbridge_lib=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
