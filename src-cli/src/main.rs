use clap::Parser;
use kic_cite_lib::{run, Cli};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(out) => print!("{out}"),
        Err(e) => {
            tracing::error!(code = %e.code, "kic-cite failed");
            eprintln!("Error: {e}");
            if let Some(details) = &e.details {
                eprintln!("  {details}");
            }
            std::process::exit(1);
        }
    }
}
