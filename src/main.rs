//! Wiregen - compile-time dependency-injection module generator

use clap::Parser;
use wiregen::cli::App;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let app = App::parse();

    // Initialize logging
    let filter = if app.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let code = app.run()?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
