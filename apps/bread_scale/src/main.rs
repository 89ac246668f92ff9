use clap::Parser;

use bread_scale::cli::AppArgs;
use bread_scale::run_app;

fn main() -> anyhow::Result<()> {
    cli_support::init_logging();
    run_app(AppArgs::parse())?;
    Ok(())
}
