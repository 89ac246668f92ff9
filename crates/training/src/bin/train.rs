use clap::Parser;
use training::util::{run_train, TrainArgs};

fn main() -> anyhow::Result<()> {
    cli_support::init_logging();
    let args = TrainArgs::parse();
    let report = run_train(args)?;
    println!("Saved checkpoint to {}", report.checkpoint.display());
    Ok(())
}
