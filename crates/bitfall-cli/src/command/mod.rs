use clap::{Parser, Subcommand};

use self::{play::PlayArg, simulate::SimulateArg};

mod play;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play in the terminal (default)
    Play(#[clap(flatten)] PlayArg),
    /// Run the engine headless with random input and print a JSON summary
    Simulate(#[clap(flatten)] SimulateArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or_else(|| Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Simulate(arg) => simulate::run(&arg)?,
    }
    Ok(())
}
