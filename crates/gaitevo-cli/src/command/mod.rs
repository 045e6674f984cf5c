use clap::{Parser, Subcommand};

use self::{optimize::OptimizeArg, playback::PlaybackArg, resume::ResumeArg};

mod optimize;
mod playback;
mod resume;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Start a fresh pool-evolution run
    Optimize(#[clap(flatten)] OptimizeArg),
    /// Continue a run from its checkpoint
    Resume(#[clap(flatten)] ResumeArg),
    /// Re-evaluate each checkpointed individual in slot order
    Playback(#[clap(flatten)] PlaybackArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Optimize(arg) => optimize::run(&arg)?,
        Mode::Resume(arg) => resume::run(&arg)?,
        Mode::Playback(arg) => playback::run(&arg)?,
    }
    Ok(())
}
