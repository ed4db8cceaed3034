use clap::{Parser, Subcommand};

use self::{evaluate::EvaluateArg, prepare_sequences::PrepareSequencesArg};

mod evaluate;
mod prepare_sequences;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evaluate the Kaplan-Meier baseline on a dataset's test split
    Evaluate(#[clap(flatten)] EvaluateArg),
    /// Build sequence datasets and dump one partition as JSON
    PrepareSequences(#[clap(flatten)] PrepareSequencesArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
        Mode::PrepareSequences(arg) => prepare_sequences::run(&arg)?,
    }
    Ok(())
}
