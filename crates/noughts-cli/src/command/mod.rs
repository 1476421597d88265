use clap::{Parser, Subcommand};

use self::{enumerate::EnumerateArg, evaluate::EvaluateArg, train::TrainArg};

mod enumerate;
mod evaluate;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve a policy with the genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Re-evaluate a trained policy model
    Evaluate(#[clap(flatten)] EvaluateArg),
    /// Count every canonical board reachable from the empty board
    Enumerate(#[clap(flatten)] EnumerateArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
        Mode::Enumerate(arg) => enumerate::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_command_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_subcommands() {
        let args = CommandArgs::try_parse_from(["noughts", "enumerate"]).unwrap();
        assert!(matches!(args.mode, Mode::Enumerate(_)));

        let args =
            CommandArgs::try_parse_from(["noughts", "evaluate", "--model", "model.json"]).unwrap();
        assert!(matches!(args.mode, Mode::Evaluate(_)));

        assert!(CommandArgs::try_parse_from(["noughts"]).is_err());
        assert!(CommandArgs::try_parse_from(["noughts", "evaluate"]).is_err());
    }
}
