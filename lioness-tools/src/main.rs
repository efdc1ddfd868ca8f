mod common;
mod run_extract;
mod run_label;
mod run_merge;
mod run_plan;

use crate::common::*;
use crate::run_extract::*;
use crate::run_label::*;
use crate::run_merge::*;
use crate::run_plan::*;

#[derive(Parser, Debug)]
#[command(version, about, long_about, term_width = 80)]
struct Cli {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Partition the samples of an expression matrix into shard ranges
    Plan(PlanArgs),

    /// Extract one shard's column slice of the expression matrix
    Extract(ExtractArgs),

    /// Stamp sample identifiers onto a shard's raw inference output
    Label(LabelArgs),

    /// Merge per-shard edge tables into gene/tf target score matrices
    Merge(MergeArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.commands {
        Commands::Plan(args) => {
            run_plan(args.clone())?;
        }
        Commands::Extract(args) => {
            run_extract(args.clone())?;
        }
        Commands::Label(args) => {
            run_label(args.clone())?;
        }
        Commands::Merge(args) => {
            run_merge(args.clone())?;
        }
    }

    Ok(())
}
