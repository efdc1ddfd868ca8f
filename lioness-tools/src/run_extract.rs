use crate::common::*;

use grn_scatter::common_io::write_lines;
use grn_scatter::expression::{extract_submatrix, read_sample_names, sample_names_in_range};
use grn_scatter::partition::PartitionPlan;

#[derive(Parser, Debug, Clone)]
pub struct ExtractArgs {
    /// expression matrix TSV
    #[arg(required = true)]
    exprs: Box<str>,

    /// shard ranges TSV produced by `plan`
    #[arg(long, short = 'r')]
    ranges: Box<str>,

    /// which shard to extract (0-based line number in the ranges file)
    #[arg(long, short = 'l')]
    line: usize,

    /// output submatrix TSV for the external inference step
    #[arg(long, short, required = true)]
    out: Box<str>,

    /// optional output file listing the shard's sample names
    #[arg(long, short = 's')]
    samples_out: Option<Box<str>>,

    /// verbosity
    #[arg(long, short)]
    verbose: bool,
}

pub fn run_extract(args: ExtractArgs) -> anyhow::Result<()> {
    init_logging(args.verbose);

    let partition = PartitionPlan::from_tsv(&args.ranges)?;
    let range = partition.shard(args.line)?;

    info!(
        "shard {}: samples [{}, {}]",
        args.line, range.start, range.end
    );

    extract_submatrix(&args.exprs, &range, &args.out)?;

    if let Some(samples_out) = args.samples_out {
        let samples = read_sample_names(&args.exprs)?;
        let shard_samples = sample_names_in_range(&samples, &range)?;
        write_lines(&shard_samples, &samples_out)?;
    }

    Ok(())
}
