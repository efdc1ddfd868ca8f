use crate::common::*;

use grn_scatter::edge_table::EdgeScoreTable;
use grn_scatter::expression::{read_sample_names, sample_names_in_range};
use grn_scatter::partition::PartitionPlan;

#[derive(Parser, Debug, Clone)]
pub struct LabelArgs {
    /// raw shard inference output (tf, gene, then placeholder columns)
    #[arg(required = true)]
    table: Box<str>,

    /// shard ranges TSV produced by `plan`
    #[arg(long, short = 'r')]
    ranges: Box<str>,

    /// which shard this table belongs to (0-based line number)
    #[arg(long, short = 'l')]
    line: usize,

    /// expression matrix TSV the sample names come from
    #[arg(long, short = 'e')]
    exprs: Box<str>,

    /// output labeled edge table TSV
    #[arg(long, short, required = true)]
    out: Box<str>,

    /// verbosity
    #[arg(long, short)]
    verbose: bool,
}

pub fn run_label(args: LabelArgs) -> anyhow::Result<()> {
    init_logging(args.verbose);

    let partition = PartitionPlan::from_tsv(&args.ranges)?;
    let range = partition.shard(args.line)?;

    let samples = read_sample_names(&args.exprs)?;
    let shard_samples = sample_names_in_range(&samples, &range)?;

    let mut table = EdgeScoreTable::from_tsv(&args.table)?;
    info!(
        "shard {}: {} edges x {} samples",
        args.line,
        table.num_edges(),
        table.num_samples()
    );

    table.relabel_samples(shard_samples)?;
    table.to_tsv(&args.out)?;

    Ok(())
}
