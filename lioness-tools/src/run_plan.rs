use crate::common::*;

use grn_scatter::expression::read_sample_names;
use grn_scatter::partition::{plan, plan_by_count};

#[derive(Parser, Debug, Clone)]
pub struct PlanArgs {
    /// expression matrix TSV; first row holds sample identifiers,
    /// first column holds feature identifiers
    #[arg(required = true)]
    exprs: Box<str>,

    /// maximum number of samples per shard
    #[arg(long, short = 'm', default_value_t = 50)]
    max_per_shard: usize,

    /// explicit number of shards; overrides --max-per-shard
    #[arg(long, short = 'k')]
    num_shards: Option<usize>,

    /// output ranges TSV (one `start\tend` line per shard)
    #[arg(long, short, required = true)]
    out: Box<str>,

    /// verbosity
    #[arg(long, short)]
    verbose: bool,
}

pub fn run_plan(args: PlanArgs) -> anyhow::Result<()> {
    init_logging(args.verbose);

    let samples = read_sample_names(&args.exprs)?;
    info!("{} samples in {}", samples.len(), args.exprs);

    let partition = match args.num_shards {
        Some(k) => plan_by_count(samples.len(), k)?,
        None => plan(samples.len(), args.max_per_shard)?,
    };

    info!("{} shards", partition.num_shards());
    partition.to_tsv(&args.out)?;

    Ok(())
}
