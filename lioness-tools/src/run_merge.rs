use crate::common::*;

use grn_scatter::aggregate::Aggregator;
use grn_scatter::edge_table::EdgeScoreTable;

use indicatif::ProgressBar;

#[derive(Parser, Debug, Clone)]
pub struct MergeArgs {
    /// labeled per-shard edge tables, in sample order
    #[arg(long, short = 'i', required = true, num_args(1..))]
    shards: Vec<Box<str>>,

    /// output file for the gene target score matrix
    #[arg(long, required = true)]
    gene: Box<str>,

    /// output file for the tf target score matrix
    #[arg(long, required = true)]
    tf: Box<str>,

    /// optional output file for the unrolled `gene<->tf` edge matrix
    #[arg(long)]
    full: Option<Box<str>>,

    /// verbosity
    #[arg(long, short)]
    verbose: bool,
}

pub fn run_merge(args: MergeArgs) -> anyhow::Result<()> {
    init_logging(args.verbose);

    let mut agg = Aggregator::new(args.full.is_some());

    let pb = ProgressBar::new(args.shards.len() as u64);
    for (idx, file) in args.shards.iter().enumerate() {
        let table =
            EdgeScoreTable::from_tsv(file).map_err(|e| e.context(format!("shard {}", idx)))?;
        agg.push(table)?;
        pb.inc(1);
    }
    pb.finish_and_clear();

    let out = agg.finish()?;

    info!("writing gene target scores to {}", args.gene);
    out.by_gene.to_tsv("gene", &args.gene)?;

    info!("writing tf target scores to {}", args.tf);
    out.by_tf.to_tsv("tf", &args.tf)?;

    if let (Some(full_file), Some(full)) = (args.full.as_ref(), out.full.as_ref()) {
        info!("writing unrolled edge matrix to {}", full_file);
        full.to_tsv("edge", full_file)?;
    }

    info!("Done");
    Ok(())
}
