use crate::common_io::open_buf_writer;
use crate::edge_table::EdgeScoreTable;
use crate::errors::ScatterError;
use crate::Mat;

use log::info;
use std::collections::{HashMap, HashSet};
use std::io::Write;

/// One reduced output matrix: a score row per entity (gene, tf, or
/// unrolled edge), one column per sample over the full reassembled
/// sample set.
#[derive(Debug)]
pub struct AggregatedScoreMatrix {
    pub names: Vec<Box<str>>,
    pub samples: Vec<Box<str>>,
    pub scores: Mat,
}

impl AggregatedScoreMatrix {
    /// TSV output: entity identifier first, then per-sample scores at
    /// a fixed 3-decimal precision so repeated runs are byte-identical.
    pub fn to_tsv(&self, id_label: &str, file: &str) -> anyhow::Result<()> {
        let mut writer = open_buf_writer(file)?;

        write!(writer, "{}", id_label)?;
        for s in &self.samples {
            write!(writer, "\t{}", s)?;
        }
        writeln!(writer)?;

        for i in 0..self.names.len() {
            write!(writer, "{}", self.names[i])?;
            for j in 0..self.samples.len() {
                write!(writer, "\t{:.3}", self.scores[(i, j)])?;
            }
            writeln!(writer)?;
        }

        writer.flush()?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct AggregateOut {
    pub by_gene: AggregatedScoreMatrix,
    pub by_tf: AggregatedScoreMatrix,
    /// unrolled `gene<->tf` edge matrix, kept only on request
    pub full: Option<AggregatedScoreMatrix>,
}

/// Streaming gather over per-shard edge tables. Each shard is reduced
/// to its gene-level and tf-level partial tables as soon as it
/// arrives, so peak memory stays at one full shard table plus the
/// growing reduced blocks (the optional unrolled output keeps one
/// edge-level block per shard and costs the full matrix footprint,
/// same as exporting it at all would).
///
/// The first shard fixes the reference key set and the first-seen row
/// order of every output; later shards are verified against it before
/// any of their columns are admitted.
pub struct Aggregator {
    keep_full: bool,
    state: Option<State>,
}

struct State {
    gene_names: Vec<Box<str>>,
    gene_index: HashMap<Box<str>, usize>,
    tf_names: Vec<Box<str>>,
    tf_index: HashMap<Box<str>, usize>,
    edge_index: HashMap<(Box<str>, Box<str>), usize>,
    edge_names: Vec<Box<str>>,
    samples: Vec<Box<str>>,
    sample_set: HashSet<Box<str>>,
    gene_blocks: Vec<Mat>,
    tf_blocks: Vec<Mat>,
    full_blocks: Vec<Mat>,
    num_shards: usize,
}

impl Aggregator {
    pub fn new(keep_full: bool) -> Self {
        Aggregator {
            keep_full,
            state: None,
        }
    }

    pub fn num_shards(&self) -> usize {
        self.state.as_ref().map(|s| s.num_shards).unwrap_or(0)
    }

    /// Fold one shard table in. Shard input order determines output
    /// column order only; values are invariant under permutation since
    /// shards contribute disjoint columns.
    pub fn push(&mut self, table: EdgeScoreTable) -> anyhow::Result<()> {
        let shard = self.num_shards();

        match &self.state {
            None => {
                self.state = Some(State::from_first_shard(&table)?);
            }
            Some(state) => {
                state.verify_keys(shard, &table)?;
            }
        }

        let state = self
            .state
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("aggregator state missing"))?;

        for s in table.samples.iter() {
            if !state.sample_set.insert(s.clone()) {
                return Err(ScatterError::DuplicateColumn {
                    shard,
                    sample: s.clone(),
                }
                .into());
            }
        }

        let num_genes = state.gene_names.len();
        let num_tfs = state.tf_names.len();
        let num_edges = state.edge_index.len();
        let k = table.num_samples();

        let mut gene_block = Mat::zeros(num_genes, k);
        let mut tf_block = Mat::zeros(num_tfs, k);
        let mut full_block = if self.keep_full {
            Mat::zeros(num_edges, k)
        } else {
            Mat::zeros(0, 0)
        };

        // accumulate in the shard's own row order; this keeps the
        // floating-point sums reproducible byte-for-byte across runs
        for i in 0..table.num_edges() {
            let g = state.gene_index[&table.genes[i]];
            let t = state.tf_index[&table.tfs[i]];
            for j in 0..k {
                let x = table.scores[(i, j)];
                gene_block[(g, j)] += x;
                tf_block[(t, j)] += x;
            }
            if self.keep_full {
                let key = (table.tfs[i].clone(), table.genes[i].clone());
                let r = state.edge_index[&key];
                for j in 0..k {
                    full_block[(r, j)] = table.scores[(i, j)];
                }
            }
        }

        state.samples.extend(table.samples);
        state.gene_blocks.push(gene_block);
        state.tf_blocks.push(tf_block);
        if self.keep_full {
            state.full_blocks.push(full_block);
        }
        state.num_shards += 1;

        Ok(())
    }

    /// Horizontally join the per-shard partial tables on their shared
    /// row keys and hand back the reduced matrices.
    pub fn finish(self) -> anyhow::Result<AggregateOut> {
        let state = self.state.ok_or_else(|| {
            ScatterError::InvalidArgument("no shard tables to aggregate".to_string())
        })?;

        info!(
            "gathered {} shards: {} genes x {} tfs x {} samples",
            state.num_shards,
            state.gene_names.len(),
            state.tf_names.len(),
            state.samples.len()
        );

        let by_gene = AggregatedScoreMatrix {
            scores: hstack(&state.gene_blocks, state.gene_names.len(), state.samples.len()),
            names: state.gene_names,
            samples: state.samples.clone(),
        };

        let by_tf = AggregatedScoreMatrix {
            scores: hstack(&state.tf_blocks, state.tf_names.len(), state.samples.len()),
            names: state.tf_names,
            samples: state.samples.clone(),
        };

        let full = if self.keep_full {
            Some(AggregatedScoreMatrix {
                scores: hstack(&state.full_blocks, state.edge_names.len(), state.samples.len()),
                names: state.edge_names,
                samples: state.samples,
            })
        } else {
            None
        };

        Ok(AggregateOut {
            by_gene,
            by_tf,
            full,
        })
    }
}

impl State {
    fn from_first_shard(table: &EdgeScoreTable) -> anyhow::Result<Self> {
        let mut gene_names = vec![];
        let mut gene_index = HashMap::new();
        let mut tf_names = vec![];
        let mut tf_index = HashMap::new();
        let mut edge_index = HashMap::new();
        let mut edge_names = vec![];

        for i in 0..table.num_edges() {
            let tf = &table.tfs[i];
            let gene = &table.genes[i];

            if !gene_index.contains_key(gene) {
                gene_index.insert(gene.clone(), gene_names.len());
                gene_names.push(gene.clone());
            }
            if !tf_index.contains_key(tf) {
                tf_index.insert(tf.clone(), tf_names.len());
                tf_names.push(tf.clone());
            }

            let key = (tf.clone(), gene.clone());
            if edge_index.insert(key, i).is_some() {
                return Err(ScatterError::InvalidArgument(format!(
                    "duplicate edge key ({}, {}) within shard 0",
                    tf, gene
                ))
                .into());
            }
            edge_names.push(format!("{}<->{}", gene, tf).into_boxed_str());
        }

        Ok(State {
            gene_names,
            gene_index,
            tf_names,
            tf_index,
            edge_index,
            edge_names,
            samples: vec![],
            sample_set: HashSet::new(),
            gene_blocks: vec![],
            tf_blocks: vec![],
            full_blocks: vec![],
            num_shards: 0,
        })
    }

    /// Key sets must be set-equal across shards. An inner join would
    /// silently drop any key missing from one side and under-count the
    /// totals, so divergence is checked up front and fails loudly.
    fn verify_keys(&self, shard: usize, table: &EdgeScoreTable) -> anyhow::Result<()> {
        let expected = self.edge_index.len();

        let mut seen = HashSet::with_capacity(table.num_edges());
        let mut matched = 0_usize;
        for i in 0..table.num_edges() {
            let key = (table.tfs[i].clone(), table.genes[i].clone());
            if !seen.insert(key.clone()) {
                return Err(ScatterError::InvalidArgument(format!(
                    "duplicate edge key ({}, {}) within shard {}",
                    table.tfs[i], table.genes[i], shard
                ))
                .into());
            }
            if self.edge_index.contains_key(&key) {
                matched += 1;
            }
        }

        if table.num_edges() != expected || matched != expected {
            return Err(ScatterError::SchemaMismatch {
                shard,
                expected,
                matched,
            }
            .into());
        }

        Ok(())
    }
}

fn hstack(blocks: &[Mat], nrows: usize, ncols: usize) -> Mat {
    let mut out = Mat::zeros(nrows, ncols);
    let mut offset = 0_usize;
    for block in blocks {
        out.view_mut((0, offset), (nrows, block.ncols()))
            .copy_from(block);
        offset += block.ncols();
    }
    out
}

/// Gather a set of in-memory shard tables into the two reduced
/// matrices (gene-level and tf-level target scores).
pub fn aggregate(
    tables: Vec<EdgeScoreTable>,
) -> anyhow::Result<(AggregatedScoreMatrix, AggregatedScoreMatrix)> {
    let mut agg = Aggregator::new(false);
    for table in tables {
        agg.push(table)?;
    }
    let out = agg.finish()?;
    Ok((out.by_gene, out.by_tf))
}

/// Gather shard tables straight from their files, one at a time.
/// Any missing or malformed shard aborts the whole run; a partial
/// gather would silently shrink the sample set of every output.
pub fn aggregate_files(files: &[Box<str>], keep_full: bool) -> anyhow::Result<AggregateOut> {
    if files.is_empty() {
        return Err(ScatterError::InvalidArgument("no shard files given".to_string()).into());
    }

    let mut agg = Aggregator::new(keep_full);
    for (idx, file) in files.iter().enumerate() {
        let table =
            EdgeScoreTable::from_tsv(file).map_err(|e| e.context(format!("shard {}", idx)))?;
        agg.push(table)?;
    }
    agg.finish()
}
