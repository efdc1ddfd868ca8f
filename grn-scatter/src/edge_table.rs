use crate::common_io::{open_buf_reader, open_buf_writer};
use crate::errors::ScatterError;
use crate::Mat;

use rayon::prelude::*;
use std::io::{BufRead, Write};

/// One shard's inference output: per-sample edge weights keyed by
/// (transcription factor, gene). Row `i` belongs to the pair
/// `(tfs[i], genes[i])`; `scores` has one column per sample in the
/// shard. All shards of one run share the same key set and differ
/// only in which sample columns they carry.
#[derive(Clone, Debug)]
pub struct EdgeScoreTable {
    pub tfs: Vec<Box<str>>,
    pub genes: Vec<Box<str>>,
    pub samples: Vec<Box<str>>,
    pub scores: Mat,
}

type ParsedRow = (usize, Box<str>, Box<str>, Vec<f64>);

fn parse_row(file: &str, index: usize, line: &str, num_samples: usize) -> anyhow::Result<ParsedRow> {
    // header occupies line 1; data row `index` sits on line index + 2
    let lno = index + 2;
    let fields: Vec<&str> = line.split('\t').collect();

    if fields.len() != num_samples + 2 {
        return Err(ScatterError::MalformedRecord {
            file: file.into(),
            line: lno,
            reason: format!(
                "expected {} fields, found {}",
                num_samples + 2,
                fields.len()
            ),
        }
        .into());
    }

    let mut row = Vec::with_capacity(num_samples);
    for x in &fields[2..] {
        let v: f64 = x.parse().map_err(|_| ScatterError::MalformedRecord {
            file: file.into(),
            line: lno,
            reason: format!("non-numeric score '{}'", x),
        })?;
        row.push(v);
    }

    Ok((
        index,
        fields[0].to_string().into_boxed_str(),
        fields[1].to_string().into_boxed_str(),
        row,
    ))
}

impl EdgeScoreTable {
    pub fn num_edges(&self) -> usize {
        self.tfs.len()
    }

    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    /// Read a shard output file: `tf`, `gene`, then one score column
    /// per sample. Row order in the file is kept as-is; it fixes the
    /// deterministic accumulation order downstream.
    pub fn from_tsv(file: &str) -> anyhow::Result<Self> {
        let reader = open_buf_reader(file)
            .map_err(|e| ScatterError::MissingInput(format!("{}: {}", file, e)))?;

        let mut lines = reader.lines();

        let header = match lines.next() {
            Some(line) => line?,
            None => {
                return Err(ScatterError::MalformedRecord {
                    file: file.into(),
                    line: 1,
                    reason: "empty file".to_string(),
                }
                .into());
            }
        };

        let hdr: Vec<&str> = header.trim_end_matches(['\n', '\r']).split('\t').collect();
        if hdr.len() < 3 || hdr[0] != "tf" || hdr[1] != "gene" {
            return Err(ScatterError::MalformedRecord {
                file: file.into(),
                line: 1,
                reason: "expected header 'tf\\tgene\\t<sample>...'".to_string(),
            }
            .into());
        }

        let samples: Vec<Box<str>> = hdr[2..]
            .iter()
            .map(|x| x.to_string().into_boxed_str())
            .collect();
        let num_samples = samples.len();

        let raw: Vec<(usize, String)> = lines
            .map_while(Result::ok)
            .enumerate()
            .collect();

        // float parsing dominates, so farm it out row-wise
        let mut rows: Vec<ParsedRow> = raw
            .par_iter()
            .map(|(i, line)| parse_row(file, *i, line, num_samples))
            .collect::<anyhow::Result<Vec<_>>>()?;

        rows.sort_by_key(|&(i, _, _, _)| i);

        let num_edges = rows.len();
        let mut tfs = Vec::with_capacity(num_edges);
        let mut genes = Vec::with_capacity(num_edges);
        let mut data = Vec::with_capacity(num_edges * num_samples);

        for (_, tf, gene, row) in rows {
            tfs.push(tf);
            genes.push(gene);
            data.extend(row);
        }

        Ok(EdgeScoreTable {
            tfs,
            genes,
            samples,
            scores: Mat::from_row_iterator(num_edges, num_samples, data),
        })
    }

    /// Replace the score column names with the shard's sample
    /// identifiers. Raw inference output carries placeholder column
    /// names; this is where the shard's slice of the original sample
    /// set gets stamped on.
    pub fn relabel_samples(&mut self, samples: Vec<Box<str>>) -> anyhow::Result<()> {
        if samples.len() != self.samples.len() {
            return Err(ScatterError::InvalidArgument(format!(
                "{} sample names for {} score columns",
                samples.len(),
                self.samples.len()
            ))
            .into());
        }
        self.samples = samples;
        Ok(())
    }

    pub fn to_tsv(&self, file: &str) -> anyhow::Result<()> {
        let mut writer = open_buf_writer(file)?;

        write!(writer, "tf\tgene")?;
        for s in &self.samples {
            write!(writer, "\t{}", s)?;
        }
        writeln!(writer)?;

        for i in 0..self.num_edges() {
            write!(writer, "{}\t{}", self.tfs[i], self.genes[i])?;
            for j in 0..self.num_samples() {
                write!(writer, "\t{}", self.scores[(i, j)])?;
            }
            writeln!(writer)?;
        }

        writer.flush()?;
        Ok(())
    }
}
