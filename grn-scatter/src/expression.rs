use crate::common_io::{open_buf_reader, open_buf_writer};
use crate::errors::ScatterError;
use crate::partition::ShardRange;

use std::collections::HashSet;
use std::io::{BufRead, Write};

/// Read the header row of an expression matrix TSV and return the
/// ordered sample identifiers. The first header field belongs to the
/// feature-identifier column and is dropped. Column order is the join
/// key between the input matrix and the shard outputs, so it is kept
/// exactly as found.
pub fn read_sample_names(exprs_file: &str) -> anyhow::Result<Vec<Box<str>>> {
    let mut reader = open_buf_reader(exprs_file)?;
    let mut header = String::new();
    if reader.read_line(&mut header)? == 0 {
        return Err(ScatterError::MalformedRecord {
            file: exprs_file.into(),
            line: 1,
            reason: "empty file".to_string(),
        }
        .into());
    }

    let fields: Vec<&str> = header.trim_end_matches(['\n', '\r']).split('\t').collect();
    if fields.len() < 2 {
        return Err(ScatterError::MalformedRecord {
            file: exprs_file.into(),
            line: 1,
            reason: "header has no sample columns".to_string(),
        }
        .into());
    }

    let samples: Vec<Box<str>> = fields[1..]
        .iter()
        .map(|x| x.to_string().into_boxed_str())
        .collect();

    let mut seen = HashSet::new();
    for s in samples.iter() {
        if !seen.insert(s) {
            return Err(ScatterError::InvalidArgument(format!(
                "duplicate sample identifier '{}' in {}",
                s, exprs_file
            ))
            .into());
        }
    }

    Ok(samples)
}

/// Select the sample names covered by one shard range.
pub fn sample_names_in_range(
    samples: &[Box<str>],
    range: &ShardRange,
) -> anyhow::Result<Vec<Box<str>>> {
    if range.start < 1 || range.end > samples.len() {
        return Err(ScatterError::InvalidArgument(format!(
            "range [{}, {}] out of bounds for {} samples",
            range.start,
            range.end,
            samples.len()
        ))
        .into());
    }
    Ok(samples[(range.start - 1)..range.end].to_vec())
}

/// Stream the shard's column slice of the expression matrix into
/// `out_file`, keeping the feature-identifier column. The full matrix
/// is never held in memory; each row is sliced as it is read.
pub fn extract_submatrix(
    exprs_file: &str,
    range: &ShardRange,
    out_file: &str,
) -> anyhow::Result<()> {
    let reader = open_buf_reader(exprs_file)?;
    let mut writer = open_buf_writer(out_file)?;

    let mut n_fields = 0_usize;

    for (lno, line) in reader.lines().enumerate() {
        let line = line?;
        let fields: Vec<&str> = line.split('\t').collect();

        if lno == 0 {
            n_fields = fields.len();
            if range.start < 1 || range.end + 1 > n_fields {
                return Err(ScatterError::InvalidArgument(format!(
                    "range [{}, {}] out of bounds for {} samples",
                    range.start,
                    range.end,
                    n_fields - 1
                ))
                .into());
            }
        } else if fields.len() != n_fields {
            return Err(ScatterError::MalformedRecord {
                file: exprs_file.into(),
                line: lno + 1,
                reason: format!("expected {} fields, found {}", n_fields, fields.len()),
            }
            .into());
        }

        // field 0 is the feature identifier; samples are 1-based from there
        write!(writer, "{}", fields[0])?;
        for x in &fields[range.start..=range.end] {
            write!(writer, "\t{}", x)?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}
