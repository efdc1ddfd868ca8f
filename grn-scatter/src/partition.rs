use crate::common_io::{read_tsv, write_lines};
use crate::errors::ScatterError;

/// One contiguous slice of samples, 1-based inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardRange {
    pub start: usize,
    pub end: usize,
}

impl ShardRange {
    pub fn num_samples(&self) -> usize {
        self.end - self.start + 1
    }
}

impl std::fmt::Display for ShardRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}", self.start, self.end)
    }
}

/// An ordered cover of `[1, total_samples]` by contiguous, disjoint
/// shard ranges. Computed once from the expression header and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPlan {
    ranges: Vec<ShardRange>,
}

impl PartitionPlan {
    pub fn num_shards(&self) -> usize {
        self.ranges.len()
    }

    pub fn total_samples(&self) -> usize {
        self.ranges.last().map(|r| r.end).unwrap_or(0)
    }

    pub fn ranges(&self) -> &[ShardRange] {
        &self.ranges
    }

    pub fn shard(&self, index: usize) -> anyhow::Result<ShardRange> {
        self.ranges.get(index).copied().ok_or_else(|| {
            ScatterError::InvalidArgument(format!(
                "shard index {} out of bounds ({} shards)",
                index,
                self.ranges.len()
            ))
            .into()
        })
    }

    /// Write one `start\tend` line per shard, no header.
    pub fn to_tsv(&self, file: &str) -> anyhow::Result<()> {
        write_lines(&self.ranges, file)
    }

    /// Read a ranges file back and re-validate the coverage invariant.
    pub fn from_tsv(file: &str) -> anyhow::Result<Self> {
        let parsed = read_tsv(file)?;

        let mut ranges = Vec::with_capacity(parsed.len());
        for (i, words) in parsed.iter().enumerate() {
            if words.len() != 2 {
                return Err(ScatterError::InvalidArgument(format!(
                    "{}: line {}: expected two fields, found {}",
                    file,
                    i + 1,
                    words.len()
                ))
                .into());
            }
            let start: usize = words[0].parse().map_err(|_| {
                ScatterError::InvalidArgument(format!(
                    "{}: line {}: non-integer start '{}'",
                    file,
                    i + 1,
                    words[0]
                ))
            })?;
            let end: usize = words[1].parse().map_err(|_| {
                ScatterError::InvalidArgument(format!(
                    "{}: line {}: non-integer end '{}'",
                    file,
                    i + 1,
                    words[1]
                ))
            })?;
            ranges.push(ShardRange { start, end });
        }

        let plan = PartitionPlan { ranges };
        plan.validate()?;
        Ok(plan)
    }

    /// Ranges must be contiguous, strictly increasing, and start at 1.
    fn validate(&self) -> anyhow::Result<()> {
        if self.ranges.is_empty() {
            return Err(ScatterError::InvalidArgument("empty partition plan".to_string()).into());
        }

        let mut expected_start = 1_usize;
        for (i, r) in self.ranges.iter().enumerate() {
            if r.start != expected_start {
                return Err(ScatterError::InvalidArgument(format!(
                    "shard {}: starts at {} but previous shard ends at {}",
                    i,
                    r.start,
                    expected_start - 1
                ))
                .into());
            }
            if r.end < r.start {
                return Err(ScatterError::InvalidArgument(format!(
                    "shard {}: empty range [{}, {}]",
                    i, r.start, r.end
                ))
                .into());
            }
            expected_start = r.end + 1;
        }
        Ok(())
    }
}

/// Partition `total_samples` into shards of at most `max_per_shard`
/// samples. The shard count is `floor(total/max)`, forced up to one
/// when the maximum exceeds the total; there is always at least one
/// shard.
pub fn plan(total_samples: usize, max_per_shard: usize) -> anyhow::Result<PartitionPlan> {
    if total_samples < 1 {
        return Err(
            ScatterError::InvalidArgument("total_samples must be >= 1".to_string()).into(),
        );
    }
    if max_per_shard < 1 {
        return Err(
            ScatterError::InvalidArgument("max_per_shard must be >= 1".to_string()).into(),
        );
    }

    let num_shards = (total_samples / max_per_shard).max(1);
    plan_by_count(total_samples, num_shards)
}

/// Partition `total_samples` into exactly `num_shards` contiguous
/// ranges. Shard `i` (0-based) spans `[q*i + 1, q*(i+1)]` with
/// `q = floor(total/num_shards)`; the final shard's end is forced to
/// `total_samples` so the integer-division remainder is absorbed
/// there rather than spilling into an extra shard.
pub fn plan_by_count(total_samples: usize, num_shards: usize) -> anyhow::Result<PartitionPlan> {
    if total_samples < 1 {
        return Err(
            ScatterError::InvalidArgument("total_samples must be >= 1".to_string()).into(),
        );
    }
    if num_shards < 1 {
        return Err(ScatterError::InvalidArgument("num_shards must be >= 1".to_string()).into());
    }
    if num_shards > total_samples {
        return Err(ScatterError::InvalidArgument(format!(
            "num_shards ({}) exceeds total_samples ({})",
            num_shards, total_samples
        ))
        .into());
    }

    let quantile = total_samples / num_shards;

    let ranges = (0..num_shards)
        .map(|i| {
            let start = quantile * i + 1;
            let end = if i + 1 == num_shards {
                total_samples
            } else {
                quantile * (i + 1)
            };
            ShardRange { start, end }
        })
        .collect();

    Ok(PartitionPlan { ranges })
}
