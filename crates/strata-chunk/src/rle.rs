//! Run-length coding of block arrays: `[(count, id), ...]` in linear index order.

use strata_blocks::BlockId;

use crate::RleError;

pub fn encode(blocks: &[BlockId]) -> Vec<(u32, BlockId)> {
    let mut runs: Vec<(u32, BlockId)> = Vec::new();
    for &id in blocks {
        match runs.last_mut() {
            Some((n, last)) if *last == id && *n < u32::MAX => *n += 1,
            _ => runs.push((1, id)),
        }
    }
    runs
}

pub fn decode(runs: &[(u32, BlockId)], expected: usize) -> Result<Vec<BlockId>, RleError> {
    // validate the totals before allocating anything
    let mut total: usize = 0;
    for (index, &(count, _)) in runs.iter().enumerate() {
        if count == 0 {
            return Err(RleError::EmptyRun { index });
        }
        total = total
            .checked_add(count as usize)
            .filter(|&t| t <= expected)
            .ok_or(RleError::Overflow { expected })?;
    }
    if total != expected {
        return Err(RleError::LengthMismatch {
            expected,
            actual: total,
        });
    }
    let mut out = Vec::with_capacity(total);
    for &(count, id) in runs {
        out.resize(out.len() + count as usize, id);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_adjacent_runs() {
        assert_eq!(encode(&[0, 0, 0, 3, 3, 1]), vec![(3, 0), (2, 3), (1, 1)]);
        assert!(encode(&[]).is_empty());
    }

    #[test]
    fn rejects_bad_runs() {
        assert_eq!(decode(&[(2, 1), (0, 4)], 2), Err(RleError::EmptyRun { index: 1 }));
        assert_eq!(decode(&[(5, 1)], 4), Err(RleError::Overflow { expected: 4 }));
        assert_eq!(
            decode(&[(3, 1)], 4),
            Err(RleError::LengthMismatch {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn huge_runs_fail_before_allocating() {
        let runs = vec![(u32::MAX, 1); 8];
        assert_eq!(decode(&runs, 64), Err(RleError::Overflow { expected: 64 }));
        assert_eq!(
            decode(&runs[..1], usize::MAX),
            Err(RleError::LengthMismatch {
                expected: usize::MAX,
                actual: u32::MAX as usize
            })
        );
    }
}
