//! The row-band partitioner (§4.2): splits a span of rows as evenly as
//! possible across a number of participants, handing the remainder to the
//! lowest-numbered participants one row at a time.
//!
//! Used by both engines: the shared-memory engine partitions the interior
//! height `D - 2` across workers; the distributed engine partitions the full
//! dimension `D` across peers (see [`crate::dms::strip_allocation`], which
//! wraps this to compute a single peer's `(allocStart, allocRows)`).

use crate::error::SolverError;

/// Splits `total` rows across `participants` participants as evenly as
/// possible. Returns one `(start, end)` pair per participant, `start`
/// inclusive and `end` exclusive, in participant order. The first
/// `total % participants` participants each receive one extra row.
///
/// Fails with `InvalidDecomposition` if `participants == 0` or
/// `participants > total` (a participant would receive an empty band).
pub fn partition_rows(
    total: usize,
    participants: usize,
) -> Result<Vec<(usize, usize)>, SolverError> {
    if participants == 0 || participants > total {
        return Err(SolverError::InvalidDecomposition {
            participants,
            rows: total,
        });
    }

    let base = total / participants;
    let remainder = total % participants;

    let mut bands = Vec::with_capacity(participants);
    let mut start = 0;
    for p in 0..participants {
        let len = if p < remainder { base + 1 } else { base };
        let end = start + len;
        bands.push((start, end));
        start = end;
    }
    Ok(bands)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_the_whole_range_without_overlap() {
        for total in 1..=40 {
            for participants in 1..=total {
                let bands = partition_rows(total, participants).unwrap();
                assert_eq!(bands.len(), participants);
                assert_eq!(bands[0].0, 0);
                assert_eq!(bands.last().unwrap().1, total);
                for w in bands.windows(2) {
                    assert_eq!(w[0].1, w[1].0, "bands must be contiguous");
                }
                let covered: usize = bands.iter().map(|(s, e)| e - s).sum();
                assert_eq!(covered, total);
            }
        }
    }

    #[test]
    fn extra_rows_go_to_lowest_numbered_participants() {
        let bands = partition_rows(10, 3).unwrap();
        // 10 / 3 = 3 remainder 1 -> first participant gets 4, the rest get 3.
        assert_eq!(bands, vec![(0, 4), (4, 7), (7, 10)]);
    }

    #[test]
    fn rejects_more_participants_than_rows() {
        assert!(matches!(
            partition_rows(8, 9),
            Err(SolverError::InvalidDecomposition {
                participants: 9,
                rows: 8
            })
        ));
    }

    #[test]
    fn rejects_zero_participants() {
        assert!(matches!(
            partition_rows(8, 0),
            Err(SolverError::InvalidDecomposition { .. })
        ));
    }

    #[test]
    fn every_participant_gets_at_least_one_row_when_participants_le_rows() {
        let bands = partition_rows(8, 8).unwrap();
        for (start, end) in bands {
            assert!(end - start >= 1);
        }
    }
}
