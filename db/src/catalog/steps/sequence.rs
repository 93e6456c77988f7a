//! Position arithmetic for dense `1..=N` step lists.
//!
//! Nothing here touches the database: the sequencer asks these functions
//! which block of positions has to slide, then hands the answer to the store.

use crate::{Result, StoreError};

/// An inclusive block of positions that all move by `delta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    pub from: i32,
    pub to: i32,
    pub delta: i32,
}

impl Shift {
    pub fn contains(&self, position: i32) -> bool {
        (self.from..=self.to).contains(&position)
    }

    pub fn apply(&self, position: i32) -> i32 {
        if self.contains(position) {
            position + self.delta
        } else {
            position
        }
    }
}

pub fn check_position(step_num: i32) -> Result<()> {
    if step_num < 1 {
        return Err(StoreError::invalid(format!(
            "step number must be at least 1, got {step_num}"
        )));
    }

    Ok(())
}

/// Plans moving the step at `current` to `target` in a list of `max` steps.
///
/// Moving later pulls `(current, target]` back by one; moving earlier pushes
/// `[target, current)` forward by one. Staying put needs no shift.
pub fn plan_move(current: i32, target: i32, max: i32) -> Result<Option<Shift>> {
    check_position(target)?;

    if target > max {
        return Err(StoreError::OutOfRange {
            requested: target,
            max,
        });
    }

    let shift = match target.cmp(&current) {
        std::cmp::Ordering::Equal => None,
        std::cmp::Ordering::Greater => Some(Shift {
            from: current + 1,
            to: target,
            delta: -1,
        }),
        std::cmp::Ordering::Less => Some(Shift {
            from: target,
            to: current - 1,
            delta: 1,
        }),
    };

    Ok(shift)
}

/// Plans closing the gap left by removing `removed` from a list of `max`.
pub fn plan_removal(removed: i32, max: i32) -> Option<Shift> {
    (removed < max).then_some(Shift {
        from: removed + 1,
        to: max,
        delta: -1,
    })
}

/// True when the positions are exactly `1..=len` in any order.
pub fn is_dense(positions: &[i32]) -> bool {
    let mut sorted = positions.to_vec();
    sorted.sort_unstable();

    sorted
        .iter()
        .zip(1..)
        .all(|(&position, expected)| position == expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a move on plain positions, the way the store does on rows.
    fn simulate_move(positions: &[i32], moving: usize, target: i32) -> Result<Vec<i32>> {
        let max = i32::try_from(positions.len()).unwrap();
        let current = positions[moving];

        let shift = plan_move(current, target, max)?;
        let mut next: Vec<i32> = positions
            .iter()
            .map(|&p| shift.map_or(p, |s| s.apply(p)))
            .collect();
        next[moving] = target;

        Ok(next)
    }

    #[test]
    fn moving_later_pulls_the_block_back() {
        assert_eq!(
            plan_move(2, 4, 5).unwrap(),
            Some(Shift {
                from: 3,
                to: 4,
                delta: -1
            })
        );
    }

    #[test]
    fn moving_earlier_pushes_the_block_forward() {
        assert_eq!(
            plan_move(3, 1, 3).unwrap(),
            Some(Shift {
                from: 1,
                to: 2,
                delta: 1
            })
        );
    }

    #[test]
    fn moving_in_place_is_a_no_op() {
        assert_eq!(plan_move(2, 2, 3).unwrap(), None);
        assert_eq!(simulate_move(&[1, 2, 3], 1, 2).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn moving_past_the_end_is_out_of_range() {
        let err = plan_move(1, 4, 3).unwrap_err();
        assert!(matches!(
            err,
            StoreError::OutOfRange {
                requested: 4,
                max: 3
            }
        ));
    }

    #[test]
    fn non_positive_targets_are_invalid() {
        assert!(matches!(
            plan_move(1, 0, 3),
            Err(StoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            plan_move(1, -2, 3),
            Err(StoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn last_to_first_rotates_the_list() {
        // steps A, B, C at 1, 2, 3; C moves to 1
        let after = simulate_move(&[1, 2, 3], 2, 1).unwrap();
        assert_eq!(after, vec![2, 3, 1]);
    }

    #[test]
    fn every_move_keeps_positions_dense() {
        for len in 1..=6 {
            let positions: Vec<i32> = (1..=len).collect();
            for moving in 0..positions.len() {
                for target in 1..=len {
                    let after = simulate_move(&positions, moving, target).unwrap();
                    assert!(is_dense(&after), "{positions:?} moving {moving} to {target}");
                    assert_eq!(after[moving], target);
                }
            }
        }
    }

    #[test]
    fn removal_closes_the_gap() {
        assert_eq!(
            plan_removal(2, 4),
            Some(Shift {
                from: 3,
                to: 4,
                delta: -1
            })
        );
        assert_eq!(plan_removal(4, 4), None);

        let shift = plan_removal(2, 4).unwrap();
        let remaining: Vec<i32> = [1, 3, 4].iter().map(|&p| shift.apply(p)).collect();
        assert_eq!(remaining, vec![1, 2, 3]);
    }

    #[test]
    fn density_check() {
        assert!(is_dense(&[]));
        assert!(is_dense(&[3, 1, 2]));
        assert!(!is_dense(&[1, 3]));
        assert!(!is_dense(&[1, 1, 2]));
        assert!(!is_dense(&[0, 1]));
    }
}
