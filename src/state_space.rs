//! State space generation: every non-terminal configuration for totals 1..=n.
//!
//! For each sub-total m, the lid holds between `min(m, 5)` and 0 sticks and the
//! remainder is split so that both hands hold at least one stick. Each split is
//! emitted twice, once free and once forced. The combined list is sorted in
//! descending `(lid, player1, player2, forced)` order and never reordered
//! afterwards: value and policy tables are indexed by position in it.

use std::collections::HashMap;

use crate::constants::LID_HOLES;
use crate::error::{Error, Result};
use crate::game_mechanics::is_terminal;
use crate::types::Configuration;

/// All `(lid, player1, player2)` splits of exactly `total` sticks with both hands non-empty,
/// as free configurations, lid descending then `player1` descending.
pub fn situations(total: u32) -> Vec<Configuration> {
    let mut res = Vec::new();
    for lid in (0..=total.min(LID_HOLES)).rev() {
        for player1 in (1..=total).rev() {
            let Some(player2) = total.checked_sub(lid + player1) else {
                continue;
            };
            if player2 >= 1 {
                res.push(Configuration::new(lid, player1, player2, false));
            }
        }
    }
    res
}

/// Every configuration for sub-totals 1..=`total`, free and forced, sorted descending.
///
/// Returns [`Error::InvalidInput`] for `total == 0`.
pub fn enumerate_states(total: u32) -> Result<Vec<Configuration>> {
    if total < 1 {
        return Err(Error::InvalidInput { total });
    }
    let mut states = Vec::new();
    for m in 1..=total {
        let s = situations(m);
        for forced in [false, true] {
            states.extend(s.iter().map(|c| c.with_forced(forced)));
        }
    }
    states.sort_unstable_by(|a, b| b.cmp(a));
    states.dedup();
    Ok(states)
}

/// Number of configurations [`enumerate_states`] yields for `total`, without
/// enumerating them: two (free and forced) per split of every sub-total.
pub fn state_count(total: u32) -> usize {
    (1..=total)
        .map(|m| {
            let splits: usize = (0..=m.min(LID_HOLES))
                .map(|lid| m.saturating_sub(lid + 1) as usize)
                .sum();
            2 * splits
        })
        .sum()
}

/// Ordered state list plus a hash index from configuration to table slot.
///
/// Built once per total and immutable afterwards.
#[derive(Clone, Debug)]
pub struct StateSpace {
    total: u32,
    states: Vec<Configuration>,
    index: HashMap<Configuration, usize>,
}

impl StateSpace {
    pub fn new(total: u32) -> Result<Self> {
        let states = enumerate_states(total)?;
        let index = states
            .iter()
            .enumerate()
            .map(|(slot, config)| (*config, slot))
            .collect();
        Ok(Self {
            total,
            states,
            index,
        })
    }

    /// Largest sub-total covered.
    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[Configuration] {
        &self.states
    }

    pub fn get(&self, slot: usize) -> Option<&Configuration> {
        self.states.get(slot)
    }

    /// Table slot of `config`, if it is in the enumerated set.
    #[inline(always)]
    pub fn position(&self, config: &Configuration) -> Option<usize> {
        self.index.get(config).copied()
    }

    /// Value of a transition target: 0 for terminal targets, `values[slot]` otherwise.
    ///
    /// A non-terminal target missing from the index is a wiring bug and is
    /// reported as [`Error::LookupFailure`] rather than defaulted.
    #[inline(always)]
    pub fn value_of(&self, values: &[f64], target: &Configuration) -> Result<f64> {
        if is_terminal(target) {
            return Ok(0.0);
        }
        self.position(target)
            .map(|slot| values[slot])
            .ok_or(Error::LookupFailure {
                configuration: *target,
            })
    }
}
