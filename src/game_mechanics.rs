//! Super Six rules: canonicalization, roll outcomes, and the terminal reward R.
//!
//! Every configuration is stored from the acting player's perspective. Any move
//! that hands the die to the opponent goes through [`swap`], which exchanges the
//! two hands and sets the `forced` flag. Callers must negate the value of a
//! swapped target to bring it back to their own perspective.
//!
//! A roll has three outcomes:
//!
//! | Face | Probability | Effect |
//! |------|-------------|--------|
//! | six | 1/6 | one stick leaves play, turn continues |
//! | free hole | (5 − lid)/6 | one stick goes into the lid, turn continues |
//! | occupied hole | lid/6 | roller takes the stick out, turn passes (opponent forced to roll) |

use crate::constants::*;
use crate::types::Configuration;

/// Exchange the two hands and set the `forced` flag of the result.
///
/// This is the only place the perspective changes.
#[inline(always)]
pub fn swap(config: Configuration, forced: bool) -> Configuration {
    Configuration {
        lid: config.lid,
        player1: config.player2,
        player2: config.player1,
        forced,
    }
}

/// A configuration where either hand is empty ends the game.
#[inline(always)]
pub fn is_terminal(config: &Configuration) -> bool {
    config.player1 == 0 || config.player2 == 0
}

/// Terminal reward R(s) from the perspective of `config.player1`:
/// +1 when the opponent's hand is empty, −1 when the acting player's is, else 0.
#[inline(always)]
pub fn reward(config: &Configuration) -> f64 {
    if config.player2 == 0 {
        1.0
    } else if config.player1 == 0 {
        -1.0
    } else {
        0.0
    }
}

/// Which face group a roll landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RollOutcome {
    Six,
    FreeHole,
    OccupiedHole,
}

/// One weighted branch of the roll action.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub outcome: RollOutcome,
    pub probability: f64,
    pub target: Configuration,
    /// The target is seen from the opponent's side and its value must be negated.
    pub passes_turn: bool,
}

impl Transition {
    /// Probability-weighted contribution p·(R(t) ± U(t)) to Q(s, continue).
    #[inline(always)]
    pub fn backup(&self, target_value: f64) -> f64 {
        let r = reward(&self.target);
        if self.passes_turn {
            self.probability * (r - target_value)
        } else {
            self.probability * (r + target_value)
        }
    }
}

/// Six: a stick leaves play.
#[inline(always)]
pub fn six_target(config: &Configuration) -> Configuration {
    Configuration::new(config.lid, config.player1 - 1, config.player2, false)
}

/// Free hole: a stick goes into the lid. Only defined for `lid < 5`.
#[inline(always)]
pub fn free_hole_target(config: &Configuration) -> Configuration {
    debug_assert!(config.lid < LID_HOLES, "lid {} has no free hole", config.lid);
    Configuration::new(config.lid + 1, config.player1 - 1, config.player2, false)
}

/// Occupied hole: the roller takes the stick and the opponent must roll.
/// Only defined for `lid > 0`.
#[inline(always)]
pub fn occupied_hole_target(config: &Configuration) -> Configuration {
    debug_assert!(config.lid > 0, "empty lid has no occupied hole");
    let after_pickup = Configuration::new(config.lid - 1, config.player1 + 1, config.player2, false);
    swap(after_pickup, true)
}

/// Stop: sticks unchanged, the opponent must roll.
#[inline(always)]
pub fn stop_target(config: &Configuration) -> Configuration {
    swap(*config, true)
}

/// The roll branches of a non-terminal configuration. Branches with zero
/// probability are `None`; the present ones always sum to probability 1.
pub fn roll_transitions(config: &Configuration) -> [Option<Transition>; 3] {
    debug_assert!(!is_terminal(config), "no roll from terminal {:?}", config);
    debug_assert!(config.lid <= LID_HOLES, "lid {} exceeds capacity", config.lid);

    let six = Some(Transition {
        outcome: RollOutcome::Six,
        probability: face_probability(1),
        target: six_target(config),
        passes_turn: false,
    });
    let free = (config.lid < LID_HOLES).then(|| Transition {
        outcome: RollOutcome::FreeHole,
        probability: face_probability(LID_HOLES - config.lid),
        target: free_hole_target(config),
        passes_turn: false,
    });
    let occupied = (config.lid > 0).then(|| Transition {
        outcome: RollOutcome::OccupiedHole,
        probability: face_probability(config.lid),
        target: occupied_hole_target(config),
        passes_turn: true,
    });
    [six, free, occupied]
}
