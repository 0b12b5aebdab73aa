//! Core data structures: configurations, actions, and per-action values.
//!
//! A [`Configuration`] is always seen from the player about to act: `player1`
//! holds that player's sticks, `player2` the opponent's. Passing the turn is
//! modelled by swapping the two counts (see [`crate::game_mechanics::swap`]),
//! so there is no separate "whose turn" field.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Game configuration `(lid, player1, player2, forced)`.
///
/// - `lid`: sticks sitting in the lid's holes, 0 ≤ lid ≤ 5
/// - `player1`: sticks held by the acting player
/// - `player2`: sticks held by the opponent
/// - `forced`: the acting player must roll (no option to stop)
///
/// Field order matters: the derived `Ord` compares `lid`, then `player1`, then
/// `player2`, then `forced`, which is the order the generator sorts by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Configuration {
    pub lid: u32,
    pub player1: u32,
    pub player2: u32,
    pub forced: bool,
}

impl Configuration {
    pub const fn new(lid: u32, player1: u32, player2: u32, forced: bool) -> Self {
        Self {
            lid,
            player1,
            player2,
            forced,
        }
    }

    /// Total sticks still in the game (lid plus both hands).
    #[inline(always)]
    pub fn total(&self) -> u32 {
        self.lid + self.player1 + self.player2
    }

    /// Same sticks, with the `forced` flag replaced.
    #[inline(always)]
    pub fn with_forced(self, forced: bool) -> Self {
        Self { forced, ..self }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.lid, self.player1, self.player2)?;
        if self.forced {
            write!(f, " (forced)")?;
        }
        Ok(())
    }
}

/// The two choices available at a free configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Roll the die again.
    Continue,
    /// Pass the die; the opponent must roll.
    Stop,
}

impl Action {
    /// `true` for [`Action::Continue`], matching the `strategy` column of the output table.
    #[inline(always)]
    pub fn is_continue(self) -> bool {
        matches!(self, Action::Continue)
    }

    /// Storage encoding: 1 = continue, 0 = stop.
    pub fn to_byte(self) -> u8 {
        self.is_continue() as u8
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Action::Continue),
            0 => Some(Action::Stop),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Continue => write!(f, "continue"),
            Action::Stop => write!(f, "stop"),
        }
    }
}

/// One-step lookahead values Q(s, continue) and Q(s, stop) for a configuration,
/// both from the acting player's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ActionValues {
    pub continue_value: f64,
    pub stop_value: f64,
}

impl ActionValues {
    /// Value-maximizing action; ties resolve to [`Action::Stop`].
    pub fn best_action(&self) -> Action {
        if self.continue_value > self.stop_value {
            Action::Continue
        } else {
            Action::Stop
        }
    }

    /// U'(s) for this configuration: the max over both actions when the player
    /// has a choice, the continue value when the roll is forced.
    pub fn value(&self, forced: bool) -> f64 {
        if forced {
            self.continue_value
        } else {
            self.continue_value.max(self.stop_value)
        }
    }

    /// Action recorded in the policy table: always continue when forced.
    pub fn policy(&self, forced: bool) -> Action {
        if forced {
            Action::Continue
        } else {
            self.best_action()
        }
    }
}

/// Win probability for the acting player given a value in [-1, 1].
#[inline(always)]
pub fn win_probability(value: f64) -> f64 {
    0.5 * value + 0.5
}
