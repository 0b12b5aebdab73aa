//! Lookups against a solved table for callers that describe a position in
//! their own terms.
//!
//! [`evaluate`] takes a configuration already in acting-player form.
//! [`evaluate_for_seat`] takes a position from either player's chair and
//! canonicalizes it first, negating the value when the caller is waiting.

use serde::{Deserialize, Serialize};

use crate::constants::{LID_HOLES, MAX_TOTAL_STICKS};
use crate::error::{Error, Result};
use crate::game_mechanics::{is_terminal, swap};
use crate::types::{win_probability, Action, ActionValues, Configuration};
use crate::value_iteration::Solution;

/// Value, action and win probability of one configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Evaluation {
    pub configuration: Configuration,
    pub value: f64,
    pub action: Action,
    pub win_probability: f64,
    pub action_values: ActionValues,
}

/// Which chair the caller sits in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seat {
    /// The caller holds the die.
    #[default]
    Acting,
    /// The opponent holds the die.
    Waiting,
}

/// Reject configurations that can never appear in a state table. Runs before
/// anything sums the stick counts, so oversized counts cannot overflow.
pub fn validate_configuration(config: &Configuration) -> Result<()> {
    if is_terminal(config) {
        return Err(Error::InvalidConfiguration {
            message: format!("{} is terminal: both hands must hold at least one stick", config),
        });
    }
    let sticks = u64::from(config.lid) + u64::from(config.player1) + u64::from(config.player2);
    if sticks > u64::from(MAX_TOTAL_STICKS) {
        return Err(Error::InvalidConfiguration {
            message: format!("{} sticks exceeds the maximum of {}", sticks, MAX_TOTAL_STICKS),
        });
    }
    if config.lid > LID_HOLES {
        return Err(Error::InvalidConfiguration {
            message: format!("lid holds {} sticks but has only {} holes", config.lid, LID_HOLES),
        });
    }
    Ok(())
}

/// Evaluate an acting-player configuration.
///
/// Returns `Ok(None)` when the configuration is valid but has more sticks than
/// the solved total.
pub fn evaluate(solution: &Solution, config: &Configuration) -> Result<Option<Evaluation>> {
    validate_configuration(config)?;
    let Some(slot) = solution.space().position(config) else {
        return Ok(None);
    };
    let value = solution.values()[slot];
    Ok(Some(Evaluation {
        configuration: *config,
        value,
        action: solution.policy()[slot],
        win_probability: win_probability(value),
        action_values: solution.action_values(config)?,
    }))
}

/// Evaluate a position from the caller's chair.
///
/// `own` and `other` are the caller's and the opponent's sticks; `forced`
/// applies to whoever holds the die. The returned value and win probability
/// are the caller's; `action` is the recommendation for the player holding the die.
pub fn evaluate_for_seat(
    solution: &Solution,
    lid: u32,
    own: u32,
    other: u32,
    seat: Seat,
    forced: bool,
) -> Result<Option<Evaluation>> {
    let as_caller = Configuration::new(lid, own, other, forced);
    match seat {
        Seat::Acting => evaluate(solution, &as_caller),
        Seat::Waiting => {
            let canonical = swap(as_caller, forced);
            Ok(evaluate(solution, &canonical)?.map(|e| {
                let value = -e.value;
                Evaluation {
                    value,
                    win_probability: win_probability(value),
                    ..e
                }
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_iteration::solve;

    #[test]
    fn test_evaluate_known_state() {
        let solution = solve(3).unwrap();
        let e = evaluate(&solution, &Configuration::new(1, 1, 1, false))
            .unwrap()
            .unwrap();
        assert!((e.value - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(e.action, Action::Stop);
        assert!((e.win_probability - 5.0 / 6.0).abs() < 1e-9);
        assert!((e.action_values.stop_value - 2.0 / 3.0).abs() < 1e-9);
        assert!((e.action_values.continue_value + 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_evaluate_rejects_terminal_and_overfull_lid() {
        let solution = solve(3).unwrap();
        assert!(matches!(
            evaluate(&solution, &Configuration::new(0, 0, 3, false)),
            Err(Error::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            evaluate(&solution, &Configuration::new(6, 1, 1, false)),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_oversized_counts_rejected_without_overflow() {
        let config = Configuration::new(5, u32::MAX, 1, false);
        assert!(matches!(
            validate_configuration(&config),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_evaluate_beyond_total() {
        let solution = solve(3).unwrap();
        assert!(evaluate(&solution, &Configuration::new(0, 3, 3, false))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_waiting_seat_negates() {
        let solution = solve(3).unwrap();
        // Caller holds 1, opponent holds 2 and must roll: the opponent sees 0/2/1 forced.
        let e = evaluate_for_seat(&solution, 0, 1, 2, Seat::Waiting, true)
            .unwrap()
            .unwrap();
        assert_eq!(e.configuration, Configuration::new(0, 2, 1, true));
        assert!((e.value + 13.0 / 18.0).abs() < 1e-9);
        assert_eq!(e.action, Action::Continue);

        let acting = evaluate_for_seat(&solution, 0, 2, 1, Seat::Acting, true)
            .unwrap()
            .unwrap();
        assert!((acting.value + e.value).abs() < 1e-15);
    }
}
