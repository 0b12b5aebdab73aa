//! Property-based tests for state generation and game mechanics.

use std::collections::HashSet;

use proptest::prelude::*;

use super6::constants::LID_HOLES;
use super6::game_mechanics::{is_terminal, reward, roll_transitions, stop_target, swap};
use super6::state_space::{enumerate_states, situations, StateSpace};
use super6::Configuration;

/// Strategy: a non-terminal configuration with up to 20 sticks per hand.
fn configuration_strategy() -> impl Strategy<Value = Configuration> {
    (0..=LID_HOLES, 1..=20u32, 1..=20u32, any::<bool>())
        .prop_map(|(lid, p1, p2, forced)| Configuration::new(lid, p1, p2, forced))
}

/// Number of splits of `m` sticks with both hands non-empty.
fn split_count(m: u32) -> usize {
    (0..=m.min(LID_HOLES))
        .map(|lid| m.saturating_sub(lid + 1) as usize)
        .sum()
}

proptest! {
    // 1. Every generated configuration belongs to a sub-total 1..=n and respects the lid cap
    #[test]
    fn generated_states_are_valid(n in 1..=40u32) {
        for c in enumerate_states(n).unwrap() {
            let m = c.total();
            prop_assert!(m >= 2 && m <= n, "{c:?} has total {m}");
            prop_assert!(c.player1 >= 1 && c.player2 >= 1, "{c:?}");
            prop_assert!(c.lid <= LID_HOLES.min(m), "{c:?}");
        }
    }

    // 2. No duplicates, strictly descending, and the expected size
    #[test]
    fn generated_states_are_unique_and_sorted(n in 1..=40u32) {
        let states = enumerate_states(n).unwrap();
        let unique: HashSet<_> = states.iter().collect();
        prop_assert_eq!(unique.len(), states.len());
        prop_assert!(states.windows(2).all(|w| w[0] > w[1]));
        let expected: usize = (1..=n).map(|m| 2 * split_count(m)).sum();
        prop_assert_eq!(states.len(), expected);
    }

    // 3. Generation is deterministic
    #[test]
    fn generation_is_deterministic(n in 1..=30u32) {
        prop_assert_eq!(enumerate_states(n).unwrap(), enumerate_states(n).unwrap());
    }

    // 4. Every transition target is terminal or in the index (closure of the state set)
    #[test]
    fn transition_targets_are_indexed(n in 2..=30u32) {
        let space = StateSpace::new(n).unwrap();
        for c in space.states() {
            for t in roll_transitions(c).iter().flatten() {
                prop_assert!(
                    is_terminal(&t.target) || space.position(&t.target).is_some(),
                    "{c:?} -> {:?}", t.target
                );
            }
            prop_assert!(space.position(&stop_target(c)).is_some());
        }
    }

    // 5. Swapping twice restores the hands
    #[test]
    fn swap_is_an_involution(c in configuration_strategy()) {
        prop_assert_eq!(swap(swap(c, true), c.forced), c);
        prop_assert_eq!(swap(c, false).total(), c.total());
    }

    // 6. Roll probabilities sum to one and every branch moves at most one stick
    #[test]
    fn roll_branches_are_a_distribution(c in configuration_strategy()) {
        let branches: Vec<_> = roll_transitions(&c).into_iter().flatten().collect();
        let total: f64 = branches.iter().map(|t| t.probability).sum();
        prop_assert!((total - 1.0).abs() < 1e-12, "total={total}");
        for t in &branches {
            prop_assert!(t.target.total() + 1 >= c.total());
            prop_assert!(t.target.lid <= LID_HOLES);
            prop_assert_eq!(t.passes_turn, t.target.forced);
        }
    }

    // 7. Terminal reward: opponent empty is a win, own hand empty is a loss
    #[test]
    fn terminal_reward_signs(lid in 0..=LID_HOLES, k in 1..=20u32, forced in any::<bool>()) {
        prop_assert_eq!(reward(&Configuration::new(lid, k, 0, forced)), 1.0);
        prop_assert_eq!(reward(&Configuration::new(lid, 0, k, forced)), -1.0);
        prop_assert_eq!(reward(&Configuration::new(lid, k, k, forced)), 0.0);
    }
}

#[test]
fn situations_of_total_two() {
    assert_eq!(situations(2), vec![Configuration::new(0, 1, 1, false)]);
}
