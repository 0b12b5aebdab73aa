//! # Super Six: optimal stop/continue strategy
//!
//! Computes the game-theoretic value of every configuration of the stick
//! wagering dice game Super Six, and the action (roll again or pass the die)
//! that maximizes the acting player's expected outcome, using **value
//! iteration** over the finite state space.
//!
//! ## Algorithm overview
//!
//! | Step | Rust module | Description |
//! |------|-------------|-------------|
//! | 1 | [`state_space`] | Enumerate every `(lid, player1, player2, forced)` for totals 1..=n, sort descending, build a hash index |
//! | 2 | [`value_iteration`] | Sweep the Bellman update until `max |U − U'| ≤ 1e-10`, recording the maximizing action |
//! | 3 | [`strategy_table`] | Flatten `U` and `π` into rows with the win probability `0.5·U + 0.5` |
//!
//! ## State representation
//!
//! A configuration is always read from the player about to act:
//! - `lid` ∈ [0, 5]: sticks in the lid's five holes
//! - `player1`, `player2` ≥ 1: the acting player's and the opponent's hands
//! - `forced`: the acting player must roll
//!
//! Passing the die swaps the hands ([`game_mechanics::swap`]) instead of
//! tracking whose turn it is, so a value read through a swap is negated.
//! Configurations with an empty hand are terminal and never stored; their
//! value is 0 and the transition into them carries reward ±1.

pub mod api_computations;
pub mod constants;
pub mod env_config;
pub mod error;
pub mod game_mechanics;
pub mod server;
pub mod state_space;
pub mod storage;
pub mod strategy_table;
pub mod types;
pub mod value_iteration;

pub use error::{Error, Result};
pub use state_space::StateSpace;
pub use types::{Action, ActionValues, Configuration};
pub use value_iteration::{solve, solve_with_config, Solution, SolverConfig, UpdateMode};
