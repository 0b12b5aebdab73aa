//! Value iteration: compute U(s) and π(s) for every configuration of a total.
//!
//! Each sweep applies the one-step lookahead
//!
//! ```text
//! Q(s, continue) = Σ_branches p · (R(t) + U(t))     turn kept
//!                + p_occ · (R(t_occ) − U(t_occ))     turn passed
//! Q(s, stop)     = −(R(t_stop) + U(t_stop))
//! U'(s)          = max(Q_continue, Q_stop)           free
//!                = Q_continue                        forced
//! ```
//!
//! and stops once `Δ = max_s |U(s) − U'(s)| ≤ ε`. Terminal targets contribute
//! only their reward. The game is not discounted; termination comes from every
//! cycle passing through rolls that remove sticks with positive probability.
//!
//! ## Update modes
//!
//! - [`UpdateMode::Synchronous`]: every state reads the previous sweep's table
//!   and writes into a scratch table, which replaces the old one at the end of
//!   the sweep. With `parallel`, states within a sweep are updated on rayon
//!   workers; the sweep still finishes completely before the next one starts.
//! - [`UpdateMode::InPlace`]: Gauss–Seidel, each state reads values already
//!   updated earlier in the same sweep. Fewer sweeps, same fixed point.

use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::constants::*;
use crate::error::{Error, Result};
use crate::game_mechanics::{reward, roll_transitions, stop_target};
use crate::state_space::StateSpace;
use crate::types::{win_probability, Action, ActionValues, Configuration};

/// How a sweep reads and writes the value table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpdateMode {
    /// Read the previous table, write a scratch table, swap at the end of the sweep.
    #[default]
    Synchronous,
    /// Overwrite values in place as the sweep proceeds (Gauss–Seidel).
    InPlace,
}

/// Solver settings.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Stop once the largest per-state change of a sweep is at most this.
    pub epsilon: f64,
    /// Sweeps allowed before giving up with [`Error::NonConvergence`].
    pub max_iterations: usize,
    pub update: UpdateMode,
    /// Update states of a synchronous sweep on the rayon pool. Ignored for in-place updates.
    pub parallel: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            epsilon: EPSILON,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            update: UpdateMode::Synchronous,
            parallel: false,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(Error::InvalidConfiguration {
                message: format!("epsilon must be positive and finite, got {}", self.epsilon),
            });
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidConfiguration {
                message: "max_iterations must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Converged value function and policy, positionally indexed by the state space.
#[derive(Clone, Debug)]
pub struct Solution {
    space: StateSpace,
    values: Vec<f64>,
    policy: Vec<Action>,
    iterations: usize,
    final_delta: f64,
}

impl Solution {
    /// Assemble a solution from stored tables. Lengths must match the state space.
    pub(crate) fn from_parts(
        space: StateSpace,
        values: Vec<f64>,
        policy: Vec<Action>,
        iterations: usize,
        final_delta: f64,
    ) -> Result<Self> {
        if values.len() != space.len() || policy.len() != space.len() {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "table sizes (values={}, policy={}) do not match {} states",
                    values.len(),
                    policy.len(),
                    space.len()
                ),
            });
        }
        Ok(Self {
            space,
            values,
            policy,
            iterations,
            final_delta,
        })
    }

    pub fn total(&self) -> u32 {
        self.space.total()
    }

    pub fn space(&self) -> &StateSpace {
        &self.space
    }

    pub fn states(&self) -> &[Configuration] {
        self.space.states()
    }

    /// U, in state-space order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// π, in state-space order.
    pub fn policy(&self) -> &[Action] {
        &self.policy
    }

    /// Number of sweeps run, including the final one that met the tolerance.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Δ of the last sweep.
    pub fn final_delta(&self) -> f64 {
        self.final_delta
    }

    pub fn value(&self, config: &Configuration) -> Option<f64> {
        self.space.position(config).map(|slot| self.values[slot])
    }

    pub fn action(&self, config: &Configuration) -> Option<Action> {
        self.space.position(config).map(|slot| self.policy[slot])
    }

    pub fn win_probability(&self, config: &Configuration) -> Option<f64> {
        self.value(config).map(win_probability)
    }

    /// Q(s, continue) and Q(s, stop) against the converged table.
    pub fn action_values(&self, config: &Configuration) -> Result<ActionValues> {
        if self.space.position(config).is_none() {
            return Err(Error::LookupFailure {
                configuration: *config,
            });
        }
        one_step_lookahead(&self.space, &self.values, config)
    }

    /// `(configuration, value, action)` triples in state-space order.
    pub fn iter(&self) -> impl Iterator<Item = (Configuration, f64, Action)> + '_ {
        self.space
            .states()
            .iter()
            .zip(self.values.iter())
            .zip(self.policy.iter())
            .map(|((c, v), a)| (*c, *v, *a))
    }
}

/// One-step lookahead for a single non-terminal configuration against `values`.
pub fn one_step_lookahead(
    space: &StateSpace,
    values: &[f64],
    config: &Configuration,
) -> Result<ActionValues> {
    let mut continue_value = 0.0;
    for transition in roll_transitions(config).iter().flatten() {
        let u = space.value_of(values, &transition.target)?;
        continue_value += transition.backup(u);
    }

    let stop = stop_target(config);
    let stop_value = -(reward(&stop) + space.value_of(values, &stop)?);

    Ok(ActionValues {
        continue_value,
        stop_value,
    })
}

/// Solve `total` with the default [`SolverConfig`].
pub fn solve(total: u32) -> Result<Solution> {
    solve_with_config(total, &SolverConfig::default())
}

/// Enumerate the states for `total` and run value iteration to convergence.
pub fn solve_with_config(total: u32, config: &SolverConfig) -> Result<Solution> {
    config.validate()?;
    let space = StateSpace::new(total)?;
    solve_space(space, config)
}

/// Run value iteration over an already built state space.
pub fn solve_space(space: StateSpace, config: &SolverConfig) -> Result<Solution> {
    config.validate()?;
    let n_states = space.len();
    let parallel = config.parallel && config.update == UpdateMode::Synchronous;
    if config.parallel && !parallel {
        debug!(update = ?config.update, "parallel sweeps need synchronous updates, running sequentially");
    }

    info!(
        total = space.total(),
        states = n_states,
        update = ?config.update,
        parallel,
        "starting value iteration"
    );

    let mut values = vec![0.0f64; n_states];
    let mut scratch = vec![0.0f64; n_states];
    let mut policy = vec![Action::Continue; n_states];
    let mut progress = SolveProgress::new(n_states);

    let mut iterations = 0usize;
    let final_delta = loop {
        iterations += 1;
        let delta = match config.update {
            UpdateMode::Synchronous => {
                let delta = if parallel {
                    sweep_parallel(&space, &values, &mut scratch, &mut policy)?
                } else {
                    sweep_synchronous(&space, &values, &mut scratch, &mut policy)?
                };
                std::mem::swap(&mut values, &mut scratch);
                delta
            }
            UpdateMode::InPlace => sweep_in_place(&space, &mut values, &mut policy)?,
        };
        progress.report(iterations, delta);

        if delta <= config.epsilon {
            break delta;
        }
        if iterations >= config.max_iterations {
            return Err(Error::NonConvergence { iterations, delta });
        }
    };

    info!(
        total = space.total(),
        iterations,
        delta = final_delta,
        elapsed_ms = progress.elapsed_ms(),
        "value iteration converged"
    );

    Ok(Solution {
        space,
        values,
        policy,
        iterations,
        final_delta,
    })
}

/// Full-table sweep: read `values`, write `next` and `policy`. Returns Δ.
fn sweep_synchronous(
    space: &StateSpace,
    values: &[f64],
    next: &mut [f64],
    policy: &mut [Action],
) -> Result<f64> {
    let mut delta = 0.0f64;
    for (slot, config) in space.states().iter().enumerate() {
        let q = one_step_lookahead(space, values, config)?;
        next[slot] = q.value(config.forced);
        policy[slot] = q.policy(config.forced);
        delta = delta.max((values[slot] - next[slot]).abs());
    }
    Ok(delta)
}

/// Same as [`sweep_synchronous`], with states split across rayon workers.
///
/// Workers only read `values`, and each writes its own slot of `next`/`policy`,
/// so the result is identical to the sequential sweep.
fn sweep_parallel(
    space: &StateSpace,
    values: &[f64],
    next: &mut [f64],
    policy: &mut [Action],
) -> Result<f64> {
    next.par_iter_mut()
        .zip(policy.par_iter_mut())
        .zip(space.states().par_iter())
        .try_for_each(|((u, action), config)| -> Result<()> {
            let q = one_step_lookahead(space, values, config)?;
            *u = q.value(config.forced);
            *action = q.policy(config.forced);
            Ok(())
        })?;

    Ok(values
        .par_iter()
        .zip(next.par_iter())
        .map(|(old, new)| (old - new).abs())
        .reduce(|| 0.0, f64::max))
}

/// Gauss–Seidel sweep: later states see this sweep's earlier updates. Returns Δ.
fn sweep_in_place(space: &StateSpace, values: &mut [f64], policy: &mut [Action]) -> Result<f64> {
    let mut delta = 0.0f64;
    for (slot, config) in space.states().iter().enumerate() {
        let q = one_step_lookahead(space, values, config)?;
        let updated = q.value(config.forced);
        delta = delta.max((values[slot] - updated).abs());
        values[slot] = updated;
        policy[slot] = q.policy(config.forced);
    }
    Ok(delta)
}

/// Progress tracker for the sweep loop: every sweep at debug level, a
/// rate-limited summary at info level for long solves.
struct SolveProgress {
    total_states: usize,
    start_time: Instant,
    last_report_time: Instant,
}

impl SolveProgress {
    fn new(total_states: usize) -> Self {
        let now = Instant::now();
        Self {
            total_states,
            start_time: now,
            last_report_time: now,
        }
    }

    fn report(&mut self, iteration: usize, delta: f64) {
        debug!(iteration, delta, "sweep complete");

        let now = Instant::now();
        if now.duration_since(self.last_report_time).as_secs_f64() < 0.5 {
            return;
        }
        self.last_report_time = now;

        let elapsed = now.duration_since(self.start_time).as_secs_f64();
        let rate = (iteration * self.total_states) as f64 / elapsed;
        info!(
            iteration,
            delta,
            elapsed_s = elapsed,
            updates_per_s = rate.round(),
            "value iteration progress"
        );
    }

    fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }
}
