use log::{debug, info, trace, warn};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use strum::VariantArray;

use crate::{
    assert_interval,
    ds::QTable,
    env::{
        grid::{FREE, GOAL, PENALTY},
        Action, Grid, Pos, State,
    },
    error::{Error, Result},
};

/// Log target of the per-step `trace!` records
pub(crate) const STEP_LOG_TARGET: &str = module_path!();

/// Configuration for the [`QTableAgent`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QTableAgentConfig {
    /// Learning rate, in `[0, 1]`
    pub alpha: f32,
    /// Discount factor, in `[0, 1]`
    pub gamma: f32,
    /// Most steps a single episode may take before it is abandoned
    pub max_steps: u32,
}

impl Default for QTableAgentConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.9,
            max_steps: 10_000,
        }
    }
}

/// How an episode came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeEnd {
    /// The agent stepped onto a goal or penalty cell
    Terminal,
    /// The agent stood on a cell with no legal action
    Stuck,
}

/// Summary of a finished episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeReport {
    pub start: Pos,
    pub steps: u32,
    pub reward: f32,
    pub end: EpisodeEnd,
}

/// A Q-learning agent that explores a [`Grid`] by uniformly random legal moves
///
/// Each episode starts on a random free cell and runs until a terminal cell is reached. Every step
/// blends the value of the move just taken with the reward received plus the discounted best value
/// of the cell moved to. The table is shared by all episodes of the agent.
///
/// ### Generics
/// - `R` - The random number generator driving start positions and move choices
///     - Seed it to make a run reproducible, see [`QTableAgent::seeded`]
pub struct QTableAgent<'g, R: Rng = StdRng> {
    grid: &'g Grid,
    q_table: QTable,
    rng: R,
    alpha: f32,     // learning rate
    gamma: f32,     // discount factor
    max_steps: u32, // step cap per episode
    episode: u32,   // current episode
}

impl<'g> QTableAgent<'g, StdRng> {
    /// Initialize an agent whose random choices are fully determined by `seed`
    pub fn seeded(grid: &'g Grid, config: QTableAgentConfig, seed: u64) -> Self {
        Self::new(grid, config, StdRng::seed_from_u64(seed))
    }
}

impl<'g, R: Rng> QTableAgent<'g, R> {
    /// Initialize a new agent with a zeroed table sized to `grid`
    ///
    /// **Panics** if `alpha` or `gamma` is not in the interval `[0,1]`
    pub fn new(grid: &'g Grid, config: QTableAgentConfig, rng: R) -> Self {
        assert_interval!(config.alpha, 0.0, 1.0);
        assert_interval!(config.gamma, 0.0, 1.0);
        Self {
            grid,
            q_table: QTable::for_grid(grid),
            rng,
            alpha: config.alpha,
            gamma: config.gamma,
            max_steps: config.max_steps,
            episode: 0,
        }
    }

    /// Initialize an agent that continues learning from an existing table
    ///
    /// Fails if the table does not have the grid's dimensions.
    ///
    /// **Panics** if `alpha` or `gamma` is not in the interval `[0,1]`
    pub fn with_table(
        grid: &'g Grid,
        q_table: QTable,
        config: QTableAgentConfig,
        rng: R,
    ) -> Result<Self> {
        q_table.check_fits(grid)?;
        Ok(Self {
            q_table,
            ..Self::new(grid, config, rng)
        })
    }

    pub fn grid(&self) -> &'g Grid {
        self.grid
    }

    pub fn get_q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn into_q_table(self) -> QTable {
        self.q_table
    }

    /// Number of episodes completed so far
    pub fn episode(&self) -> u32 {
        self.episode
    }

    /// Draw a uniformly random free cell to start an episode from
    ///
    /// Positions are drawn over the whole grid until one lands on a free cell.
    pub fn random_state(&mut self) -> Result<State<'g>> {
        if !self.grid.has_free_cell() {
            return Err(Error::NoFreeCell);
        }

        let width = self.grid.width() as i32;
        let height = self.grid.height() as i32;
        loop {
            let x = self.rng.gen_range(0..width);
            let y = self.rng.gen_range(0..height);
            if self.grid.get(x, y) == Some(FREE) {
                return Ok(State::new(self.grid, x, y));
            }
        }
    }

    /// Choose a legal action uniformly at random, if there is one
    fn act(&mut self, state: &State<'g>) -> Option<Action> {
        state
            .legal_actions(Action::VARIANTS)
            .choose(&mut self.rng)
            .copied()
    }

    /// Update the table for taking `action` in `state` and arriving in `next_state`
    ///
    /// **Returns** the reward received on arrival
    fn update(&mut self, state: &State<'g>, action: Action, next_state: &State<'g>) -> f32 {
        // A legal move always lands on the map
        let reward = next_state.reward().unwrap_or_default();
        // Max over all four actions, legal from `next_state` or not
        let max_next_q = self.q_table.max(next_state.pos());

        let q_value = &mut self.q_table[(state.pos(), action)];
        *q_value = updated_q_value(*q_value, reward, max_next_q, self.alpha, self.gamma);

        trace!(
            target: STEP_LOG_TARGET,
            "({}, {}) {action} -> ({}, {}): reward {reward}, q {:.4}",
            state.x(),
            state.y(),
            next_state.x(),
            next_state.y(),
            *q_value,
        );

        reward
    }

    /// Take one random legal step from `state` and learn from it
    ///
    /// **Returns** the action taken, the state reached and the reward received, or `None` if no action
    /// is legal in `state` or the agent could not be standing there. The table is untouched in that case.
    pub(crate) fn step(&mut self, state: &State<'g>) -> Option<(Action, State<'g>, f32)> {
        if !self.can_occupy(state) {
            return None;
        }
        let action = self.act(state)?;
        let next_state = state.execute(action);
        let reward = self.update(state, action, &next_state);
        Some((action, next_state, reward))
    }

    /// Whether `state` is on a free or terminal cell of this agent's own grid
    fn can_occupy(&self, state: &State<'g>) -> bool {
        std::ptr::eq(state.grid(), self.grid) && matches!(state.cell(), Some(FREE | GOAL | PENALTY))
    }

    /// Run a single episode, see [`QTableAgent::learn_episode_observed`]
    pub fn learn_episode(&mut self) -> Result<EpisodeReport> {
        self.learn_episode_observed(|_| {})
    }

    /// Run a single episode, passing every state the agent occupies to `on_state`
    ///
    /// The start state is observed first and the final state last. An episode whose current cell
    /// allows no move ends early as [`EpisodeEnd::Stuck`].
    ///
    /// Fails with [`Error::StepLimitExceeded`] once `max_steps` moves have not led to a terminal cell.
    /// The updates made up to then stay in the table, but the abandoned episode is not counted by
    /// [`QTableAgent::episode`].
    pub fn learn_episode_observed<F>(&mut self, mut on_state: F) -> Result<EpisodeReport>
    where
        F: FnMut(&State<'g>),
    {
        let mut state = self.random_state()?;
        let start = state.pos();
        let mut steps = 0;
        let mut total_reward = 0.0;

        on_state(&state);
        let end = loop {
            if state.at_end() {
                break EpisodeEnd::Terminal;
            }
            if steps >= self.max_steps {
                return Err(Error::StepLimitExceeded {
                    limit: self.max_steps,
                    x: start.0,
                    y: start.1,
                });
            }

            let Some((_, next_state, reward)) = self.step(&state) else {
                warn!(
                    "Episode {}: no legal action from ({}, {})",
                    self.episode,
                    state.x(),
                    state.y()
                );
                break EpisodeEnd::Stuck;
            };

            steps += 1;
            total_reward += reward;
            state = next_state;
            on_state(&state);
        };

        debug!(
            "Episode {} from {:?} ended ({:?}) after {steps} steps with reward {total_reward}",
            self.episode, start, end
        );
        self.episode += 1;

        Ok(EpisodeReport {
            start,
            steps,
            reward: total_reward,
            end,
        })
    }

    /// Run `episodes` episodes in sequence, all updating the same table
    ///
    /// Stops at the first episode that fails. The table keeps what was learned until then, while the
    /// reports of the episodes already finished are dropped along with the error. Call
    /// [`QTableAgent::learn_episode`] in a loop to keep them.
    pub fn learn(&mut self, episodes: u32) -> Result<Vec<EpisodeReport>> {
        info!(
            "Learning for {episodes} episodes (alpha = {}, gamma = {})",
            self.alpha, self.gamma
        );

        let reports = (0..episodes)
            .map(|_| self.learn_episode())
            .collect::<Result<Vec<_>>>()
            .inspect_err(|err| warn!("Learning stopped in episode {}: {err}", self.episode))?;

        let goals = reports.iter().filter(|r| r.reward > 0.0).count();
        info!("Finished {episodes} episodes, {goals} reached the goal");

        Ok(reports)
    }
}

/// q ← (1 − α)·q + α·(r + γ·max<sub>a'</sub> q')
fn updated_q_value(q_value: f32, reward: f32, max_next_q: f32, alpha: f32, gamma: f32) -> f32 {
    (1.0 - alpha) * q_value + alpha * (reward + gamma * max_next_q)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use statrs::distribution::{ChiSquared, ContinuousCDF};

    use super::*;
    use crate::env::{GOAL_REWARD, PENALTY_REWARD};

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-5,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn untrained_table_is_zero() {
        let grid = Grid::default();
        let agent = QTableAgent::seeded(&grid, QTableAgentConfig::default(), 0);
        assert!(agent.get_q_table().iter().all(|(_, _, v)| v == 0.0));
        assert_eq!(agent.episode(), 0);
    }

    #[test]
    fn single_move_to_goal() {
        let grid = Grid::parse(" +").unwrap();
        let mut agent = QTableAgent::seeded(&grid, QTableAgentConfig::default(), 1);

        let report = agent.learn_episode().unwrap();
        assert_eq!(
            report,
            EpisodeReport {
                start: (0, 0),
                steps: 1,
                reward: GOAL_REWARD,
                end: EpisodeEnd::Terminal,
            }
        );
        assert_close(agent.get_q_table().get((0, 0), Action::Right), 1.0);

        agent.learn_episode().unwrap();
        assert_close(agent.get_q_table().get((0, 0), Action::Right), 1.9);

        let untouched = agent
            .get_q_table()
            .iter()
            .filter(|&(pos, action, _)| !(pos == (0, 0) && action == Action::Right))
            .all(|(_, _, v)| v == 0.0);
        assert!(untouched, "Only the move taken is updated");
        assert_eq!(agent.episode(), 2);
    }

    #[test]
    fn successor_value_maximizes_over_illegal_actions() {
        let grid = Grid::parse("  +").unwrap();
        let mut table = QTable::for_grid(&grid);
        table.set((1, 0), Action::Up, 3.0); // off the map from (1, 0)
        table.set((1, 0), Action::Right, 2.0);
        table.set((1, 0), Action::Left, 1.0);

        let mut agent = QTableAgent::with_table(
            &grid,
            table,
            QTableAgentConfig::default(),
            StdRng::seed_from_u64(0),
        )
        .unwrap();

        let state = State::new(&grid, 0, 0);
        let (action, next_state, reward) = agent.step(&state).unwrap();
        assert_eq!(action, Action::Right, "The only legal move");
        assert_eq!(next_state.pos(), (1, 0));
        assert_eq!(reward, 0.0);
        assert_close(agent.get_q_table().get((0, 0), Action::Right), 0.1 * 0.9 * 3.0);
    }

    #[test]
    fn update_moves_toward_target_without_overshoot() {
        let (alpha, gamma) = (0.1, 0.9);
        for q in [-10.0, -2.5, 0.0, 0.3, 7.0] {
            for reward in [PENALTY_REWARD, 0.0, GOAL_REWARD] {
                for max_next_q in [-9.0, 0.0, 4.2] {
                    let target = reward + gamma * max_next_q;
                    let updated = updated_q_value(q, reward, max_next_q, alpha, gamma);
                    assert!((updated - q).abs() <= alpha * (target - q).abs() + 1e-5);
                    assert!(
                        (updated - target).abs() <= (q - target).abs() + 1e-5,
                        "Update from {q} toward {target} overshoots to {updated}"
                    );
                }
            }
        }
    }

    #[test]
    fn repeated_update_converges_to_target() {
        let mut q = 0.0;
        for _ in 0..500 {
            q = updated_q_value(q, 0.0, 5.0, 0.1, 0.9);
        }
        assert_close(q, 4.5);
    }

    #[test]
    fn grid_without_free_cell_fails_fast() {
        let grid = Grid::parse("+").unwrap();
        let mut agent = QTableAgent::seeded(&grid, QTableAgentConfig::default(), 0);
        assert_eq!(agent.random_state(), Err(Error::NoFreeCell));
        assert_eq!(agent.learn_episode(), Err(Error::NoFreeCell));
    }

    #[test]
    fn enclosed_start_ends_without_update() {
        let grid = Grid::parse("###|# #|###").unwrap();
        let mut agent = QTableAgent::seeded(&grid, QTableAgentConfig::default(), 3);

        let report = agent.learn_episode().unwrap();
        assert_eq!(report.start, (1, 1));
        assert_eq!(report.steps, 0);
        assert_eq!(report.end, EpisodeEnd::Stuck);
        assert!(agent.get_q_table().iter().all(|(_, _, v)| v == 0.0));
    }

    #[test]
    fn unreachable_terminal_hits_step_limit() {
        let grid = Grid::parse("   ").unwrap();
        let config = QTableAgentConfig {
            max_steps: 50,
            ..Default::default()
        };
        let mut agent = QTableAgent::seeded(&grid, config, 5);

        assert!(matches!(
            agent.learn_episode(),
            Err(Error::StepLimitExceeded { limit: 50, .. })
        ));
        assert!(matches!(
            agent.learn(3),
            Err(Error::StepLimitExceeded { .. })
        ));
    }

    #[test]
    fn table_must_match_grid() {
        let grid = Grid::default();
        let result = QTableAgent::with_table(
            &grid,
            QTable::new(7, 4),
            QTableAgentConfig::default(),
            StdRng::seed_from_u64(0),
        );
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn resumes_from_existing_table() {
        let grid = Grid::parse(" +").unwrap();
        let mut first = QTableAgent::seeded(&grid, QTableAgentConfig::default(), 0);
        first.learn(1).unwrap();

        let mut second = QTableAgent::with_table(
            &grid,
            first.into_q_table(),
            QTableAgentConfig::default(),
            StdRng::seed_from_u64(0),
        )
        .unwrap();
        second.learn(1).unwrap();
        assert_close(second.get_q_table().get((0, 0), Action::Right), 1.9);
    }

    #[test]
    fn starts_cover_free_cells_only() {
        let grid = Grid::default();
        let mut agent = QTableAgent::seeded(&grid, QTableAgentConfig::default(), 11);

        let starts: HashSet<Pos> = (0..500)
            .map(|_| agent.random_state().unwrap().pos())
            .collect();
        let free: HashSet<Pos> = grid.free_cells().collect();
        assert_eq!(starts, free);
    }

    #[test]
    fn actions_are_sampled_uniformly() {
        let grid = Grid::parse("   |   |   ").unwrap();
        let mut agent = QTableAgent::seeded(&grid, QTableAgentConfig::default(), 2024);
        let center = State::new(&grid, 1, 1);

        let n = 4000;
        let mut counts = [0u32; Action::COUNT];
        for _ in 0..n {
            let action = agent.act(&center).unwrap();
            counts[action.index()] += 1;
        }

        let expected = n as f64 / Action::COUNT as f64;
        let statistic: f64 = counts
            .iter()
            .map(|&c| (c as f64 - expected).powi(2) / expected)
            .sum();
        let p_value = 1.0 - ChiSquared::new(3.0).unwrap().cdf(statistic);
        assert!(p_value > 1e-3, "counts {counts:?} are not uniform");

        let corner = State::new(&grid, 0, 0);
        for _ in 0..100 {
            let action = agent.act(&corner).unwrap();
            assert!(matches!(action, Action::Right | Action::Down));
        }
    }

    #[test]
    fn observer_sees_every_state() {
        let grid = Grid::default();
        let mut agent = QTableAgent::seeded(&grid, QTableAgentConfig::default(), 8);

        let mut visited = Vec::new();
        let report = agent
            .learn_episode_observed(|s| visited.push((s.pos(), s.at_end())))
            .unwrap();

        assert_eq!(visited.len() as u32, report.steps + 1);
        assert_eq!(visited.first(), Some(&(report.start, false)));
        assert!(visited.last().unwrap().1, "The last state is terminal");
        assert!(visited[..visited.len() - 1].iter().all(|&(_, end)| !end));
    }

    #[test]
    fn same_seed_same_table() {
        let grid = Grid::default();
        let run = |seed| {
            let mut agent = QTableAgent::seeded(&grid, QTableAgentConfig::default(), seed);
            agent.learn_episode().unwrap();
            let reports = agent.learn(100).unwrap();
            (agent.into_q_table(), reports)
        };

        let (table, reports) = run(42);
        assert_eq!(reports.len(), 100);
        assert_eq!(run(42), (table.clone(), reports));
        assert_ne!(run(43).0, table);
    }

    #[test]
    fn seeded_run_matches_recorded_table() {
        let grid = Grid::default();
        let mut agent = QTableAgent::seeded(&grid, QTableAgentConfig::default(), 42);
        let first = agent.learn_episode().unwrap();
        let reports = agent.learn(100).unwrap();

        // Start cells pin the draw order: x first, then y
        let report = |start, steps, reward| EpisodeReport {
            start,
            steps,
            reward,
            end: EpisodeEnd::Terminal,
        };
        assert_eq!(first, report((3, 4), 134, PENALTY_REWARD));
        assert_eq!(
            reports[..5],
            [
                report((4, 1), 4, PENALTY_REWARD),
                report((0, 3), 238, PENALTY_REWARD),
                report((4, 0), 10, GOAL_REWARD),
                report((2, 2), 97, PENALTY_REWARD),
                report((0, 2), 564, GOAL_REWARD),
            ]
        );
        assert_eq!(reports[99], report((0, 4), 45, PENALTY_REWARD));
        assert_eq!(reports.iter().filter(|r| r.reward > 0.0).count(), 25);
        assert_eq!(reports.iter().map(|r| r.steps).sum::<u32>(), 22707);

        let table = agent.get_q_table();
        assert_eq!(table.get((5, 2), Action::Right), f32::from_bits(0x4114837c));
        assert_eq!(table.get((5, 2), Action::Up), f32::from_bits(0x409016e9));
        assert_eq!(table.get((5, 1), Action::Right), f32::from_bits(0xc11b8cc6));
        assert_eq!(table.get((6, 0), Action::Down), f32::from_bits(0xc11e1598));
        assert_eq!(table.get((0, 0), Action::Right), f32::from_bits(0x40634d5e));

        let expected = "UP\n\
            ---- ---- ---- ---- ---- ---- ---- \n\
            3.17 ---- ---- ---- 4.79 3.49 ---- \n\
            2.82 ---- ---- ---- 5.35 4.50 ---- \n\
            2.50 ---- 1.21 ---- ---- ---- ---- \n\
            2.21 ---- 1.37 ---- ---- ---- ---- \n\
            \n\
            RIGHT\n\
            3.55 3.97 4.46 5.06 4.58 2.52 ---- \n\
            ---- ---- ---- ---- 5.53 -9.72 ---- \n\
            ---- ---- ---- ---- 7.88 9.28 ---- \n\
            ---- ---- ---- ---- ---- ---- ---- \n\
            1.74 1.54 1.37 1.21 1.07 0.94 ---- \n\
            \n\
            DOWN\n\
            2.81 ---- ---- ---- 5.82 5.43 -9.88 \n\
            2.51 ---- ---- ---- 6.75 6.84 ---- \n\
            2.21 ---- 1.37 ---- ---- ---- ---- \n\
            1.95 ---- 1.54 ---- ---- ---- ---- \n\
            ---- ---- ---- ---- ---- ---- ---- \n\
            \n\
            LEFT\n\
            ---- 3.17 3.53 3.92 4.10 4.50 3.44 \n\
            ---- ---- ---- ---- ---- 5.30 ---- \n\
            ---- ---- ---- ---- ---- 5.64 ---- \n\
            ---- ---- ---- ---- ---- ---- ---- \n\
            ---- 1.96 1.74 1.54 1.37 1.21 1.07 \n\
            \n";
        assert_eq!(table.to_string(), expected);
    }

    #[test]
    fn step_refuses_states_the_agent_cannot_occupy() {
        let grid = Grid::parse("# +").unwrap();
        let mut agent = QTableAgent::seeded(&grid, QTableAgentConfig::default(), 0);

        assert_eq!(agent.step(&State::new(&grid, 0, 0)), None, "On a wall");
        assert_eq!(agent.step(&State::new(&grid, 3, 0)), None, "Off the map");

        let other = Grid::default();
        assert_eq!(agent.step(&State::new(&other, 3, 4)), None, "On another grid");
        let twin = Grid::parse("# +").unwrap();
        assert_eq!(agent.step(&State::new(&twin, 1, 0)), None, "On an equal but distinct grid");

        assert!(agent.get_q_table().iter().all(|(_, _, v)| v == 0.0));

        let (action, next_state, reward) = agent.step(&State::new(&grid, 1, 0)).unwrap();
        assert_eq!((action, next_state.pos(), reward), (Action::Right, (2, 0), GOAL_REWARD));
    }

    #[test]
    fn abandoned_episode_keeps_updates_but_is_not_counted() {
        let grid = Grid::parse("   ").unwrap();
        let mut table = QTable::for_grid(&grid);
        for &action in Action::VARIANTS {
            table.set((1, 0), action, 1.0);
        }
        let config = QTableAgentConfig {
            max_steps: 20,
            ..Default::default()
        };
        let mut agent =
            QTableAgent::with_table(&grid, table.clone(), config, StdRng::seed_from_u64(9)).unwrap();

        assert!(matches!(
            agent.learn_episode(),
            Err(Error::StepLimitExceeded { limit: 20, .. })
        ));
        assert_eq!(agent.episode(), 0);
        assert_ne!(agent.get_q_table(), &table, "Updates of the abandoned episode remain");

        assert!(agent.learn(2).is_err());
        assert_eq!(agent.episode(), 0);
    }

    #[test]
    fn learns_values_around_terminals() {
        let grid = Grid::default();
        let mut agent = QTableAgent::seeded(&grid, QTableAgentConfig::default(), 42);
        let reports = agent.learn(500).unwrap();

        assert!(reports.iter().all(|r| r.end == EpisodeEnd::Terminal));
        assert!(reports.iter().all(|r| r.reward == GOAL_REWARD || r.reward == PENALTY_REWARD));

        let table = agent.get_q_table();
        assert!(table.get((5, 2), Action::Right) > 0.0, "Moving onto the goal pays");
        assert!(table.get((5, 1), Action::Right) < 0.0, "Moving onto the penalty costs");
        assert!(table.get((6, 0), Action::Down) < 0.0, "Moving onto the penalty costs");
        assert!(table
            .iter()
            .all(|(_, _, v)| v.abs() <= GOAL_REWARD + 1e-4));

        for (pos, action, value) in table.iter() {
            let from = State::new(&grid, pos.0, pos.1);
            if from.cell() != Some(FREE) || !from.is_legal(action) {
                assert_eq!(value, 0.0, "{action} at {pos:?} is never taken");
            }
        }
    }

    #[test]
    #[should_panic(expected = "Invalid value for `config.alpha`")]
    fn rejects_learning_rate_above_one() {
        let grid = Grid::default();
        let config = QTableAgentConfig {
            alpha: 1.5,
            ..Default::default()
        };
        QTableAgent::seeded(&grid, config, 0);
    }
}
