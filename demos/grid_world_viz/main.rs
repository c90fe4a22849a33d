//! Watch the agent learn in the terminal dashboard
//!
//! ```text
//! cargo run --example grid_world_viz --features viz
//! ```

use std::{thread, time::Duration};

use qgrid::{
    algo::{QTableAgent, QTableAgentConfig},
    env::Grid,
    viz,
};

const NUM_EPISODES: u16 = 2000;
const SEED: u64 = 42;

fn main() -> anyhow::Result<()> {
    let grid = Grid::default();
    let mut agent = QTableAgent::seeded(&grid, QTableAgentConfig::default(), SEED);

    let (handle, tx) = viz::init(&["steps", "reward"], NUM_EPISODES);

    for i in 0..NUM_EPISODES {
        let report = agent.learn_episode()?;
        let update = viz::Update {
            episode: i,
            data: vec![report.steps.into(), report.reward.into()],
            table: agent.get_q_table().to_string(),
        };
        if tx.send(update).is_err() {
            // Dashboard closed early
            break;
        }
        thread::sleep(Duration::from_millis(2));
    }
    drop(tx);

    handle
        .join()
        .map_err(|_| anyhow::anyhow!("dashboard thread panicked"))??;
    Ok(())
}
