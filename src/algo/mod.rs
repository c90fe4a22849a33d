pub mod tabular;

pub use tabular::q_table::{EpisodeEnd, EpisodeReport, QTableAgent, QTableAgentConfig};
