pub mod content;
pub mod game;
pub mod journal;
pub mod mapgen;
pub mod replay;
pub mod rng;
pub mod state;
pub mod types;

pub use content::SimConfig;
pub use game::pathfinding::{find_path, path_cost};
pub use game::visibility::compute_fov;
pub use game::{Game, StatusPatch};
pub use journal::{HostCommand, InputJournal, InputRecord};
pub use replay::{ReplayError, ReplayResult, apply_command, replay_to_end};
pub use state::*;
pub use types::*;
