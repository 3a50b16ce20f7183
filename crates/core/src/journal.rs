use serde::{Deserialize, Serialize};

use crate::types::Coord;

/// One host command as the input layer would issue it. Coordinates stand in
/// for unit references so a journal stays meaningful across replays; the
/// adapter in `replay` resolves them against the live world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostCommand {
    QueueMove { to: Coord },
    QueueAttack { at: Coord },
    QueueClimb,
    QueueWait,
    CancelAction,
    ToggleSneak,
    ToggleDebugFow,
    Tick { millis: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub seq: u64,
    pub command: HostCommand,
}

/// Seed plus the ordered host inputs: everything needed to reconstruct a
/// run. Lives in memory; hosts may serialize it however they like.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputJournal {
    pub format_version: u16,
    pub seed: u32,
    pub inputs: Vec<InputRecord>,
}

impl InputJournal {
    pub fn new(seed: u32) -> Self {
        Self { format_version: 1, seed, inputs: Vec::new() }
    }

    pub fn append(&mut self, command: HostCommand) {
        let seq = self.inputs.len() as u64;
        self.inputs.push(InputRecord { seq, command });
    }
}
