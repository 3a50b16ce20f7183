use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;

use gridfall_core::{
    Coord, Game, HostCommand, InputJournal, SimConfig, TileKind, UnitKind, apply_command,
    find_path, manhattan, path_cost, replay_to_end,
};

#[derive(Parser)]
#[command(author, version, about = "Headless driver for the gridfall simulation core", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a seeded game for a number of turns with a scripted player.
    Run {
        #[arg(short, long, default_value_t = 42)]
        seed: u32,
        #[arg(short, long, default_value_t = 10)]
        turns: u32,
        /// Write the recorded input journal to this JSON file.
        #[arg(long)]
        journal_out: Option<String>,
    },
    /// Replay a journal JSON file and print the final snapshot hash.
    Replay {
        #[arg(short, long)]
        journal: String,
    },
}

fn main() -> Result<()> {
    match Args::parse().command {
        Command::Run { seed, turns, journal_out } => run(seed, turns, journal_out),
        Command::Replay { journal } => replay(&journal),
    }
}

fn run(seed: u32, turns: u32, journal_out: Option<String>) -> Result<()> {
    let mut game = Game::new(seed, SimConfig::default());
    let mut journal = InputJournal::new(seed);

    for turn in 1..=turns {
        if let Some(command) = choose_player_command(&game) {
            apply(&mut game, &mut journal, command)?;
        }
        apply(&mut game, &mut journal, HostCommand::Tick { millis: 5_000 })?;

        println!("turn {turn:>3}  hash {:016x}", game.snapshot_hash());
        print_floor(&game);

        if game.state().player().is_none() {
            println!("the player has fallen");
            break;
        }
    }

    println!("-- event log --");
    for event in game.log() {
        println!("{event:?}");
    }

    if let Some(path) = journal_out {
        let json = serde_json::to_string_pretty(&journal)?;
        fs::write(&path, json).with_context(|| format!("failed to write journal to {path}"))?;
        println!("journal written to {path}");
    }
    Ok(())
}

fn replay(path: &str) -> Result<()> {
    let data =
        fs::read_to_string(path).with_context(|| format!("failed to read journal file {path}"))?;
    let journal: InputJournal =
        serde_json::from_str(&data).context("failed to deserialize journal JSON")?;

    let result = replay_to_end(&journal, SimConfig::default())
        .map_err(|error| anyhow::anyhow!("replay failed: {error:?}"))?;

    println!("commands applied: {}", result.commands_applied);
    println!("final phase:      {:?}", result.final_phase);
    println!("snapshot hash:    {:016x}", result.final_snapshot_hash);
    Ok(())
}

/// A minimal scripted player: trade blows with anything adjacent, otherwise
/// head for the stairs under the current AP budget, and climb when standing
/// on them.
fn choose_player_command(game: &Game) -> Option<HostCommand> {
    let world = game.state();
    let player = world.player()?;

    for (id, unit) in &world.units {
        if id != game.player_id()
            && unit.kind == UnitKind::Enemy
            && unit.pos.floor == player.pos.floor
            && manhattan(unit.pos, player.pos) <= 1
        {
            return Some(HostCommand::QueueAttack { at: unit.pos });
        }
    }

    let stair_kind =
        if player.pos.floor == 0 { TileKind::StairsUp } else { TileKind::StairsDown };
    if world.floors.tile_at(player.pos).map(|tile| tile.kind) == Some(stair_kind) {
        return Some(HostCommand::QueueClimb);
    }

    let stairs = find_tile(game, player.pos.floor, stair_kind)?;
    let path = find_path(player.pos, stairs, &world.floors, &world.units, game.player_id())?;

    // Trim the walk to what this turn's AP affords.
    let mut reachable = player.pos;
    for end in (1..path.len()).rev() {
        let cost = path_cost(&path[..=end], &world.units, game.player_id());
        if cost <= player.status.ap {
            reachable = path[end];
            break;
        }
    }
    if reachable == player.pos {
        return Some(HostCommand::QueueWait);
    }
    Some(HostCommand::QueueMove { to: reachable })
}

fn find_tile(game: &Game, floor: u8, kind: TileKind) -> Option<Coord> {
    let floors = &game.state().floors;
    for y in 0..floors.height() {
        for x in 0..floors.width() {
            let pos = Coord::new(x, y, floor);
            if floors.tile_at(pos).map(|tile| tile.kind) == Some(kind) {
                return Some(pos);
            }
        }
    }
    None
}

fn apply(game: &mut Game, journal: &mut InputJournal, command: HostCommand) -> Result<()> {
    journal.append(command);
    apply_command(game, &command)
        .map_err(|error| anyhow::anyhow!("simulation stalled: {error:?}"))
}

fn print_floor(game: &Game) {
    let world = game.state();
    let Some(player) = world.player() else {
        return;
    };
    let floor = player.pos.floor;
    for y in 0..world.floors.height() {
        let mut line = String::new();
        for x in 0..world.floors.width() {
            let pos = Coord::new(x, y, floor);
            let glyph = if !game.is_visible_to_player(pos) {
                if world.explored.contains(&pos) { '\u{b7}' } else { ' ' }
            } else if pos == player.pos {
                '@'
            } else if world.units.values().any(|unit| unit.pos == pos) {
                'e'
            } else {
                match world.floors.tile_at(pos).map(|tile| tile.kind) {
                    Some(TileKind::Wall) => '#',
                    Some(TileKind::StairsUp) => '<',
                    Some(TileKind::StairsDown) => '>',
                    Some(TileKind::Mud) => '~',
                    _ => '.',
                }
            };
            line.push(glyph);
        }
        println!("{line}");
    }
}
