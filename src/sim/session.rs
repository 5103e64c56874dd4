/// Session: one game in progress.
///
/// Processing order for a move:
///   1. Resolve the move (passes until fixed point)
///   2. Terminal check (simulate all four moves)
///   3. Spawn one tile if any cell is empty
///
/// The spawn happens after the terminal check, so a spawn that fills the
/// last cell is only judged on the next move.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

use crate::config::BoardConfig;
use crate::domain::direction::Direction;
use crate::domain::grid::Grid;
use crate::domain::rules::{self, Merge};
use crate::domain::tile::Tile;
use super::event::GameEvent;

pub struct Session {
    grid: Grid,
    is_terminal: bool,
    spawn_value: u32,
    rng: StdRng,
}

impl Session {
    /// Empty board of the given size.
    pub fn new(size: usize, spawn_value: u32, rng: StdRng) -> Self {
        Session {
            grid: Grid::new(size),
            is_terminal: false,
            spawn_value,
            rng,
        }
    }

    /// New session from config: seeded (or entropy) RNG plus the
    /// configured number of starting tiles.
    pub fn from_config(cfg: &BoardConfig) -> Self {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut session = Session::new(cfg.size, cfg.spawn_value, rng);
        for _ in 0..cfg.start_tiles {
            if session.add_random_tile(cfg.spawn_value).is_none() {
                break;
            }
        }
        info!(
            size = cfg.size,
            start_tiles = session.grid.tile_count(),
            seed = ?cfg.seed,
            "session started"
        );
        session
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn is_terminal(&self) -> bool {
        self.is_terminal
    }

    /// Advance the game by one move.
    pub fn apply_move(&mut self, dir: Direction) -> Vec<GameEvent> {
        let before = self.grid.clone();
        let merges = self.move_all_items_in_dir(dir);

        let mut events: Vec<GameEvent> = merges
            .iter()
            .map(|m| GameEvent::TilesMerged { x: m.x, y: m.y, value: m.value })
            .collect();
        if self.grid == before {
            events.push(GameEvent::BoardUnchanged);
        }
        debug!(dir = dir.label(), merges = merges.len(), "move resolved");
        trace!("board after {}:\n{}", dir.label(), self.grid);

        self.check_terminal();
        if self.is_terminal {
            info!(max_tile = self.grid.max_value(), "game over");
            events.push(GameEvent::GameOver);
        }

        if !self.grid.is_full() {
            if let Some((x, y)) = self.add_random_tile(self.spawn_value) {
                events.push(GameEvent::TileSpawned { x, y, value: self.spawn_value });
            }
        }

        events
    }

    /// Slide and merge everything toward `dir` until nothing changes.
    /// No spawn, no terminal check.
    pub fn move_all_items_in_dir(&mut self, dir: Direction) -> Vec<Merge> {
        rules::resolve_move(&mut self.grid, dir)
    }

    /// Place `value` on a uniformly random empty cell.
    ///
    /// Rejection sampling: draw random coordinates until one is empty.
    /// Returns None without drawing when the grid is full.
    pub fn add_random_tile(&mut self, value: u32) -> Option<(usize, usize)> {
        if self.grid.is_full() {
            return None;
        }
        let size = self.grid.size();
        loop {
            let x = self.rng.gen_range(0..size);
            let y = self.rng.gen_range(0..size);
            if self.grid.get(x, y).is_empty() {
                self.grid.set(x, y, Tile::Value(value));
                debug!(x, y, value, "tile spawned");
                return Some((x, y));
            }
        }
    }

    /// Recompute the terminal flag: terminal iff no cell is empty and no
    /// direction changes the grid.
    pub fn check_terminal(&mut self) {
        self.is_terminal = true;
        if !self.grid.empty_cells().is_empty() {
            self.is_terminal = false;
            return;
        }
        if rules::has_legal_move(&self.grid) {
            self.is_terminal = false;
        }
    }

    #[cfg(test)]
    pub fn with_grid(grid: Grid, seed: u64) -> Self {
        Session {
            grid,
            is_terminal: false,
            spawn_value: 2,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}
