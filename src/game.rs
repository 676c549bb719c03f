use rand::Rng;

use crate::hazard::Hazard;
use crate::input::Dir;
use crate::maze::{generate, Grid, MazeParams, Pos};

const KEY_SCORE: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Menu,
    Playing,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    KeyCollected,
    LevelComplete,
    Caught,
}

pub struct Game {
    pub params: MazeParams,
    pub grid: Grid,
    pub player: Pos,
    pub start: Pos,
    pub exit: Pos,
    pub keys: Vec<Pos>,
    pub hazards: Vec<Hazard>,
    pub keys_total: usize,
    pub score: u32,
    pub level: u32,
    pub phase: Phase,
}

impl Game {
    pub fn new(params: MazeParams, rng: &mut impl Rng) -> Self {
        let level = generate(rng, &params);
        Game {
            params,
            keys_total: level.keys.len(),
            grid: level.grid,
            player: level.start,
            start: level.start,
            exit: level.exit,
            keys: level.keys,
            hazards: level.hazards,
            score: 0,
            level: 1,
            phase: Phase::Menu,
        }
    }

    // Start from the menu or restart after a game over. Returns false while a
    // game is already running.
    pub fn start(&mut self, rng: &mut impl Rng) -> bool {
        if self.phase == Phase::Playing {
            return false;
        }
        self.score = 0;
        self.level = 1;
        self.load_level(rng);
        self.phase = Phase::Playing;
        log::info!("game started");
        true
    }

    pub fn exit_unlocked(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn hazard_at(&self, pos: Pos) -> bool {
        self.hazards.iter().any(|h| h.pos == pos)
    }

    pub fn can_enter(&self, pos: Pos) -> bool {
        self.grid.is_open(pos) && (pos != self.exit || self.exit_unlocked())
    }

    pub fn move_player(&mut self, dir: Dir, rng: &mut impl Rng) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase != Phase::Playing {
            return events;
        }
        let (dx, dy) = dir.delta();
        let target = match self.player.offset(dx, dy) {
            Some(pos) if self.can_enter(pos) => pos,
            _ => return events,
        };
        self.player = target;

        self.collect_key(&mut events);

        if self.hazard_at(self.player) {
            self.end_game(&mut events);
            return events;
        }

        if self.player == self.exit && self.exit_unlocked() {
            self.level += 1;
            log::info!("level {} reached, score {}", self.level, self.score);
            self.load_level(rng);
            events.push(GameEvent::LevelComplete);
        }
        events
    }

    pub fn tick_hazards(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase != Phase::Playing {
            return events;
        }
        for hazard in self.hazards.iter_mut() {
            hazard.step(&self.grid);
        }
        if self.hazard_at(self.player) {
            self.end_game(&mut events);
        }
        events
    }

    fn collect_key(&mut self, events: &mut Vec<GameEvent>) {
        let before = self.keys.len();
        let player = self.player;
        self.keys.retain(|k| *k != player);
        let collected = before - self.keys.len();
        for _ in 0..collected {
            self.score += KEY_SCORE;
            events.push(GameEvent::KeyCollected);
        }
        if collected > 0 {
            log::debug!("key collected, {} left", self.keys.len());
        }
    }

    fn end_game(&mut self, events: &mut Vec<GameEvent>) {
        self.phase = Phase::GameOver;
        log::info!(
            "caught at ({}, {}) on level {}, final score {}",
            self.player.x,
            self.player.y,
            self.level,
            self.score
        );
        events.push(GameEvent::Caught);
    }

    fn load_level(&mut self, rng: &mut impl Rng) {
        let level = generate(rng, &self.params);
        self.grid = level.grid;
        self.keys_total = level.keys.len();
        self.keys = level.keys;
        self.hazards = level.hazards;
        self.start = level.start;
        self.exit = level.exit;
        self.player = self.start;
    }
}
