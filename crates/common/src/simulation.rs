use std::{
    collections::{hash_map::DefaultHasher, VecDeque},
    hash::{Hash, Hasher},
};

use instant::Instant;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    gameloop::Clock,
    rules,
    speed::Speed,
    world::{Dimensions, Grid, Tick},
    Result,
};

// how many past generations are remembered for cycle detection
const HISTORY_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub rows: usize,
    pub cols: usize,
    pub speed: Speed,
    /// Pause as soon as a generation repeats one of the recent ones.
    pub pause_on_cycle: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rows: 10,
            cols: 10,
            speed: Speed::default(),
            pause_on_cycle: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum SimulationState {
    /// Idle with a freshly cleared grid.
    Stopped,
    Running,
    /// Idle with the grid content kept.
    Paused,
}

/// What a call to [`Simulation::update`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    /// The clock is not armed.
    Idle,
    /// Armed, but the next tick is not due yet.
    Waiting,
    Advanced {
        generation: Tick,
        population: usize,
        /// The new grid repeats one of the last few generations.
        cycle: bool,
    },
}

#[derive(Debug, Default)]
struct History {
    hashes: VecDeque<u64>,
}

impl History {
    fn push(&mut self, hash: u64) {
        if self.hashes.len() == HISTORY_LEN {
            self.hashes.pop_front();
        }
        self.hashes.push_back(hash);
    }

    fn contains(&self, hash: u64) -> bool {
        self.hashes.contains(&hash)
    }

    fn clear(&mut self) {
        self.hashes.clear();
    }
}

fn grid_hash(grid: &Grid) -> u64 {
    let mut hasher = DefaultHasher::new();
    grid.hash(&mut hasher);
    hasher.finish()
}

/// One simulation session. Owns the grid and every piece of state that
/// decides when it changes; all mutation goes through these methods.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    grid: Grid,
    state: SimulationState,
    speed: Speed,
    clock: Clock,
    generation: Tick,
    history: History,
}

impl Simulation {
    pub fn new(mut config: SimulationConfig) -> Self {
        let dimensions = Dimensions {
            rows: config.rows,
            cols: config.cols,
        }
        .bounded();
        config.rows = dimensions.rows;
        config.cols = dimensions.cols;
        debug!("new simulation {} at {}", dimensions, config.speed);
        Self {
            grid: Grid::new(dimensions),
            state: SimulationState::Stopped,
            speed: config.speed,
            clock: Clock::new(),
            generation: Tick::zero(),
            history: History::default(),
            config,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn dimensions(&self) -> Dimensions {
        self.grid.dimensions()
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_armed()
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn generation(&self) -> Tick {
        self.generation
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// When the host should call [`Simulation::update`] next, if running.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.clock.next_deadline()
    }

    pub fn start(&mut self, now: Instant) {
        if self.clock.is_armed() {
            return;
        }
        let handle = self.clock.arm(self.speed.interval(), now);
        self.state = SimulationState::Running;
        info!("started at {} ({:?})", self.speed, handle);
    }

    /// Stops ticking and keeps the grid.
    pub fn pause(&mut self) {
        if let Some(handle) = self.clock.cancel_current() {
            self.state = SimulationState::Paused;
            info!("paused at generation {} ({:?})", self.generation.0, handle);
        }
    }

    /// Stops ticking and clears the grid.
    pub fn stop(&mut self) {
        let dimensions = self.grid.dimensions();
        self.replace_grid(Grid::new(dimensions), SimulationState::Stopped);
        info!("stopped, grid cleared to {}", dimensions);
    }

    pub fn toggle_running(&mut self, now: Instant) {
        if self.is_running() {
            self.pause();
        } else {
            self.start(now);
        }
    }

    /// Takes effect from `now`: a running clock is re-armed so the next tick
    /// lands one new interval later.
    pub fn set_speed(&mut self, speed: Speed, now: Instant) {
        self.speed = speed;
        if self.clock.is_armed() {
            let handle = self.clock.arm(speed.interval(), now);
            debug!("speed set to {}, re-armed as {:?}", speed, handle);
        } else {
            debug!("speed set to {}", speed);
        }
    }

    /// Parses a speed label or millisecond value and applies it.
    pub fn set_speed_str(&mut self, speed: &str, now: Instant) -> Result<Speed> {
        let speed = speed.parse()?;
        self.set_speed(speed, now);
        Ok(speed)
    }

    /// Polls the clock and advances one generation if a tick is due.
    pub fn update(&mut self, now: Instant) -> Update {
        if !self.clock.is_armed() {
            return Update::Idle;
        }
        match self.clock.poll(now) {
            Some(_) => self.advance(),
            None => Update::Waiting,
        }
    }

    /// Advances a single generation by hand. Does nothing while the clock is
    /// running.
    pub fn step(&mut self) -> Update {
        if self.clock.is_armed() {
            return Update::Waiting;
        }
        let update = self.advance();
        if self.state == SimulationState::Stopped {
            self.state = SimulationState::Paused;
        }
        update
    }

    fn advance(&mut self) -> Update {
        self.history.push(grid_hash(&self.grid));
        let next = rules::next_generation(&self.grid);
        let cycle = self.history.contains(grid_hash(&next));
        self.grid = next;
        self.generation.increment_self();

        let population = self.grid.population();
        debug!(
            "generation {}: {} alive{}",
            self.generation.0,
            population,
            if cycle { ", cycle" } else { "" }
        );
        if cycle && self.config.pause_on_cycle {
            info!("generation {} repeats a recent one", self.generation.0);
            self.pause();
        }

        Update::Advanced {
            generation: self.generation,
            population,
            cycle,
        }
    }

    /// Swaps in a new grid with the clock forced idle first.
    pub(crate) fn replace_grid(&mut self, grid: Grid, state: SimulationState) {
        if let Some(handle) = self.clock.cancel_current() {
            debug!("grid replaced while running, cancelled {:?}", handle);
        }
        self.grid = grid;
        self.state = state;
        self.generation = Tick::zero();
        self.history.clear();
    }

    /// In-place edit of the current grid. Running state is untouched.
    pub(crate) fn edit_grid<T>(&mut self, edit: impl FnOnce(&mut Grid) -> Result<T>) -> Result<T> {
        let value = edit(&mut self.grid)?;
        self.history.clear();
        Ok(value)
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Simulation::new(SimulationConfig::default())
    }
}
