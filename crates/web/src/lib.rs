//! Browser bindings. The page owns layout and drawing; it reads cells from a
//! [`Session`] and forwards clicks and control changes to it.

use std::convert::TryFrom;

use instant::Instant;
use life_common::{Simulation, SimulationConfig, SimulationState, Speed, Update};
use tracing::debug;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    use tracing_subscriber::layer::SubscriberExt;
    console_error_panic_hook::set_once();
    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new("life_web=debug,life_common=info"))
            .with(tracing_wasm::WASMLayer::new(
                tracing_wasm::WASMLayerConfig::default(),
            )),
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))?;
    debug!("initialized wasm");
    Ok(())
}

/// One simulation session as seen from JavaScript.
///
/// The page calls `update()` from its animation loop and redraws whenever
/// it returns `true`.
#[wasm_bindgen]
pub struct Session {
    simulation: Simulation,
}

#[wasm_bindgen]
impl Session {
    #[wasm_bindgen(constructor)]
    pub fn new(rows: i32, cols: i32) -> Session {
        let mut simulation = Simulation::new(SimulationConfig::default());
        simulation.resize(i64::from(rows), i64::from(cols));
        debug!("session created");
        Session { simulation }
    }

    pub fn rows(&self) -> u32 {
        self.simulation.dimensions().rows as u32
    }

    pub fn cols(&self) -> u32 {
        self.simulation.dimensions().cols as u32
    }

    /// Row-major 0/1 cells.
    pub fn cells(&self) -> Box<[u8]> {
        self.simulation.grid().to_bytes().into_boxed_slice()
    }

    pub fn is_alive(&self, row: u32, col: u32) -> bool {
        self.simulation
            .grid()
            .cell_at(row as usize, col as usize)
            .map_or(false, |cell| cell.is_alive())
    }

    /// CSS class list for the cell element at `(row, col)`.
    pub fn cell_class(&self, row: u32, col: u32) -> String {
        if self.is_alive(row, col) {
            "grid-cell alive".to_string()
        } else {
            "grid-cell".to_string()
        }
    }

    pub fn population(&self) -> u32 {
        self.simulation.grid().population() as u32
    }

    pub fn generation(&self) -> u32 {
        self.simulation.generation().0
    }

    pub fn is_running(&self) -> bool {
        self.simulation.is_running()
    }

    pub fn state(&self) -> String {
        match self.simulation.state() {
            SimulationState::Stopped => "stopped",
            SimulationState::Running => "running",
            SimulationState::Paused => "paused",
        }
        .to_string()
    }

    pub fn start(&mut self) {
        self.simulation.start(Instant::now());
    }

    pub fn pause(&mut self) {
        self.simulation.pause();
    }

    pub fn stop(&mut self) {
        self.simulation.stop();
    }

    /// The Start/Pause button.
    pub fn toggle_running(&mut self) {
        self.simulation.toggle_running(Instant::now());
    }

    /// Advances one generation while paused. Returns whether the grid changed.
    pub fn step(&mut self) -> bool {
        matches!(self.simulation.step(), Update::Advanced { .. })
    }

    /// Current tick interval in milliseconds.
    pub fn speed(&self) -> u32 {
        self.simulation.speed().millis() as u32
    }

    pub fn set_speed(&mut self, millis: u32) -> Result<(), JsError> {
        let speed = Speed::try_from(u64::from(millis))?;
        self.simulation.set_speed(speed, Instant::now());
        Ok(())
    }

    pub fn speed_levels() -> Box<[u32]> {
        Speed::LEVELS
            .iter()
            .map(|speed| speed.millis() as u32)
            .collect::<Vec<_>>()
            .into_boxed_slice()
    }

    pub fn speed_labels() -> js_sys::Array {
        Speed::LEVELS
            .iter()
            .map(|speed| JsValue::from_str(speed.label()))
            .collect()
    }

    /// Forwarded cell click. Returns the new state of the cell.
    pub fn toggle_cell(&mut self, row: u32, col: u32) -> Result<bool, JsError> {
        let cell = self.simulation.toggle_cell(row as usize, col as usize)?;
        Ok(cell.is_alive())
    }

    pub fn resize(&mut self, rows: i32, cols: i32) {
        self.simulation.resize(i64::from(rows), i64::from(cols));
    }

    pub fn set_rows(&mut self, rows: i32) {
        self.simulation.set_rows(i64::from(rows));
    }

    pub fn set_cols(&mut self, cols: i32) {
        self.simulation.set_cols(i64::from(cols));
    }

    /// Loads the text of a JSON setup file. A rejected file leaves the
    /// session untouched and the error message is surfaced to the page.
    pub fn load_json(&mut self, text: &str) -> Result<(), JsError> {
        self.simulation.import_json(text)?;
        Ok(())
    }

    pub fn export_json(&self) -> Result<String, JsError> {
        Ok(self.simulation.grid().to_json()?)
    }

    /// Polls the clock. Returns `true` when a new generation was computed.
    pub fn update(&mut self) -> bool {
        matches!(
            self.simulation.update(Instant::now()),
            Update::Advanced { .. }
        )
    }

    /// Milliseconds until the next tick is due, or `undefined` when idle.
    pub fn millis_until_tick(&self) -> Option<f64> {
        let deadline = self.simulation.next_deadline()?;
        let now = Instant::now();
        if deadline <= now {
            return Some(0.0);
        }
        Some((deadline - now).as_secs_f64() * 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_clamps_dimensions() {
        let session = Session::new(0, 7);
        assert_eq!(session.rows(), 1);
        assert_eq!(session.cols(), 7);
        assert_eq!(session.cells().len(), 7);
        assert_eq!(session.state(), "stopped");
    }

    #[test]
    fn oversized_inputs_are_capped() {
        let mut session = Session::new(3, 3);
        session.resize(i32::MAX, i32::MAX);
        assert_eq!(session.rows(), 1024);
        assert_eq!(session.cols(), 1024);
        assert_eq!(session.cells().len(), 1024 * 1024);
        assert!(matches!(session.toggle_cell(1023, 1023), Ok(true)));
    }

    #[test]
    fn clicks_toggle_cells() {
        let mut session = Session::new(3, 3);
        assert!(matches!(session.toggle_cell(1, 2), Ok(true)));
        assert!(session.is_alive(1, 2));
        assert_eq!(session.cell_class(1, 2), "grid-cell alive");
        assert_eq!(session.cell_class(0, 0), "grid-cell");
        assert_eq!(session.cells()[5], 1);
        assert_eq!(session.population(), 1);
    }

    #[test]
    fn controls_drive_the_state_machine() {
        let mut session = Session::new(5, 5);
        session.toggle_running();
        assert!(session.is_running());
        assert_eq!(session.state(), "running");
        assert!(session.millis_until_tick().is_some());

        session.toggle_running();
        assert_eq!(session.state(), "paused");
        assert_eq!(session.millis_until_tick(), None);
        assert!(!session.update());

        session.start();
        session.set_rows(8);
        assert!(!session.is_running());
        assert_eq!(session.rows(), 8);
        assert_eq!(session.cols(), 5);
    }

    #[test]
    fn speed_selection() {
        assert_eq!(&*Session::speed_levels(), &[2000, 1000, 500, 250]);
        let mut session = Session::new(2, 2);
        assert_eq!(session.speed(), 1000);
        assert!(session.set_speed(250).is_ok());
        assert_eq!(session.speed(), 250);
    }

    #[test]
    fn loads_setup_files() {
        let mut session = Session::new(10, 10);
        assert!(session.load_json("[[0,0,0],[1,1,1],[0,0,0]]").is_ok());
        assert_eq!(session.rows(), 3);
        assert_eq!(session.state(), "paused");

        assert!(session.step());
        assert_eq!(&*session.cells(), &[0, 1, 0, 0, 1, 0, 0, 1, 0]);
        assert_eq!(session.generation(), 1);
        assert_eq!(
            session.export_json().ok().as_deref(),
            Some("[[0,1,0],[0,1,0],[0,1,0]]")
        );
    }
}
