use serde::Serialize;

pub const COUNTDOWN_SECONDS: f64 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum RacePhase {
    // Cars sit on the grid and can see the track; nobody gets to drive until
    // the countdown runs out
    Countdown,
    // Controllers drive, physics, scoring, and progress all run
    Racing,
    // Everyone crossed the line or the race was called off; show standings
    Finished,
}

pub struct CountdownState {
    pub remaining: f64,
}

impl CountdownState {
    pub fn new() -> Self {
        Self {
            remaining: COUNTDOWN_SECONDS,
        }
    }

    // true once the countdown has run out
    pub fn tick(&mut self, dt: f64) -> bool {
        self.remaining = (self.remaining - dt).max(0.0);
        self.remaining <= 0.0
    }
}

impl Default for CountdownState {
    fn default() -> Self {
        Self::new()
    }
}
