use serde::Serialize;

use crate::checkpoint::{CheckpointID, LapNumber};
use crate::VehicleID;

// Transition points reported by the simulation components. Presentation
// layers (HUD, audio, particles) subscribe to these through an EventSink.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum RaceEvent {
    DriftStarted,
    DriftEnded { duration: f64 },
    HandbrakeLocked,
    HandbrakeReleased,
    TurboEngaged,
    TurboDepleted,
    Collision { force: f64 },
    CheckpointCrossed { checkpoint: CheckpointID, crossed: usize },
    WrongWay { checkpoint: CheckpointID },
    LapCompleted { lap: LapNumber, time: f64 },
    Finished { time: f64 },
    ComboLevelUp { level: usize },
    ComboDropped { level: usize },
    ComboReset { points: f64 },
    CheckpointSkipped { checkpoint: CheckpointID },
    RouteReset,
}

pub trait EventSink {
    fn record(&mut self, vehicle: VehicleID, event: RaceEvent);
}

// Forwards every event to `tracing` as a structured record.
#[derive(Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&mut self, vehicle: VehicleID, event: RaceEvent) {
        match &event {
            RaceEvent::Collision { force } => {
                tracing::debug!(vehicle, force, "collision");
            }
            RaceEvent::WrongWay { checkpoint } => {
                tracing::warn!(vehicle, checkpoint, "wrong way");
            }
            RaceEvent::LapCompleted { lap, time } => {
                tracing::info!(vehicle, lap, time, "lap complete");
            }
            RaceEvent::Finished { time } => {
                tracing::info!(vehicle, time, "finished");
            }
            RaceEvent::CheckpointSkipped { checkpoint } => {
                tracing::warn!(vehicle, checkpoint, "stuck, skipping checkpoint");
            }
            RaceEvent::RouteReset => {
                tracing::warn!(vehicle, "recovery exhausted, route reset");
            }
            other => {
                tracing::debug!(vehicle, event = ?other);
            }
        }
    }
}

// Buffers events in order; the race loop drains it once per tick.
#[derive(Default, Debug)]
pub struct EventLog {
    pub entries: Vec<(VehicleID, RaceEvent)>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&mut self) -> Vec<(VehicleID, RaceEvent)> {
        std::mem::take(&mut self.entries)
    }

    pub fn count(&self, predicate: impl Fn(&RaceEvent) -> bool) -> usize {
        self.entries.iter().filter(|(_, event)| predicate(event)).count()
    }
}

impl EventSink for EventLog {
    fn record(&mut self, vehicle: VehicleID, event: RaceEvent) {
        self.entries.push((vehicle, event));
    }
}

#[derive(Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _vehicle: VehicleID, _event: RaceEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_drains_in_order() {
        let mut log = EventLog::new();
        log.record(1, RaceEvent::DriftStarted);
        log.record(0, RaceEvent::Collision { force: 0.5 });
        assert_eq!(log.count(|e| matches!(e, RaceEvent::DriftStarted)), 1);

        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0], (1, RaceEvent::DriftStarted));
        assert!(log.entries.is_empty());
    }
}
