use std::cmp::Ordering;
use std::collections::BTreeMap;

use glam::DVec2;
use serde::Serialize;

use skid_core::checkpoint::{next_index, CheckpointID, LapNumber};
use skid_core::events::{EventSink, RaceEvent};
use skid_core::vehicle::state::VehicleState;
use skid_core::{ProgressTuning, VehicleID};

use crate::checkpoints::{Gate, RaceSetup};

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RaceProgress {
    pub next_checkpoint: CheckpointID,
    pub lap: LapNumber,
    pub finished: bool,
    pub finish_time: Option<f64>,
    // race clock at each valid crossing, keyed by the absolute crossing count
    pub timestamps: BTreeMap<usize, f64>,
    // race clock at the end of each lap
    pub lap_times: Vec<f64>,
    pub wrong_way: bool,
    pub wrong_way_duration: f64,
    pub crossed: usize,
}

impl RaceProgress {
    // duration of each completed lap
    pub fn lap_splits(&self) -> Vec<f64> {
        let mut previous = 0.0;
        self.lap_times
            .iter()
            .map(|&time| {
                let split = time - previous;
                previous = time;
                split
            })
            .collect()
    }

    pub fn best_lap(&self) -> Option<f64> {
        self.lap_splits().into_iter().reduce(f64::min)
    }
}

// What a HUD or minimap needs to draw one car's race state.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub vehicle: VehicleID,
    pub next_checkpoint: CheckpointID,
    pub lap: LapNumber,
    pub laps_target: LapNumber,
    pub finished: bool,
    pub finish_time: Option<f64>,
    pub wrong_way: bool,
    pub wrong_way_duration: f64,
    pub distance_to_next: f64,
    pub clock: f64,
}

/*
 * Ranks two racers: finished racers first (earliest finish wins), then
 * whoever has crossed more gates, then whoever is closer to their next gate.
 * Each entry carries the distance to its next gate.
 */
pub fn cmp_progress(a: (&RaceProgress, f64), b: (&RaceProgress, f64)) -> Ordering {
    let (a, a_distance) = a;
    let (b, b_distance) = b;
    match (a.finish_time, b.finish_time) {
        (Some(a_time), Some(b_time)) => a_time.total_cmp(&b_time),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => {
            if a.crossed != b.crossed {
                a.crossed.cmp(&b.crossed).reverse()
            } else {
                a_distance.total_cmp(&b_distance)
            }
        }
    }
}

pub struct ProgressTracker {
    gates: Vec<Gate>,
    laps_target: LapNumber,
    tuning: ProgressTuning,
    clock: f64,
}

impl ProgressTracker {
    pub fn new(setup: &RaceSetup, laps_target: LapNumber, tuning: ProgressTuning) -> Self {
        Self {
            gates: setup.gates(&tuning),
            laps_target,
            tuning,
            clock: 0.0,
        }
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn tick(&mut self, dt: f64) {
        self.clock += dt.max(0.0);
    }

    // fresh progress for a vehicle joining the race
    pub fn register(&self, vehicle: VehicleID) -> RaceProgress {
        tracing::debug!(vehicle, gates = self.gates.len(), "registered with tracker");
        RaceProgress::default()
    }

    // new race: the clock starts over and every racer's progress is cleared
    pub fn reset<'a>(&mut self, racers: impl IntoIterator<Item = &'a mut RaceProgress>) {
        self.clock = 0.0;
        for progress in racers {
            *progress = RaceProgress::default();
        }
    }

    pub fn distance_to_next(&self, progress: &RaceProgress, position: DVec2) -> f64 {
        self.gates
            .get(progress.next_checkpoint)
            .map(|gate| gate.shape.center().distance(position))
            .unwrap_or(f64::INFINITY)
    }

    pub fn snapshot(
        &self,
        vehicle: VehicleID,
        progress: &RaceProgress,
        position: DVec2,
    ) -> ProgressSnapshot {
        ProgressSnapshot {
            vehicle,
            next_checkpoint: progress.next_checkpoint,
            lap: progress.lap,
            laps_target: self.laps_target,
            finished: progress.finished,
            finish_time: progress.finish_time,
            wrong_way: progress.wrong_way,
            wrong_way_duration: progress.wrong_way_duration,
            distance_to_next: self.distance_to_next(progress, position),
            clock: self.clock,
        }
    }

    pub fn update(
        &self,
        progress: &mut RaceProgress,
        vehicle: &VehicleState,
        dt: f64,
        sink: &mut dyn EventSink,
    ) {
        if progress.finished || self.gates.is_empty() {
            return;
        }
        if progress.wrong_way {
            progress.wrong_way_duration += dt.max(0.0);
        }

        let gate = match self.gates.get(progress.next_checkpoint) {
            Some(gate) => gate,
            None => return,
        };
        if !gate.is_crossed_by(vehicle.position) {
            return;
        }

        if self.is_wrong_way(gate, vehicle) {
            if !progress.wrong_way {
                progress.wrong_way = true;
                sink.record(
                    vehicle.id,
                    RaceEvent::WrongWay {
                        checkpoint: gate.checkpoint,
                    },
                );
            }
            return;
        }

        progress.wrong_way = false;
        progress.wrong_way_duration = 0.0;

        progress.crossed += 1;
        progress.timestamps.insert(progress.crossed, self.clock);
        progress.next_checkpoint = next_index(progress.next_checkpoint, self.gates.len());
        sink.record(
            vehicle.id,
            RaceEvent::CheckpointCrossed {
                checkpoint: gate.checkpoint,
                crossed: progress.crossed,
            },
        );

        if progress.next_checkpoint == 0 {
            progress.lap += 1;
            progress.lap_times.push(self.clock);
            sink.record(
                vehicle.id,
                RaceEvent::LapCompleted {
                    lap: progress.lap,
                    time: self.clock,
                },
            );
        }

        let needed = self.laps_target as usize * self.gates.len();
        if progress.crossed >= needed {
            progress.finished = true;
            progress.finish_time = Some(self.clock);
            sink.record(vehicle.id, RaceEvent::Finished { time: self.clock });
        }
    }

    fn is_wrong_way(&self, gate: &Gate, vehicle: &VehicleState) -> bool {
        let exit = match gate.exit {
            Some(exit) => exit,
            None => return false,
        };
        let velocity = vehicle.velocity();
        if velocity.length() <= self.tuning.direction_min_speed {
            return false;
        }
        velocity.normalize().dot(exit) < self.tuning.wrong_way_dot
    }

    // Vehicle ids from first to last place.
    pub fn standings(&self, racers: &[(VehicleID, &RaceProgress, DVec2)]) -> Vec<VehicleID> {
        let mut ranked: Vec<(VehicleID, &RaceProgress, f64)> = racers
            .iter()
            .map(|(id, progress, position)| {
                (*id, *progress, self.distance_to_next(progress, *position))
            })
            .collect();
        ranked.sort_by(|(_, a, a_distance), (_, b, b_distance)| {
            cmp_progress((*a, *a_distance), (*b, *b_distance))
        });
        ranked.into_iter().map(|(id, _, _)| id).collect()
    }
}
