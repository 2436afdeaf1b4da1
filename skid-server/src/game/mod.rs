use std::thread;
use std::time::{Duration, Instant};

use glam::DVec2;
use serde::Serialize;

use skid_core::events::{EventLog, EventSink, RaceEvent, TracingSink};
use skid_core::track::{CachedSurface, RectSurface, Track};
use skid_core::vehicle::control_input::ControlInput;
use skid_core::vehicle::state::{Traction, VehicleState};
use skid_core::{ScoringTuning, Settings, VehicleID};

use crate::checkpoints::RaceSetup;
use crate::controllers::Controller;
use crate::lineup::{get_ai_controller, get_traction_from_vehicle_number, get_vehicle_start_entity};
use crate::physics::vehicle_entity::VehicleEntity;
use crate::progress::{ProgressSnapshot, ProgressTracker, RaceProgress};
use crate::scoring::{DriftSample, DriftScore, DriftScorer};

pub use self::phase::*;

mod phase;

// track surface lookups are memoized on a grid this fine
const SURFACE_CELL_SIZE: f64 = 2.0;

// One car and everything that belongs to it alone.
pub struct Racer {
    pub entity: VehicleEntity,
    pub controller: Box<dyn Controller>,
    pub progress: RaceProgress,
    pub scorer: DriftScorer,
}

#[derive(Debug, Serialize)]
pub struct Standing {
    pub place: usize,
    pub vehicle: VehicleID,
    pub controller: &'static str,
    pub traction: Traction,
    pub laps: u32,
    pub finished: bool,
    pub finish_time: Option<f64>,
    pub best_lap: Option<f64>,
    pub drift_points: f64,
    pub best_drift_chain: f64,
    pub best_combo: usize,
}

// Past the line: brake to a stop, then coast. Holding the brake at rest
// would back the car up.
fn cool_down_input(entity: &VehicleEntity) -> ControlInput {
    ControlInput {
        brake: entity.state.v_long > entity.tuning.reverse_threshold,
        ..ControlInput::coast()
    }
}

// Everything a HUD shows for one car.
#[derive(Clone, Debug, Serialize)]
pub struct HudSnapshot {
    pub progress: ProgressSnapshot,
    pub drift: DriftScore,
}

pub struct RaceSession {
    phase: RacePhase,
    countdown: CountdownState,
    racers: Vec<Racer>,
    surface: CachedSurface<RectSurface>,
    tracker: ProgressTracker,
    events: EventLog,
    scoring: ScoringTuning,
    max_time_step: f64,
    ticks: u64,
}

impl RaceSession {
    pub fn new(track: &Track, settings: &Settings) -> RaceSession {
        let setup = RaceSetup::from_track(track);
        let tracker = ProgressTracker::new(&setup, settings.laps_target, settings.progress);
        tracing::info!(
            track = %track.name,
            gates = tracker.gates().len(),
            laps = settings.laps_target,
            "race session created"
        );

        RaceSession {
            phase: RacePhase::Countdown,
            countdown: CountdownState::new(),
            racers: Vec::new(),
            surface: CachedSurface::new(track.surface(), SURFACE_CELL_SIZE),
            tracker,
            events: EventLog::new(),
            scoring: settings.scoring.clone(),
            max_time_step: settings.max_time_step,
            ticks: 0,
        }
    }

    // Puts a car on the grid. Its id is its grid position.
    pub fn add_racer(
        &mut self,
        mut entity: VehicleEntity,
        controller: Box<dyn Controller>,
    ) -> VehicleID {
        let id = self.racers.len();
        entity.state.id = id;
        tracing::info!(
            vehicle = id,
            controller = controller.name(),
            traction = ?entity.state.traction,
            "joined the grid"
        );
        self.racers.push(Racer {
            entity,
            controller,
            progress: self.tracker.register(id),
            scorer: DriftScorer::new(self.scoring.clone()),
        });
        id
    }

    pub fn spawn_ai(&mut self, track: &Track, settings: &Settings, amount: usize) {
        for _ in 0..amount {
            let id = self.racers.len();
            let traction = get_traction_from_vehicle_number(id);
            let entity = get_vehicle_start_entity(track, settings, id, traction);
            let controller = get_ai_controller(track, settings, self.tracker.gates(), id);
            self.add_racer(entity, controller);
        }
    }

    pub fn phase(&self) -> RacePhase {
        self.phase
    }

    pub fn racers(&self) -> &[Racer] {
        &self.racers
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn clock(&self) -> f64 {
        self.tracker.clock()
    }

    // stopping mid-race is safe: nothing is held across ticks
    pub fn abort(&mut self) {
        if self.phase != RacePhase::Finished {
            tracing::warn!(ticks = self.ticks, "race aborted");
            self.phase = RacePhase::Finished;
        }
    }

    // Back to the grid for another race with the same cars and drivers.
    pub fn restart(&mut self, track: &Track) {
        let progress = self.racers.iter_mut().map(|racer| &mut racer.progress);
        self.tracker.reset(progress);

        for racer in self.racers.iter_mut() {
            let VehicleState { id, traction, .. } = racer.entity.state;
            let slot = track.start_slot(id);
            let position = DVec2::new(slot.x, slot.y);
            racer.entity.state = VehicleState::new(id, position, slot.heading, traction);
            racer.controller.reset();
            racer.scorer.reset();
        }

        self.phase = RacePhase::Countdown;
        self.countdown = CountdownState::new();
        self.events.drain();
        self.ticks = 0;
        tracing::info!(racers = self.racers.len(), "race restarted");
    }

    // Advances the race by one frame and returns the events it produced.
    pub fn tick(&mut self, dt: f64) -> Vec<(VehicleID, RaceEvent)> {
        let dt = dt.clamp(0.0, self.max_time_step);
        self.ticks += 1;

        match self.phase {
            RacePhase::Countdown => {
                if self.countdown.tick(dt) {
                    tracing::info!("go!");
                    self.phase = RacePhase::Racing;
                }
            }
            RacePhase::Racing => {
                self.simulate_racers(dt);
                let all_finished = self.racers.iter().all(|racer| racer.progress.finished);
                if !self.racers.is_empty() && all_finished {
                    tracing::info!(time = self.tracker.clock(), "all racers finished");
                    self.phase = RacePhase::Finished;
                }
            }
            RacePhase::Finished => {}
        }

        let events = self.events.drain();
        let mut log = TracingSink;
        for (vehicle, event) in &events {
            log.record(*vehicle, event.clone());
        }
        events
    }

    // controller -> dynamics -> {scoring, progress}, one car at a time
    fn simulate_racers(&mut self, dt: f64) {
        self.tracker.tick(dt);

        for racer in self.racers.iter_mut() {
            let input = if racer.progress.finished {
                cool_down_input(&racer.entity)
            } else {
                racer.controller.control(&racer.entity.state, dt, &mut self.events)
            };

            let state = *racer.entity.step(&input, dt, &self.surface, &mut self.events);

            let sample = DriftSample {
                drift_active: state.drift.active,
                speed: state.speed(),
                angle: state.slip_angle(),
                collision_force: state.last_impact,
                on_grass: racer.entity.on_grass(&self.surface),
            };
            racer.scorer.update(state.id, dt, &sample, &mut self.events);
            self.tracker.update(&mut racer.progress, &state, dt, &mut self.events);
        }
    }

    // per-car HUD state, in grid order
    pub fn snapshots(&self) -> Vec<HudSnapshot> {
        self.racers
            .iter()
            .map(|racer| {
                let state = &racer.entity.state;
                HudSnapshot {
                    progress: self.tracker.snapshot(state.id, &racer.progress, state.position),
                    drift: racer.scorer.score().clone(),
                }
            })
            .collect()
    }

    pub fn standings(&self) -> Vec<Standing> {
        let entries: Vec<_> = self
            .racers
            .iter()
            .map(|racer| (racer.entity.state.id, &racer.progress, racer.entity.state.position))
            .collect();

        self.tracker
            .standings(&entries)
            .into_iter()
            .enumerate()
            .map(|(place, id)| {
                let racer = &self.racers[id];
                let score = racer.scorer.score();
                Standing {
                    place: place + 1,
                    vehicle: id,
                    controller: racer.controller.name(),
                    traction: racer.entity.state.traction,
                    laps: racer.progress.lap,
                    finished: racer.progress.finished,
                    finish_time: racer.progress.finish_time,
                    best_lap: racer.progress.best_lap(),
                    drift_points: score.total_points,
                    best_drift_chain: score.best_points,
                    best_combo: score.best_combo,
                }
            })
            .collect()
    }

    // Runs fixed ticks until the race is over or `max_ticks` have passed.
    // With `realtime` each tick is padded out to `tick_duration` of wall time.
    pub fn start_loop(&mut self, tick_duration: Duration, max_ticks: u64, realtime: bool) {
        let dt = tick_duration.as_secs_f64();

        while self.phase != RacePhase::Finished {
            if self.ticks >= max_ticks {
                self.abort();
                break;
            }
            let start_time = Instant::now();

            self.tick(dt);

            if realtime {
                // a slow tick just runs late instead of bringing the loop down
                if let Some(remaining) = tick_duration.checked_sub(start_time.elapsed()) {
                    thread::sleep(remaining);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use skid_core::bounding_box::BoundingBox;
    use skid_core::checkpoint::Checkpoint;
    use skid_core::track::StartSlot;

    use super::*;
    use crate::controllers::HumanController;

    const DT: f64 = 1.0 / 60.0;

    fn square_track() -> Track {
        Track {
            name: "square".to_string(),
            checkpoints: vec![
                Checkpoint::new(0.0, 0.0),
                Checkpoint::new(400.0, 0.0),
                Checkpoint::new(400.0, 300.0),
                Checkpoint::new(0.0, 300.0),
            ],
            waypoints: vec![],
            drivable: vec![BoundingBox::new(-300.0, 700.0, -300.0, 600.0)],
            grass: vec![],
            start_line: None,
            legacy_checkpoints: vec![],
            starts: vec![StartSlot {
                x: 0.0,
                y: 0.0,
                heading: 0.0,
            }],
        }
    }

    fn settings(laps: u32) -> Settings {
        Settings {
            laps_target: laps,
            ..Settings::default()
        }
    }

    fn human_at(x: f64, y: f64) -> (VehicleEntity, HumanController) {
        let entity = VehicleEntity::new(
            VehicleState::new(0, DVec2::new(x, y), 0.0, Traction::Awd),
            Settings::default().vehicle,
            60.0,
        );
        (entity, HumanController::default())
    }

    #[test]
    fn test_countdown_holds_cars() {
        let track = square_track();
        let mut session = RaceSession::new(&track, &settings(1));
        let (entity, mut human) = human_at(0.0, 0.0);
        human.set_input(ControlInput {
            throttle: true,
            ..ControlInput::coast()
        });
        session.add_racer(entity, Box::new(human));

        // huge frame deltas are clamped, so this is nowhere near three seconds
        for _ in 0..10 {
            session.tick(1.0);
        }
        assert_eq!(session.phase(), RacePhase::Countdown);
        assert_eq!(session.racers()[0].entity.state.position, DVec2::ZERO);

        for _ in 0..200 {
            session.tick(DT);
        }
        assert_eq!(session.phase(), RacePhase::Racing);
        assert!(session.racers()[0].entity.state.position.x > 0.0);
        assert!(session.clock() > 0.0);
    }

    #[test]
    fn test_finished_car_stops_without_reversing() {
        let track = square_track();
        let mut session = RaceSession::new(&track, &settings(1));
        let (mut entity, human) = human_at(100.0, 0.0);
        entity.state.v_long = 5.0;
        session.add_racer(entity, Box::new(human));
        // someone still racing keeps the session going
        let (parked, idle) = human_at(0.0, 300.0);
        session.add_racer(parked, Box::new(idle));
        session.phase = RacePhase::Racing;
        session.racers[0].progress.finished = true;

        let mut collisions = 0;
        for _ in 0..1200 {
            for (_, event) in session.tick(DT) {
                if matches!(event, RaceEvent::Collision { .. }) {
                    collisions += 1;
                }
            }
            assert!(session.racers()[0].entity.state.v_long >= 0.0);
        }

        let state = session.racers()[0].entity.state;
        assert_eq!(state.v_long, 0.0);
        assert!(state.position.x > 100.0);
        assert_eq!(collisions, 0);
        assert_eq!(session.phase(), RacePhase::Racing);
    }

    #[test]
    fn test_ai_finishes_race() {
        let track = square_track();
        let settings = settings(2);
        let mut session = RaceSession::new(&track, &settings);
        session.spawn_ai(&track, &settings, 1);

        let mut laps = 0;
        for _ in 0..3000 {
            for (_, event) in session.tick(DT) {
                if matches!(event, RaceEvent::LapCompleted { .. }) {
                    laps += 1;
                }
            }
            if session.phase() == RacePhase::Finished {
                break;
            }
        }

        assert_eq!(session.phase(), RacePhase::Finished);
        assert_eq!(laps, 2);
        let standings = session.standings();
        assert_eq!(standings.len(), 1);
        assert!(standings[0].finished);
        assert_eq!(standings[0].laps, 2);
        assert_eq!(standings[0].controller, "pure pursuit");
    }

    #[test]
    fn test_abort_ends_loop() {
        let track = square_track();
        let settings = settings(3);
        let mut session = RaceSession::new(&track, &settings);
        session.spawn_ai(&track, &settings, 2);
        assert_eq!(session.racers()[1].controller.name(), "reactive seeker");
        assert_eq!(session.racers()[1].entity.state.traction, Traction::Front);

        session.start_loop(Duration::from_millis(16), 50, false);
        assert_eq!(session.phase(), RacePhase::Finished);
        assert_eq!(session.ticks(), 50);
        assert_eq!(session.standings().len(), 2);

        let snapshots = session.snapshots();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[1].progress.vehicle, 1);
        assert_eq!(snapshots[0].progress.laps_target, 3);
        assert!(snapshots.iter().all(|snapshot| !snapshot.progress.finished));
        assert!(snapshots.iter().all(|snapshot| snapshot.drift.drift_timer == 0.0));
    }

    #[test]
    fn test_restart_puts_cars_back_on_grid() {
        let track = square_track();
        let settings = settings(1);
        let mut session = RaceSession::new(&track, &settings);
        session.spawn_ai(&track, &settings, 2);

        while session.phase() != RacePhase::Finished && session.ticks() < 3000 {
            session.tick(DT);
        }
        assert!(session.racers()[0].progress.finished);

        session.restart(&track);
        assert_eq!(session.phase(), RacePhase::Countdown);
        assert_eq!(session.clock(), 0.0);
        assert_eq!(session.ticks(), 0);
        for racer in session.racers() {
            assert_eq!(racer.progress, RaceProgress::default());
            assert_eq!(racer.entity.state.position, DVec2::ZERO);
            assert_eq!(racer.entity.state.v_long, 0.0);
            assert_eq!(racer.scorer.score().total_points, 0.0);
        }
        assert_eq!(session.racers()[1].entity.state.traction, Traction::Front);
    }
}
