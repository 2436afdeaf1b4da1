use serde::Serialize;

use skid_core::events::{EventSink, RaceEvent};
use skid_core::{ScoringTuning, VehicleID};

// What the scorer needs to know about one car for one tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct DriftSample {
    pub drift_active: bool,
    pub speed: f64,
    // slip angle in degrees
    pub angle: f64,
    // 0..1, zero on ticks without an impact
    pub collision_force: f64,
    pub on_grass: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DriftScore {
    // the running chain; lost when the combo resets
    pub points: f64,
    // every point earned this race
    pub total_points: f64,
    pub best_points: f64,
    // index into the multiplier ladder
    pub combo: usize,
    pub best_combo: usize,
    // 0..1 towards the next combo level
    pub progress: f64,
    // length of the drift in progress; zero between drifts
    pub drift_timer: f64,
    pub no_drift_timer: f64,
}

pub struct DriftScorer {
    tuning: ScoringTuning,
    score: DriftScore,
}

impl DriftScorer {
    pub fn new(tuning: ScoringTuning) -> Self {
        Self {
            tuning,
            score: DriftScore::default(),
        }
    }

    pub fn score(&self) -> &DriftScore {
        &self.score
    }

    pub fn multiplier(&self) -> f64 {
        self.tuning.ladder.get(self.score.combo).copied().unwrap_or(1.0)
    }

    fn top_level(&self) -> usize {
        self.tuning.ladder.len().saturating_sub(1)
    }

    pub fn update(
        &mut self,
        vehicle: VehicleID,
        dt: f64,
        sample: &DriftSample,
        sink: &mut dyn EventSink,
    ) -> &DriftScore {
        let dt = dt.max(0.0);

        if sample.on_grass || sample.collision_force > self.tuning.hard_collision {
            self.reset_combo(vehicle, sink);
            return &self.score;
        }

        if sample.drift_active {
            self.score.drift_timer += dt;
            self.score.no_drift_timer = 0.0;
            self.accrue(dt, sample);
            self.fill(vehicle, dt, sink);
        } else {
            self.score.drift_timer = 0.0;
            self.score.no_drift_timer += dt;
            if self.score.no_drift_timer > self.tuning.no_drift_tolerance {
                self.reset_combo(vehicle, sink);
            } else {
                self.decay(vehicle, dt, sink);
            }
        }
        &self.score
    }

    fn accrue(&mut self, dt: f64, sample: &DriftSample) {
        let tuning = &self.tuning;
        let angle_factor = (sample.angle.abs() / tuning.angle_reference.max(skid_core::EPSILON))
            .min(tuning.angle_cap);
        let speed_factor = (sample.speed.abs() / tuning.speed_reference.max(skid_core::EPSILON))
            .min(tuning.speed_cap);
        let gained = tuning.base_rate * angle_factor * speed_factor * self.multiplier() * dt;

        let score = &mut self.score;
        score.points += gained;
        score.total_points += gained;
        score.best_points = score.best_points.max(score.points);
    }

    // higher levels take longer to fill
    fn fill(&mut self, vehicle: VehicleID, dt: f64, sink: &mut dyn EventSink) {
        let level = self.score.combo as f64;
        let rate = self.tuning.fill_rate / (1.0 + self.tuning.fill_difficulty * level);
        let top = self.top_level();
        let score = &mut self.score;
        score.progress += rate * dt;

        if score.progress >= 1.0 {
            if score.combo < top {
                score.combo += 1;
                score.progress -= 1.0;
                sink.record(vehicle, RaceEvent::ComboLevelUp { level: score.combo });
            } else {
                score.progress = 1.0;
            }
        }
        score.best_combo = score.best_combo.max(score.combo);
    }

    // higher levels drain faster; an empty bar drops a level with partial credit
    fn decay(&mut self, vehicle: VehicleID, dt: f64, sink: &mut dyn EventSink) {
        let level = self.score.combo as f64;
        let rate = self.tuning.decay_rate * (1.0 + self.tuning.decay_growth * level);
        let carry_over = self.tuning.drop_carry_over;
        let score = &mut self.score;
        score.progress -= rate * dt;

        if score.progress <= 0.0 {
            if score.combo > 0 {
                score.combo -= 1;
                score.progress = carry_over;
                sink.record(vehicle, RaceEvent::ComboDropped { level: score.combo });
            } else {
                score.progress = 0.0;
            }
        }
    }

    fn reset_combo(&mut self, vehicle: VehicleID, sink: &mut dyn EventSink) {
        let score = &mut self.score;
        if score.combo > 0 || score.points > 0.0 || score.progress > 0.0 {
            sink.record(vehicle, RaceEvent::ComboReset { points: score.points });
        }
        score.points = 0.0;
        score.combo = 0;
        score.progress = 0.0;
        score.drift_timer = 0.0;
        score.no_drift_timer = 0.0;
    }

    // new race
    pub fn reset(&mut self) {
        self.score = DriftScore::default();
    }
}
