use glam::DVec2;

use skid_core::bounding_box::BoundingBox;
use skid_core::checkpoint::{next_index, Checkpoint, CheckpointID};
use skid_core::track::Track;
use skid_core::vehicle::{heading_vector, left_vector};
use skid_core::ProgressTuning;

// The crossing region of a checkpoint. Oriented gates are rectangles turned to
// face the direction of travel; legacy gates are the axis-aligned rectangles
// older tracks were authored with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GateShape {
    Oriented {
        center: DVec2,
        // degrees, the direction of travel through the gate
        angle: f64,
        // across the track
        width: f64,
        // along the direction of travel
        thickness: f64,
    },
    Legacy(BoundingBox),
}

impl GateShape {
    pub fn center(&self) -> DVec2 {
        match self {
            GateShape::Oriented { center, .. } => *center,
            GateShape::Legacy(bounds) => bounds.pos(),
        }
    }

    pub fn contains(&self, point: DVec2) -> bool {
        match self {
            GateShape::Oriented {
                center,
                angle,
                width,
                thickness,
            } => {
                let offset = point - *center;
                let along = offset.dot(heading_vector(*angle));
                let across = offset.dot(left_vector(*angle));
                along.abs() <= thickness / 2.0 && across.abs() <= width / 2.0
            }
            GateShape::Legacy(bounds) => bounds.contains(point),
        }
    }

    // grows the shape by `margin` on every side
    pub fn inflated(&self, margin: f64) -> GateShape {
        match *self {
            GateShape::Oriented {
                center,
                angle,
                width,
                thickness,
            } => GateShape::Oriented {
                center,
                angle,
                width: width + 2.0 * margin,
                thickness: thickness + 2.0 * margin,
            },
            GateShape::Legacy(bounds) => GateShape::Legacy(bounds.inflated(margin)),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Gate {
    pub checkpoint: CheckpointID,
    pub shape: GateShape,
    // region the car's centre has to enter to count as crossing
    pub trigger: GateShape,
    // unit vector from this gate towards the following checkpoint; legacy
    // gates carry none and are never direction checked
    pub exit: Option<DVec2>,
}

impl Gate {
    pub fn is_crossed_by(&self, position: DVec2) -> bool {
        self.trigger.contains(position)
    }
}

// Which kind of gates a race is run with, decided once at race start.
#[derive(Clone, Debug)]
pub enum RaceSetup {
    Checkpoints(Vec<Checkpoint>),
    Legacy {
        start_line: BoundingBox,
        checkpoints: Vec<BoundingBox>,
    },
}

impl RaceSetup {
    pub fn from_track(track: &Track) -> RaceSetup {
        match track.start_line {
            Some(start_line) if track.checkpoints.is_empty() => RaceSetup::Legacy {
                start_line,
                checkpoints: track.legacy_checkpoints.clone(),
            },
            _ => RaceSetup::Checkpoints(track.checkpoints.clone()),
        }
    }

    pub fn gates(&self, tuning: &ProgressTuning) -> Vec<Gate> {
        match self {
            RaceSetup::Checkpoints(checkpoints) => {
                let count = checkpoints.len();
                checkpoints
                    .iter()
                    .enumerate()
                    .map(|(index, checkpoint)| {
                        let following = &checkpoints[next_index(index, count)];
                        let shape = GateShape::Oriented {
                            center: checkpoint.pos(),
                            angle: checkpoint.orientation(following),
                            width: tuning.gate_width,
                            thickness: tuning.gate_thickness,
                        };
                        let towards = following.pos() - checkpoint.pos();
                        Gate {
                            checkpoint: index,
                            shape,
                            trigger: shape.inflated(tuning.vehicle_half_width),
                            exit: (towards.length_squared() > skid_core::EPSILON)
                                .then(|| towards.normalize()),
                        }
                    })
                    .collect()
            }
            RaceSetup::Legacy {
                start_line,
                checkpoints,
            } => std::iter::once(start_line)
                .chain(checkpoints.iter())
                .enumerate()
                .map(|(index, bounds)| Gate {
                    checkpoint: index,
                    shape: GateShape::Legacy(*bounds),
                    trigger: GateShape::Legacy(*bounds),
                    exit: None,
                })
                .collect(),
        }
    }
}
