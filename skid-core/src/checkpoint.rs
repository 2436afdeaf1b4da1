use glam::DVec2;
use serde::{Deserialize, Serialize};

pub type CheckpointID = usize;
pub type LapNumber = u32;

// One entry of the ordered, cyclic checkpoint list as authored in a track file.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub x: f64,
    pub y: f64,
    // degrees; the direction a car is expected to be travelling through the gate
    #[serde(default)]
    pub angle: Option<f64>,
}

impl Checkpoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, angle: None }
    }

    pub fn pos(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    // Explicit angle if authored, otherwise the bearing towards `next`.
    // A checkpoint stacked on top of its successor faces +x.
    pub fn orientation(&self, next: &Checkpoint) -> f64 {
        if let Some(angle) = self.angle {
            return angle;
        }
        let towards = next.pos() - self.pos();
        if towards.length_squared() < crate::EPSILON {
            0.0
        } else {
            towards.y.atan2(towards.x).to_degrees()
        }
    }
}

// index of the checkpoint after `index` in a cyclic list of `count`
pub fn next_index(index: CheckpointID, count: usize) -> CheckpointID {
    if count == 0 {
        0
    } else {
        (index + 1) % count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_inferred_from_next() {
        let a = Checkpoint::new(0.0, 0.0);
        let b = Checkpoint::new(0.0, 10.0);
        assert!((a.orientation(&b) - 90.0).abs() < 1e-9);
        assert_eq!(a.orientation(&a), 0.0);
    }

    #[test]
    fn test_explicit_orientation_wins() {
        let a = Checkpoint {
            angle: Some(-45.0),
            ..Checkpoint::new(0.0, 0.0)
        };
        let b = Checkpoint::new(10.0, 0.0);
        assert_eq!(a.orientation(&b), -45.0);
    }

    #[test]
    fn test_next_index_wraps() {
        assert_eq!(next_index(2, 3), 0);
        assert_eq!(next_index(0, 3), 1);
        assert_eq!(next_index(0, 0), 0);
    }
}
