use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bounding_box::BoundingBox;
use crate::checkpoint::Checkpoint;

pub mod surface;

pub use surface::{CachedSurface, OpenSurface, RectSurface, TrackSurface};

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("could not read track file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse track file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("track '{0}' has no drivable area")]
    Empty(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StartSlot {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

// Everything an editor hands the simulation for one track, as stored on disk.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    #[serde(default)]
    pub checkpoints: Vec<Checkpoint>,
    // racing line; when absent, the checkpoint positions are used
    #[serde(default)]
    pub waypoints: Vec<[f64; 2]>,
    #[serde(default)]
    pub drivable: Vec<BoundingBox>,
    #[serde(default)]
    pub grass: Vec<BoundingBox>,
    // old-style tracks: an axis-aligned start line followed by rectangles
    #[serde(default)]
    pub start_line: Option<BoundingBox>,
    #[serde(default)]
    pub legacy_checkpoints: Vec<BoundingBox>,
    #[serde(default)]
    pub starts: Vec<StartSlot>,
}

impl Track {
    pub fn load(path: impl AsRef<Path>) -> Result<Track, TrackError> {
        let contents = std::fs::read_to_string(path)?;
        Track::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Track, TrackError> {
        let track: Track = serde_yaml::from_str(contents)?;
        if track.drivable.is_empty() && track.grass.is_empty() {
            return Err(TrackError::Empty(track.name));
        }
        Ok(track)
    }

    pub fn surface(&self) -> RectSurface {
        RectSurface::new(self.drivable.clone(), self.grass.clone())
    }

    pub fn racing_line(&self) -> Vec<DVec2> {
        if self.waypoints.is_empty() {
            self.checkpoints.iter().map(Checkpoint::pos).collect()
        } else {
            self.waypoints
                .iter()
                .map(|[x, y]| DVec2::new(*x, *y))
                .collect()
        }
    }

    // grid slot for the n-th car; wraps when there are more cars than slots
    pub fn start_slot(&self, n: usize) -> StartSlot {
        if self.starts.is_empty() {
            let origin = self
                .checkpoints
                .first()
                .copied()
                .unwrap_or_else(|| Checkpoint::new(0.0, 0.0));
            return StartSlot {
                x: origin.x,
                y: origin.y,
                heading: 0.0,
            };
        }
        self.starts[n % self.starts.len()]
    }
}
