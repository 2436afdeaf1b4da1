use std::cell::RefCell;
use std::collections::HashMap;

use crate::bounding_box::BoundingBox;

// The only view of the track the simulation gets: a pure, synchronous
// "can a car be here" query. Image/pixel classification lives behind it.
pub trait TrackSurface {
    fn is_drivable(&self, x: f64, y: f64) -> bool;

    // drivable but off the racing surface; freezes drift scoring
    fn is_grass(&self, _x: f64, _y: f64) -> bool {
        false
    }
}

// Every position is drivable. Handy for open-field tests.
pub struct OpenSurface;

impl TrackSurface for OpenSurface {
    fn is_drivable(&self, _x: f64, _y: f64) -> bool {
        true
    }
}

// A surface described by a union of drivable rectangles, some of which are grass.
#[derive(Clone, Debug, Default)]
pub struct RectSurface {
    pub drivable: Vec<BoundingBox>,
    pub grass: Vec<BoundingBox>,
}

impl RectSurface {
    pub fn new(drivable: Vec<BoundingBox>, grass: Vec<BoundingBox>) -> Self {
        Self { drivable, grass }
    }
}

impl TrackSurface for RectSurface {
    fn is_drivable(&self, x: f64, y: f64) -> bool {
        let point = glam::DVec2::new(x, y);
        self.drivable.iter().any(|rect| rect.contains(point))
            || self.grass.iter().any(|rect| rect.contains(point))
    }

    fn is_grass(&self, x: f64, y: f64) -> bool {
        let point = glam::DVec2::new(x, y);
        self.grass.iter().any(|rect| rect.contains(point))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct CellClass {
    drivable: bool,
    grass: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Cell {
    // all four corners agree; every point inside is answered from the cache
    Uniform(CellClass),
    // a boundary runs through the cell; ask the inner surface every time
    Edge,
}

// Memoizes another surface on a square grid. The cache belongs to this value,
// so two tracks (or two tests) never share classifications. Cells are judged
// by their corners, so a feature smaller than a cell that touches none of
// them is not seen.
pub struct CachedSurface<S: TrackSurface> {
    inner: S,
    cell_size: f64,
    cells: RefCell<HashMap<(i64, i64), Cell>>,
}

impl<S: TrackSurface> CachedSurface<S> {
    pub fn new(inner: S, cell_size: f64) -> Self {
        Self {
            inner,
            cell_size: cell_size.max(crate::EPSILON),
            cells: RefCell::new(HashMap::new()),
        }
    }

    fn exact(&self, x: f64, y: f64) -> CellClass {
        CellClass {
            drivable: self.inner.is_drivable(x, y),
            grass: self.inner.is_grass(x, y),
        }
    }

    fn classify(&self, x: f64, y: f64) -> CellClass {
        let key = (
            (x / self.cell_size).floor() as i64,
            (y / self.cell_size).floor() as i64,
        );
        let cached = self.cells.borrow().get(&key).copied();
        let cell = match cached {
            Some(cell) => cell,
            None => {
                let cell = self.sample_cell(key);
                self.cells.borrow_mut().insert(key, cell);
                cell
            }
        };

        match cell {
            Cell::Uniform(class) => class,
            Cell::Edge => self.exact(x, y),
        }
    }

    fn sample_cell(&self, (cx, cy): (i64, i64)) -> Cell {
        let x0 = cx as f64 * self.cell_size;
        let y0 = cy as f64 * self.cell_size;
        let x1 = x0 + self.cell_size;
        let y1 = y0 + self.cell_size;

        let first = self.exact(x0, y0);
        let uniform = [(x1, y0), (x0, y1), (x1, y1)]
            .iter()
            .all(|&(x, y)| self.exact(x, y) == first);
        if uniform {
            Cell::Uniform(first)
        } else {
            Cell::Edge
        }
    }
}

impl<S: TrackSurface> TrackSurface for CachedSurface<S> {
    fn is_drivable(&self, x: f64, y: f64) -> bool {
        self.classify(x, y).drivable
    }

    fn is_grass(&self, x: f64, y: f64) -> bool {
        self.classify(x, y).grass
    }
}
