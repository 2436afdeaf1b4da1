use glam::DVec2;

use skid_core::EPSILON;

// A closed loop of evenly spaced points along the racing line. Index
// arithmetic wraps, so the point after the last one is the first.
#[derive(Clone, Debug, Default)]
pub struct Route {
    points: Vec<DVec2>,
}

impl Route {
    pub fn closed_loop(waypoints: &[DVec2], spacing: f64) -> Route {
        let spacing = spacing.max(EPSILON);
        let mut points = Vec::new();

        for (index, start) in waypoints.iter().enumerate() {
            let end = waypoints[(index + 1) % waypoints.len()];
            let length = start.distance(end);
            if length < EPSILON {
                continue;
            }
            let samples = (length / spacing).ceil().max(1.0) as usize;
            points.extend((0..samples).map(|k| start.lerp(end, k as f64 / samples as f64)));
        }

        // every segment had zero length: a single point is all there is
        if points.is_empty() {
            if let Some(first) = waypoints.first() {
                points.push(*first);
            }
        }

        Route { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, index: usize) -> DVec2 {
        self.points[index % self.points.len()]
    }

    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.points.len()
    }

    // Global search; only used to seed a follower.
    pub fn nearest_index(&self, position: DVec2) -> Option<usize> {
        self.points
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.distance_squared(position)
                    .total_cmp(&b.distance_squared(position))
            })
            .map(|(index, _)| index)
    }

    /*
     * Local hill climb from `from`: step forward while the next point is
     * strictly closer than the current one. Never moves backwards, so a
     * follower can't latch onto an earlier part of the loop that happens to
     * pass nearby. Returns the new index and how many steps it moved.
     */
    pub fn advance_nearest(&self, from: usize, position: DVec2) -> (usize, usize) {
        let mut index = from % self.points.len();
        let mut steps = 0;
        while steps < self.points.len() {
            let next = self.next_index(index);
            if self.point(next).distance_squared(position)
                >= self.point(index).distance_squared(position)
            {
                break;
            }
            index = next;
            steps += 1;
        }
        (index, steps)
    }

    // Walks forward from `from` until `distance` of arc length is covered and
    // returns the point there, interpolated within the last segment.
    pub fn point_ahead(&self, from: usize, distance: f64) -> DVec2 {
        let mut index = from % self.points.len();
        let mut remaining = distance.max(0.0);

        for _ in 0..self.points.len() {
            let next = self.next_index(index);
            let segment = self.point(next) - self.point(index);
            let length = segment.length();
            if length >= remaining {
                if length < EPSILON {
                    return self.point(index);
                }
                return self.point(index) + segment * (remaining / length);
            }
            remaining -= length;
            index = next;
        }
        self.point(index)
    }
}
