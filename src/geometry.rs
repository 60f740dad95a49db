//! world-position <-> grid-cell mapping & ray helpers
//!
//! Pure coordinate transforms. The host's rendering layer owns the real cell
//! size; it hands the same numbers to us so that both sides agree on where a
//! cell lives in world space.

use bevy::prelude::*;

#[derive(Resource, Clone, Copy, Debug)]
pub struct GridGeometry {
    pub cell_size: f32,
    /// world position of the lower-left corner of cell (0, 0)
    pub origin: Vec2,
}

impl GridGeometry {
    /// origin chosen so the world is centered on (0, 0), matching the way the
    /// host parks its tilemap
    pub fn centered(world_width: i32, world_height: i32, cell_size: f32) -> Self {
        Self {
            cell_size,
            origin: Vec2::new(
                -(world_width as f32) * cell_size / 2.0,
                -(world_height as f32) * cell_size / 2.0,
            ),
        }
    }

    pub fn world_to_cell(&self, world_pos: Vec2) -> IVec2 {
        let local = (world_pos - self.origin) / self.cell_size;
        IVec2::new(local.x.floor() as i32, local.y.floor() as i32)
    }

    pub fn cell_center_world(&self, cell: IVec2) -> Vec2 {
        self.origin + (cell.as_vec2() + Vec2::splat(0.5)) * self.cell_size
    }

    pub fn cell_rect(&self, cell: IVec2) -> Rect {
        Rect::from_center_size(self.cell_center_world(cell), Vec2::splat(self.cell_size))
    }
}

/// Nearest intersection of the ray `origin + t * dir` (t > 0) with the four
/// edges of `rect`, keeping only hits that land within the perpendicular edge
/// bounds. `None` when the ray points away from every edge.
pub fn ray_rect_intersection(origin: Vec2, dir: Vec2, rect: Rect) -> Option<Vec2> {
    let dir = dir.normalize_or_zero();
    let mut best: Option<(f32, Vec2)> = None;

    let mut consider = |t: f32, point: Vec2| {
        if best.map_or(true, |(bt, _)| t < bt) {
            best = Some((t, point));
        }
    };

    // horizontal edges
    if dir.y.abs() > 1e-3 {
        for edge_y in [rect.min.y, rect.max.y] {
            let t = (edge_y - origin.y) / dir.y;
            if t > 0.0 {
                let x = origin.x + dir.x * t;
                if x >= rect.min.x && x <= rect.max.x {
                    consider(t, Vec2::new(x, edge_y));
                }
            }
        }
    }

    // vertical edges
    if dir.x.abs() > 1e-3 {
        for edge_x in [rect.min.x, rect.max.x] {
            let t = (edge_x - origin.x) / dir.x;
            if t > 0.0 {
                let y = origin.y + dir.y * t;
                if y >= rect.min.y && y <= rect.max.y {
                    consider(t, Vec2::new(edge_x, y));
                }
            }
        }
    }

    best.map(|(_, p)| p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geom() -> GridGeometry {
        GridGeometry::centered(40, 100, 1.0)
    }

    #[test]
    fn cell_center_round_trips() {
        let g = geom();
        for cell in [
            IVec2::new(0, 0),
            IVec2::new(-1, 100),
            IVec2::new(39, 57),
            IVec2::new(40, -1),
        ] {
            assert_eq!(g.world_to_cell(g.cell_center_world(cell)), cell);
        }
    }

    #[test]
    fn origin_centers_the_world() {
        let g = geom();
        // the world's bounding box is centered on the world origin
        let mid =
            (g.cell_center_world(IVec2::new(0, 0)) + g.cell_center_world(IVec2::new(39, 99))) / 2.0;
        assert!(mid.length() < 1e-4);
    }

    #[test]
    fn ray_hits_facing_edge_first() {
        let rect = Rect::from_center_size(Vec2::ZERO, Vec2::splat(1.0));
        let hit = ray_rect_intersection(Vec2::new(-3.0, 0.0), Vec2::X, rect).unwrap();
        assert!((hit - Vec2::new(-0.5, 0.0)).length() < 1e-4);

        let hit = ray_rect_intersection(Vec2::new(0.2, 4.0), Vec2::NEG_Y, rect).unwrap();
        assert!((hit - Vec2::new(0.2, 0.5)).length() < 1e-4);
    }

    #[test]
    fn ray_pointing_away_misses() {
        let rect = Rect::from_center_size(Vec2::ZERO, Vec2::splat(1.0));
        assert!(ray_rect_intersection(Vec2::new(-3.0, 0.0), Vec2::NEG_X, rect).is_none());
        assert!(ray_rect_intersection(Vec2::new(-3.0, 2.0), Vec2::X, rect).is_none());
    }
}
