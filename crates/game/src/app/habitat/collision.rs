use pethouse_engine::{Aabb, Vec2};
use serde::Deserialize;

pub(crate) const BLOCKING_LAYER: &str = "Furniture";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BlockingSurface {
    pub(crate) name: String,
    pub(crate) layer: String,
    pub(crate) bounds: Aabb,
}

impl BlockingSurface {
    pub(crate) fn translated_x(&self, offset_x: f32) -> BlockingSurface {
        BlockingSurface {
            name: self.name.clone(),
            layer: self.layer.clone(),
            bounds: self.bounds.translated(Vec2::new(offset_x, 0.0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CollisionProbe {
    pub(crate) distance: f32,
    pub(crate) layer: String,
}

impl Default for CollisionProbe {
    fn default() -> Self {
        Self {
            distance: 0.2,
            layer: BLOCKING_LAYER.to_string(),
        }
    }
}

impl CollisionProbe {
    /// Short ray from the centre of `origin` along `direction`, against the probe layer only.
    pub(crate) fn is_blocked(
        &self,
        origin: &Aabb,
        direction: Vec2,
        surfaces: &[BlockingSurface],
    ) -> bool {
        let dir = direction.normalized();
        if dir.is_zero() {
            return false;
        }
        surfaces
            .iter()
            .filter(|surface| surface.layer == self.layer)
            .any(|surface| ray_hits_aabb(origin.center, dir, self.distance, &surface.bounds))
    }
}

/// Slab test; a ray starting inside the box counts as a hit.
fn ray_hits_aabb(origin: Vec2, dir: Vec2, max_distance: f32, bounds: &Aabb) -> bool {
    let min = bounds.min();
    let max = bounds.max();
    let mut t_enter = 0.0_f32;
    let mut t_exit = max_distance;

    for (o, d, lo, hi) in [(origin.x, dir.x, min.x, max.x), (origin.y, dir.y, min.y, max.y)] {
        if d.abs() <= f32::EPSILON {
            if o < lo || o > hi {
                return false;
            }
            continue;
        }
        let inv = d.recip();
        let (t0, t1) = {
            let a = (lo - o) * inv;
            let b = (hi - o) * inv;
            if a <= b {
                (a, b)
            } else {
                (b, a)
            }
        };
        t_enter = t_enter.max(t0);
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return false;
        }
    }
    true
}
