use serde::{Deserialize, Serialize};

/// A simple 3D vector struct, used for agent positions inside the simulation box.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Creates a new Vec3.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vec3 { x, y, z }
    }

    /// Creates a zero vector.
    pub fn zero() -> Self {
        Vec3 { x: 0.0, y: 0.0, z: 0.0 }
    }

    /// Clamps every component into the cube `[min, max]^3`.
    pub fn clamp_to_cube(&self, min: f64, max: f64) -> Self {
        Vec3 {
            x: clamp(self.x, min, max),
            y: clamp(self.y, min, max),
            z: clamp(self.z, min, max),
        }
    }

    /// True if every component lies inside `[min, max]`.
    pub fn inside_cube(&self, min: f64, max: f64) -> bool {
        [self.x, self.y, self.z].iter().all(|c| *c >= min && *c <= max)
    }
}

/// Clamps a value between a minimum and maximum.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_to_cube_pulls_outliers_onto_faces() {
        let p = Vec3::new(-5.0, 50.0, 120.0).clamp_to_cube(0.0, 100.0);
        assert_eq!(p, Vec3::new(0.0, 50.0, 100.0));
        assert!(p.inside_cube(0.0, 100.0));
    }
}
