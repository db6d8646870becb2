//! Axis-aligned 3D bounding boxes.

use serde::{Deserialize, Serialize};

/// An axis-aligned box in mesh coordinates.
///
/// Field order follows the usual mesh-toolkit convention
/// `(xmin, xmax, ymin, ymax, zmin, zmax)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds3 {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl Bounds3 {
    /// Create a box from interleaved min/max pairs.
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64, min_z: f64, max_z: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
            min_z,
            max_z,
        }
    }

    /// Build from the 6-float array form `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    pub fn from_array(b: [f64; 6]) -> Self {
        Self::new(b[0], b[1], b[2], b[3], b[4], b[5])
    }

    pub fn to_array(&self) -> [f64; 6] {
        [
            self.min_x, self.max_x, self.min_y, self.max_y, self.min_z, self.max_z,
        ]
    }

    /// Parse a command-line bounds string: "xmin,xmax,ymin,ymax,zmin,zmax"
    pub fn from_arg_string(s: &str) -> Result<Self, BoundsParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 6 {
            return Err(BoundsParseError::InvalidFormat(s.to_string()));
        }

        let mut values = [0.0f64; 6];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| BoundsParseError::InvalidNumber(part.to_string()))?;
        }

        Ok(Self::from_array(values))
    }

    /// Smallest box enclosing all of `points`. `None` for an empty slice.
    pub fn enclosing(points: &[[f64; 3]]) -> Option<Self> {
        let first = points.first()?;
        let mut b = Self::new(first[0], first[0], first[1], first[1], first[2], first[2]);
        for p in &points[1..] {
            b.min_x = b.min_x.min(p[0]);
            b.max_x = b.max_x.max(p[0]);
            b.min_y = b.min_y.min(p[1]);
            b.max_y = b.max_y.max(p[1]);
            b.min_z = b.min_z.min(p[2]);
            b.max_z = b.max_z.max(p[2]);
        }
        Some(b)
    }

    /// Edge lengths along x, y and z.
    pub fn extents(&self) -> [f64; 3] {
        [
            self.max_x - self.min_x,
            self.max_y - self.min_y,
            self.max_z - self.min_z,
        ]
    }

    /// Product of the extents. Zero or negative for flat or inverted boxes.
    pub fn volume(&self) -> f64 {
        let [ex, ey, ez] = self.extents();
        ex * ey * ez
    }

    pub fn min_corner(&self) -> [f64; 3] {
        [self.min_x, self.min_y, self.min_z]
    }

    pub fn max_corner(&self) -> [f64; 3] {
        [self.max_x, self.max_y, self.max_z]
    }

    pub fn center(&self) -> [f64; 3] {
        [
            0.5 * (self.min_x + self.max_x),
            0.5 * (self.min_y + self.max_y),
            0.5 * (self.min_z + self.max_z),
        ]
    }

    /// Check if this box overlaps another with non-zero volume.
    pub fn intersects(&self, other: &Bounds3) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
            && self.min_z < other.max_z
            && self.max_z > other.min_z
    }

    /// Compute the intersection of two boxes.
    pub fn intersection(&self, other: &Bounds3) -> Option<Bounds3> {
        if !self.intersects(other) {
            return None;
        }

        Some(Bounds3 {
            min_x: self.min_x.max(other.min_x),
            max_x: self.max_x.min(other.max_x),
            min_y: self.min_y.max(other.min_y),
            max_y: self.max_y.min(other.max_y),
            min_z: self.min_z.max(other.min_z),
            max_z: self.max_z.min(other.max_z),
        })
    }

    /// Check if a point lies inside or on the boundary.
    pub fn contains_point(&self, p: [f64; 3]) -> bool {
        p[0] >= self.min_x
            && p[0] <= self.max_x
            && p[1] >= self.min_y
            && p[1] <= self.max_y
            && p[2] >= self.min_z
            && p[2] <= self.max_z
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BoundsParseError {
    #[error("Invalid bounds format: {0}. Expected 'xmin,xmax,ymin,ymax,zmin,zmax'")]
    InvalidFormat(String),

    #[error("Invalid number in bounds: {0}")]
    InvalidNumber(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arg_bounds() {
        let b = Bounds3::from_arg_string("2,17, 2,22,22,27").unwrap();
        assert_eq!(b.to_array(), [2.0, 17.0, 2.0, 22.0, 22.0, 27.0]);
        assert!(Bounds3::from_arg_string("1,2,3").is_err());
        assert!(Bounds3::from_arg_string("1,2,3,4,5,x").is_err());
    }

    #[test]
    fn test_extents_and_volume() {
        let b = Bounds3::new(2.0, 17.0, 2.0, 22.0, 22.0, 27.0);
        assert_eq!(b.extents(), [15.0, 20.0, 5.0]);
        assert_eq!(b.volume(), 1500.0);

        let flat = Bounds3::new(0.0, 1.0, 0.0, 1.0, 3.0, 3.0);
        assert_eq!(flat.volume(), 0.0);
    }

    #[test]
    fn test_intersection() {
        let a = Bounds3::new(0.0, 10.0, 0.0, 10.0, 0.0, 10.0);
        let b = Bounds3::new(5.0, 15.0, 5.0, 15.0, -5.0, 5.0);
        let c = Bounds3::new(20.0, 30.0, 0.0, 10.0, 0.0, 10.0);

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.intersection(&c).is_none());

        let i = a.intersection(&b).unwrap();
        assert_eq!(i.to_array(), [5.0, 10.0, 5.0, 10.0, 0.0, 5.0]);
    }

    #[test]
    fn test_enclosing() {
        let pts = [[1.0, 5.0, -1.0], [-2.0, 0.0, 4.0], [0.5, 2.0, 0.0]];
        let b = Bounds3::enclosing(&pts).unwrap();
        assert_eq!(b.to_array(), [-2.0, 1.0, 0.0, 5.0, -1.0, 4.0]);
        assert!(Bounds3::enclosing(&[]).is_none());
    }
}
