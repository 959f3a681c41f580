//! Block-grid positions and scan regions (no host dependency).
#![forbid(unsafe_code)]

use core::fmt;
use core::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Largest scan radius accepted from settings. Keeps the inflated sphere box
/// and its volume well inside `i32` and `u64`.
pub const MAX_RADIUS: u32 = 1 << 16;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const ORIGIN: BlockPos = BlockPos { x: 0, y: 0, z: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Block containing a continuous feet position.
    #[inline]
    pub fn from_feet(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: x.floor() as i32,
            y: y.floor() as i32,
            z: z.floor() as i32,
        }
    }

    #[inline]
    pub const fn up(self) -> BlockPos {
        BlockPos {
            x: self.x,
            y: self.y.wrapping_add(1),
            z: self.z,
        }
    }

    #[inline]
    pub const fn down(self) -> BlockPos {
        BlockPos {
            x: self.x,
            y: self.y.wrapping_sub(1),
            z: self.z,
        }
    }

    /// Squared euclidean distance, widened so large coordinates cannot overflow.
    #[inline]
    pub fn distance_sq(self, other: BlockPos) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        let dz = i64::from(self.z) - i64::from(other.z);
        dx * dx + dy * dy + dz * dz
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum ScanShape {
    Cube,
    #[default]
    Sphere,
}

impl ScanShape {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanShape::Cube => "cube",
            ScanShape::Sphere => "sphere",
        }
    }

    pub fn parse(s: &str) -> Option<ScanShape> {
        if s.eq_ignore_ascii_case("cube") {
            Some(ScanShape::Cube)
        } else if s.eq_ignore_ascii_case("sphere") {
            Some(ScanShape::Sphere)
        } else {
            None
        }
    }
}

impl fmt::Display for ScanShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Volume around a center that one scan pass walks.
///
/// Spheres scan a box one block wider than the radius on every side while the
/// membership test keeps using the configured radius, so the outermost ring of
/// the box never contributes members.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanRegion {
    pub center: BlockPos,
    pub radius: u32,
    pub shape: ScanShape,
}

impl ScanRegion {
    #[inline]
    pub const fn new(center: BlockPos, radius: u32, shape: ScanShape) -> Self {
        Self {
            center,
            radius,
            shape,
        }
    }

    /// Half side length of the scanned bounding box.
    #[inline]
    pub fn extent(&self) -> i32 {
        let r = i32::try_from(self.radius).unwrap_or(i32::MAX);
        match self.shape {
            ScanShape::Cube => r,
            ScanShape::Sphere => r.saturating_add(1),
        }
    }

    #[inline]
    pub fn radius_sq(&self) -> i64 {
        let r = i64::from(self.radius);
        r * r
    }

    /// Inclusive corners of the bounding box.
    pub fn bounds(&self) -> (BlockPos, BlockPos) {
        let e = self.extent();
        let c = self.center;
        (
            BlockPos::new(c.x.saturating_sub(e), c.y.saturating_sub(e), c.z.saturating_sub(e)),
            BlockPos::new(c.x.saturating_add(e), c.y.saturating_add(e), c.z.saturating_add(e)),
        )
    }

    #[inline]
    pub fn x_range(&self) -> RangeInclusive<i32> {
        let (min, max) = self.bounds();
        min.x..=max.x
    }

    #[inline]
    pub fn y_range(&self) -> RangeInclusive<i32> {
        let (min, max) = self.bounds();
        min.y..=max.y
    }

    #[inline]
    pub fn z_range(&self) -> RangeInclusive<i32> {
        let (min, max) = self.bounds();
        min.z..=max.z
    }

    /// Number of positions in the bounding box.
    pub fn box_volume(&self) -> u64 {
        let side = 2 * u64::from(self.extent().unsigned_abs()) + 1;
        side.saturating_mul(side).saturating_mul(side)
    }

    #[inline]
    pub fn in_box(&self, pos: BlockPos) -> bool {
        let (min, max) = self.bounds();
        (min.x..=max.x).contains(&pos.x)
            && (min.y..=max.y).contains(&pos.y)
            && (min.z..=max.z).contains(&pos.z)
    }

    /// Shape membership. Cubes accept every position in the box.
    #[inline]
    pub fn contains(&self, pos: BlockPos) -> bool {
        match self.shape {
            ScanShape::Cube => self.in_box(pos),
            ScanShape::Sphere => pos.distance_sq(self.center) <= self.radius_sq(),
        }
    }

    /// Every box position in scan order: x outermost, then y, then z.
    pub fn iter_box(&self) -> impl Iterator<Item = BlockPos> + use<> {
        let ys = self.y_range();
        let zs = self.z_range();
        self.x_range().flat_map(move |x| {
            let zs = zs.clone();
            ys.clone()
                .flat_map(move |y| zs.clone().map(move |z| BlockPos::new(x, y, z)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_feet_floors_negative_coordinates() {
        assert_eq!(BlockPos::from_feet(-0.5, 64.99, 3.0), BlockPos::new(-1, 64, 3));
    }

    #[test]
    fn sphere_extent_is_inflated() {
        let r = ScanRegion::new(BlockPos::ORIGIN, 4, ScanShape::Sphere);
        assert_eq!(r.extent(), 5);
        let c = ScanRegion::new(BlockPos::ORIGIN, 4, ScanShape::Cube);
        assert_eq!(c.extent(), 4);
    }

    #[test]
    fn shape_tokens_are_case_insensitive() {
        assert_eq!(ScanShape::parse("Sphere"), Some(ScanShape::Sphere));
        assert_eq!(ScanShape::parse("CUBE"), Some(ScanShape::Cube));
        assert_eq!(ScanShape::parse("pyramid"), None);
    }

    #[test]
    fn sphere_extent_at_the_radius_cap() {
        let r = ScanRegion::new(BlockPos::ORIGIN, MAX_RADIUS, ScanShape::Sphere);
        assert_eq!(r.extent(), MAX_RADIUS as i32 + 1);
        let side = 2 * u64::from(MAX_RADIUS + 1) + 1;
        assert_eq!(r.box_volume(), side * side * side);
    }

    #[test]
    fn oversized_radius_saturates_instead_of_wrapping() {
        for radius in [i32::MAX as u32, u32::MAX] {
            let r = ScanRegion::new(BlockPos::ORIGIN, radius, ScanShape::Sphere);
            assert_eq!(r.extent(), i32::MAX);
            let (min, max) = r.bounds();
            assert!(min.x <= max.x && min.y <= max.y && min.z <= max.z);
            assert_eq!(r.box_volume(), u64::MAX);
        }
    }

    proptest::proptest! {
        #[test]
        fn up_then_down_is_identity(p: BlockPos) {
            proptest::prop_assert_eq!(p.up().down(), p);
        }

        #[test]
        fn center_is_always_a_member(
            c in proptest::prelude::any::<BlockPos>(),
            shape in proptest::prelude::any::<ScanShape>(),
            radius in 1u32..64
        ) {
            let region = ScanRegion::new(c, radius, shape);
            proptest::prop_assert!(region.contains(c));
        }

        #[test]
        fn shape_token_parses_back(shape: ScanShape) {
            proptest::prop_assert_eq!(ScanShape::parse(shape.as_str()), Some(shape));
        }
    }
}
