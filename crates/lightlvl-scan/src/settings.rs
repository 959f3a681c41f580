use lightlvl_geom::{BlockPos, MAX_RADIUS, ScanRegion, ScanShape};
use lightlvl_rules::{Classifier, FixedBands};

pub const DEFAULT_RADIUS: u32 = 32;

/// Everything one pass needs besides the world. Immutable once published.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanSettings {
    pub radius: u32,
    pub shape: ScanShape,
    pub classifier: Classifier,
    /// Also list floor blocks that classify as transparent. Off by default, so
    /// only colored floors enter the set.
    pub include_transparent: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            shape: ScanShape::Sphere,
            classifier: Classifier::Fixed(FixedBands::default()),
            include_transparent: false,
        }
    }
}

impl ScanSettings {
    /// Radius is clamped to `1..=MAX_RADIUS`.
    pub fn new(radius: u32, shape: ScanShape, classifier: Classifier) -> Self {
        Self {
            radius: radius.clamp(1, MAX_RADIUS),
            shape,
            classifier,
            include_transparent: false,
        }
    }

    pub fn with_include_transparent(mut self, include: bool) -> Self {
        self.include_transparent = include;
        self
    }

    pub fn region(&self, center: BlockPos) -> ScanRegion {
        ScanRegion::new(center, self.radius.clamp(1, MAX_RADIUS), self.shape)
    }
}
