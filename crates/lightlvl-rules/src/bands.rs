use crate::color::Rgba;

/// Level at or above which a channel counts as bright.
pub const BRIGHT_THRESHOLD: u8 = 8;
pub const BAND_ALPHA: u8 = 32;

const YELLOW: Rgba = Rgba::new(255, 255, 0, BAND_ALPHA);
const CYAN: Rgba = Rgba::new(0, 255, 255, BAND_ALPHA);
const RED: Rgba = Rgba::new(255, 0, 0, BAND_ALPHA);
const BLUE: Rgba = Rgba::new(0, 0, 255, BAND_ALPHA);

/// Dark / dim / lit scheme used when no rule list is configured.
///
/// Color contrast mode swaps red for blue and yellow for cyan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedBands {
    pub color_contrast: bool,
}

impl FixedBands {
    pub const fn new(color_contrast: bool) -> Self {
        Self { color_contrast }
    }

    pub fn color_for(&self, block: u8, sun: u8) -> Rgba {
        let block_lit = block >= BRIGHT_THRESHOLD;
        let sun_lit = sun >= BRIGHT_THRESHOLD;
        match (block_lit, sun_lit) {
            (true, true) => Rgba::TRANSPARENT,
            // Only sun keeps it safe: spawnable at night.
            (false, true) => self.dim(),
            (false, false) => self.dark(),
            // Block light without sun light does not happen with real lighting.
            (true, false) => Rgba::TRANSPARENT,
        }
    }

    #[inline]
    pub fn dim(&self) -> Rgba {
        if self.color_contrast { CYAN } else { YELLOW }
    }

    #[inline]
    pub fn dark(&self) -> Rgba {
        if self.color_contrast { BLUE } else { RED }
    }
}
