//! Light-level classification: ordered rules and the fixed three-band scheme.
#![forbid(unsafe_code)]

mod bands;
mod color;
mod rule;

pub use bands::{BAND_ALPHA, BRIGHT_THRESHOLD, FixedBands};
pub use color::Rgba;
pub use lightlvl_world::LightChannel;
pub use rule::{Comparison, Rule, RuleDef, RuleError, RuleSet};

use lightlvl_geom::BlockPos;
use lightlvl_world::{BlockQuery, QueryError};

/// Maps the light above a floor block to an overlay color.
#[derive(Clone, Debug, PartialEq)]
pub enum Classifier {
    Fixed(FixedBands),
    Rules(RuleSet),
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::Fixed(FixedBands::default())
    }
}

impl Classifier {
    /// Classifies with levels pulled on demand from `level`.
    ///
    /// Rule sets only ask for the channels their rules reference, in rule order,
    /// and stop at the first match.
    pub fn classify_with<E>(
        &self,
        mut level: impl FnMut(LightChannel) -> Result<u8, E>,
    ) -> Result<Rgba, E> {
        match self {
            Classifier::Fixed(bands) => {
                let block = level(LightChannel::Block)?;
                let sun = level(LightChannel::Sun)?;
                Ok(bands.color_for(block, sun))
            }
            Classifier::Rules(rules) => rules.evaluate_with(level),
        }
    }

    /// Classifies the light at `pos`, which is the air block above a floor.
    pub fn classify(&self, world: &dyn BlockQuery, pos: BlockPos) -> Result<Rgba, QueryError> {
        self.classify_with(|channel| world.light_level(pos, channel))
    }

    pub fn is_rule_based(&self) -> bool {
        matches!(self, Classifier::Rules(_))
    }
}
