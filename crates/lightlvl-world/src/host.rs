use std::fmt;
use std::sync::Mutex;

use lightlvl_geom::BlockPos;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Independent illumination channels a host computes per position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightChannel {
    Block,
    Sun,
}

impl LightChannel {
    /// Case-insensitive token match (`"Block"`, `"sun"`, ...).
    pub fn parse(token: &str) -> Option<LightChannel> {
        let token = token.trim();
        if token.eq_ignore_ascii_case("block") {
            Some(LightChannel::Block)
        } else if token.eq_ignore_ascii_case("sun") {
            Some(LightChannel::Sun)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LightChannel::Block => "Block",
            LightChannel::Sun => "Sun",
        }
    }
}

impl fmt::Display for LightChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("block data at {pos} is not loaded")]
    Unloaded { pos: BlockPos },
    #[error("host data unavailable: {0}")]
    Unavailable(String),
}

/// Synchronous world queries, callable from the scan thread.
pub trait BlockQuery: Send + Sync {
    fn is_air(&self, pos: BlockPos) -> Result<bool, QueryError>;

    /// True when the block has collision geometry.
    fn is_solid(&self, pos: BlockPos) -> Result<bool, QueryError>;

    fn light_level(&self, pos: BlockPos, channel: LightChannel) -> Result<u8, QueryError>;
}

pub trait PlayerSource: Send + Sync {
    /// Block containing the player's feet.
    fn feet_block_pos(&self) -> Result<BlockPos, QueryError>;
}

impl<T: BlockQuery + ?Sized> BlockQuery for std::sync::Arc<T> {
    fn is_air(&self, pos: BlockPos) -> Result<bool, QueryError> {
        (**self).is_air(pos)
    }

    fn is_solid(&self, pos: BlockPos) -> Result<bool, QueryError> {
        (**self).is_solid(pos)
    }

    fn light_level(&self, pos: BlockPos, channel: LightChannel) -> Result<u8, QueryError> {
        (**self).light_level(pos, channel)
    }
}

/// Player position written by the main thread and read once per scan pass.
#[derive(Debug, Default)]
pub struct SharedPlayer {
    feet: Mutex<[f64; 3]>,
}

impl SharedPlayer {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            feet: Mutex::new([x, y, z]),
        }
    }

    pub fn set_feet(&self, x: f64, y: f64, z: f64) {
        match self.feet.lock() {
            Ok(mut g) => *g = [x, y, z],
            Err(poisoned) => *poisoned.into_inner() = [x, y, z],
        }
    }

    pub fn feet(&self) -> [f64; 3] {
        match self.feet.lock() {
            Ok(g) => *g,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

impl PlayerSource for SharedPlayer {
    fn feet_block_pos(&self) -> Result<BlockPos, QueryError> {
        let [x, y, z] = self.feet();
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return Err(QueryError::Unavailable("player position is not finite".into()));
        }
        Ok(BlockPos::from_feet(x, y, z))
    }
}
