use hashbrown::HashMap;
use lightlvl_geom::BlockPos;

use crate::host::{BlockQuery, LightChannel, QueryError};

pub const MAX_LIGHT: u8 = 15;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Block {
    #[default]
    Air,
    /// Full collision geometry (stone, dirt, planks).
    Solid,
    /// Present but walk-through (tall grass, flowers).
    Foliage,
}

impl Block {
    #[inline]
    pub fn is_air(self) -> bool {
        matches!(self, Block::Air)
    }

    #[inline]
    pub fn is_solid(self) -> bool {
        matches!(self, Block::Solid)
    }
}

/// Sparse block storage over a rectangle of loaded columns.
///
/// Columns outside `[min_x, max_x] x [min_z, max_z]` behave like unloaded
/// chunks and fail every query. Inside, any y is answerable; unset blocks are air.
/// Sun light is full above the highest solid block of a column and zero below it;
/// block light falls off by one level per block of manhattan distance from each torch.
#[derive(Clone, Debug)]
pub struct VoxelGrid {
    min_x: i32,
    max_x: i32,
    min_z: i32,
    max_z: i32,
    blocks: HashMap<BlockPos, Block>,
    column_tops: HashMap<(i32, i32), i32>,
    torches: Vec<(BlockPos, u8)>,
    light_overrides: HashMap<(BlockPos, LightChannel), u8>,
}

impl VoxelGrid {
    /// Grid with loaded columns spanning the x/z of the two corners, inclusive.
    pub fn new(a: BlockPos, b: BlockPos) -> Self {
        Self {
            min_x: a.x.min(b.x),
            max_x: a.x.max(b.x),
            min_z: a.z.min(b.z),
            max_z: a.z.max(b.z),
            blocks: HashMap::new(),
            column_tops: HashMap::new(),
            torches: Vec::new(),
            light_overrides: HashMap::new(),
        }
    }

    #[inline]
    pub fn is_loaded(&self, pos: BlockPos) -> bool {
        (self.min_x..=self.max_x).contains(&pos.x) && (self.min_z..=self.max_z).contains(&pos.z)
    }

    #[inline]
    fn check_loaded(&self, pos: BlockPos) -> Result<(), QueryError> {
        if self.is_loaded(pos) {
            Ok(())
        } else {
            Err(QueryError::Unloaded { pos })
        }
    }

    pub fn get(&self, pos: BlockPos) -> Block {
        self.blocks.get(&pos).copied().unwrap_or_default()
    }

    /// Writes outside the loaded columns are ignored.
    pub fn set(&mut self, pos: BlockPos, block: Block) {
        if !self.is_loaded(pos) {
            return;
        }
        let prev = (if block.is_air() {
            self.blocks.remove(&pos)
        } else {
            self.blocks.insert(pos, block)
        })
        .unwrap_or_default();

        let key = (pos.x, pos.z);
        if block.is_solid() {
            let top = self.column_tops.entry(key).or_insert(pos.y);
            *top = (*top).max(pos.y);
        } else if prev.is_solid() && self.column_tops.get(&key) == Some(&pos.y) {
            self.recompute_column_top(key);
        }
    }

    /// Fills the inclusive box between two corners.
    pub fn fill(&mut self, a: BlockPos, b: BlockPos, block: Block) {
        for x in a.x.min(b.x)..=a.x.max(b.x) {
            for y in a.y.min(b.y)..=a.y.max(b.y) {
                for z in a.z.min(b.z)..=a.z.max(b.z) {
                    self.set(BlockPos::new(x, y, z), block);
                }
            }
        }
    }

    fn recompute_column_top(&mut self, key: (i32, i32)) {
        let top = self
            .blocks
            .iter()
            .filter(|(p, b)| p.x == key.0 && p.z == key.1 && b.is_solid())
            .map(|(p, _)| p.y)
            .max();
        match top {
            Some(y) => {
                self.column_tops.insert(key, y);
            }
            None => {
                self.column_tops.remove(&key);
            }
        }
    }

    pub fn column_top(&self, x: i32, z: i32) -> Option<i32> {
        self.column_tops.get(&(x, z)).copied()
    }

    pub fn add_torch(&mut self, pos: BlockPos, level: u8) {
        self.torches.push((pos, level.min(MAX_LIGHT)));
    }

    /// Pins a channel's level at one position, bypassing the computed value.
    pub fn set_light(&mut self, pos: BlockPos, channel: LightChannel, level: u8) {
        self.light_overrides.insert((pos, channel), level);
    }

    pub fn solid_count(&self) -> usize {
        self.blocks.values().filter(|b| b.is_solid()).count()
    }

    fn computed_sun(&self, pos: BlockPos) -> u8 {
        match self.column_top(pos.x, pos.z) {
            Some(top) if pos.y <= top => 0,
            _ => MAX_LIGHT,
        }
    }

    fn computed_block(&self, pos: BlockPos) -> u8 {
        self.torches
            .iter()
            .map(|(t, level)| {
                let d = (t.x - pos.x).unsigned_abs()
                    + (t.y - pos.y).unsigned_abs()
                    + (t.z - pos.z).unsigned_abs();
                u32::from(*level).saturating_sub(d) as u8
            })
            .max()
            .unwrap_or(0)
    }
}

impl BlockQuery for VoxelGrid {
    fn is_air(&self, pos: BlockPos) -> Result<bool, QueryError> {
        self.check_loaded(pos)?;
        Ok(self.get(pos).is_air())
    }

    fn is_solid(&self, pos: BlockPos) -> Result<bool, QueryError> {
        self.check_loaded(pos)?;
        Ok(self.get(pos).is_solid())
    }

    fn light_level(&self, pos: BlockPos, channel: LightChannel) -> Result<u8, QueryError> {
        self.check_loaded(pos)?;
        if let Some(level) = self.light_overrides.get(&(pos, channel)) {
            return Ok(*level);
        }
        Ok(match channel {
            LightChannel::Sun => self.computed_sun(pos),
            LightChannel::Block => self.computed_block(pos),
        })
    }
}
