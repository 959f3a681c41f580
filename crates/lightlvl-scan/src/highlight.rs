use lightlvl_geom::BlockPos;
use lightlvl_rules::Rgba;

/// Positions paired with overlay colors, in scan order. Empty clears the overlay.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighlightSet {
    positions: Vec<BlockPos>,
    colors: Vec<Rgba>,
}

impl HighlightSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pos: BlockPos, color: Rgba) {
        self.positions.push(pos);
        self.colors.push(color);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[BlockPos] {
        &self.positions
    }

    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    pub fn iter(&self) -> impl Iterator<Item = (BlockPos, Rgba)> + '_ {
        self.positions.iter().copied().zip(self.colors.iter().copied())
    }

    pub fn color_at(&self, pos: BlockPos) -> Option<Rgba> {
        self.iter().find(|(p, _)| *p == pos).map(|(_, c)| c)
    }

    /// Entries that actually draw something.
    pub fn visible_count(&self) -> usize {
        self.colors.iter().filter(|c| !c.is_transparent()).count()
    }
}

impl FromIterator<(BlockPos, Rgba)> for HighlightSet {
    fn from_iter<I: IntoIterator<Item = (BlockPos, Rgba)>>(iter: I) -> Self {
        let mut set = HighlightSet::new();
        for (p, c) in iter {
            set.push(p, c);
        }
        set
    }
}
