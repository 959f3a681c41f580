use fastnoise_lite::{FastNoiseLite, NoiseType};
use lightlvl_geom::BlockPos;

use crate::grid::{Block, VoxelGrid};

/// Heightmap terrain with a few roofed overhangs and torches, centered on the origin.
#[derive(Clone, Debug)]
pub struct TerrainParams {
    pub seed: i32,
    /// Loaded columns span `-half_extent..=half_extent` on x and z.
    pub half_extent: i32,
    pub base_height: i32,
    pub amplitude: f32,
    pub frequency: f32,
    /// Roof noise above this value places an overhang slab four blocks over the ground.
    pub overhang_threshold: f32,
    /// Grid spacing for torches; 0 disables them.
    pub torch_spacing: i32,
    pub torch_level: u8,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: 1337,
            half_extent: 48,
            base_height: 64,
            amplitude: 6.0,
            frequency: 0.03,
            overhang_threshold: 0.55,
            torch_spacing: 12,
            torch_level: 14,
        }
    }
}

impl TerrainParams {
    pub fn surface_height(&self, noise: &FastNoiseLite, x: i32, z: i32) -> i32 {
        let h = noise.get_noise_2d(x as f32, z as f32);
        self.base_height + (h * self.amplitude).round() as i32
    }

    fn height_noise(&self) -> FastNoiseLite {
        let mut n = FastNoiseLite::with_seed(self.seed);
        n.set_noise_type(Some(NoiseType::OpenSimplex2));
        n.set_frequency(Some(self.frequency));
        n
    }

    fn roof_noise(&self) -> FastNoiseLite {
        let mut n = FastNoiseLite::with_seed(self.seed ^ 41_337);
        n.set_noise_type(Some(NoiseType::OpenSimplex2));
        n.set_frequency(Some(self.frequency * 2.0));
        n
    }
}

// Cheap per-column hash for decoration placement.
#[inline]
fn column_hash(seed: i32, x: i32, z: i32) -> u32 {
    let mut h = (seed as u32) ^ 0x9E37_79B9;
    h = h.wrapping_mul(31).wrapping_add(x as u32);
    h = h.wrapping_mul(31).wrapping_add(z as u32);
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B_3C6D);
    h ^ (h >> 12)
}

impl VoxelGrid {
    pub fn generate(params: &TerrainParams) -> VoxelGrid {
        let e = params.half_extent.max(1);
        let mut grid = VoxelGrid::new(BlockPos::new(-e, 0, -e), BlockPos::new(e, 0, e));
        let height = params.height_noise();
        let roof = params.roof_noise();
        let floor_y = params.base_height - params.amplitude.ceil() as i32 - 4;

        for x in -e..=e {
            for z in -e..=e {
                let top = params.surface_height(&height, x, z);
                for y in floor_y..=top {
                    grid.set(BlockPos::new(x, y, z), Block::Solid);
                }
                if column_hash(params.seed, x, z) % 7 == 0 {
                    grid.set(BlockPos::new(x, top + 1, z), Block::Foliage);
                }
                if roof.get_noise_2d(x as f32, z as f32) > params.overhang_threshold {
                    grid.set(BlockPos::new(x, top + 5, z), Block::Solid);
                }
            }
        }

        if params.torch_spacing > 0 {
            let s = params.torch_spacing;
            let first = -e + s / 2;
            let mut x = first;
            while x <= e {
                let mut z = first;
                while z <= e {
                    let top = params.surface_height(&height, x, z);
                    grid.add_torch(BlockPos::new(x, top + 1, z), params.torch_level);
                    z += s;
                }
                x += s;
            }
        }
        grid
    }
}
