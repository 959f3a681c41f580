//! Region scan: floor-candidate filtering and light classification.
#![forbid(unsafe_code)]

mod cancel;
mod highlight;
mod settings;


pub use cancel::CancelToken;
pub use highlight::HighlightSet;
pub use settings::{DEFAULT_RADIUS, ScanSettings};

use lightlvl_geom::{BlockPos, ScanRegion};
use lightlvl_world::{BlockQuery, QueryError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("scan pass aborted: {0}")]
    Query(#[from] QueryError),
    #[error("scan pass cancelled")]
    Cancelled,
}

/// True when `pos` is a solid block with a non-solid block directly above it.
///
/// Partial blocks such as slabs count as floor when the host reports them solid.
pub fn is_floor_candidate(world: &dyn BlockQuery, pos: BlockPos) -> Result<bool, QueryError> {
    if world.is_air(pos)? || !world.is_solid(pos)? {
        return Ok(false);
    }
    Ok(!world.is_solid(pos.up())?)
}

/// Runs one pass over the region around `center`.
///
/// Positions are visited x, then y, then z ascending and the set keeps that order.
/// Each entry is a floor block colored by the light one block above it. The first
/// host query error aborts the pass; `cancel` is polled once per x slice.
pub fn scan_region(
    world: &dyn BlockQuery,
    center: BlockPos,
    settings: &ScanSettings,
    cancel: &CancelToken,
) -> Result<HighlightSet, ScanError> {
    let region = settings.region(center);
    let mut out = HighlightSet::new();
    let mut candidates = 0usize;

    for x in region.x_range() {
        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }
        for y in region.y_range() {
            for z in region.z_range() {
                let pos = BlockPos::new(x, y, z);
                if !region.contains(pos) || !is_floor_candidate(world, pos)? {
                    continue;
                }
                candidates += 1;
                let color = settings.classifier.classify(world, pos.up())?;
                if color.is_transparent() && !settings.include_transparent {
                    continue;
                }
                out.push(pos, color);
            }
        }
    }

    log::trace!(
        target: "scan",
        "pass at {} r={} {}: {} candidates, {} visible",
        center,
        settings.radius,
        settings.shape,
        candidates,
        out.visible_count()
    );
    Ok(out)
}

/// Number of positions a pass with these settings examines.
pub fn box_volume(settings: &ScanSettings) -> u64 {
    ScanRegion::new(BlockPos::ORIGIN, settings.radius, settings.shape).box_volume()
}
