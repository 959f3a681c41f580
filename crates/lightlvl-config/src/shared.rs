use std::sync::Arc;

use arc_swap::ArcSwap;
use lightlvl_scan::ScanSettings;

/// Copy-on-write settings snapshot.
///
/// The command side publishes whole new values; the scan loop loads one `Arc`
/// per pass and keeps using it even if a newer value lands mid-pass.
#[derive(Clone, Debug)]
pub struct SharedSettings {
    inner: Arc<ArcSwap<ScanSettings>>,
}

impl SharedSettings {
    pub fn new(settings: ScanSettings) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(settings)),
        }
    }

    pub fn load(&self) -> Arc<ScanSettings> {
        self.inner.load_full()
    }

    pub fn publish(&self, settings: ScanSettings) {
        self.inner.store(Arc::new(settings));
    }
}

impl Default for SharedSettings {
    fn default() -> Self {
        Self::new(ScanSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightlvl_geom::ScanShape;

    #[test]
    fn held_snapshot_survives_publish() {
        let shared = SharedSettings::default();
        let before = shared.load();
        let mut next = (*before).clone();
        next.radius = 3;
        next.shape = ScanShape::Cube;
        shared.publish(next);
        assert_eq!(before.radius, lightlvl_scan::DEFAULT_RADIUS);
        assert_eq!(shared.load().radius, 3);
        assert_eq!(shared.clone().load().shape, ScanShape::Cube);
    }
}
