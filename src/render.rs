use hashbrown::HashMap;
use lightlvl_geom::BlockPos;
use lightlvl_rules::Rgba;
use lightlvl_runtime::HighlightRenderer;

/// Stand-in for a real overlay renderer: keeps the current set and logs a
/// per-color summary whenever it changes.
#[derive(Debug, Default)]
pub struct LogRenderer {
    shown: Vec<(BlockPos, Rgba)>,
    last_summary: Option<String>,
    pub updates: u64,
}

impl LogRenderer {
    pub fn shown(&self) -> &[(BlockPos, Rgba)] {
        &self.shown
    }
}

impl HighlightRenderer for LogRenderer {
    fn set_highlights(&mut self, owner: u32, positions: &[BlockPos], colors: &[Rgba]) {
        self.updates += 1;
        self.shown = positions.iter().copied().zip(colors.iter().copied()).collect();
        let summary = summarize(colors);
        if self.last_summary.as_deref() == Some(summary.as_str()) {
            log::debug!(target: "overlay", "owner {}: unchanged ({} blocks)", owner, positions.len());
            return;
        }
        log::info!(target: "overlay", "owner {}: {} blocks [{}]", owner, positions.len(), summary);
        self.last_summary = Some(summary);
    }
}

/// Counts per color, ordered by packed value so equal sets summarize equally.
pub fn summarize(colors: &[Rgba]) -> String {
    if colors.is_empty() {
        return "cleared".to_string();
    }
    let mut counts: HashMap<Rgba, usize> = HashMap::new();
    for c in colors {
        *counts.entry(*c).or_insert(0) += 1;
    }
    let mut entries: Vec<(Rgba, usize)> = counts.into_iter().collect();
    entries.sort_by_key(|(c, _)| c.to_packed());
    entries
        .iter()
        .map(|(c, n)| {
            if c.is_transparent() {
                format!("transparent x{n}")
            } else {
                format!("{c} x{n}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
