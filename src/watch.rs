use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crossbeam_channel::{Receiver, unbounded};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Watches the settings file's directory and flags changes to that one file.
///
/// Editors often replace files instead of writing in place, so the parent
/// directory is watched rather than the file itself.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<()>,
}

impl ConfigWatcher {
    pub fn new(path: &Path) -> notify::Result<Self> {
        let file_name: Option<OsString> = path.file_name().map(|n| n.to_os_string());
        let dir = match path.parent() {
            Some(d) if !d.as_os_str().is_empty() => d.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let (tx, rx) = unbounded();
        let mut watcher =
            notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                let Ok(event) = res else {
                    return;
                };
                match event.kind {
                    EventKind::Modify(_)
                    | EventKind::Create(_)
                    | EventKind::Remove(_)
                    | EventKind::Any => {
                        if event
                            .paths
                            .iter()
                            .any(|p| p.file_name() == file_name.as_deref())
                        {
                            let _ = tx.send(());
                        }
                    }
                    _ => {}
                }
            })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        log::info!("watching {} for settings changes", path.display());
        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// True if the file changed since the last call. Bursts collapse into one.
    pub fn changed(&self) -> bool {
        self.rx.try_iter().count() > 0
    }
}
