//! Watch mode.
//!
//! Polls the input workbook and re-runs the dashboard pipeline whenever
//! the file is created or replaced, until shutdown is requested.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{debug, error, info};

/// Identity of one version of the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl FileStamp {
    /// Stamp of the file at `path`, or `None` when it does not exist.
    pub fn read(path: &Path) -> Option<Self> {
        let metadata = std::fs::metadata(path).ok()?;
        Some(Self {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

/// What a poll observed compared to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
    /// The file appeared or changed; render it.
    Changed,
    /// The file is unchanged since the last render.
    Unchanged,
    /// No file yet (or it was removed); wait for one.
    Waiting,
}

/// Tracks the last rendered version of the input file.
#[derive(Debug, Default)]
pub struct WatchState {
    last: Option<FileStamp>,
}

impl WatchState {
    pub fn observe(&mut self, current: Option<FileStamp>) -> WatchEvent {
        match current {
            None => {
                self.last = None;
                WatchEvent::Waiting
            }
            Some(stamp) if self.last == Some(stamp) => WatchEvent::Unchanged,
            Some(stamp) => {
                self.last = Some(stamp);
                WatchEvent::Changed
            }
        }
    }
}

fn waiting_spinner(input: &Path) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!(
        "Waiting for {} (upload a workbook to start, Ctrl-C to stop)",
        input.display()
    ));
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Re-run `render` every time `input` changes, until `shutdown` resolves.
///
/// A failed render is logged and the loop keeps waiting for the next
/// version of the file. Returns the number of render attempts.
pub async fn watch<F, S>(
    input: &Path,
    interval: Duration,
    show_progress: bool,
    shutdown: S,
    mut render: F,
) -> Result<usize>
where
    F: FnMut(&Path) -> Result<()>,
    S: Future<Output = ()>,
{
    info!(
        "Watching {} every {}ms",
        input.display(),
        interval.as_millis()
    );

    let mut state = WatchState::default();
    let mut ticker = tokio::time::interval(interval);
    let mut spinner: Option<ProgressBar> = None;
    let mut renders = 0usize;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                debug!("Shutdown requested");
                break;
            }
            _ = ticker.tick() => {
                match state.observe(FileStamp::read(input)) {
                    WatchEvent::Waiting => {
                        if show_progress && spinner.is_none() {
                            spinner = Some(waiting_spinner(input));
                        }
                    }
                    WatchEvent::Unchanged => {}
                    WatchEvent::Changed => {
                        if let Some(s) = spinner.take() {
                            s.finish_and_clear();
                        }
                        renders += 1;
                        info!("Input changed, rendering pass {}", renders);
                        if let Err(e) = render(input) {
                            error!("Render failed: {:#}", e);
                            eprintln!("❌ Error: {:#}", e);
                        }
                    }
                }
            }
        }
    }

    if let Some(s) = spinner.take() {
        s.finish_and_clear();
    }

    Ok(renders)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp(len: u64) -> Option<FileStamp> {
        Some(FileStamp {
            modified: None,
            len,
        })
    }

    #[test]
    fn test_watch_state_transitions() {
        let mut state = WatchState::default();

        assert_eq!(state.observe(None), WatchEvent::Waiting);
        assert_eq!(state.observe(stamp(10)), WatchEvent::Changed);
        assert_eq!(state.observe(stamp(10)), WatchEvent::Unchanged);
        assert_eq!(state.observe(stamp(12)), WatchEvent::Changed);
        assert_eq!(state.observe(None), WatchEvent::Waiting);
        // A re-created file renders again even if identical.
        assert_eq!(state.observe(stamp(12)), WatchEvent::Changed);
    }

    #[test]
    fn test_file_stamp_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileStamp::read(&dir.path().join("absent.xlsx")).is_none());
    }

    #[tokio::test]
    async fn test_watch_renders_existing_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("kpi.xlsx");
        std::fs::write(&input, b"placeholder").unwrap();

        let mut seen = Vec::new();
        let renders = watch(
            &input,
            Duration::from_millis(10),
            false,
            tokio::time::sleep(Duration::from_millis(100)),
            |path| {
                seen.push(path.to_path_buf());
                Ok(())
            },
        )
        .await
        .unwrap();

        assert_eq!(renders, 1);
        assert_eq!(seen, vec![input]);
    }

    #[tokio::test]
    async fn test_watch_survives_render_errors() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("kpi.xlsx");
        std::fs::write(&input, b"placeholder").unwrap();

        let renders = watch(
            &input,
            Duration::from_millis(10),
            false,
            tokio::time::sleep(Duration::from_millis(60)),
            |_| anyhow::bail!("missing required columns: role"),
        )
        .await
        .unwrap();

        assert_eq!(renders, 1);
    }

    #[tokio::test]
    async fn test_watch_waits_without_file() {
        let dir = tempfile::tempdir().unwrap();

        let renders = watch(
            &dir.path().join("kpi.xlsx"),
            Duration::from_millis(10),
            false,
            tokio::time::sleep(Duration::from_millis(50)),
            |_| Ok(()),
        )
        .await
        .unwrap();

        assert_eq!(renders, 0);
    }
}
