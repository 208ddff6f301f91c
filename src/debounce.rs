//! Folder watching and trailing-edge debounce of new executables.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::future::Future;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Coalesces bursts of "executable created" events into one callback.
///
/// Every matching event restarts the countdown, so the callback fires once
/// `delay` has passed with no further matches. A steady stream of matches
/// postpones it indefinitely.
pub(crate) struct Debouncer {
    executable_name: String,
    pending: Arc<AtomicBool>,
    tx: mpsc::UnboundedSender<()>,
    task: JoinHandle<()>,
}

impl Debouncer {
    /// Start the timer task on the current tokio runtime.
    ///
    /// `on_elapsed` runs as its own task so that tearing the debouncer down
    /// never cancels a rescan it already started.
    pub(crate) fn spawn<F, Fut>(delay: Duration, executable_name: String, on_elapsed: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(run_timer(rx, Arc::clone(&pending), delay, on_elapsed));
        Self {
            executable_name,
            pending,
            tx,
            task,
        }
    }

    /// Feed one created path. Non-matching names are ignored.
    ///
    /// Safe to call from any thread, including after the timer task ended.
    pub(crate) fn file_created(&self, path: &Path) {
        let matches = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().eq_ignore_ascii_case(&self.executable_name));
        if !matches {
            return;
        }

        trace!(path = %path.display(), "new executable seen");
        self.pending.store(true, Ordering::Release);
        if self.tx.send(()).is_err() {
            trace!("debounce timer already stopped, event discarded");
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_timer<F, Fut>(
    mut rx: mpsc::UnboundedReceiver<()>,
    pending: Arc<AtomicBool>,
    delay: Duration,
    on_elapsed: F,
) where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    while rx.recv().await.is_some() {
        loop {
            tokio::select! {
                next = rx.recv() => {
                    if next.is_none() {
                        return;
                    }
                }
                () = tokio::time::sleep(delay) => break,
            }
        }

        if pending.swap(false, Ordering::AcqRel) {
            debug!("debounce elapsed, starting rescan");
            tokio::spawn(on_elapsed());
        }
    }
}

/// Recursive watch on a workspace root feeding a [`Debouncer`].
///
/// Dropping it stops the watch and the timer together.
pub(crate) struct FolderWatch {
    debouncer: Arc<Debouncer>,
    watcher: Option<RecommendedWatcher>,
}

impl FolderWatch {
    /// Watch `root`. If the watch cannot be set up the debouncer is still
    /// kept, only automatic rescans on new executables are lost.
    pub(crate) fn start(root: &Path, debouncer: Debouncer) -> Self {
        let debouncer = Arc::new(debouncer);
        let watcher = match watch_root(root, Arc::downgrade(&debouncer)) {
            Ok(w) => Some(w),
            Err(e) => {
                warn!(root = %root.display(), error = %e, "cannot watch workspace folder");
                None
            }
        };
        Self { debouncer, watcher }
    }

    pub(crate) fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Feed a creation event that did not come from the watch itself.
    pub(crate) fn file_created(&self, path: &Path) {
        self.debouncer.file_created(path);
    }
}

fn watch_root(root: &Path, sink: Weak<Debouncer>) -> notify::Result<RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let event = match res {
            Ok(event) => event,
            Err(e) => {
                debug!(error = %e, "watch error");
                return;
            }
        };
        if !matches!(event.kind, EventKind::Create(_)) {
            return;
        }
        let Some(debouncer) = sink.upgrade() else {
            trace!("watch event after teardown, discarded");
            return;
        };
        for path in &event.paths {
            debouncer.file_created(path);
        }
    })?;
    watcher.watch(root, RecursiveMode::Recursive)?;
    Ok(watcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_debouncer(delay: Duration) -> (Debouncer, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let debouncer = Debouncer::spawn(delay, "python".to_string(), move || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });
        (debouncer, count)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_event_fires_after_delay() {
        let (debouncer, count) = counting_debouncer(ms(1000));
        debouncer.file_created(Path::new("/ws/env/bin/python"));

        tokio::time::sleep(ms(900)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(ms(200)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_coalesces_into_one_call() {
        let (debouncer, count) = counting_debouncer(ms(1000));
        for _ in 0..5 {
            debouncer.file_created(Path::new("/ws/env/bin/PYTHON"));
            tokio::time::sleep(ms(200)).await;
        }

        // last event at t=800, so nothing before t=1800
        tokio::time::sleep(ms(700)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(ms(200)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::sleep(ms(5000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_fire_separately() {
        let (debouncer, count) = counting_debouncer(ms(1000));
        debouncer.file_created(Path::new("/ws/a/python"));
        tokio::time::sleep(ms(1500)).await;
        debouncer.file_created(Path::new("/ws/b/python"));
        tokio::time::sleep(ms(1500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_matching_names_ignored() {
        let (debouncer, count) = counting_debouncer(ms(1000));
        debouncer.file_created(Path::new("/ws/env/bin/pythonw"));
        debouncer.file_created(Path::new("/ws/README.md"));
        tokio::time::sleep(ms(3000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_debouncer_never_fires() {
        let (debouncer, count) = counting_debouncer(ms(1000));
        debouncer.file_created(Path::new("/ws/env/python"));
        drop(debouncer);
        tokio::time::sleep(ms(3000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_watch_on_missing_root_is_swallowed() {
        let (debouncer, _count) = counting_debouncer(ms(10));
        let watch = FolderWatch::start(Path::new("/nonexistent/workspace/root"), debouncer);
        assert!(!watch.is_watching());
        // debouncer still usable
        watch.file_created(Path::new("/x/python"));
    }
}
