//! File Watcher (spec.md §4.A) — observes a rooted directory tree and
//! delivers create/modify/delete events filtered by extension.
//!
//! Grounded on the only filesystem-watching idiom present in the retrieval
//! pack: `notify::recommended_watcher` bridged to a drain loop, rather than
//! a bare poll loop. `.git` and `target` directories are pruned; files not
//! matching one of the configured extensions are suppressed before the
//! callback ever sees them.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use genai_core::{FileEvent, FileEventKind};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(500);
const PRUNED_DIRS: [&str; 2] = [".git", "target"];

/// Observes a directory tree on a dedicated worker thread and forwards
/// matching events to a callback. `start`/`stop` are idempotent; a second
/// `start` while already running replaces the prior watch.
pub struct FileWatcher {
    handle: std::sync::Mutex<Option<RunningWatch>>,
}

struct RunningWatch {
    _watcher: RecommendedWatcher,
    stop_flag: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Default for FileWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FileWatcher {
    pub fn new() -> Self {
        Self {
            handle: std::sync::Mutex::new(None),
        }
    }

    /// Begin observation. A missing `root` is logged and the watcher stays
    /// inert (no retry), per spec.md §4.A's failure semantics.
    pub fn start<F>(&self, root: impl AsRef<Path>, extensions: Vec<String>, callback: F)
    where
        F: Fn(FileEvent) + Send + Sync + 'static,
    {
        let root = root.as_ref().to_path_buf();
        if !root.exists() {
            tracing::warn!(path = %root.display(), "watch root does not exist, watcher stays inert");
            return;
        }

        self.stop();

        let (tx, rx) = std_mpsc::channel::<notify::Result<notify::Event>>();
        let mut watcher = match notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        }) {
            Ok(w) => w,
            Err(e) => {
                tracing::warn!(error = %e, "failed to create filesystem watcher");
                return;
            }
        };

        if let Err(e) = watcher.watch(&root, RecursiveMode::Recursive) {
            tracing::warn!(path = %root.display(), error = %e, "failed to start watching");
            return;
        }

        let stop_flag = Arc::new(AtomicBool::new(false));
        let thread_stop_flag = stop_flag.clone();
        let thread = std::thread::spawn(move || {
            drain_loop(rx, thread_stop_flag, extensions, callback);
        });

        *self.handle.lock().expect("watcher mutex poisoned") = Some(RunningWatch {
            _watcher: watcher,
            stop_flag,
            thread: Some(thread),
        });
    }

    /// Idempotent teardown. Safe to call whether or not a watch is active.
    pub fn stop(&self) {
        let running = self.handle.lock().expect("watcher mutex poisoned").take();
        if let Some(mut running) = running {
            running.stop_flag.store(true, Ordering::SeqCst);
            if let Some(thread) = running.thread.take() {
                let _ = thread.join();
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.lock().expect("watcher mutex poisoned").is_some()
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn drain_loop<F>(
    rx: std_mpsc::Receiver<notify::Result<notify::Event>>,
    stop_flag: Arc<AtomicBool>,
    extensions: Vec<String>,
    callback: F,
) where
    F: Fn(FileEvent) + Send + Sync + 'static,
{
    while !stop_flag.load(Ordering::SeqCst) {
        match rx.recv_timeout(DRAIN_POLL_INTERVAL) {
            Ok(Ok(event)) => {
                for file_event in translate(event, &extensions) {
                    callback(file_event);
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "filesystem watch I/O error");
            }
            Err(std_mpsc::RecvTimeoutError::Timeout) => continue,
            Err(std_mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn translate(event: notify::Event, extensions: &[String]) -> Vec<FileEvent> {
    let kind = match event.kind {
        EventKind::Create(_) => FileEventKind::Created,
        EventKind::Modify(_) => FileEventKind::Modified,
        EventKind::Remove(_) => FileEventKind::Deleted,
        _ => return Vec::new(),
    };

    event
        .paths
        .into_iter()
        .filter(|p| !is_pruned(p))
        .filter(|p| matches_extension(p, extensions))
        .map(|path| FileEvent { path, kind })
        .collect()
}

fn is_pruned(path: &Path) -> bool {
    path.components().any(|c| {
        let s = c.as_os_str().to_string_lossy();
        PRUNED_DIRS.contains(&s.as_ref())
    })
}

fn matches_extension(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    path.extension()
        .map(|ext| extensions.iter().any(|allowed| allowed.trim_start_matches('.') == ext))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prunes_git_and_target_directories() {
        assert!(is_pruned(Path::new("/base/.git/HEAD")));
        assert!(is_pruned(Path::new("/base/target/debug/foo")));
        assert!(!is_pruned(Path::new("/base/agents/summarizer.yaml")));
    }

    #[test]
    fn filters_by_extension() {
        let exts = vec!["yaml".to_string(), "md".to_string()];
        assert!(matches_extension(Path::new("agent.yaml"), &exts));
        assert!(matches_extension(Path::new("prompt.md"), &exts));
        assert!(!matches_extension(Path::new("notes.txt"), &exts));
    }

    #[test]
    fn start_on_missing_root_stays_inert() {
        let watcher = FileWatcher::new();
        watcher.start("/does/not/exist/anywhere", vec!["yaml".to_string()], |_| {});
        assert!(!watcher.is_running());
    }

    #[test]
    fn stop_is_idempotent() {
        let watcher = FileWatcher::new();
        watcher.stop();
        watcher.stop();
        assert!(!watcher.is_running());
    }
}
