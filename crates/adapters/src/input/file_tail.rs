// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wildcard file tailer (spec §4.4.1): the hardest input. Runs on a
//! dedicated blocking thread since its state machine is inherently
//! synchronous file I/O driven by filesystem-watch callbacks, the same way
//! the teacher's `agent::watcher` bridges a `notify` callback onto a
//! channel rather than polling.

use crate::emitter::Emitter;
use crate::input::InputHandle;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

const READ_CHUNK: usize = 8192;
const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
pub struct FileTailConfig {
    /// Absolute glob patterns (wildcards `*`, `?`).
    pub patterns: Vec<String>,
}

struct TailedFile {
    path: PathBuf,
    file: File,
    position: u64,
    inode: u64,
    size: u64,
    partial: String,
}

impl TailedFile {
    fn open(path: &Path, seek_to_end: bool) -> std::io::Result<Self> {
        let mut file = File::open(path)?;
        let meta = file.metadata()?;
        let position = if seek_to_end {
            file.seek(SeekFrom::End(0))?
        } else {
            0
        };
        Ok(Self {
            path: path.to_path_buf(),
            file,
            position,
            inode: meta.ino(),
            size: meta.len(),
            partial: String::new(),
        })
    }
}

/// Starts the tailer on a blocking thread. `stop()` signals the thread to
/// exit at the next poll tick.
pub fn spawn(config: FileTailConfig, emitter: Emitter) -> InputHandle {
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let join = tokio::task::spawn_blocking(move || run(config, emitter, shutdown_rx));
    InputHandle::new(shutdown_tx, join)
}

fn run(config: FileTailConfig, emitter: Emitter, mut shutdown_rx: tokio::sync::oneshot::Receiver<()>) {
    let (event_tx, event_rx) = mpsc::channel::<notify::Event>();

    let mut files: HashMap<PathBuf, TailedFile> = HashMap::new();
    let mut file_watchers: Vec<RecommendedWatcher> = Vec::new();
    let mut dir_watchers: HashMap<PathBuf, RecommendedWatcher> = HashMap::new();

    for path in discover(&config.patterns) {
        if let Ok(tf) = TailedFile::open(&path, true) {
            if let Some(w) = watch(&path, &event_tx) {
                file_watchers.push(w);
            }
            files.insert(path, tf);
        }
    }
    for dir in directories_of(&config.patterns) {
        if let Some(w) = watch(&dir, &event_tx) {
            dir_watchers.insert(dir, w);
        }
    }

    loop {
        if shutdown_rx.try_recv().is_ok() {
            break;
        }
        match event_rx.recv_timeout(POLL_INTERVAL) {
            Ok(event) => {
                for path in &event.paths {
                    if dir_watchers.contains_key(path.as_path()) || path.is_dir() {
                        rediscover(&config, &mut files, &mut file_watchers, &event_tx, &emitter);
                    } else if let Some(tf) = files.get_mut(path) {
                        handle_file_event(tf, &emitter);
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn handle_file_event(tf: &mut TailedFile, emitter: &Emitter) {
    let meta = match std::fs::metadata(&tf.path) {
        Ok(meta) => meta,
        Err(_) => return, // removed; directory watch will reconcile
    };
    let (new_size, new_inode) = (meta.len(), meta.ino());

    let rotated = new_size < tf.size || new_inode != tf.inode;
    if rotated {
        drain(tf, emitter);
        if !tf.partial.is_empty() {
            emitter.emit_text(std::mem::take(&mut tf.partial));
        }
        if let Ok(mut fresh) = File::open(&tf.path) {
            let _ = fresh.seek(SeekFrom::Start(0));
            tf.file = fresh;
            tf.position = 0;
            tf.inode = new_inode;
            tf.size = 0;
        }
    }

    drain(tf, emitter);
    tf.size = new_size;
}

/// Reads whatever is newly available, splits on `\n`, emits complete
/// lines, and retains a trailing partial line in the buffer.
fn drain(tf: &mut TailedFile, emitter: &Emitter) {
    loop {
        let mut chunk = [0u8; READ_CHUNK];
        let n = match tf.file.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(_) => break,
        };
        tf.position += n as u64;
        tf.partial.push_str(&String::from_utf8_lossy(&chunk[..n]));

        while let Some(pos) = tf.partial.find('\n') {
            let line = tf.partial[..pos].to_string();
            tf.partial.drain(..=pos);
            emitter.emit_text(line);
        }
    }
}

fn rediscover(
    config: &FileTailConfig,
    files: &mut HashMap<PathBuf, TailedFile>,
    file_watchers: &mut Vec<RecommendedWatcher>,
    event_tx: &mpsc::Sender<notify::Event>,
    emitter: &Emitter,
) {
    let matched: Vec<PathBuf> = discover(&config.patterns);

    let gone: Vec<PathBuf> = files.keys().filter(|p| !matched.contains(p)).cloned().collect();
    for path in gone {
        files.remove(&path);
    }

    for path in matched {
        if files.contains_key(&path) {
            continue;
        }
        // Discovered after startup: opened at offset zero (spec §4.4.1
        // "Startup policy").
        if let Ok(tf) = TailedFile::open(&path, false) {
            if let Some(w) = watch(&path, event_tx) {
                file_watchers.push(w);
            }
            files.insert(path, tf);
        }
    }

    // A freshly (re)discovered file may already have content from before
    // the watch was installed; drain it immediately.
    for tf in files.values_mut() {
        drain(tf, emitter);
    }
}

fn watch(path: &Path, tx: &mpsc::Sender<notify::Event>) -> Option<RecommendedWatcher> {
    let tx = tx.clone();
    let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })
    .ok()?;
    watcher.watch(path, RecursiveMode::NonRecursive).ok()?;
    Some(watcher)
}

fn discover(patterns: &[String]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for pattern in patterns {
        if let Ok(entries) = glob::glob(pattern) {
            for entry in entries.flatten() {
                if entry.is_file() && !out.contains(&entry) {
                    out.push(entry);
                }
            }
        }
    }
    out
}

/// Parent directory of each pattern's literal (non-wildcard) prefix.
fn directories_of(patterns: &[String]) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        let mut literal = PathBuf::new();
        for component in path.components() {
            let piece = component.as_os_str().to_string_lossy();
            if piece.contains('*') || piece.contains('?') {
                break;
            }
            literal.push(component);
        }
        if literal.as_os_str().is_empty() {
            continue;
        }
        if !dirs.contains(&literal) {
            dirs.push(literal);
        }
    }
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use std::time::Duration as StdDuration;

    fn recording_emitter() -> (Emitter, Arc<Mutex<Vec<String>>>) {
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let emitter = Emitter::new(
            "host",
            Arc::new(move |m| seen_clone.lock().unwrap().push(m.get_text("message").unwrap_or("").to_string())),
        );
        (emitter, seen)
    }

    #[tokio::test]
    async fn tails_appended_lines_in_an_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "").unwrap();

        let (emitter, seen) = recording_emitter();
        let config = FileTailConfig {
            patterns: vec![dir.path().join("*.log").to_string_lossy().into_owned()],
        };
        let handle = spawn(config, emitter);
        tokio::time::sleep(StdDuration::from_millis(150)).await;

        let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(f, "hello").unwrap();
        writeln!(f, "world").unwrap();

        tokio::time::sleep(StdDuration::from_millis(400)).await;
        handle.stop().await;

        let lines = seen.lock().unwrap().clone();
        assert!(lines.contains(&"hello".to_string()));
        assert!(lines.contains(&"world".to_string()));
    }

    #[tokio::test]
    async fn discovers_files_created_after_startup() {
        let dir = tempfile::tempdir().unwrap();
        let (emitter, seen) = recording_emitter();
        let config = FileTailConfig {
            patterns: vec![dir.path().join("*.log").to_string_lossy().into_owned()],
        };
        let handle = spawn(config, emitter);
        tokio::time::sleep(StdDuration::from_millis(150)).await;

        let path = dir.path().join("new.log");
        std::fs::write(&path, "first line\n").unwrap();

        tokio::time::sleep(StdDuration::from_millis(500)).await;
        handle.stop().await;

        assert!(seen.lock().unwrap().contains(&"first line".to_string()));
    }

    #[test]
    fn directories_of_strips_wildcard_components() {
        let dirs = directories_of(&["/var/log/*.log".to_string()]);
        assert_eq!(dirs, vec![PathBuf::from("/var/log")]);
    }
}
