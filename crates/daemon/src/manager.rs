// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The pipeline manager (spec §4.5): owns the glob patterns identifying
//! pipeline documents, the name→pipeline mapping, the filesystem watcher
//! that drives reload/unload, and the cross-pipeline dispatch entry
//! points every `call`/`jump`/`fork` action and every input ultimately
//! goes through.

use crate::error::ManagerError;
use crate::input_config::{spawn_input, SinkConfig};
use crate::worker_pool::WorkerPool;
use logshipper_adapters::input::InputHandle;
use logshipper_adapters::Emitter;
use logshipper_config::{discover, load, pipeline_name_for, InputDef};
use logshipper_core::{DispatchError, Dispatcher, Message};
use logshipper_engine::builtins::register_builtins;
use logshipper_engine::{CompiledPipeline, Registry};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

tokio::task_local! {
    /// Per-dispatch-chain recursion depth (spec §4.5, §5 "Recursion
    /// bound"). `process_async` starts a fresh scope, so every chain
    /// launched by an input or a `fork` begins at zero.
    static RECURSION: std::cell::Cell<u32>;
}

const RECURSION_LIMIT: u32 = 10;

struct RunningPipeline {
    compiled: Arc<CompiledPipeline>,
    inputs: Vec<InputHandle>,
}

struct ManagerInner {
    patterns: Vec<String>,
    hostname: Arc<str>,
    registry: Registry,
    pipelines: RwLock<HashMap<String, RunningPipeline>>,
    pool: WorkerPool,
}

/// A cheap handle over the shared manager state that also implements
/// [`Dispatcher`]; cloned into every [`logshipper_core::Context`] and
/// every input's [`Emitter`] downstream closure.
#[derive(Clone)]
struct DispatcherHandle(Arc<ManagerInner>);

impl Dispatcher for DispatcherHandle {
    /// A chain of nested `call`/`jump` dispatches all run synchronously on
    /// one worker and share one task-local recursion counter. The first
    /// entry into a chain — whether from `process_async`'s fresh task or
    /// a bare top-level call — establishes the counter; every nested call
    /// underneath it reuses the same scope.
    fn process(&self, message: Message, pipeline: &str) -> Result<Message, DispatchError> {
        if RECURSION.try_with(|_| ()).is_ok() {
            self.process_within_scope(message, pipeline)
        } else {
            let handle = self.clone();
            let pipeline = pipeline.to_string();
            RECURSION.sync_scope(std::cell::Cell::new(0), move || handle.process_within_scope(message, &pipeline))
        }
    }

    fn process_async(&self, message: Message, pipeline: &str) {
        let handle = self.clone();
        let pipeline = pipeline.to_string();
        self.0.pool.submit(async move {
            let _ = RECURSION
                .scope(std::cell::Cell::new(0), async move { handle.process_within_scope(message, &pipeline) })
                .await;
        });
    }
}

impl DispatcherHandle {
    /// Assumes a [`RECURSION`] scope is already active (spec §4.5
    /// "Increments the recursion counter ... Decrements the counter on
    /// all exit paths").
    fn process_within_scope(&self, message: Message, pipeline: &str) -> Result<Message, DispatchError> {
        let depth = RECURSION.with(|c| {
            let d = c.get() + 1;
            c.set(d);
            d
        });

        let result = if depth > RECURSION_LIMIT {
            Err(DispatchError::RecursionTooDeep)
        } else {
            self.run_pipeline(message, pipeline)
        };

        RECURSION.with(|c| c.set(c.get().saturating_sub(1)));
        result
    }

    fn run_pipeline(&self, message: Message, pipeline: &str) -> Result<Message, DispatchError> {
        let compiled = {
            let pipelines = self.0.pipelines.read();
            pipelines.get(pipeline).map(|p| Arc::clone(&p.compiled))
        }
        .ok_or_else(|| DispatchError::PipelineNotFound(pipeline.to_string()))?;

        let dispatcher: Arc<dyn Dispatcher> = Arc::new(self.clone());
        let result = compiled.run(message, Some(dispatcher));
        Ok(result.unwrap_or_default())
    }
}

/// Owns loading, reloading, dispatch, and the worker pool for one set of
/// glob-matched pipeline documents.
pub struct Manager {
    inner: Arc<ManagerInner>,
    dispatcher: DispatcherHandle,
    watch: Mutex<Option<(mpsc::Sender<()>, std::thread::JoinHandle<()>)>>,
}

impl Manager {
    pub fn new(patterns: Vec<String>, sinks: SinkConfig) -> Result<Self, ManagerError> {
        let mut registry = Registry::new();
        register_builtins(&mut registry, sinks.into_builtins_context()?);

        let hostname: Arc<str> = Arc::from(
            gethostname::gethostname()
                .into_string()
                .unwrap_or_else(|_| "localhost".to_string()),
        );

        let inner = Arc::new(ManagerInner {
            patterns,
            hostname,
            registry,
            pipelines: RwLock::new(HashMap::new()),
            pool: WorkerPool::new(),
        });
        let dispatcher = DispatcherHandle(Arc::clone(&inner));

        Ok(Self { inner, dispatcher, watch: Mutex::new(None) })
    }

    pub fn process(&self, message: Message, pipeline: &str) -> Result<Message, ManagerError> {
        self.dispatcher.process(message, pipeline).map_err(Into::into)
    }

    pub fn process_async(&self, message: Message, pipeline: &str) {
        self.dispatcher.process_async(message, pipeline);
    }

    pub fn pipeline_names(&self) -> Vec<String> {
        self.inner.pipelines.read().keys().cloned().collect()
    }

    /// Compiles every document matched by `patterns` without starting any
    /// inputs or installing a filesystem watch, for the CLI's `validate`
    /// subcommand. Returns one entry per document that failed to parse
    /// or compile, alongside the path it came from.
    pub fn validate_only(patterns: &[String]) -> Result<Vec<(PathBuf, ManagerError)>, ManagerError> {
        let registry = {
            let mut registry = Registry::new();
            register_builtins(&mut registry, SinkConfig::default().into_builtins_context()?);
            registry
        };

        let mut failures = Vec::new();
        for path in discover(patterns)? {
            let name = pipeline_name_for(&path);
            let result: Result<(), ManagerError> = load(&path)
                .map_err(ManagerError::from)
                .and_then(|document| CompiledPipeline::compile(name, &document, &registry).map(|_| ()).map_err(ManagerError::from));
            if let Err(e) = result {
                failures.push((path, e));
            }
        }
        Ok(failures)
    }

    /// Loads every document matched by the configured globs (spec §4.5
    /// "Loading"). A single document's *config-parse-error* is logged and
    /// skipped; it never aborts the rest of startup.
    pub async fn load_all(&self) -> Result<(), ManagerError> {
        let paths = discover(&self.inner.patterns)?;
        for path in paths {
            if let Err(e) = self.reload_path(&path).await {
                warn!(path = %path.display(), error = %e, "pipeline failed to load, skipping");
            }
        }
        Ok(())
    }

    /// (Re)loads the document at `path`, swapping it in under its
    /// derived name. Builds the replacement before tearing down the
    /// previous one so the window with no running pipeline is as short
    /// as the final map swap (spec §4.5 "Reloading atomically stops the
    /// existing inputs, replaces the step list, rebuilds inputs, and
    /// restarts them").
    async fn reload_path(&self, path: &Path) -> Result<(), ManagerError> {
        let name = pipeline_name_for(path);
        let document = load(path)?;
        let compiled = Arc::new(CompiledPipeline::compile(name.clone(), &document, &self.inner.registry)?);
        let inputs = self.spawn_inputs(&name, &document.inputs).await;

        let previous = {
            let mut pipelines = self.inner.pipelines.write();
            pipelines.insert(name.clone(), RunningPipeline { compiled, inputs })
        };
        if let Some(previous) = previous {
            for handle in previous.inputs {
                handle.stop().await;
            }
        }
        info!(pipeline = %name, path = %path.display(), "pipeline loaded");
        Ok(())
    }

    async fn unload_path(&self, path: &Path) {
        let name = pipeline_name_for(path);
        let removed = self.inner.pipelines.write().remove(&name);
        if let Some(running) = removed {
            for handle in running.inputs {
                handle.stop().await;
            }
            info!(pipeline = %name, "pipeline unloaded");
        }
    }

    async fn spawn_inputs(&self, pipeline: &str, defs: &[InputDef]) -> Vec<InputHandle> {
        let mut handles = Vec::with_capacity(defs.len());
        for def in defs {
            let downstream = {
                let dispatcher = self.dispatcher.clone();
                let pipeline = pipeline.to_string();
                Arc::new(move |message: Message| dispatcher.process_async(message, &pipeline))
            };
            let emitter = Emitter::new(Arc::clone(&self.inner.hostname), downstream);
            match spawn_input(def, emitter).await {
                Ok(handle) => handles.push(handle),
                Err(e) => warn!(pipeline, input = %def.name, error = %e, "input failed to start"),
            }
        }
        handles
    }

    /// Installs a filesystem watch over the parent directories of every
    /// configured glob and reacts to create/modify as reload, remove as
    /// unload (spec §4.5 "Loading", §6 "Filesystem events consumed").
    pub fn start_watching(self: &Arc<Self>) {
        let dirs = parent_dirs(&self.inner.patterns);
        let (event_tx, event_rx) = mpsc::channel::<notify::Event>();
        let mut watchers: Vec<RecommendedWatcher> = Vec::new();
        for dir in &dirs {
            let tx = event_tx.clone();
            if let Ok(mut watcher) = notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = tx.send(event);
                }
            }) {
                if watcher.watch(dir, RecursiveMode::NonRecursive).is_ok() {
                    watchers.push(watcher);
                }
            }
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let manager = Arc::clone(self);
        let runtime = tokio::runtime::Handle::current();
        let join = std::thread::spawn(move || {
            let _watchers = watchers;
            loop {
                if stop_rx.try_recv().is_ok() {
                    break;
                }
                match event_rx.recv_timeout(Duration::from_millis(200)) {
                    Ok(event) => {
                        for path in event.paths {
                            if !matches_any(&manager.inner.patterns, &path) {
                                continue;
                            }
                            let manager = Arc::clone(&manager);
                            runtime.spawn(async move {
                                if path.exists() {
                                    if let Err(e) = manager.reload_path(&path).await {
                                        warn!(path = %path.display(), error = %e, "pipeline reload failed");
                                    }
                                } else {
                                    manager.unload_path(&path).await;
                                }
                            });
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        *self.watch.lock() = Some((stop_tx, join));
    }

    /// Stops every pipeline's inputs, drains the worker pool, and closes
    /// the filesystem watcher (spec §5 "Cancellation").
    pub async fn stop(&self) {
        if let Some((stop_tx, join)) = self.watch.lock().take() {
            let _ = stop_tx.send(());
            let _ = join.join();
        }

        let running: Vec<RunningPipeline> = self.inner.pipelines.write().drain().map(|(_, v)| v).collect();
        for pipeline in running {
            for handle in pipeline.inputs {
                handle.stop().await;
            }
        }

        self.inner.pool.drain().await;
    }
}

impl From<DispatchError> for ManagerError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::PipelineNotFound(name) => ManagerError::PipelineNotFound(name),
            DispatchError::RecursionTooDeep => ManagerError::RecursionTooDeep,
        }
    }
}

fn parent_dirs(patterns: &[String]) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    for pattern in patterns {
        if let Some(dir) = Path::new(pattern).parent() {
            let dir = dir.to_path_buf();
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
    }
    dirs
}

fn matches_any(patterns: &[String], path: &Path) -> bool {
    patterns.iter().any(|pattern| {
        glob::Pattern::new(pattern)
            .map(|p| p.matches_path(path))
            .unwrap_or(false)
    })
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
