//! Background analysis worker.
//!
//! [`AnalysisService`] owns one worker thread. Requests carry a snapshot of
//! the curve set (cheap: the set is reference counted) and a reply channel;
//! callers get a [`Pending`] handle back immediately and poll it from the UI
//! loop. Each reply is tagged with the version of the set it was computed
//! for, so a result that arrives after the data moved on can be recognised
//! and dropped.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::analysis::stats::{compute_statistics, Statistics};
use crate::analysis::suggest::{suggest, Suggestion};
use crate::config::{AnalysisConfig, EngineFlags};
use crate::data::store::{CurveSet, CurveSetVersion};
use crate::error::AnalysisError;
use crate::telemetry::PerformanceMetrics;

/// A value computed for one curve-set version.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub version: CurveSetVersion,
    pub value: T,
}

impl<T> Versioned<T> {
    /// Whether this result describes `set` as it is now.
    pub fn is_current_for(&self, set: &CurveSet) -> bool {
        self.version == set.version()
    }
}

/// Handle to a result the worker has not delivered yet.
#[derive(Debug)]
pub struct Pending<T> {
    rx: Receiver<T>,
}

impl<T> Pending<T> {
    /// Non-blocking poll. `Ok(None)` while the request is still in flight.
    pub fn try_take(&self) -> Result<Option<T>, AnalysisError> {
        match self.rx.try_recv() {
            Ok(v) => Ok(Some(v)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(AnalysisError::Disconnected),
        }
    }

    /// Block for at most `timeout`.
    pub fn wait(&self, timeout: Duration) -> Result<T, AnalysisError> {
        self.rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => AnalysisError::Timeout(timeout),
            RecvTimeoutError::Disconnected => AnalysisError::Disconnected,
        })
    }
}

enum Request {
    Statistics {
        set: CurveSet,
        reply: Sender<Versioned<Statistics>>,
    },
    Suggestions {
        set: CurveSet,
        metrics: PerformanceMetrics,
        flags: EngineFlags,
        reply: Sender<Versioned<Vec<Suggestion>>>,
    },
    ClearCache,
    Shutdown,
}

/// Statistics memoized per curve-set version, oldest evicted first.
struct StatsCache {
    capacity: usize,
    entries: VecDeque<(CurveSetVersion, Statistics)>,
}

impl StatsCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    fn get_or_compute(&mut self, set: &CurveSet) -> Statistics {
        let version = set.version();
        if let Some((_, stats)) = self.entries.iter().find(|(v, _)| *v == version) {
            log::trace!("analysis cache hit for version {version}");
            return stats.clone();
        }
        let stats = compute_statistics(set);
        if self.capacity > 0 {
            if self.entries.len() >= self.capacity {
                self.entries.pop_front();
            }
            self.entries.push_back((version, stats.clone()));
        }
        stats
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

fn run_worker(rx: Receiver<Request>, cfg: AnalysisConfig) {
    let mut cache = StatsCache::new(cfg.cache_capacity);
    for req in rx.iter() {
        match req {
            Request::Statistics { set, reply } => {
                let value = cache.get_or_compute(&set);
                // receiver gone means the caller lost interest
                let _ = reply.send(Versioned {
                    version: set.version(),
                    value,
                });
            }
            Request::Suggestions {
                set,
                metrics,
                flags,
                reply,
            } => {
                let stats = cache.get_or_compute(&set);
                let value = suggest(&stats, &metrics, &flags, &cfg);
                let _ = reply.send(Versioned {
                    version: set.version(),
                    value,
                });
            }
            Request::ClearCache => cache.clear(),
            Request::Shutdown => break,
        }
    }
}

/// Owner of the analysis worker thread.
pub struct AnalysisService {
    tx: Option<Sender<Request>>,
    join: Option<JoinHandle<()>>,
    unavailable: Option<String>,
    flags: EngineFlags,
}

impl AnalysisService {
    pub fn start() -> Self {
        Self::start_with(AnalysisConfig::default())
    }

    /// Spawn the worker. A spawn failure is not an error here: the service is
    /// returned not ready and every request fails with
    /// [`AnalysisError::Unavailable`].
    pub fn start_with(cfg: AnalysisConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        let name = cfg.thread_name.clone();
        match thread::Builder::new()
            .name(name.clone())
            .spawn(move || run_worker(rx, cfg))
        {
            Ok(join) => {
                log::info!("analysis worker '{name}' started");
                Self {
                    tx: Some(tx),
                    join: Some(join),
                    unavailable: None,
                    flags: EngineFlags::default(),
                }
            }
            Err(e) => {
                log::error!("failed to spawn analysis worker '{name}': {e}");
                Self::unavailable(e.to_string())
            }
        }
    }

    /// A service with no worker behind it.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            tx: None,
            join: None,
            unavailable: Some(reason.into()),
            flags: EngineFlags::default(),
        }
    }

    /// Whether the worker is up and accepting requests.
    pub fn ready(&self) -> bool {
        self.unavailable.is_none()
            && self.tx.is_some()
            && self.join.as_ref().is_some_and(|j| !j.is_finished())
    }

    /// Flags the suggestion heuristics evaluate against.
    pub fn set_flags(&mut self, flags: EngineFlags) {
        self.flags = flags;
    }

    fn send(&self, req: Request) -> Result<(), AnalysisError> {
        if let Some(reason) = &self.unavailable {
            return Err(AnalysisError::Unavailable(reason.clone()));
        }
        let tx = self.tx.as_ref().ok_or(AnalysisError::Disconnected)?;
        tx.send(req).map_err(|_| AnalysisError::Disconnected)
    }

    pub fn calculate_statistics(
        &self,
        set: &CurveSet,
    ) -> Result<Pending<Versioned<Statistics>>, AnalysisError> {
        let (reply, rx) = mpsc::channel();
        self.send(Request::Statistics {
            set: set.clone(),
            reply,
        })?;
        Ok(Pending { rx })
    }

    pub fn get_optimization_suggestions(
        &self,
        set: &CurveSet,
        metrics: &PerformanceMetrics,
    ) -> Result<Pending<Versioned<Vec<Suggestion>>>, AnalysisError> {
        let (reply, rx) = mpsc::channel();
        self.send(Request::Suggestions {
            set: set.clone(),
            metrics: *metrics,
            flags: self.flags,
            reply,
        })?;
        Ok(Pending { rx })
    }

    pub fn clear_cache(&self) -> Result<(), AnalysisError> {
        self.send(Request::ClearCache)
    }
}

impl Drop for AnalysisService {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Request::Shutdown);
        }
        if let Some(join) = self.join.take() {
            match join.join() {
                Ok(()) => log::info!("analysis worker stopped"),
                Err(_) => log::error!("analysis worker panicked"),
            }
        }
    }
}
