//! Execution engine for running spec-driven operations with configurable parallelism.
//!
//! This module sits "above" [`crate::processing`] and provides:
//!
//! - Parallel (chunked) execution of a [`FunctionOperation`] over a [`DataSet`]
//! - Resource limits / throttling (in-flight chunks)
//! - A choice between resolving once per run or once per chunk ([`ResolveScope`])
//! - Real-time metrics + observer hooks for monitoring

mod observer;
mod semaphore;

use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;

use crate::bridge::Bridge;
use crate::error::BridgeResult;
use crate::processing::{FunctionOperation, PreparedOperation};
use crate::types::{DataSet, Schema, Tuple};

pub use observer::{ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver};

use semaphore::Semaphore;

/// When the engine resolves an operation's spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveScope {
    /// Once, before any chunk runs; all chunks share the callable.
    #[default]
    PerRun,
    /// Independently in every chunk, the way separate pipeline tasks would.
    PerChunk,
}

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Number of worker threads used by the engine.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Number of rows per chunk.
    pub chunk_size: usize,
    /// Upper bound on concurrently executing chunks.
    ///
    /// This is an additional throttle on top of `num_threads`.
    pub max_in_flight_chunks: usize,
    pub resolve_scope: ResolveScope,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self {
            num_threads: Some(n),
            chunk_size: 4_096,
            max_in_flight_chunks: n.max(1),
            resolve_scope: ResolveScope::default(),
        }
    }
}

/// Runs [`FunctionOperation`]s over in-memory [`DataSet`]s on a dedicated thread pool.
pub struct ExecutionEngine {
    pool: ThreadPool,
    bridge: Bridge,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine resolving through `bridge`.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size == 0`, `max_in_flight_chunks == 0`, or `num_threads == Some(0)`.
    pub fn new(bridge: Bridge, opts: ExecutionOptions) -> Self {
        assert!(opts.chunk_size > 0, "chunk_size must be > 0");
        assert!(
            opts.max_in_flight_chunks > 0,
            "max_in_flight_chunks must be > 0"
        );
        if let Some(n) = opts.num_threads {
            assert!(n > 0, "num_threads must be > 0 when set");
        }

        let n_threads = opts
            .num_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
            .max(1);

        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build()
            .expect("failed to build rayon thread pool");

        Self {
            pool,
            bridge,
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        }
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run `op` over every row of `dataset` in parallel.
    ///
    /// Output rows keep the input order. The first resolution, call or arity error aborts the
    /// run and is returned.
    pub fn run(&self, dataset: &DataSet, op: &FunctionOperation) -> BridgeResult<DataSet> {
        self.pool.install(|| self.run_impl(dataset, op))
    }

    fn run_impl(&self, dataset: &DataSet, op: &FunctionOperation) -> BridgeResult<DataSet> {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted);

        let out = self.execute(dataset, op);

        self.metrics.end_run(start.elapsed());
        if let Err(e) = &out {
            self.emit(ExecutionEvent::RunFailed {
                error: e.to_string(),
            });
        }
        self.emit(ExecutionEvent::RunFinished {
            elapsed: start.elapsed(),
            metrics: self.metrics.snapshot(),
        });
        out
    }

    fn execute(&self, dataset: &DataSet, op: &FunctionOperation) -> BridgeResult<DataSet> {
        let output = op.output_schema(&dataset.schema);
        let shared = match self.opts.resolve_scope {
            ResolveScope::PerRun => Some(self.prepare(op)?),
            ResolveScope::PerChunk => None,
        };

        let sem = Semaphore::new(self.opts.max_in_flight_chunks);
        let per_chunk = chunk_ranges(dataset.row_count(), self.opts.chunk_size)
            .into_par_iter()
            .map(|range| {
                let (_permit, waited) = sem.acquire();
                if waited > Duration::ZERO {
                    self.metrics.on_throttle_wait(waited);
                    self.emit(ExecutionEvent::ThrottleWaited { duration: waited });
                }

                self.metrics.on_chunk_start();
                self.emit(ExecutionEvent::ChunkStarted {
                    start_row: range.start,
                    row_count: range.end - range.start,
                });

                let out = self.process_chunk(&dataset.rows[range], op, shared.as_ref(), &output);

                self.emit(ExecutionEvent::ChunkFinished {
                    output_rows: out.as_ref().map(Vec::len).unwrap_or(0),
                });
                self.metrics.on_chunk_end();
                out
            })
            .collect::<BridgeResult<Vec<Vec<Tuple>>>>()?;

        let rows = per_chunk.into_iter().flatten().collect::<Vec<_>>();
        Ok(DataSet::new(output, rows))
    }

    fn process_chunk(
        &self,
        rows: &[Tuple],
        op: &FunctionOperation,
        shared: Option<&PreparedOperation>,
        output: &Schema,
    ) -> BridgeResult<Vec<Tuple>> {
        let local;
        let prepared = match shared {
            Some(p) => p,
            None => {
                local = self.prepare(op)?;
                &local
            }
        };

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let emitted = prepared.operate_checked(row, output)?;
            self.metrics.on_row_processed(emitted.len());
            out.extend(emitted);
        }
        Ok(out)
    }

    fn prepare(&self, op: &FunctionOperation) -> BridgeResult<PreparedOperation> {
        let prepared = op.prepare(&self.bridge)?;
        self.metrics.on_resolution();
        self.emit(ExecutionEvent::Resolved {
            spec: op.spec.to_string(),
        });
        Ok(prepared)
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

fn chunk_ranges(row_count: usize, chunk_size: usize) -> Vec<Range<usize>> {
    if row_count == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(row_count.div_ceil(chunk_size));
    let mut start = 0usize;
    while start < row_count {
        let end = (start + chunk_size).min(row_count);
        out.push(start..end);
        start = end;
    }
    out
}
