// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The function both compute stacks deploy, once per CPU architecture. It
//! times a CPU-bound workload (an FFT by default) and reports the running
//! time through API Gateway's proxy integration.

use lambda_runtime::LambdaEvent;
use rand::Rng;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

pub const WORKLOAD_ENV: &str = "BENCHMARK_WORKLOAD";
pub const FIBONACCI_INPUT: u32 = 30;
pub const WORKER_THREADS: usize = 4;

/// One FFT over the columns of an 8192x8192 matrix.
pub const FFT_SHAPE: MatrixShape = MatrixShape {
    rows: 8192,
    columns: 8192,
};
/// Each worker of the threaded FFT transforms one 8192x2048 chunk.
pub const FFT_CHUNK_SHAPE: MatrixShape = MatrixShape {
    rows: 8192,
    columns: 2048,
};

#[derive(Debug, Error)]
pub enum BenchmarkError {
    #[error("Unknown workload `{0}`, expected one of `fft`, `threaded-fft`, `fibonacci` or `threaded-fibonacci`")]
    UnknownWorkload(String),
    #[error("A benchmark worker thread panicked")]
    WorkerPanicked,
    #[error("Error serializing the response body {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Workload {
    #[default]
    Fft,
    ThreadedFft,
    Fibonacci,
    ThreadedFibonacci,
}

impl FromStr for Workload {
    type Err = BenchmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "fft" => Ok(Workload::Fft),
            "threaded-fft" => Ok(Workload::ThreadedFft),
            "fibonacci" => Ok(Workload::Fibonacci),
            "threaded-fibonacci" => Ok(Workload::ThreadedFibonacci),
            other => Err(BenchmarkError::UnknownWorkload(other.to_string())),
        }
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Workload::Fft => f.write_str("fft"),
            Workload::ThreadedFft => f.write_str("threaded-fft"),
            Workload::Fibonacci => f.write_str("fibonacci"),
            Workload::ThreadedFibonacci => f.write_str("threaded-fibonacci"),
        }
    }
}

impl Workload {
    /// An unset or blank setting selects the default workload.
    pub fn from_setting(setting: Option<&str>) -> Result<Self, BenchmarkError> {
        match setting {
            Some(value) if !value.trim().is_empty() => value.parse(),
            _ => Ok(Workload::default()),
        }
    }

    pub fn from_env() -> Result<Self, BenchmarkError> {
        Self::from_setting(std::env::var(WORKLOAD_ENV).ok().as_deref())
    }

    /// Runs the workload to completion and returns how long it took. Input
    /// matrices are generated before the clock starts.
    pub fn run(&self) -> Result<Duration, BenchmarkError> {
        match self {
            Workload::Fft => Ok(timed_fft(FFT_SHAPE)),
            Workload::ThreadedFft => timed_threaded_fft(FFT_CHUNK_SHAPE, WORKER_THREADS),
            Workload::Fibonacci => {
                let start = Instant::now();
                let value = fibonacci(FIBONACCI_INPUT);
                log::debug!("fibonacci({}) = {}", FIBONACCI_INPUT, value);
                Ok(start.elapsed())
            }
            Workload::ThreadedFibonacci => {
                let start = Instant::now();
                let workers = (0..WORKER_THREADS)
                    .map(|_| thread::spawn(|| fibonacci(FIBONACCI_INPUT)))
                    .collect::<Vec<_>>();
                for worker in workers {
                    worker.join().map_err(|_| BenchmarkError::WorkerPanicked)?;
                }
                Ok(start.elapsed())
            }
        }
    }
}

/// Naive recursion on purpose: the point is to keep one core busy.
pub fn fibonacci(n: u32) -> u64 {
    if n <= 1 {
        u64::from(n)
    } else {
        fibonacci(n - 1) + fibonacci(n - 2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixShape {
    pub rows: usize,
    pub columns: usize,
}

impl MatrixShape {
    pub fn len(&self) -> usize {
        self.rows * self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Uniform samples in `[0, 1)`, stored column by column so that every
/// column is one contiguous FFT input.
pub fn random_matrix(shape: MatrixShape) -> Vec<Complex<f64>> {
    let mut rng = rand::thread_rng();
    (0..shape.len())
        .map(|_| Complex::new(rng.gen::<f64>(), 0.0))
        .collect()
}

/// Forward FFT along axis 0: each column of `matrix` is transformed in place.
pub fn fft_columns(fft: &dyn Fft<f64>, matrix: &mut [Complex<f64>]) {
    fft.process(matrix);
}

pub fn timed_fft(shape: MatrixShape) -> Duration {
    let mut matrix = random_matrix(shape);
    let fft = FftPlanner::<f64>::new().plan_fft_forward(shape.rows);
    let start = Instant::now();
    fft_columns(fft.as_ref(), &mut matrix);
    start.elapsed()
}

/// Transforms `workers` independent chunks of `shape`, one per thread.
pub fn timed_threaded_fft(shape: MatrixShape, workers: usize) -> Result<Duration, BenchmarkError> {
    let chunks = (0..workers)
        .map(|_| random_matrix(shape))
        .collect::<Vec<_>>();
    let fft: Arc<dyn Fft<f64>> = FftPlanner::<f64>::new().plan_fft_forward(shape.rows);

    let start = Instant::now();
    let handles = chunks
        .into_iter()
        .map(|mut chunk| {
            let fft = Arc::clone(&fft);
            thread::spawn(move || fft_columns(fft.as_ref(), &mut chunk))
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().map_err(|_| BenchmarkError::WorkerPanicked)?;
    }
    Ok(start.elapsed())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

/// Response shape API Gateway expects from a proxy integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ProxyResponse {
    pub fn running_time(elapsed: Duration) -> Result<Self, BenchmarkError> {
        let headers = [
            ("Access-Control-Allow-Origin", "*"),
            ("Access-Control-Allow-Headers", "Content-Type"),
            ("Access-Control-Allow-Methods", "OPTIONS,GET"),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
        let body = serde_json::to_string(&Message {
            message: format!("running time {}ms", elapsed.as_secs_f64() * 1000.0),
        })?;
        Ok(ProxyResponse {
            status_code: 200,
            headers,
            body,
        })
    }
}

/// Invocation entry point. The request itself is ignored; only the
/// configured workload matters.
pub async fn handle_request(
    event: LambdaEvent<Value>,
) -> Result<ProxyResponse, lambda_runtime::Error> {
    let workload = Workload::from_env()?;
    log::info!(
        "request {} running {} workload",
        event.context.request_id,
        workload
    );
    let elapsed = workload.run()?;
    log::info!("{} workload took {:?}", workload, elapsed);
    Ok(ProxyResponse::running_time(elapsed)?)
}
