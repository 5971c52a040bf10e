// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Bounded, fixed-delay retry for blocking operations.

use std::fmt::Debug;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use http::StatusCode;
use log::warn;

use crate::{Error, Result};

/// Retries performed after the first attempt by default.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Pause between two attempts by default.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(200);

/// RetryPolicy decides whether a failed attempt is worth another one.
pub trait RetryPolicy: Debug + Send + Sync + 'static {
    /// Returns `true` if the operation should be attempted again after `err`.
    fn should_retry(&self, err: &Error) -> bool;
}

/// Retry every failure, whatever its cause.
///
/// This is the default policy: a permanent 4xx answer is retried exactly like
/// a reset connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRetry;

impl RetryPolicy for AlwaysRetry {
    fn should_retry(&self, _: &Error) -> bool {
        true
    }
}

/// Retry only failures that may go away on their own.
///
/// Errors raised before the request reached the wire and client errors other
/// than `408 Request Timeout` and `429 Too Many Requests` fail immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransientOnly;

impl RetryPolicy for TransientOnly {
    fn should_retry(&self, err: &Error) -> bool {
        if err.is_permanent() {
            return false;
        }

        match err.status() {
            Some(status) if status.is_client_error() => {
                status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => true,
        }
    }
}

/// Retry runs an operation up to `max_retries + 1` times, sleeping a fixed
/// delay between attempts.
///
/// Once attempts are exhausted the last error is returned untouched, there is
/// no dedicated "retries exhausted" error.
///
/// ```
/// use blobrest_core::retry::Retry;
/// use std::time::Duration;
///
/// let retry = Retry::new(2, Duration::ZERO);
/// let mut calls = 0;
/// let v = retry.run(|| {
///     calls += 1;
///     if calls < 2 {
///         Err(blobrest_core::Error::unexpected("connection reset"))
///     } else {
///         Ok(calls)
///     }
/// });
/// assert_eq!(v.unwrap(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Retry {
    max_retries: usize,
    delay: Duration,
    policy: Arc<dyn RetryPolicy>,
}

impl Default for Retry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY)
    }
}

impl Retry {
    /// Create a new retry executor with the [`AlwaysRetry`] policy.
    pub fn new(max_retries: usize, delay: Duration) -> Self {
        Self {
            max_retries,
            delay,
            policy: Arc::new(AlwaysRetry),
        }
    }

    /// Replace the retry policy.
    pub fn with_policy(mut self, policy: impl RetryPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Retries performed after the first attempt.
    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Pause between two attempts.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `op`, blocking the current thread between attempts.
    pub fn run<T>(&self, op: impl FnMut() -> Result<T>) -> Result<T> {
        self.run_with_sleep(op, thread::sleep)
    }

    /// Run `op`, calling `sleep` between attempts instead of blocking the thread.
    ///
    /// `sleep` is never called when the delay is zero.
    pub fn run_with_sleep<T>(
        &self,
        mut op: impl FnMut() -> Result<T>,
        mut sleep: impl FnMut(Duration),
    ) -> Result<T> {
        let mut retried = 0;

        loop {
            let err = match op() {
                Ok(v) => return Ok(v),
                Err(err) => err,
            };

            if retried >= self.max_retries || !self.policy.should_retry(&err) {
                return Err(err);
            }
            retried += 1;

            warn!(
                "attempt {retried} of {} failed, retrying in {:?}: {err}",
                self.max_retries + 1,
                self.delay
            );
            if !self.delay.is_zero() {
                sleep(self.delay);
            }
        }
    }
}
