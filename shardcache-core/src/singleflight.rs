//  Copyright 2026 ShardCache Authors
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

//! Request coalescing: concurrent callers asking for the same key while a
//! fetch is in flight all get the one fetch's result, instead of each
//! triggering their own.
//!
//! Mirrors the reference `singleflight.Group`: a mutex-guarded map of
//! in-flight [`Call`]s, and a `Notify` per call so waiters block without
//! polling. Results are never cached here — once a call completes its
//! entry is removed, so the next `Get` for that key starts a fresh call.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

struct Call<T> {
    result: std::sync::Mutex<Option<T>>,
    done: Notify,
}

/// Coalesces concurrent calls for the same key into a single execution
/// of the underlying future.
pub struct SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    calls: Mutex<HashMap<String, Arc<Call<T>>>>,
}

impl<T> Default for SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Run `fut` for `key`, unless another caller is already running one
    /// for the same key — in that case, wait for it and share its
    /// result. Exactly one invocation of `fut` runs per in-flight call,
    /// no matter how many callers pass the same `key` concurrently.
    pub async fn do_call<F>(&self, key: &str, fut: F) -> T
    where
        F: Future<Output = T>,
    {
        let existing = {
            let mut calls = self.calls.lock();
            if let Some(call) = calls.get(key) {
                Some(call.clone())
            } else {
                let call = Arc::new(Call {
                    result: std::sync::Mutex::new(None),
                    done: Notify::new(),
                });
                calls.insert(key.to_owned(), call);
                None
            }
        };

        if let Some(call) = existing {
            // notified() must be constructed before checking `result`,
            // or a completion between the check and the await would be
            // missed and this waiter would hang forever.
            let notified = call.done.notified();
            if let Some(result) = call.result.lock().unwrap().clone() {
                return result;
            }
            notified.await;
            return call
                .result
                .lock()
                .unwrap()
                .clone()
                .expect("call marked done without a result");
        }

        let result = fut.await;

        let call = {
            let mut calls = self.calls.lock();
            calls.remove(key).expect("this call's own entry must still be present")
        };
        *call.result.lock().unwrap() = Some(result.clone());
        call.done.notify_waiters();

        result
    }

    /// Number of keys with a call currently in flight. Exposed for tests.
    #[cfg(test)]
    fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn concurrent_callers_share_one_execution() {
        let flight: Arc<SingleFlight<Arc<str>>> = Arc::new(SingleFlight::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..100 {
            let flight = flight.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                flight
                    .do_call("k", async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Arc::<str>::from("result")
                    })
                    .await
            }));
        }

        let mut results = Vec::new();
        for h in handles {
            results.push(h.await.unwrap());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for r in &results {
            assert!(Arc::ptr_eq(r, &results[0]));
        }
    }

    #[tokio::test]
    async fn sequential_calls_for_the_same_key_each_run() {
        let flight: SingleFlight<u32> = SingleFlight::new();
        let calls = AtomicUsize::new(0);

        let a = flight
            .do_call("k", async {
                calls.fetch_add(1, Ordering::SeqCst);
                1u32
            })
            .await;
        let b = flight
            .do_call("k", async {
                calls.fetch_add(1, Ordering::SeqCst);
                2u32
            })
            .await;

        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn entry_is_removed_once_the_call_completes() {
        let flight: SingleFlight<u32> = SingleFlight::new();
        flight.do_call("k", async { 1u32 }).await;
        assert_eq!(flight.in_flight(), 0);
    }

    #[tokio::test]
    async fn distinct_keys_run_independently() {
        let flight: Arc<SingleFlight<u32>> = Arc::new(SingleFlight::new());
        let (a, b) = tokio::join!(flight.do_call("a", async { 1u32 }), flight.do_call("b", async { 2u32 }));
        assert_eq!((a, b), (1, 2));
    }
}
