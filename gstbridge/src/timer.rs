// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::Duration;

/// A one-shot delayed action running on its own thread.
///
/// The action runs once after the delay unless the timer is cancelled first.
/// Dropping the timer cancels it.
///
/// ```no_run
/// # use gstbridge::StopTimer;
/// # use std::time::Duration;
/// let timer = StopTimer::schedule(Duration::from_secs(30), || println!("Running the timer"));
/// // ... long running work ...
/// let fired = timer.cancel();
/// ```
#[derive(Debug)]
pub struct StopTimer {
    // Dropping the sender wakes the timer thread and cancels the action.
    cancel: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<bool>>,
}

impl StopTimer {
    /// Runs `action` after `delay` on a dedicated thread.
    pub fn schedule<F>(delay: Duration, action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (cancel, cancelled) = mpsc::channel::<()>();
        let thread = std::thread::spawn(move || match cancelled.recv_timeout(delay) {
            Err(RecvTimeoutError::Timeout) => {
                tracing::debug!("Stop timer fired after {:?}", delay);
                action();
                true
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                tracing::debug!("Stop timer cancelled");
                false
            }
        });
        StopTimer {
            cancel: Some(cancel),
            thread: Some(thread),
        }
    }

    /// Cancels the timer and waits for its thread.
    ///
    /// Returns `true` if the action had already run.
    pub fn cancel(mut self) -> bool {
        self.finish()
    }

    fn finish(&mut self) -> bool {
        self.cancel.take();
        match self.thread.take() {
            // Only the action can panic, so a panicked thread has fired.
            Some(thread) => thread.join().unwrap_or(true),
            None => false,
        }
    }
}

impl Drop for StopTimer {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn cancelled_timer_never_fires() {
        let count = Arc::new(AtomicUsize::new(0));
        let timer = {
            let count = count.clone();
            StopTimer::schedule(Duration::from_secs(30), move || {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };
        assert!(!timer.cancel());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn timer_fires_once_after_the_delay() {
        let count = Arc::new(AtomicUsize::new(0));
        let timer = {
            let count = count.clone();
            StopTimer::schedule(Duration::from_millis(20), move || {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };
        std::thread::sleep(Duration::from_millis(200));
        assert!(timer.cancel());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panicking_action_still_counts_as_fired() {
        let timer = StopTimer::schedule(Duration::from_millis(20), || panic!("stop failed"));
        std::thread::sleep(Duration::from_millis(200));
        assert!(timer.cancel());
    }

    #[test]
    fn dropping_cancels() {
        let count = Arc::new(AtomicUsize::new(0));
        {
            let count = count.clone();
            let _timer = StopTimer::schedule(Duration::from_secs(30), move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
