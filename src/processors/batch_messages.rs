//! Batching stage
//!
//! Coalesces messages into larger batches. A batch is released when it
//! reaches `limit` messages, when `timeout` has elapsed since its first
//! message, or when the logger publishes `Flush` or `Reset`, whichever
//! happens first. Every release clears the buffer and disarms the timer.
//!
//! The timer runs on a dedicated worker thread fed through a crossbeam
//! channel. Each armed deadline carries a generation number; a deadline
//! whose generation no longer matches the buffer's is stale and ignored,
//! so at most one timer is live for a buffer.

use crate::core::{
    ChannelBinding, LoggerError, LoggerEvent, Message, Next, Processor, Result,
};
use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default age of a batch before it is released
pub const DEFAULT_BATCH_TIMEOUT: Duration = Duration::from_millis(100);

/// Default maximum number of buffered messages
pub const DEFAULT_BATCH_LIMIT: usize = 50;

/// Options of the batching stage
///
/// `None` disables a trigger. A `limit` below 2 also disables the limit
/// trigger, and with both triggers disabled the stage passes batches
/// through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    pub timeout: Option<Duration>,
    pub limit: Option<usize>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_BATCH_TIMEOUT),
            limit: Some(DEFAULT_BATCH_LIMIT),
        }
    }
}

impl BatchOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout == Some(Duration::ZERO) {
            return Err(LoggerError::config(
                "batch_messages",
                "timeout must be greater than zero; use None to disable it",
            ));
        }
        Ok(())
    }
}

/// Create a batching stage
///
/// # Example
///
/// ```
/// use logchain::prelude::*;
/// use std::time::Duration;
///
/// let logger = Logger::new();
/// logger
///     .add_channel(vec![
///         Stage::new(batch_messages(BatchOptions {
///             timeout: Some(Duration::from_millis(50)),
///             limit: Some(20),
///         })?),
///         Stage::new(write_to_console(ConsoleOptions::default())),
///     ])?;
/// # Ok::<(), logchain::LoggerError>(())
/// ```
pub fn batch_messages(options: BatchOptions) -> Result<BatchMessages> {
    BatchMessages::new(options)
}

#[derive(Default)]
struct BatchState {
    buffer: Vec<Message>,
    /// Continuation supplied with the most recent batch
    next: Option<Next>,
    /// Generation of the armed timer, if any
    armed: Option<u64>,
    generation: u64,
}

impl BatchState {
    /// Take the buffer and its continuation, disarming the timer
    fn take(&mut self) -> Option<(Vec<Message>, Next)> {
        self.armed = None;
        if self.buffer.is_empty() {
            return None;
        }
        let next = self.next.take()?;
        Some((std::mem::take(&mut self.buffer), next))
    }
}

struct Arm {
    generation: u64,
    deadline: Instant,
}

pub struct BatchMessages {
    state: Arc<Mutex<BatchState>>,
    timeout: Option<Duration>,
    limit: Option<usize>,
    /// Dropping the sender stops the timer thread
    timer: Option<Sender<Arm>>,
}

impl BatchMessages {
    pub fn new(options: BatchOptions) -> Result<Self> {
        options.validate()?;

        let limit = options.limit.filter(|limit| *limit >= 2);
        let state = Arc::new(Mutex::new(BatchState::default()));

        let timer = match options.timeout {
            Some(_) => Some(spawn_timer(Arc::clone(&state))?),
            None => None,
        };

        Ok(Self {
            state,
            timeout: options.timeout,
            limit,
            timer,
        })
    }

    /// Both triggers are disabled
    pub fn is_pass_through(&self) -> bool {
        self.timeout.is_none() && self.limit.is_none()
    }

    /// Number of messages currently held
    pub fn pending(&self) -> usize {
        self.state.lock().buffer.len()
    }

    fn arm(&self, state: &mut BatchState) -> Result<()> {
        let (Some(timeout), Some(timer)) = (self.timeout, &self.timer) else {
            return Ok(());
        };

        state.generation = state.generation.wrapping_add(1);
        state.armed = Some(state.generation);

        timer
            .send(Arm {
                generation: state.generation,
                deadline: Instant::now() + timeout,
            })
            .map_err(|_| LoggerError::processor("batch_messages", "timer thread has stopped"))
    }
}

impl Processor for BatchMessages {
    fn process(&self, messages: Vec<Message>, next: &Next) -> Result<()> {
        if self.is_pass_through() {
            return next.call(messages);
        }

        let mut state = self.state.lock();
        state.buffer.extend(messages);
        state.next = Some(next.clone());

        if let Some(limit) = self.limit {
            if state.buffer.len() >= limit {
                let released = state.take();
                drop(state);
                return match released {
                    Some((batch, next)) => next.call(batch),
                    None => Ok(()),
                };
            }
        }

        if state.armed.is_none() {
            self.arm(&mut state)?;
        }
        Ok(())
    }

    fn bind(&mut self, binding: &ChannelBinding) -> Result<()> {
        if self.is_pass_through() {
            return Ok(());
        }

        let state = Arc::clone(&self.state);
        binding.subscribe(move |event| match event {
            LoggerEvent::Flush | LoggerEvent::Reset => release_detached(&state),
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "batch_messages"
    }
}

impl Drop for BatchMessages {
    fn drop(&mut self) {
        // A call still in flight during reset can buffer after the Reset event
        release_detached(&self.state);
    }
}

impl std::fmt::Debug for BatchMessages {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchMessages")
            .field("timeout", &self.timeout)
            .field("limit", &self.limit)
            .field("pending", &self.pending())
            .finish()
    }
}

/// Release whatever is buffered outside of a logging call
fn release_detached(state: &Mutex<BatchState>) {
    let released = state.lock().take();
    if let Some((batch, next)) = released {
        next.call_detached(batch);
    }
}

fn spawn_timer(state: Arc<Mutex<BatchState>>) -> Result<Sender<Arm>> {
    let (tx, rx) = unbounded::<Arm>();

    thread::Builder::new()
        .name("logchain-batch-timer".to_string())
        .spawn(move || {
            let mut pending: Option<Arm> = None;
            loop {
                let received = match &pending {
                    Some(arm) => rx.recv_deadline(arm.deadline),
                    None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
                };

                match received {
                    Ok(arm) => pending = Some(arm),
                    Err(RecvTimeoutError::Timeout) => {
                        if let Some(arm) = pending.take() {
                            fire(&state, arm.generation);
                        }
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        })?;

    Ok(tx)
}

fn fire(state: &Mutex<BatchState>, generation: u64) {
    let released = {
        let mut state = state.lock();
        if state.armed != Some(generation) {
            // Released by the limit or a control event since it was armed
            return;
        }
        state.take()
    };
    if let Some((batch, next)) = released {
        next.call_detached(batch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Arg, Level};

    type Batches = Arc<Mutex<Vec<Vec<Message>>>>;

    fn recording_next() -> (Next, Batches) {
        let batches: Batches = Arc::new(Mutex::new(Vec::new()));
        let batches_clone = Arc::clone(&batches);
        let next = Next::from_fn(move |messages| {
            batches_clone.lock().push(messages);
            Ok(())
        });
        (next, batches)
    }

    fn message(text: &str) -> Message {
        Message::new(Level::INFO, vec![Arg::from(text)], None)
    }

    #[test]
    fn test_default_options() {
        let options = BatchOptions::default();
        assert_eq!(options.timeout, Some(Duration::from_millis(100)));
        assert_eq!(options.limit, Some(50));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let result = batch_messages(BatchOptions::new().with_timeout(Some(Duration::ZERO)));
        assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_small_limit_disables_limit() {
        let stage = batch_messages(BatchOptions::new().with_timeout(None).with_limit(Some(1)))
            .unwrap();
        assert!(stage.is_pass_through());

        let (next, batches) = recording_next();
        stage.process(vec![message("aaa")], &next).unwrap();
        assert_eq!(batches.lock().len(), 1);
    }

    #[test]
    fn test_limit_releases_combined_batch() {
        let stage = batch_messages(BatchOptions::new().with_timeout(None).with_limit(Some(2)))
            .unwrap();
        let (next, batches) = recording_next();

        stage.process(vec![message("aaa")], &next).unwrap();
        assert!(batches.lock().is_empty());
        assert_eq!(stage.pending(), 1);

        stage.process(vec![message("bbb")], &next).unwrap();
        let batches = batches.lock();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(stage.pending(), 0);
    }

    #[test]
    fn test_timeout_releases_after_delay() {
        let stage = batch_messages(
            BatchOptions::new()
                .with_timeout(Some(Duration::from_millis(10)))
                .with_limit(None),
        )
        .unwrap();
        let (next, batches) = recording_next();

        stage.process(vec![message("aaa")], &next).unwrap();
        assert!(batches.lock().is_empty());

        thread::sleep(Duration::from_millis(200));
        let batches = batches.lock();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0][0].args, vec![Arg::from("aaa")]);
    }

    #[test]
    fn test_limit_release_disarms_timer() {
        let stage = batch_messages(
            BatchOptions::new()
                .with_timeout(Some(Duration::from_millis(20)))
                .with_limit(Some(2)),
        )
        .unwrap();
        let (next, batches) = recording_next();

        stage.process(vec![message("aaa")], &next).unwrap();
        stage.process(vec![message("bbb")], &next).unwrap();
        thread::sleep(Duration::from_millis(150));

        // The timer armed by the first message must not release an empty
        // or duplicate batch
        assert_eq!(batches.lock().len(), 1);
    }

    #[test]
    fn test_latest_continuation_is_used() {
        let stage = batch_messages(BatchOptions::new().with_timeout(None).with_limit(Some(2)))
            .unwrap();
        let (stale, stale_batches) = recording_next();
        let (fresh, fresh_batches) = recording_next();

        stage.process(vec![message("aaa")], &stale).unwrap();
        stage.process(vec![message("bbb")], &fresh).unwrap();

        assert!(stale_batches.lock().is_empty());
        assert_eq!(fresh_batches.lock()[0].len(), 2);
    }

    #[test]
    fn test_drop_releases_buffer() {
        let stage = batch_messages(BatchOptions::new().with_timeout(None).with_limit(Some(10)))
            .unwrap();
        let (next, batches) = recording_next();

        stage.process(vec![message("aaa")], &next).unwrap();
        assert!(batches.lock().is_empty());

        drop(stage);
        assert_eq!(batches.lock().len(), 1);
        assert_eq!(batches.lock()[0].len(), 1);
    }
}
