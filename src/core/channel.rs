//! Channel: an ordered chain of processors composed into one callable

use super::error::{LoggerError, Result};
use super::event_bus::EventBus;
use super::failure::FailureReporter;
use super::log_message::Message;
use super::processor::{ChannelBinding, Next, Processor, Stage};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

pub(crate) struct Channel {
    /// First stage of the composed chain; `None` for an empty channel
    entry: Option<Next>,
    len: usize,
}

impl Channel {
    /// Bind every stage in order, then fold them right to left so each
    /// stage's continuation is the stage after it.
    ///
    /// If any stage fails to bind, subscriptions made by the stages before
    /// it are released and the error is returned.
    pub(crate) fn build(
        index: usize,
        stages: Vec<Stage>,
        bus: &EventBus,
        failures: &FailureReporter,
    ) -> Result<Self> {
        let binding = ChannelBinding::new(index, bus.clone(), failures.clone());
        let mut processors: Vec<Box<dyn Processor>> = Vec::with_capacity(stages.len());

        for stage in stages {
            let mut processor = stage.into_processor();
            if let Err(e) = processor.bind(&binding) {
                binding.rollback();
                return Err(e);
            }
            processors.push(processor);
        }

        let len = processors.len();
        if len == 0 {
            return Ok(Self { entry: None, len });
        }

        let mut next = Next::terminal(index, failures.clone());
        for processor in processors.into_iter().rev() {
            let processor: Arc<dyn Processor> = Arc::from(processor);
            let downstream = next;
            next = Next::new(
                move |messages| processor.process(messages, &downstream),
                index,
                failures.clone(),
            );
        }

        Ok(Self {
            entry: Some(next),
            len,
        })
    }

    /// Run the chain with a one-message batch; panics become errors
    pub(crate) fn dispatch(&self, message: Message) -> Result<()> {
        let Some(entry) = &self.entry else {
            return Ok(());
        };

        match panic::catch_unwind(AssertUnwindSafe(|| entry.call(vec![message]))) {
            Ok(result) => result,
            Err(payload) => Err(LoggerError::from_panic(payload)),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
}
