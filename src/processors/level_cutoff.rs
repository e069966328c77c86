//! Drops messages below a severity threshold

use crate::core::{Level, Message, Next, Processor, Result};

/// Forward only messages with `level >= threshold`.
///
/// The continuation is always called, with an empty batch if nothing
/// passed, so stages further down still observe every batch.
pub fn level_cutoff(threshold: Level) -> LevelCutoff {
    LevelCutoff { threshold }
}

#[derive(Debug, Clone, Copy)]
pub struct LevelCutoff {
    threshold: Level,
}

impl LevelCutoff {
    pub fn threshold(&self) -> Level {
        self.threshold
    }
}

impl Processor for LevelCutoff {
    fn process(&self, mut messages: Vec<Message>, next: &Next) -> Result<()> {
        messages.retain(|message| message.level >= self.threshold);
        next.call(messages)
    }

    fn name(&self) -> &str {
        "level_cutoff"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_filters_below_threshold() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let next = Next::from_fn(move |messages: Vec<Message>| {
            seen_clone.lock().push(messages.iter().map(|m| m.level).collect::<Vec<_>>());
            Ok(())
        });

        let stage = level_cutoff(Level::WARN);
        let batch = vec![
            Message::new(Level::INFO, vec![], None),
            Message::new(Level::WARN, vec![], None),
            Message::new(Level::FATAL, vec![], None),
        ];
        stage.process(batch, &next).unwrap();
        stage
            .process(vec![Message::new(Level::DEBUG, vec![], None)], &next)
            .unwrap();

        assert_eq!(
            *seen.lock(),
            vec![vec![Level::WARN, Level::FATAL], vec![]]
        );
    }
}
