//! Prepends fixed arguments to every message

use crate::core::{Arg, Args, Message, Next, Processor, Result};

/// Insert `args` in front of each message's own arguments
///
/// ```
/// use logchain::prelude::*;
///
/// let stage = prepend_args(vec![Arg::from("[worker]"), Arg::from(3)]);
/// assert_eq!(stage.args().len(), 2);
/// ```
pub fn prepend_args(args: impl Into<Args>) -> PrependArgs {
    PrependArgs {
        args: args.into().into_vec(),
    }
}

#[derive(Debug, Clone)]
pub struct PrependArgs {
    args: Vec<Arg>,
}

impl PrependArgs {
    pub fn args(&self) -> &[Arg] {
        &self.args
    }
}

impl Processor for PrependArgs {
    fn process(&self, mut messages: Vec<Message>, next: &Next) -> Result<()> {
        for message in &mut messages {
            message.args.splice(0..0, self.args.iter().cloned());
        }
        next.call(messages)
    }

    fn name(&self) -> &str {
        "prepend_args"
    }
}
