//! Chat-bot command interface for TradeWatch.
//!
//! Parses bot mentions into commands, answers them from the insight
//! services, and delivers the reply through a pluggable message sink.

pub mod error;
pub mod interpreter;
pub mod parser;
pub mod sink;

pub use error::ChatError;
pub use interpreter::{CommandInterpreter, MentionEvent};
pub use parser::{Command, CommandParser};
pub use sink::{LogSink, MessageSink, RecordingSink, SentMessage, SlackSink};
