//! Line-oriented terminal input

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

use super::app::CommandError;
use super::signals::ShutdownSignal;

/// Reads answers to prompts one line at a time
pub struct LineReader<R> {
    lines: Lines<R>,
}

impl LineReader<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Next line without its newline; `None` at end of input.
    /// Cancel-safe, so it can race a timer or signal.
    pub async fn next_line(&mut self) -> Option<String> {
        self.lines.next_line().await.ok().flatten()
    }

    /// Next line, failing on end of input or interrupt
    pub async fn read(&mut self, shutdown: &ShutdownSignal) -> Result<String, CommandError> {
        tokio::select! {
            line = self.next_line() => line.ok_or(CommandError::Aborted),
            _ = shutdown.wait() => Err(CommandError::Interrupted),
        }
    }
}
