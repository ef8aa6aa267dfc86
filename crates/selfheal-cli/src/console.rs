//! Line-oriented console shared by the REPL and the fallback prompts.
//!
//! Both the input loop and the decision core read from the same reader, so
//! a clarification question asked mid-episode consumes the next line the
//! user types rather than racing the loop for it.

use std::io::{self, Write};
use std::sync::Mutex;

use async_trait::async_trait;
use decision::InputProvider;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tracing::warn;

pub struct ConsoleInput<R, W> {
    reader: tokio::sync::Mutex<R>,
    writer: Mutex<W>,
}

impl ConsoleInput<BufReader<Stdin>, io::Stdout> {
    /// Console over the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), io::stdout())
    }
}

impl<R, W> ConsoleInput<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: tokio::sync::Mutex::new(reader),
            writer: Mutex::new(writer),
        }
    }

    /// Print `prompt` without a newline and read one line.
    ///
    /// Returns `None` at end of input. The trailing line terminator is removed.
    pub async fn read_line(&self, prompt: &str) -> io::Result<Option<String>> {
        self.write(prompt)?;
        let mut line = String::new();
        let read = self.reader.lock().await.read_line(&mut line).await?;
        if read == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Print one line.
    pub fn say(&self, line: &str) -> io::Result<()> {
        self.write(&format!("{line}\n"))
    }

    fn write(&self, text: &str) -> io::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        writer.write_all(text.as_bytes())?;
        writer.flush()
    }
}

#[async_trait]
impl<R, W> InputProvider for ConsoleInput<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    async fn ask(&self, prompt: &str) -> String {
        match self.read_line(prompt).await {
            Ok(Some(line)) => line.trim().to_string(),
            Ok(None) => String::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read console input; treating as empty answer");
                String::new()
            }
        }
    }
}
