//! Interactive line input.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Asks questions on one stream and reads answers, one line each, from another.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    /// Prompts on stdout and reads from stdin.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> Prompter<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Writes `question` and returns the next input line without its line
    /// terminator. End of input yields an empty answer.
    pub async fn ask(&mut self, question: &str) -> std::io::Result<String> {
        self.output.write_all(question.as_bytes()).await?;
        self.output.flush().await?;

        let mut line = String::new();
        self.input.read_line(&mut line).await?;
        Ok(line.trim_end_matches(['\r', '\n']).to_owned())
    }

    /// Writes `text` followed by a newline.
    pub async fn say(&mut self, text: &str) -> std::io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await
    }
}
