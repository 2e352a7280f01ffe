//! Line-oriented console input and output
//!
//! Commands, confirmations and form fields are all read from the same line
//! stream, so a prompt simply takes the next line.

use std::io::{self, Write};

use async_trait::async_trait;
use servis::confirm::{ConfirmRequest, Confirmer};
use servis::entry::EntryForm;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::debug;

pub struct ConsoleIo<R, W> {
    lines: Lines<R>,
    out: W,
}

fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "d" | "da"
    )
}

impl<R, W> ConsoleIo<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    pub fn new(input: R, out: W) -> Self {
        Self {
            lines: input.lines(),
            out,
        }
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Next input line; `None` at end of input
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        self.lines.next_line().await
    }

    pub fn print(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            self.out.write_all(b"\n")?;
        }
        self.out.flush()
    }

    /// Print `question` without a newline and read the answer
    pub async fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        self.out.write_all(question.as_bytes())?;
        self.out.flush()?;
        self.next_line().await
    }

    /// Read the inputs of an entry form, then ask whether to save it.
    ///
    /// An owner answer ending in `?` lists the matching customer names and
    /// asks again; an empty owner answer keeps the preselected name.
    pub async fn fill_entry_form(&mut self, form: &mut EntryForm) -> io::Result<bool> {
        self.print(&format!("== {} ==", form.title()))?;
        for (field, placeholder) in form.inputs() {
            let Some(text) = self.ask(&format!("{}: ", placeholder)).await? else {
                return Ok(false);
            };
            form.set(field, text);
        }

        while let Some(owner) = form.owner() {
            let question = format!("Vlasnik [{}] (kraj sa ? za predloge): ", owner.text);
            let Some(answer) = self.ask(&question).await? else {
                return Ok(false);
            };
            let answer = answer.trim();
            if let Some(prefix) = answer.strip_suffix('?') {
                let suggestions = form
                    .owner()
                    .map(|o| o.directory.suggestions(prefix.trim()).join("\n"))
                    .unwrap_or_default();
                if suggestions.is_empty() {
                    self.print("(nema predloga)")?;
                } else {
                    self.print(&suggestions)?;
                }
                continue;
            }
            if !answer.is_empty() {
                form.set_owner_text(answer);
            }
            break;
        }

        let answer = self.ask("Sačuvati? [y/N] ").await?;
        Ok(answer.as_deref().is_some_and(is_yes))
    }
}

#[async_trait]
impl<R, W> Confirmer for ConsoleIo<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    async fn confirm(&mut self, request: &ConfirmRequest) -> bool {
        let question = format!("{}: {} [y/N] ", request.title, request.message);
        match self.ask(&question).await {
            Ok(Some(answer)) => is_yes(&answer),
            Ok(None) => false,
            Err(e) => {
                debug!("[ConsoleIo] Confirmation read failed: {}", e);
                false
            }
        }
    }
}
