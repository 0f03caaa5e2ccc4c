//! Line-oriented console input.
//!
//! [`Prompter`] is the seam between interactive loops and stdin. Anything that
//! can prompt can also answer CAPTCHAs.

use std::future::Future;
use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::watch;

use crate::captcha::{AnswerProvider, CaptchaVerdict};

/// Shows a prompt and reads one line of reply
pub trait Prompter {
    /// `None` once input is exhausted
    fn prompt(&mut self, label: &str) -> impl Future<Output = Option<String>>;
}

impl<P: Prompter> AnswerProvider for P {
    async fn answer(&mut self, question: &str) -> Option<String> {
        println!("\nCAPTCHA: Solve this math problem: {}", question);
        self.prompt("Your answer: ").await
    }

    fn verdict(&mut self, verdict: CaptchaVerdict) {
        match verdict {
            CaptchaVerdict::Correct => println!("CAPTCHA solved successfully!"),
            CaptchaVerdict::Incorrect => println!("Incorrect answer. Please try again."),
            CaptchaVerdict::NotANumber => println!("Invalid input. Please enter a number."),
        }
    }
}

/// Async line reader, stdin by default.
///
/// A pending prompt gives up as soon as shutdown is signalled, so Ctrl-C
/// ends an interactive session instead of waiting for the next line.
pub struct Console<R = BufReader<Stdin>> {
    lines: Lines<R>,
    shutdown: watch::Receiver<bool>,
}

impl Console {
    pub fn new(shutdown: watch::Receiver<bool>) -> Self {
        Self::with_reader(BufReader::new(tokio::io::stdin()), shutdown)
    }
}

impl<R: AsyncBufRead + Unpin> Console<R> {
    pub fn with_reader(reader: R, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            lines: reader.lines(),
            shutdown,
        }
    }
}

impl<R: AsyncBufRead + Unpin> Prompter for Console<R> {
    async fn prompt(&mut self, label: &str) -> Option<String> {
        if *self.shutdown.borrow() {
            return None;
        }

        print!("{}", label);
        let _ = std::io::stdout().flush();

        tokio::select! {
            line = self.lines.next_line() => match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read from stdin");
                    None
                }
            },
            Ok(_) = self.shutdown.wait_for(|stop| *stop) => {
                println!();
                None
            }
        }
    }
}

#[cfg(test)]
pub use scripted::ScriptedInput;

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready_eq, task};

    #[test]
    fn test_console_reads_lines_until_input_ends() {
        let (_tx, rx) = watch::channel(false);
        let mut console = Console::with_reader(&b"admin\r\nsecret\n"[..], rx);

        tokio_test::block_on(async {
            assert_eq!(console.prompt("user: ").await.as_deref(), Some("admin"));
            assert_eq!(console.prompt("pass: ").await.as_deref(), Some("secret"));
            assert_eq!(console.prompt("user: ").await, None);
        });
    }

    #[test]
    fn test_shutdown_abandons_a_pending_prompt() {
        // The writer half stays open, so the read never completes.
        let (_writer, reader) = tokio::io::duplex(64);
        let (tx, rx) = watch::channel(false);
        let mut console = Console::with_reader(BufReader::new(reader), rx);

        let mut prompt = task::spawn(console.prompt("user: "));
        assert_pending!(prompt.poll());

        tx.send(true).unwrap();
        assert!(prompt.is_woken());
        assert_ready_eq!(prompt.poll(), None);
    }

    #[test]
    fn test_no_prompt_after_shutdown() {
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        let mut console = Console::with_reader(&b"admin\n"[..], rx);

        assert_eq!(tokio_test::block_on(console.prompt("user: ")), None);
    }
}

#[cfg(test)]
mod scripted {
    use super::Prompter;
    use std::collections::VecDeque;

    /// Replays canned replies, then reports end of input
    #[derive(Debug, Default)]
    pub struct ScriptedInput {
        replies: VecDeque<String>,
        pub prompts: Vec<String>,
    }

    impl ScriptedInput {
        pub fn new<I, S>(replies: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                replies: replies.into_iter().map(Into::into).collect(),
                prompts: Vec::new(),
            }
        }

        pub fn remaining(&self) -> usize {
            self.replies.len()
        }
    }

    impl Prompter for ScriptedInput {
        async fn prompt(&mut self, label: &str) -> Option<String> {
            self.prompts.push(label.to_string());
            self.replies.pop_front()
        }
    }
}
