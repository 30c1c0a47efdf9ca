//! `forge chat` command implementation.

use crate::chat::{
    CompletionClient, Conversation, CredentialStore, GeminiClient, InFlight, Message,
    SendOutcome, Topic,
};
use crate::cli::open_unlocked;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::KeyValueStore;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Messages replayed when an interactive session starts.
const REPLAY_ON_OPEN: usize = 10;

/// Run the chat command.
///
/// With a message, runs one turn and prints the reply. Without one, reads
/// lines from stdin until EOF, `/quit` or Ctrl-C at the prompt.
///
/// # Errors
///
/// Returns an error if the vault is locked, storage fails, stdin can't be
/// read, or a one-shot turn has no credential.
pub async fn run(config: &Config, topic: Topic, message: Option<&str>) -> Result<()> {
    let store = open_unlocked(config)?;
    let credential = match &config.api_key_override {
        Some(key) => Some(key.clone()),
        None => CredentialStore::new(&store).get()?,
    };
    let client = GeminiClient::new(&config.gemini.base_url, &config.gemini.model);

    let mut conversation = Conversation::open(topic, &store, credential, InFlight::new());
    conversation.activate();

    let mut interrupts = listen_for_interrupts();

    match message {
        Some(text) => {
            let outcome = send_turn(&mut conversation, text, &client, &mut interrupts).await;
            if outcome == SendOutcome::NeedsCredential {
                return Err(Error::MissingCredential);
            }
            print_outcome(&outcome);
            Ok(())
        }
        None => {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            interactive(&mut conversation, &client, &store, &mut lines, &mut interrupts).await
        }
    }
}

/// Forward every Ctrl-C for the rest of the process.
///
/// Once tokio installs its SIGINT handler the default action is gone, so a
/// single listener has to outlive every turn and every prompt.
fn listen_for_interrupts() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}

/// Send one turn; an interrupt cancels it.
async fn send_turn(
    conversation: &mut Conversation<'_>,
    text: &str,
    client: &dyn CompletionClient,
    interrupts: &mut mpsc::UnboundedReceiver<()>,
) -> SendOutcome {
    let cancel = CancellationToken::new();
    let send = conversation.send(text, client, &cancel);
    tokio::pin!(send);

    tokio::select! {
        outcome = &mut send => outcome,
        Some(()) = interrupts.recv() => {
            cancel.cancel();
            send.await
        }
    }
}

async fn interactive<R>(
    conversation: &mut Conversation<'_>,
    client: &dyn CompletionClient,
    store: &dyn KeyValueStore,
    lines: &mut Lines<R>,
    interrupts: &mut mpsc::UnboundedReceiver<()>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let topic = conversation.topic();
    println!("forge chat [{topic}]  (/clear to reset this topic, /quit or Ctrl-C to exit)");
    println!();

    let messages = conversation.messages();
    let start = messages.len().saturating_sub(REPLAY_ON_OPEN);
    for msg in &messages[start..] {
        println!("{}", format_message(msg));
    }

    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            biased;
            Some(()) = interrupts.recv() => {
                println!();
                return Ok(());
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            println!();
            return Ok(());
        };

        match line.trim() {
            "" => {}
            "/quit" | "/exit" => return Ok(()),
            "/clear" => {
                conversation.clear_history()?;
                println!("{}", format_message(&conversation.messages()[0]));
            }
            text => {
                let outcome = send_turn(conversation, text, client, interrupts).await;
                if outcome == SendOutcome::NeedsCredential {
                    print!("Enter your Google Gemini API key: ");
                    std::io::stdout().flush()?;
                    let Some(key) = lines.next_line().await? else {
                        return Err(Error::MissingCredential);
                    };
                    match CredentialStore::new(store).save(&key) {
                        Ok(()) => {
                            conversation.set_credential(key.trim());
                            println!("API key saved. Send your message again.");
                        }
                        Err(e) => eprintln!("forge: {e}"),
                    }
                    continue;
                }
                print_outcome(&outcome);
            }
        }
    }
}

fn print_outcome(outcome: &SendOutcome) {
    match outcome {
        SendOutcome::Replied(msg) | SendOutcome::Failed(msg) => println!("{}", format_message(msg)),
        SendOutcome::Busy => eprintln!("forge: a request for this topic is already running"),
        SendOutcome::Cancelled => eprintln!("forge: request cancelled"),
        SendOutcome::Ignored | SendOutcome::NeedsCredential => {}
    }
}

/// Render one transcript line.
fn format_message(msg: &Message) -> String {
    let speaker = if msg.is_bot { "assistant" } else { "you" };
    format!("{speaker}> {}", msg.content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatError, HistoryStore};
    use crate::storage::MemoryBackend;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::time::timeout;

    /// Raises an interrupt once the request is in flight, then never answers.
    struct InterruptedClient {
        interrupt: mpsc::UnboundedSender<()>,
    }

    #[async_trait]
    impl CompletionClient for InterruptedClient {
        async fn complete(&self, _prompt: &str, _credential: &str) -> std::result::Result<String, ChatError> {
            let _ = self.interrupt.send(());
            std::future::pending().await
        }
    }

    struct EchoClient;

    #[async_trait]
    impl CompletionClient for EchoClient {
        async fn complete(&self, _prompt: &str, _credential: &str) -> std::result::Result<String, ChatError> {
            Ok("echo".to_string())
        }
    }

    fn open(store: &MemoryBackend) -> Conversation<'_> {
        let mut conversation =
            Conversation::open(Topic::General, store, Some("key".to_string()), InFlight::new());
        conversation.activate();
        conversation
    }

    #[test]
    fn format_bot_and_user_lines() {
        let bot = Message::new("Focus on X", true, Topic::MvpPlanning);
        let user = Message::new("What first?", false, Topic::MvpPlanning);
        assert_eq!(format_message(&bot), "assistant> Focus on X");
        assert_eq!(format_message(&user), "you> What first?");
    }

    #[tokio::test]
    async fn interrupt_at_prompt_ends_session() {
        let store = MemoryBackend::new();
        let mut conversation = open(&store);
        let (tx, mut interrupts) = mpsc::unbounded_channel();

        // Input stays open and silent, so only the interrupt can end the loop
        let (_writer, reader) = tokio::io::duplex(64);
        let mut lines = BufReader::new(reader).lines();

        tx.send(()).unwrap();
        let result = timeout(
            Duration::from_secs(5),
            interactive(&mut conversation, &EchoClient, &store, &mut lines, &mut interrupts),
        )
        .await
        .expect("session should end on interrupt");
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn interrupt_during_turn_cancels_and_keeps_session() {
        let store = MemoryBackend::new();
        let mut conversation = open(&store);
        let (tx, mut interrupts) = mpsc::unbounded_channel();
        let client = InterruptedClient { interrupt: tx };

        let input: &[u8] = b"hello\n/quit\n";
        let mut lines = BufReader::new(input).lines();

        timeout(
            Duration::from_secs(5),
            interactive(&mut conversation, &client, &store, &mut lines, &mut interrupts),
        )
        .await
        .expect("turn should be cancelled")
        .unwrap();

        let stored = HistoryStore::new(&store).load(Topic::General);
        let last = stored.last().unwrap();
        assert_eq!(last.content, "hello");
        assert!(!last.is_bot);
    }

    #[tokio::test]
    async fn every_turn_honours_interrupts() {
        let store = MemoryBackend::new();
        let mut conversation = open(&store);
        let (tx, mut interrupts) = mpsc::unbounded_channel();

        let outcome = send_turn(&mut conversation, "first", &EchoClient, &mut interrupts).await;
        assert!(matches!(outcome, SendOutcome::Replied(_)));

        let client = InterruptedClient { interrupt: tx };
        let outcome = timeout(
            Duration::from_secs(5),
            send_turn(&mut conversation, "second", &client, &mut interrupts),
        )
        .await
        .expect("second turn should be cancelled");
        assert_eq!(outcome, SendOutcome::Cancelled);
    }
}
