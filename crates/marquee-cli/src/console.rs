//! Terminal-backed collaborators: lookup from arguments, stdin confirmation,
//! and a display channel that prints cards.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use marquee_core::domain::{ActorId, Card, MessageId};
use marquee_core::ports::{
    ChannelError, Confirmation, Confirmer, DisplayChannel, LookupError, LookupRecord, MovieLookup,
    PostedMessage,
};

/// Details typed on the command line stand in for a movie database.
#[derive(Debug, Clone, Default)]
pub struct ManualLookup {
    pub release_year: Option<String>,
    pub runtime: Option<String>,
    pub poster_url: Option<String>,
    pub plot: Option<String>,
    pub external_id: Option<String>,
}

#[async_trait]
impl MovieLookup for ManualLookup {
    async fn lookup(&self, query: &str) -> Result<LookupRecord, LookupError> {
        let title = query.trim();
        if title.is_empty() {
            return Err(LookupError::NotFound(query.to_string()));
        }
        let mut record = LookupRecord::new(
            title,
            self.release_year.clone().unwrap_or_else(|| "N/A".into()),
            self.runtime.clone().unwrap_or_else(|| "N/A".into()),
        );
        record.poster_url = self.poster_url.clone();
        record.plot = self.plot.clone();
        record.external_id = self.external_id.clone();
        Ok(record)
    }
}

/// Asks on stderr, reads `y`/`yes` from stdin. End of input counts as no answer.
pub struct StdinConfirmer {
    assume_yes: bool,
}

impl StdinConfirmer {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

#[async_trait]
impl Confirmer for StdinConfirmer {
    async fn confirm(&self, _actor: &ActorId, prompt: &str) -> Confirmation {
        if self.assume_yes {
            return Confirmation::Confirmed;
        }
        let mut stderr = tokio::io::stderr();
        if stderr
            .write_all(format!("{prompt} [y/N] ").as_bytes())
            .await
            .is_err()
        {
            return Confirmation::Declined;
        }
        let _ = stderr.flush().await;

        let mut line = String::new();
        match BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
            Ok(0) | Err(_) => Confirmation::TimedOut,
            Ok(_) => match line.trim().to_lowercase().as_str() {
                "y" | "yes" => Confirmation::Confirmed,
                _ => Confirmation::Declined,
            },
        }
    }
}

/// Prints every post and edit to stdout and remembers its own messages.
#[derive(Default)]
pub struct ConsoleChannel {
    messages: Mutex<Vec<PostedMessage>>,
}

impl ConsoleChannel {
    pub fn new() -> Self {
        Self::default()
    }

    fn messages(&self) -> std::sync::MutexGuard<'_, Vec<PostedMessage>> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl DisplayChannel for ConsoleChannel {
    async fn recent_own_messages(&self, limit: usize) -> Result<Vec<PostedMessage>, ChannelError> {
        Ok(self.messages().iter().rev().take(limit).cloned().collect())
    }

    async fn post(&self, card: &Card) -> Result<MessageId, ChannelError> {
        let id = MessageId::generate();
        println!("[{id}]\n{card}");
        self.messages().push(PostedMessage {
            id,
            card: card.clone(),
        });
        Ok(id)
    }

    async fn edit(&self, id: MessageId, card: &Card) -> Result<(), ChannelError> {
        let mut messages = self.messages();
        let message = messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(ChannelError::MessageGone(id))?;
        message.card = card.clone();
        println!("[{id} edited]\n{card}");
        Ok(())
    }
}
