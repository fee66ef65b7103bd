//! The ordered, append-only chat log of a single browser session.

use std::fmt;

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

impl Role {
    /// Label rendered in front of each message.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Bot => "Bot",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One message in the transcript.  Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    role: Role,
    content: String,
}

impl ChatTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self::new(Role::Bot, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Append-only log of [`ChatTurn`]s.  Insertion order is display order.
///
/// There is deliberately no way to remove, reorder or edit a turn.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single turn at the end.
    pub fn append(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    /// Append a completed exchange: the user's message, then the bot's reply.
    pub fn append_exchange(&mut self, prompt: impl Into<String>, reply: impl Into<String>) {
        self.append(ChatTurn::user(prompt));
        self.append(ChatTurn::bot(reply));
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_labels() {
        assert_eq!(Role::User.label(), "User");
        assert_eq!(Role::Bot.to_string(), "Bot");
    }

    #[test]
    fn new_transcript_is_empty() {
        let t = Transcript::new();
        assert!(t.is_empty());
        assert_eq!(t.len(), 0);
    }

    #[test]
    fn exchange_appends_user_then_bot() {
        let mut t = Transcript::new();
        t.append_exchange("hello", "hi there");

        assert_eq!(
            t.turns(),
            &[ChatTurn::user("hello"), ChatTurn::bot("hi there")]
        );
    }

    #[test]
    fn earlier_turns_are_left_untouched() {
        let mut t = Transcript::new();
        t.append_exchange("one", "1");
        let before = t.turns().to_vec();

        t.append_exchange("two", "2");

        assert_eq!(&t.turns()[..2], before.as_slice());
        assert_eq!(t.turns()[2].content(), "two");
        assert_eq!(t.turns()[3].role(), Role::Bot);
    }
}
