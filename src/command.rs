//! Command extraction from raw message text.
//!
//! A feedback message looks like `!bug The export crashes` or uses a
//! custom emoji as the command, e.g. `<:request:12345> add a dark theme`.
//! The first whitespace-separated token is the full command; the rest of
//! the message is the payload.

/// The four feedback categories the support endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Request,
    Bug,
    Idea,
    Feedback,
}

impl FeedbackKind {
    /// Maps a normalized command or emoji name to a kind.
    pub fn from_command(command: &str) -> Option<Self> {
        match command {
            "request" => Some(FeedbackKind::Request),
            "bug" => Some(FeedbackKind::Bug),
            "idea" => Some(FeedbackKind::Idea),
            "feedback" => Some(FeedbackKind::Feedback),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::Request => "request",
            FeedbackKind::Bug => "bug",
            FeedbackKind::Idea => "idea",
            FeedbackKind::Feedback => "feedback",
        }
    }

    /// Single-letter code used by the support endpoint: bugs are `B`,
    /// everything else is filed as `F`.
    pub fn type_letter(&self) -> char {
        match self {
            FeedbackKind::Bug => 'B',
            _ => 'F',
        }
    }
}

/// A message body split into its command token and remaining text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Normalized command, e.g. `bug` for `!bug` or `<:bug:12345>`.
    pub command: String,
    /// Message text with the command token removed and trimmed.
    pub payload: String,
}

impl ParsedCommand {
    /// Splits `content` into command and payload.
    ///
    /// The full command token keeps whatever decoration the user typed
    /// (`!`, `+`, or custom emoji syntax); normalization lowercases it and
    /// strips a leading run of `<!+:`, a trailing run of `!+:`, and a
    /// trailing `:<digits>>` emoji-id suffix. The payload is the content
    /// with the literal token removed from the front.
    pub fn parse(content: &str) -> Self {
        let trimmed = content.trim();
        let full_command = trimmed.split_whitespace().next().unwrap_or("");

        let command = normalize_command(full_command);

        // Literal removal, not pattern-based: tokens like `<:idea:12345>`
        // contain characters that are special to pattern engines.
        let payload = trimmed
            .strip_prefix(full_command)
            .unwrap_or(trimmed)
            .trim()
            .to_string();

        Self { command, payload }
    }

}

/// Reduces a full command token to its bare name.
fn normalize_command(full_command: &str) -> String {
    let lower = full_command.to_lowercase();

    // Custom emoji mentions carry an `:<id>>` tail, e.g. `<:bug:12345>`.
    let mut s = lower.as_str();
    if let Some(colon) = s.rfind(':') {
        let tail = &s[colon + 1..];
        if tail.ends_with('>') && tail.len() > 1 && tail[..tail.len() - 1].bytes().all(|b| b.is_ascii_digit()) {
            s = &s[..colon];
        }
    }

    s.trim_start_matches(['<', '!', '+', ':'])
        .trim_end_matches(['!', '+', ':'])
        .to_string()
}
