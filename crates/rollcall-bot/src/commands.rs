//! Command parsing, help text, and participant mention labels.

/// Prefix of per-category post commands.
const POST_PREFIX: &str = "post_";

/// A bot command recognized in an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/post` (random category) or `/post_<category>`.
    Post {
        /// Requested category, lowercased. `None` for a random one.
        category: Option<String>,
    },
    /// `/help`.
    Help,
    /// Any other slash command.
    Unknown {
        /// The command name without slash or bot suffix.
        name: String,
    },
}

impl Command {
    /// Parse the first word of `text` as a command.
    ///
    /// Returns `None` for plain text. A `@botname` suffix is ignored and
    /// command names are case-insensitive.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let raw = word.strip_prefix('/')?;
        let name = raw.split('@').next().unwrap_or_default().to_lowercase();

        let command = match name.as_str() {
            "post" => Self::Post { category: None },
            "help" => Self::Help,
            other => match other.strip_prefix(POST_PREFIX) {
                Some(category) if !category.is_empty() => Self::Post {
                    category: Some(category.to_owned()),
                },
                _ => Self::Unknown { name },
            },
        };
        Some(command)
    }
}

/// The `/help` listing for the given categories.
pub fn help_text(categories: &[String]) -> String {
    let mut lines = vec!["/post - Post a message from a random category".to_owned()];
    lines.extend(
        categories
            .iter()
            .map(|c| format!("/{POST_PREFIX}{c} - Post a message from '{c}'")),
    );
    lines.push("/help - Show this list".to_owned());
    lines.join("\n")
}

/// A clickable mention of a chat user, used as the participant label.
pub fn mention_label(user_id: &str, first_name: &str) -> String {
    format!(
        "<a href=\"tg://user?id={}\">{}</a>",
        html_escape::encode_double_quoted_attribute(user_id),
        html_escape::encode_text(first_name)
    )
}
