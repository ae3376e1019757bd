//! User-facing reply texts.

use chrono::TimeDelta;
use rand::Rng;
use rand::seq::IndexedRandom;
use rollcall_core::{EngineError, OrchestratorError, WaitTime};

/// Placeholder for the remaining wait in [`TIRED_MESSAGES`].
const TIME_PLACEHOLDER: &str = "{time}";

/// Replies for a request refused by the cooldown.
const TIRED_MESSAGES: &[&str] = &[
    "🍺 The bot went to the pub to gossip about your chat with other bots.\n\
     ⌛ It should sober up in {time}. Hopefully. 😵‍💫",
    "⚠️ The bot is asleep. Before dozing off it saved every one of your requests. 📂\n\
     ⌛ Back in {time}, whether you like it or not. 🤭",
    "🤖 The bot is at its therapist complaining about how often you type /post.\n\
     ⌛ Returning in {time}. Delete the evidence while you can! 🏃‍♂️💨",
    "🛠️ The bot is rebooting and rereading your old comments from 2013. 🫣\n\
     ⌛ Back in {time}, and now it knows everything. 👁️",
    "📡 The bot stepped out to count how many times you searched for weird stuff.\n\
     ⌛ Back on duty in {time}. Hopefully you will be too. 🤯",
];

/// Generic reply for failures the user cannot act on.
const TRY_LATER: &str = "Something went wrong while sending the message. Try again later.";

/// Render a wait as `M minutes S seconds`, or `S seconds` under a minute.
pub fn format_wait(remaining: TimeDelta) -> String {
    let wait = WaitTime::from_remaining(remaining);
    if wait.minutes > 0 {
        format!("{} minutes {} seconds", wait.minutes, wait.seconds)
    } else {
        format!("{} seconds", wait.seconds)
    }
}

/// A randomly chosen "bot is resting" reply naming the remaining wait.
pub fn tired_reply<R: Rng + ?Sized>(remaining: TimeDelta, rng: &mut R) -> String {
    let template = TIRED_MESSAGES
        .choose(rng)
        .copied()
        .unwrap_or("⌛ The bot is resting. Back in {time}.");
    template.replace(TIME_PLACEHOLDER, &format_wait(remaining))
}

/// The reply for a failed `/post` request.
pub fn error_reply<R: Rng + ?Sized>(err: &OrchestratorError, rng: &mut R) -> String {
    match err {
        OrchestratorError::Engine(engine) => match engine {
            EngineError::RateLimited { remaining } => tired_reply(*remaining, rng),
            EngineError::NoParticipants => "No participants available yet!".to_owned(),
            EngineError::NoCategories => "No categories with messages available!".to_owned(),
            EngineError::EmptyCategory { category } => {
                format!("No messages in category '{category}'!")
            }
            EngineError::NotFound { category } => {
                format!("Category '{category}' not found. See /help.")
            }
            EngineError::Persistence(_) | EngineError::Catalog(_) => TRY_LATER.to_owned(),
        },
        OrchestratorError::Delivery { .. } => TRY_LATER.to_owned(),
    }
}

/// Reply to a command the bot does not know.
pub fn unknown_command(name: &str) -> String {
    format!("Unknown command /{name}. See /help.")
}
