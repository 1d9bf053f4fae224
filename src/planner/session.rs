//! Interactive session loop.

use futures::StreamExt;

use crate::channels::{Channel, IncomingMessage, MessageStream, OutgoingResponse, StatusUpdate};
use crate::timeline::Timeline;

use super::driver::ConversationDriver;

/// A parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Surprise,
    Timeline,
    Day(u32),
    NextDay,
    PreviousDay,
    Status,
    Reset,
    Help,
    Turn(String),
}

impl Command {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let lower = trimmed.to_lowercase();
        if let Some(arg) = lower.strip_prefix("/day ") {
            return match arg.trim().parse() {
                Ok(day) => Self::Day(day),
                Err(_) => Self::Help,
            };
        }
        match lower.as_str() {
            "/quit" | "/exit" => Self::Quit,
            "/surprise" => Self::Surprise,
            "/timeline" => Self::Timeline,
            "/next" => Self::NextDay,
            "/prev" => Self::PreviousDay,
            "/status" => Self::Status,
            "/reset" => Self::Reset,
            "/help" => Self::Help,
            _ => Self::Turn(trimmed.to_string()),
        }
    }
}

const HELP: &str = "Tell me about the trip you'd like to take. Commands:
  /surprise   pick a destination for me
  /status     show what I know so far
  /timeline   show the saved itinerary day by day
  /day N      show one day of the itinerary
  /next       show the following day
  /prev       show the previous day
  /reset      forget the saved trip and start over
  /quit       leave";

const RESET_MESSAGE: &str = "Starting fresh! Where would you like to go?";

/// Movement through the timeline for the single-day view.
#[derive(Debug, Clone, Copy)]
enum DayMove {
    To(u32),
    Next,
    Previous,
}

/// Process messages from `stream` one at a time until it ends or the user
/// quits.
///
/// Each message's slots are committed as soon as it is read. A message that
/// arrives while replies are still being produced cuts them short; any
/// itinerary request in flight is made again while handling the newer one.
pub async fn run_session(
    driver: &mut ConversationDriver,
    channel: &dyn Channel,
    mut stream: MessageStream,
) {
    let mut pending: Option<IncomingMessage> = None;
    let mut stream_open = true;
    let mut viewing_day = 1;

    loop {
        let msg = match pending.take() {
            Some(msg) => msg,
            None if !stream_open => break,
            None => tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received, ending session");
                    break;
                }
                next = stream.next() => match next {
                    Some(msg) => msg,
                    None => break,
                },
            },
        };

        let command = Command::parse(&msg.content);
        let outcome = match command {
            Command::Quit => {
                reply(channel, &msg, "Safe travels!".to_string()).await;
                break;
            }
            Command::Help => {
                reply(channel, &msg, HELP.to_string()).await;
                continue;
            }
            Command::Status => {
                reply(channel, &msg, driver.status().render_text()).await;
                continue;
            }
            Command::Timeline => {
                reply(channel, &msg, render_timeline(driver).await).await;
                continue;
            }
            Command::Day(day) => {
                let text = browse_day(driver, &mut viewing_day, DayMove::To(day)).await;
                reply(channel, &msg, text).await;
                continue;
            }
            Command::NextDay => {
                let text = browse_day(driver, &mut viewing_day, DayMove::Next).await;
                reply(channel, &msg, text).await;
                continue;
            }
            Command::PreviousDay => {
                let text = browse_day(driver, &mut viewing_day, DayMove::Previous).await;
                reply(channel, &msg, text).await;
                continue;
            }
            Command::Reset => {
                viewing_day = 1;
                reply(channel, &msg, reset(driver).await).await;
                continue;
            }
            Command::Surprise | Command::Turn(_) => {
                let accepted = match &command {
                    Command::Turn(text) => driver.accept_turn(text),
                    _ => driver.accept_surprise(),
                };
                if let Err(e) = channel
                    .send_status(StatusUpdate::Thinking("Planning...".into()), &msg.metadata)
                    .await
                {
                    tracing::debug!("Status update on {} failed: {}", channel.name(), e);
                }

                let turn = driver.respond(accepted);
                tokio::pin!(turn);
                loop {
                    tokio::select! {
                        biased;
                        outcome = &mut turn => break Some(outcome),
                        next = stream.next(), if stream_open => match next {
                            Some(newer) => {
                                tracing::warn!("Replies cut short by a newer message");
                                pending = Some(newer);
                                break None;
                            }
                            None => stream_open = false,
                        },
                    }
                }
            }
        };

        let Some(outcome) = outcome else {
            continue;
        };
        for text in outcome.messages {
            reply(channel, &msg, text).await;
        }
    }
}

/// The saved timeline, or the sample trip when nothing is saved.
async fn saved_or_demo(driver: &ConversationDriver) -> Result<(Timeline, bool), String> {
    match driver.store().load().await {
        Ok(Some(doc)) => Ok((Timeline::from_stored(doc), false)),
        Ok(None) => Ok((Timeline::demo(), true)),
        Err(e) => {
            tracing::warn!("Failed to load itinerary: {}", e);
            Err("I couldn't load your saved itinerary.".to_string())
        }
    }
}

async fn render_timeline(driver: &ConversationDriver) -> String {
    match saved_or_demo(driver).await {
        Ok((timeline, false)) => timeline.render_text(),
        Ok((timeline, true)) => format!(
            "No itinerary saved yet. Here's a sample trip:\n\n{}",
            timeline.render_text()
        ),
        Err(message) => message,
    }
}

async fn browse_day(driver: &ConversationDriver, viewing_day: &mut u32, step: DayMove) -> String {
    let mut timeline = match saved_or_demo(driver).await {
        Ok((timeline, _)) => timeline,
        Err(message) => return message,
    };
    timeline.select_day(*viewing_day);
    *viewing_day = match step {
        DayMove::To(day) => timeline.select_day(day),
        DayMove::Next => timeline.next_day(),
        DayMove::Previous => timeline.previous_day(),
    };
    timeline.render_current()
}

async fn reset(driver: &mut ConversationDriver) -> String {
    match driver.store().clear().await {
        Ok(removed) => {
            tracing::info!("Session reset (saved trip removed: {})", removed);
            driver.reset();
            RESET_MESSAGE.to_string()
        }
        Err(e) => {
            tracing::warn!("Failed to clear saved itinerary: {}", e);
            "I couldn't clear your saved trip.".to_string()
        }
    }
}

async fn reply(channel: &dyn Channel, msg: &IncomingMessage, text: String) {
    if let Err(e) = channel.respond(msg, OutgoingResponse::text(text)).await {
        tracing::warn!("Failed to respond on {}: {}", channel.name(), e);
    }
}
