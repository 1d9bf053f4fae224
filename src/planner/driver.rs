//! Conversation driver: turns user messages into trip slots and, once the
//! trip is complete, into a generated itinerary.

use std::sync::Arc;

use chrono::Utc;
use rand::seq::SliceRandom;
use serde::Serialize;
use tokio::sync::watch;

use crate::config::SessionConfig;
use crate::error::LlmError;
use crate::itinerary::{self, ParsedDay};
use crate::llm::ChatMessage;
use crate::store::{ItineraryStore, StoredItinerary};
use crate::timeline::MAX_TIMELINE_DAYS;

use super::assistant::{TravelAssistant, collect_stream};
use super::model::TripData;
use super::prompts;
use super::state::{ConversationStep, PlanningState, Transition};

/// A freshly generated itinerary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedItinerary {
    pub raw: String,
    pub days: Vec<ParsedDay>,
}

/// What a single turn produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Assistant messages to show, in order.
    pub messages: Vec<String>,
    /// Active step after the turn.
    pub step: ConversationStep,
    /// Slot transition, when extraction ran.
    pub transition: Option<Transition>,
    pub itinerary: Option<GeneratedItinerary>,
}

/// Snapshot of a session's progress, published after every committed turn.
#[derive(Debug, Clone, Serialize)]
pub struct PlanningStatus {
    pub step: ConversationStep,
    pub step_number: usize,
    pub step_title: String,
    pub filled_slots: usize,
    pub total_slots: usize,
    pub trip: TripData,
    pub quick_options: Vec<String>,
    pub itinerary_ready: bool,
}

impl PlanningStatus {
    pub fn from_state(state: &PlanningState) -> Self {
        Self {
            step: state.step,
            step_number: state.step.number(),
            step_title: state.step.title().to_string(),
            filled_slots: state.trip.filled_slots(),
            total_slots: ConversationStep::SLOT_COUNT,
            trip: state.trip.clone(),
            quick_options: prompts::quick_options(state.step),
            itinerary_ready: state.step.is_terminal(),
        }
    }

    /// Short multi-line summary for the terminal.
    pub fn render_text(&self) -> String {
        let mut lines = vec![
            format!(
                "Step {} of {}: {}",
                self.step_number, self.total_slots, self.step_title
            ),
            format!("Filled {}/{} details", self.filled_slots, self.total_slots),
        ];
        if let Some(destination) = &self.trip.destination {
            lines.push(format!("  destination: {destination}"));
        }
        if let Some(duration) = &self.trip.duration {
            lines.push(format!("  duration: {duration}"));
        }
        if let Some(pace) = self.trip.pace {
            lines.push(format!("  pace: {pace}"));
        }
        if !self.trip.styles.is_empty() {
            lines.push(format!("  interests: {}", self.trip.styles_label()));
        }
        for option in &self.quick_options {
            lines.push(format!("  * {option}"));
        }
        lines.join("\n")
    }
}

/// A user turn whose extraction is committed and whose replies are still owed.
///
/// Produced by [`ConversationDriver::accept_turn`] and consumed by
/// [`ConversationDriver::respond`].
#[derive(Debug, Clone)]
pub struct AcceptedTurn {
    prompt: Option<String>,
    canned: Vec<String>,
    context_end: usize,
    transition: Option<Transition>,
    generate: bool,
}

impl AcceptedTurn {
    fn canned(messages: Vec<String>) -> Self {
        Self {
            prompt: None,
            canned: messages,
            context_end: 0,
            transition: None,
            generate: false,
        }
    }

    /// Whether responding to this turn will request an itinerary.
    pub fn generates_itinerary(&self) -> bool {
        self.generate
    }
}

/// Drives one planning conversation.
///
/// A turn is split in two. [`accept_turn`](Self::accept_turn) records the
/// message and commits its extracted slots without awaiting anything.
/// [`respond`](Self::respond) produces the replies and the itinerary and may
/// be dropped at any await; a dropped itinerary request is made again on the
/// next accepted turn.
pub struct ConversationDriver {
    assistant: Arc<dyn TravelAssistant>,
    store: ItineraryStore,
    config: SessionConfig,
    state: PlanningState,
    transcript: Vec<ChatMessage>,
    generation_pending: bool,
    status_tx: watch::Sender<PlanningStatus>,
}

impl ConversationDriver {
    pub fn new(
        assistant: Arc<dyn TravelAssistant>,
        store: ItineraryStore,
        config: SessionConfig,
    ) -> Self {
        let state = PlanningState::new();
        let (status_tx, _) = watch::channel(PlanningStatus::from_state(&state));
        Self {
            assistant,
            store,
            config,
            state,
            transcript: Vec::new(),
            generation_pending: false,
            status_tx,
        }
    }

    pub fn state(&self) -> &PlanningState {
        &self.state
    }

    pub fn store(&self) -> &ItineraryStore {
        &self.store
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn status(&self) -> PlanningStatus {
        PlanningStatus::from_state(&self.state)
    }

    /// Receiver that always holds the latest committed status.
    pub fn subscribe(&self) -> watch::Receiver<PlanningStatus> {
        self.status_tx.subscribe()
    }

    /// Handle one complete user turn.
    pub async fn handle_turn(&mut self, text: &str) -> TurnOutcome {
        let turn = self.accept_turn(text);
        self.respond(turn).await
    }

    /// Pick a random destination for the traveler and move on to duration.
    ///
    /// Only available while the destination is still being asked for.
    pub async fn surprise_me(&mut self) -> TurnOutcome {
        let turn = self.accept_surprise();
        self.respond(turn).await
    }

    /// Record a user message and commit whatever it fills.
    pub fn accept_turn(&mut self, text: &str) -> AcceptedTurn {
        let text = text.trim();
        if text.is_empty() {
            return AcceptedTurn::canned(Vec::new());
        }

        let context_end = self.transcript.len();
        let prompt = if context_end == 0 {
            prompts::opener_prompt(text)
        } else {
            text.to_string()
        };
        self.transcript.push(ChatMessage::user(text));

        let mut transition = None;
        let mut generate = false;
        if !self.state.step.is_terminal() {
            let applied = self.state.apply_turn(text);
            tracing::debug!(
                "Extracted {:?} at step {}",
                applied.extracted,
                self.state.step
            );
            if self.generation_pending && !applied.ready_for_itinerary {
                tracing::info!("Retrying an itinerary request that was cut short");
            }
            generate = applied.ready_for_itinerary || self.generation_pending;
            self.set_state(applied.state.clone());
            transition = Some(applied);
        }
        self.generation_pending = generate;
        self.publish();

        AcceptedTurn {
            prompt: Some(prompt),
            canned: Vec::new(),
            context_end,
            transition,
            generate,
        }
    }

    /// Record a surprise request and store the chosen destination.
    pub fn accept_surprise(&mut self) -> AcceptedTurn {
        if self.state.step != ConversationStep::Destination {
            return AcceptedTurn::canned(vec![prompts::SURPRISE_UNAVAILABLE.to_string()]);
        }

        let (destination, hook) = pick_surprise();
        tracing::info!("Surprise destination: {}", destination);

        let context_end = self.transcript.len();
        self.transcript.push(ChatMessage::user(prompts::SURPRISE_REQUEST));
        let mut next = self.state.clone();
        if let Err(e) = next.choose_destination(destination) {
            tracing::warn!("Could not store surprise destination: {}", e);
        }
        self.set_state(next);
        self.publish();

        AcceptedTurn {
            prompt: Some(prompts::surprise_prompt(destination, hook)),
            canned: Vec::new(),
            context_end,
            transition: None,
            generate: false,
        }
    }

    /// Produce the replies owed for an accepted turn.
    ///
    /// Session state is only touched after the last await, so dropping this
    /// future keeps the accepted slots and loses only the replies.
    pub async fn respond(&mut self, turn: AcceptedTurn) -> TurnOutcome {
        let Some(prompt) = turn.prompt else {
            return TurnOutcome {
                messages: turn.canned,
                step: self.state.step,
                transition: turn.transition,
                itinerary: None,
            };
        };

        let reply = self.reply_or_apology(&prompt, turn.context_end).await;
        let mut messages = vec![reply];

        let mut generated = None;
        if turn.generate {
            let trip = self.state.trip.clone();
            messages.push(prompts::summary_message(&trip));
            match self.generate_itinerary(&trip).await {
                Ok(raw) => {
                    self.persist(&trip, &raw).await;
                    messages.push(prompts::ready_message(&trip, &raw));
                    let days = parse_for_trip(&trip, &raw);
                    generated = Some(GeneratedItinerary { raw, days });
                }
                Err(e) => {
                    tracing::warn!("Itinerary generation failed: {}", e);
                    messages.push(prompts::generation_apology(&trip));
                }
            }
        }

        self.transcript
            .extend(messages.iter().map(|r| ChatMessage::assistant(r.as_str())));
        if turn.generate {
            self.generation_pending = false;
            if generated.is_some() {
                let mut next = self.state.clone();
                match next.complete() {
                    Ok(_) => self.set_state(next),
                    Err(e) => tracing::warn!("Could not complete trip: {}", e),
                }
            }
        }
        self.publish();

        TurnOutcome {
            messages,
            step: self.state.step,
            transition: turn.transition,
            itinerary: generated,
        }
    }

    /// Forget the conversation and start over at the first step.
    pub fn reset(&mut self) {
        self.set_state(PlanningState::new());
        self.transcript.clear();
        self.generation_pending = false;
        self.publish();
    }

    fn set_state(&mut self, state: PlanningState) {
        if state.step != self.state.step {
            tracing::info!("Trip planning moved from {} to {}", self.state.step, state.step);
        }
        self.state = state;
    }

    fn publish(&self) {
        self.status_tx
            .send_replace(PlanningStatus::from_state(&self.state));
    }

    fn recent_context(&self, end: usize) -> &[ChatMessage] {
        let end = end.min(self.transcript.len());
        let skip = end.saturating_sub(self.config.context_turns);
        &self.transcript[skip..end]
    }

    async fn reply_or_apology(&self, prompt: &str, context_end: usize) -> String {
        match self.generate_reply(prompt, context_end).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("Reply generation failed: {}", e);
                prompts::REPLY_APOLOGY.to_string()
            }
        }
    }

    async fn generate_reply(&self, prompt: &str, context_end: usize) -> Result<String, LlmError> {
        let context = self.recent_context(context_end);
        let timeout = self.config.generation_timeout;
        let streamed = async {
            let stream = self.assistant.stream_reply(prompt, context).await?;
            collect_stream(stream).await
        };
        let reply = tokio::time::timeout(timeout, streamed)
            .await
            .map_err(|_| LlmError::Timeout(timeout))??;
        if reply.trim().is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: "assistant".to_string(),
                reason: "empty reply".to_string(),
            });
        }
        Ok(reply)
    }

    async fn generate_itinerary(&self, trip: &TripData) -> Result<String, LlmError> {
        tracing::info!(
            "Generating itinerary for {}",
            trip.destination.as_deref().unwrap_or_default()
        );
        let timeout = self.config.generation_timeout;
        let raw = tokio::time::timeout(timeout, self.assistant.generate_itinerary(trip))
            .await
            .map_err(|_| LlmError::Timeout(timeout))??;
        tracing::info!("Itinerary generated ({} bytes)", raw.len());
        Ok(raw)
    }

    /// Failures are logged; the itinerary is still shown to the traveler.
    async fn persist(&self, trip: &TripData, raw: &str) {
        let doc = StoredItinerary::new(trip, raw, Utc::now());
        if let Err(e) = self.store.save(&doc).await {
            tracing::warn!("Failed to persist itinerary: {}", e);
        }
    }
}

fn parse_for_trip(trip: &TripData, raw: &str) -> Vec<ParsedDay> {
    let total_days = trip.total_days().unwrap_or(0).min(MAX_TIMELINE_DAYS);
    itinerary::parse(raw, total_days)
}

fn pick_surprise() -> (&'static str, &'static str) {
    prompts::SURPRISE_DESTINATIONS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(("Kyoto, Japan", "ancient temples and cherry blossoms"))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::planner::model::{Pace, TravelStyle};
    use crate::store::LibSqlBackend;

    const KYOTO_ITINERARY: &str = "## Daily Itinerary\n\n### Day 1: Arrival\n**Morning (9-12)**\n- check in\n- breakfast\n\n### Day 2: Temples\n**Afternoon**\n- Fushimi Inari\n";

    #[derive(Default)]
    struct ScriptedAssistant {
        fail_reply: AtomicBool,
        fail_itinerary: AtomicBool,
        itinerary_delay_ms: AtomicU64,
        itinerary_calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
        context_lens: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl TravelAssistant for ScriptedAssistant {
        async fn generate_reply(
            &self,
            prompt: &str,
            prior_turns: &[ChatMessage],
        ) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.context_lens.lock().unwrap().push(prior_turns.len());
            if self.fail_reply.load(Ordering::SeqCst) {
                return Err(LlmError::RequestFailed {
                    provider: "scripted".into(),
                    reason: "offline".into(),
                });
            }
            Ok(format!("Sounds wonderful! ({prompt})"))
        }

        async fn generate_itinerary(&self, _trip: &TripData) -> Result<String, LlmError> {
            self.itinerary_calls.fetch_add(1, Ordering::SeqCst);
            let delay = self.itinerary_delay_ms.load(Ordering::SeqCst);
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            if self.fail_itinerary.load(Ordering::SeqCst) {
                return Err(LlmError::RateLimited {
                    provider: "scripted".into(),
                    retry_after: None,
                });
            }
            Ok(KYOTO_ITINERARY.to_string())
        }
    }

    async fn driver(
        assistant: &Arc<ScriptedAssistant>,
        config: SessionConfig,
    ) -> (ConversationDriver, ItineraryStore) {
        let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let store = ItineraryStore::new(db);
        let driver = ConversationDriver::new(assistant.clone(), store.clone(), config);
        (driver, store)
    }

    async fn at_style_step(driver: &mut ConversationDriver) {
        driver.handle_turn("I want to go to Kyoto, Japan").await;
        driver.handle_turn("7 days").await;
        driver.handle_turn("I want a relaxed trip").await;
        assert_eq!(driver.state().step, ConversationStep::Style);
    }

    #[tokio::test]
    async fn kyoto_scenario_generates_and_persists() {
        let assistant = Arc::new(ScriptedAssistant::default());
        let (mut driver, store) = driver(&assistant, SessionConfig::default()).await;

        let outcome = driver.handle_turn("I want to go to Kyoto, Japan").await;
        assert_eq!(outcome.step, ConversationStep::Duration);
        assert_eq!(
            driver.state().trip.destination.as_deref(),
            Some("Kyoto, Japan")
        );

        let outcome = driver.handle_turn("7 days").await;
        assert_eq!(outcome.step, ConversationStep::Pace);
        assert_eq!(driver.state().trip.duration.as_deref(), Some("7"));

        let outcome = driver.handle_turn("I want a relaxed trip").await;
        assert_eq!(outcome.step, ConversationStep::Style);
        assert_eq!(driver.state().trip.pace, Some(Pace::Relaxed));

        let outcome = driver.handle_turn("culture and food").await;
        assert_eq!(outcome.step, ConversationStep::Complete);
        assert!(outcome.transition.unwrap().ready_for_itinerary);
        assert_eq!(assistant.itinerary_calls.load(Ordering::SeqCst), 1);

        assert_eq!(outcome.messages.len(), 3);
        assert!(outcome.messages[1].contains("**Destination:** Kyoto, Japan"));
        assert!(outcome.messages[2].contains("itinerary is ready"));
        assert!(outcome.messages[2].contains("### Day 1: Arrival"));

        let generated = outcome.itinerary.unwrap();
        assert_eq!(generated.raw, KYOTO_ITINERARY);
        assert_eq!(generated.days.len(), 7);
        assert_eq!(generated.days[0].title, "Arrival");
        assert!(generated.days[6].is_placeholder());

        let stored = store.load().await.unwrap().unwrap();
        assert_eq!(stored.destination, "Kyoto, Japan");
        assert_eq!(stored.duration, "7");
        assert_eq!(stored.pace, "relaxed");
        assert_eq!(stored.styles, vec!["culture", "food"]);
        assert_eq!(stored.itinerary, KYOTO_ITINERARY);

        // 4 user turns, 1 + 1 + 1 + 3 assistant messages
        assert_eq!(driver.transcript().len(), 10);
    }

    #[tokio::test]
    async fn first_turn_is_wrapped_in_opener() {
        let assistant = Arc::new(ScriptedAssistant::default());
        let (mut driver, _) = driver(&assistant, SessionConfig::default()).await;

        driver.handle_turn("hello!").await;
        driver.handle_turn("visit Rome").await;

        let prompts = assistant.prompts.lock().unwrap().clone();
        assert!(prompts[0].starts_with("A traveler just said: \"hello!\""));
        assert_eq!(prompts[1], "visit Rome");
        assert_eq!(driver.transcript()[0].content, "hello!");
    }

    #[tokio::test]
    async fn reply_failure_still_extracts() {
        let assistant = Arc::new(ScriptedAssistant::default());
        assistant.fail_reply.store(true, Ordering::SeqCst);
        let (mut driver, _) = driver(&assistant, SessionConfig::default()).await;

        let outcome = driver.handle_turn("trip to Oslo").await;
        assert_eq!(outcome.messages, vec![prompts::REPLY_APOLOGY.to_string()]);
        assert_eq!(outcome.step, ConversationStep::Duration);
        assert_eq!(driver.state().trip.destination.as_deref(), Some("Oslo"));
    }

    #[tokio::test]
    async fn generation_failure_leaves_trip_pending() {
        let assistant = Arc::new(ScriptedAssistant::default());
        let (mut driver, store) = driver(&assistant, SessionConfig::default()).await;
        at_style_step(&mut driver).await;

        assistant.fail_itinerary.store(true, Ordering::SeqCst);
        let outcome = driver.handle_turn("culture and food").await;
        assert_eq!(outcome.step, ConversationStep::Style);
        assert!(outcome.itinerary.is_none());
        assert_eq!(outcome.messages.len(), 3);
        assert!(outcome.messages[2].contains("couldn't finish"));
        assert!(driver.state().trip.is_complete());
        assert!(store.load().await.unwrap().is_none());

        // A turn with no interests does not retry.
        driver.handle_turn("thanks").await;
        assert_eq!(assistant.itinerary_calls.load(Ordering::SeqCst), 1);

        // A style-bearing turn does.
        assistant.fail_itinerary.store(false, Ordering::SeqCst);
        let outcome = driver.handle_turn("some nature too").await;
        assert_eq!(outcome.step, ConversationStep::Complete);
        assert_eq!(assistant.itinerary_calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            driver.state().trip.styles,
            [TravelStyle::Culture, TravelStyle::Food, TravelStyle::Nature]
                .into_iter()
                .collect()
        );
        assert!(store.load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn generation_timeout_is_a_failure() {
        let assistant = Arc::new(ScriptedAssistant::default());
        assistant.itinerary_delay_ms.store(2_000, Ordering::SeqCst);
        let config = SessionConfig {
            generation_timeout: Duration::from_millis(50),
            ..SessionConfig::default()
        };
        let (mut driver, _) = driver(&assistant, config).await;
        at_style_step(&mut driver).await;

        let outcome = driver.handle_turn("food").await;
        assert_eq!(outcome.step, ConversationStep::Style);
        assert!(outcome.itinerary.is_none());
    }

    #[tokio::test]
    async fn dropped_response_keeps_extraction() {
        let assistant = Arc::new(ScriptedAssistant::default());
        assistant.itinerary_delay_ms.store(2_000, Ordering::SeqCst);
        let (mut driver, store) = driver(&assistant, SessionConfig::default()).await;
        at_style_step(&mut driver).await;
        let before_len = driver.transcript().len();

        let result =
            tokio::time::timeout(Duration::from_millis(50), driver.handle_turn("food")).await;
        assert!(result.is_err());

        assert_eq!(driver.state().step, ConversationStep::Style);
        assert_eq!(
            driver.state().trip.styles,
            [TravelStyle::Food].into_iter().collect()
        );
        // Only the user message made it in.
        assert_eq!(driver.transcript().len(), before_len + 1);
        assert_eq!(driver.transcript()[before_len].content, "food");
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn cut_short_generation_is_requested_again() {
        let assistant = Arc::new(ScriptedAssistant::default());
        assistant.itinerary_delay_ms.store(2_000, Ordering::SeqCst);
        let (mut driver, store) = driver(&assistant, SessionConfig::default()).await;
        at_style_step(&mut driver).await;

        let turn = driver.accept_turn("culture");
        assert!(turn.generates_itinerary());
        let result = tokio::time::timeout(Duration::from_millis(50), driver.respond(turn)).await;
        assert!(result.is_err());
        assert_eq!(assistant.itinerary_calls.load(Ordering::SeqCst), 1);

        // No interests named, but the earlier request is still owed.
        assistant.itinerary_delay_ms.store(0, Ordering::SeqCst);
        let turn = driver.accept_turn("thanks!");
        assert!(turn.generates_itinerary());
        let outcome = driver.respond(turn).await;
        assert_eq!(outcome.step, ConversationStep::Complete);
        assert!(outcome.itinerary.is_some());
        assert_eq!(assistant.itinerary_calls.load(Ordering::SeqCst), 2);
        assert!(store.load().await.unwrap().is_some());

        let turn = driver.accept_turn("see you");
        assert!(!turn.generates_itinerary());
    }

    #[tokio::test]
    async fn accepted_turn_is_visible_before_reply() {
        let assistant = Arc::new(ScriptedAssistant::default());
        let (mut driver, _) = driver(&assistant, SessionConfig::default()).await;
        let rx = driver.subscribe();

        let turn = driver.accept_turn("I want to go to Kyoto, Japan");
        assert_eq!(rx.borrow().step, ConversationStep::Duration);
        assert!(assistant.prompts.lock().unwrap().is_empty());

        let outcome = driver.respond(turn).await;
        assert_eq!(outcome.step, ConversationStep::Duration);
        assert!(outcome.transition.unwrap().advanced);
        assert_eq!(driver.transcript().len(), 2);
    }

    #[tokio::test]
    async fn reset_starts_over() {
        let assistant = Arc::new(ScriptedAssistant::default());
        let (mut driver, _) = driver(&assistant, SessionConfig::default()).await;
        at_style_step(&mut driver).await;
        let rx = driver.subscribe();

        driver.reset();
        assert_eq!(driver.state(), &PlanningState::new());
        assert!(driver.transcript().is_empty());
        assert_eq!(rx.borrow().step, ConversationStep::Destination);

        driver.handle_turn("hi again").await;
        let prompts = assistant.prompts.lock().unwrap().clone();
        assert!(prompts.last().unwrap().starts_with("A traveler just said"));
    }

    #[tokio::test]
    async fn blank_turn_is_ignored() {
        let assistant = Arc::new(ScriptedAssistant::default());
        let (mut driver, _) = driver(&assistant, SessionConfig::default()).await;

        let outcome = driver.handle_turn("   ").await;
        assert!(outcome.messages.is_empty());
        assert!(outcome.transition.is_none());
        assert!(driver.transcript().is_empty());
        assert!(assistant.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn completed_trip_only_chats() {
        let assistant = Arc::new(ScriptedAssistant::default());
        let (mut driver, _) = driver(&assistant, SessionConfig::default()).await;
        at_style_step(&mut driver).await;
        driver.handle_turn("culture").await;
        assert_eq!(driver.state().step, ConversationStep::Complete);

        let trip = driver.state().trip.clone();
        let outcome = driver.handle_turn("add some nightlife and a trip to Paris").await;
        assert_eq!(outcome.messages.len(), 1);
        assert!(outcome.transition.is_none());
        assert_eq!(driver.state().trip, trip);
        assert_eq!(assistant.itinerary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn context_is_limited_to_recent_turns() {
        let assistant = Arc::new(ScriptedAssistant::default());
        let config = SessionConfig {
            context_turns: 2,
            ..SessionConfig::default()
        };
        let (mut driver, _) = driver(&assistant, config).await;
        at_style_step(&mut driver).await;

        let lens = assistant.context_lens.lock().unwrap().clone();
        assert_eq!(lens, vec![0, 2, 2]);
    }

    #[tokio::test]
    async fn surprise_me_picks_listed_destination() {
        let assistant = Arc::new(ScriptedAssistant::default());
        let (mut driver, _) = driver(&assistant, SessionConfig::default()).await;

        let outcome = driver.surprise_me().await;
        assert_eq!(outcome.step, ConversationStep::Duration);
        let destination = driver.state().trip.destination.clone().unwrap();
        assert!(
            prompts::SURPRISE_DESTINATIONS
                .iter()
                .any(|(name, _)| *name == destination)
        );
        assert_eq!(driver.transcript()[0].content, prompts::SURPRISE_REQUEST);

        let outcome = driver.surprise_me().await;
        assert_eq!(outcome.messages, vec![prompts::SURPRISE_UNAVAILABLE.to_string()]);
        assert_eq!(driver.state().trip.destination.as_deref(), Some(destination.as_str()));
    }

    #[tokio::test]
    async fn status_is_published_after_commit() {
        let assistant = Arc::new(ScriptedAssistant::default());
        let (mut driver, _) = driver(&assistant, SessionConfig::default()).await;
        let rx = driver.subscribe();
        assert_eq!(rx.borrow().step, ConversationStep::Destination);

        driver.handle_turn("go to Lima").await;
        let status = rx.borrow().clone();
        assert_eq!(status.step, ConversationStep::Duration);
        assert_eq!(status.filled_slots, 1);
        assert_eq!(status.step_number, 2);
        assert_eq!(status.quick_options.len(), 3);
        assert!(status.render_text().contains("destination: Lima"));
    }
}
