//! Dialogue engine.
//!
//! One call to [`DialogueEngine::handle_message`] is one turn. The turn holds
//! the session's lock from start to finish and works on a copy of the
//! session; the copy is committed only if every collaborator call succeeded,
//! so a failed lookup leaves the conversation exactly where it was.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::advice;
use crate::catalog::LayoutCatalog;
use crate::city::CityResolver;
use crate::config::AssistantConfig;
use crate::dates;
use crate::draft::{self, Action, BookingDraft, BookingState, DraftView, Step};
use crate::error::{AssistantError, StoreError};
use crate::filter;
use crate::help::{HelpContext, HelpResponder, SYSTEM_PROMPT};
use crate::intent::{self, Intent, RoutingContext};
use crate::models::{BookingRecord, City, Flight, NewBooking, PaymentStatus, SearchContext, Session};
use crate::seats;
use crate::services::{BookingStore, FlightLookup};
use crate::session_store::SessionStore;
use crate::text;

/// Flights shown per listing.
pub const MAX_LISTED: usize = 8;

const WELCOME: &str = "Hey! I'm Wayfare, your travel buddy. Tell me where you'd like to go (e.g. 'Flights from Chennai to Delhi this Sunday').";
const CLARIFY: &str = "I couldn't detect both origin and destination. Maybe a small typo? Try: 'Flights from Chennai to Kolkata on Sunday'. You can also type airport codes like BLR or DEL.";
const ASK_COUNT: &str = "How many passengers are traveling? Please reply with a number (e.g., \"2\" or \"3\").";

/// Words never taken for a city when pulling places out of a sentence.
const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "any", "some", "from", "to", "on", "for", "in", "at", "by", "of", "i",
    "me", "my", "we", "us", "our", "want", "need", "would", "like", "please", "show", "find",
    "search", "book", "get", "go", "going", "fly", "flying", "travel", "trip", "flight", "flights",
    "ticket", "tickets", "cheap", "cheapest", "this", "next", "today", "tomorrow", "tonight",
    "morning", "evening", "night", "after", "before", "under", "below", "monday", "tuesday",
    "wednesday", "thursday", "friday", "saturday", "sunday", "what", "with", "there", "can", "you",
    "look", "new", "another", "different", "one", "way", "return",
];

/// Identity supplied by an upstream auth layer for this turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
}

impl AuthUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Navigation {
    pub path: String,
    pub state: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub reply: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigate_to: Option<Navigation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_draft: Option<DraftView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_count: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentOutcome {
    pub reply: String,
    pub booking: BookingRecord,
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub lookup_timeout: Duration,
    pub help_history_turns: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&AssistantConfig::default())
    }
}

impl From<&AssistantConfig> for EngineSettings {
    fn from(config: &AssistantConfig) -> Self {
        Self {
            lookup_timeout: Duration::from_secs(config.lookup_timeout_seconds),
            help_history_turns: config.llm_history_turns,
        }
    }
}

/// Reply parts produced by one handler.
#[derive(Default)]
struct Answer {
    reply: String,
    navigate_to: Option<Navigation>,
    booking_draft: Option<DraftView>,
    results_count: Option<usize>,
}

impl Answer {
    fn text(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            ..Default::default()
        }
    }

    fn with_draft(reply: impl Into<String>, draft: &BookingDraft) -> Self {
        Self {
            reply: reply.into(),
            booking_draft: Some(draft.view()),
            ..Default::default()
        }
    }
}

pub struct DialogueEngine {
    resolver: CityResolver,
    layouts: LayoutCatalog,
    flights: Arc<dyn FlightLookup>,
    bookings: Arc<dyn BookingStore>,
    sessions: Arc<dyn SessionStore>,
    help: Option<Arc<dyn HelpResponder>>,
    settings: EngineSettings,
}

impl DialogueEngine {
    pub fn new(
        resolver: CityResolver,
        layouts: LayoutCatalog,
        flights: Arc<dyn FlightLookup>,
        bookings: Arc<dyn BookingStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            resolver,
            layouts,
            flights,
            bookings,
            sessions,
            help: None,
            settings: EngineSettings::default(),
        }
    }

    pub fn with_help(mut self, help: Arc<dyn HelpResponder>) -> Self {
        self.help = Some(help);
        self
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    pub fn flights_backend(&self) -> &str {
        self.flights.name()
    }

    pub fn bookings_backend(&self) -> &str {
        self.bookings.name()
    }

    pub fn help_enabled(&self) -> bool {
        self.help.is_some()
    }

    // ========================================================================
    // Turns
    // ========================================================================

    pub async fn handle_message(
        &self,
        session_id: Option<&str>,
        message: &str,
        user: Option<&AuthUser>,
    ) -> Result<Reply, AssistantError> {
        let handle = self.sessions.get_or_create(session_id).await;
        let mut guard = handle.lock().await;
        let id = guard.id.clone();
        let message = message.trim();

        let mut work: Session = (*guard).clone();
        work.push_user(message);

        let intent = intent::decode(message, &routing_context(&work));
        debug!(session_id = %id, ?intent, "Routing message");

        if intent == Intent::Reset {
            drop(guard);
            self.sessions.delete(&id).await;
            info!(session_id = %id, "Session reset");
            return Ok(Reply {
                reply: "All set, I cleared the session. Ready when you are!".to_string(),
                session_id: id,
                navigate_to: None,
                booking_draft: None,
                results_count: None,
            });
        }

        let answer = match intent {
            Intent::Greeting => Ok(Answer::text(WELCOME)),
            Intent::CancelBooking => Ok(self.cancel(&mut work)),
            Intent::Suggest => Ok(self.suggest(&work)),
            Intent::BookingFlow => self.booking_flow(&mut work, message, user).await,
            Intent::BookByCode(code) => self.book_by_code(&mut work, &code).await,
            Intent::SelectIndex(n) => Ok(self.select_index(&mut work, n)),
            Intent::SelectCode(code) => Ok(self.select_code(&mut work, &code)),
            Intent::Filter => Ok(self.filter(&mut work, message)),
            Intent::Search | Intent::Reset => self.search(&mut work, message).await,
        };

        let answer = match answer {
            Ok(a) => a,
            Err(e) => {
                error!(session_id = %id, error = %e, "Turn failed; session left unchanged");
                return Err(e);
            }
        };

        work.push_assistant(&answer.reply);
        work.last_active_at = Utc::now();
        *guard = work;
        drop(guard);
        self.sessions.touch(&id).await;

        Ok(Reply {
            reply: answer.reply,
            session_id: id,
            navigate_to: answer.navigate_to,
            booking_draft: answer.booking_draft,
            results_count: answer.results_count,
        })
    }

    /// Seats chosen on the seat-selection surface for a manual seat flow.
    pub async fn submit_seats(
        &self,
        session_id: &str,
        seats: &[String],
    ) -> Result<Reply, AssistantError> {
        let handle = self
            .sessions
            .get(session_id)
            .await
            .ok_or_else(|| AssistantError::SessionNotFound(session_id.to_string()))?;
        let mut guard = handle.lock().await;
        let mut work: Session = (*guard).clone();

        let BookingState::Drafting(draft) = std::mem::take(&mut work.booking) else {
            return Err(AssistantError::NoDraft(session_id.to_string()));
        };
        let booked = self
            .call(self.bookings.list_booked_seats(&draft.flight.id))
            .await?;
        let step = draft.apply_manual_seats(seats, &booked)?;

        let answer = Answer::with_draft(step.reply, &step.draft);
        work.booking = BookingState::Drafting(step.draft);
        work.push_assistant(&answer.reply);
        work.last_active_at = Utc::now();
        *guard = work;
        drop(guard);
        self.sessions.touch(session_id).await;

        info!(session_id = %session_id, seats = seats.len(), "Manual seats saved");
        Ok(Reply {
            reply: answer.reply,
            session_id: session_id.to_string(),
            navigate_to: None,
            booking_draft: answer.booking_draft,
            results_count: None,
        })
    }

    /// Settle payment for a confirmed draft and close the session.
    pub async fn confirm_payment(
        &self,
        session_id: &str,
        payment_result: Option<serde_json::Value>,
        user: Option<&AuthUser>,
    ) -> Result<PaymentOutcome, AssistantError> {
        let handle = self
            .sessions
            .get(session_id)
            .await
            .ok_or_else(|| AssistantError::NoDraft(session_id.to_string()))?;
        let guard = handle.lock().await;

        let draft = match &guard.booking {
            BookingState::Drafting(d) if d.ready_for_payment() => d.clone(),
            _ => return Err(AssistantError::NoDraft(session_id.to_string())),
        };

        let booking = match (draft.booking_id(), user) {
            (Some(booking_id), _) => {
                self.call(self.bookings.update_payment_status(
                    booking_id,
                    PaymentStatus::Paid,
                    payment_result,
                ))
                .await?
            }
            (None, None) => return Err(AssistantError::Unauthorized),
            (None, Some(user)) => {
                let payload = new_booking(&draft, &user.id, PaymentStatus::Paid, payment_result);
                let id = self.call(self.bookings.create_booking(payload)).await?;
                self.call(self.bookings.get_booking(&id))
                    .await?
                    .ok_or_else(|| StoreError::NotFound(format!("booking {}", id)))?
            }
        };

        drop(guard);
        self.sessions.delete(session_id).await;
        info!(session_id = %session_id, booking_id = %booking.id, "Payment confirmed");

        Ok(PaymentOutcome {
            reply: "Payment confirmed. Booking completed.".to_string(),
            booking,
        })
    }

    /// Evict sessions idle for longer than `ttl`.
    pub async fn evict_idle(&self, ttl: chrono::Duration) -> usize {
        self.sessions.evict_idle(Utc::now(), ttl).await
    }

    // ========================================================================
    // Handlers
    // ========================================================================

    fn cancel(&self, work: &mut Session) -> Answer {
        work.clear_booking();
        Answer::text("Alright, booking cancelled. Want me to search again or suggest something else?")
    }

    fn suggest(&self, work: &Session) -> Answer {
        let Some(advice) = advice::suggest(&work.last_search_results) else {
            return Answer::text(
                "Not searching anything right now. Tell me a route (for example: 'Flights from Chennai to Kolkata tomorrow'), and I'll suggest the best options.",
            );
        };

        let mut parts = Vec::new();
        if let Some(f) = advice.cheapest {
            parts.push(format!("Cheapest: {}", describe(f)));
        }
        if let Some(f) = advice.earliest {
            parts.push(format!("Earliest: {}", describe(f)));
        }
        if let Some(f) = advice.balanced {
            parts.push(format!("Best balance of price and timing: {}", describe(f)));
        }
        Answer::text(format!(
            "Here are my suggestions:\n{}\n\nSay 'show cheapest' or 'show earliest' to reorder the list, or reply with a number to pick.",
            parts.join("\n")
        ))
    }

    async fn booking_flow(
        &self,
        work: &mut Session,
        message: &str,
        user: Option<&AuthUser>,
    ) -> Result<Answer, AssistantError> {
        match std::mem::take(&mut work.booking) {
            BookingState::AwaitingCount { flight } => match draft::extract_passenger_count(message) {
                Some(count) => {
                    let draft = BookingDraft::new(flight, count);
                    let answer = Answer::with_draft(
                        format!(
                            "Great, I'll collect details for {count} passenger(s). Let's start with passenger #1: please provide the full name."
                        ),
                        &draft,
                    );
                    work.booking = BookingState::Drafting(draft);
                    Ok(answer)
                }
                None => {
                    work.booking = BookingState::AwaitingCount { flight };
                    Ok(Answer::text(ASK_COUNT))
                }
            },
            BookingState::Drafting(current) => {
                let step = draft::advance(current, message);
                let (step, navigate_to) = self.run_action(step, user).await?;
                let mut answer = Answer::with_draft(step.reply, &step.draft);
                answer.navigate_to = navigate_to;
                work.booking = BookingState::Drafting(step.draft);
                Ok(answer)
            }
            BookingState::Idle => self.search(work, message).await,
        }
    }

    /// Carry out the side effect a draft step asked for.
    async fn run_action(
        &self,
        step: Step,
        user: Option<&AuthUser>,
    ) -> Result<(Step, Option<Navigation>), AssistantError> {
        match step.action {
            Action::None => Ok((step, None)),
            Action::AssignSeats => {
                let draft = step.draft;
                let booked = self
                    .call(self.bookings.list_booked_seats(&draft.flight.id))
                    .await?;
                let assigned = seats::assign_seats(
                    &draft.flight,
                    &draft.passengers,
                    &booked,
                    draft.travel_class,
                    &self.layouts,
                );
                if assigned.is_none() {
                    warn!(flight = %draft.flight.flight_number, passengers = draft.passengers.len(), "Seat allocation exhausted; falling back to manual");
                }
                Ok((draft.apply_auto_assignment(assigned), None))
            }
            Action::OpenSeatSelection => {
                let view = step.draft.view();
                let nav = Navigation {
                    path: "/seat-booking".to_string(),
                    state: serde_json::json!({
                        "flight": view.flight,
                        "travelClass": view.travel_class,
                        "passengerData": view.passenger_data,
                        "selectedSeats": view.selected_seats,
                        "allowManualSelect": true,
                        "booking": view,
                    }),
                };
                Ok((step, Some(nav)))
            }
            Action::Confirm => {
                let draft = step.draft;
                let booking_id = match user {
                    Some(user) => {
                        let payload = new_booking(&draft, &user.id, PaymentStatus::Pending, None);
                        let id = self.call(self.bookings.create_booking(payload)).await?;
                        info!(booking_id = %id, user_id = %user.id, "Booking persisted on confirmation");
                        Some(id)
                    }
                    None => None,
                };
                let step = draft.confirm(booking_id);
                let nav = payment_navigation(&step.draft);
                Ok((step, Some(nav)))
            }
            Action::OpenPayment => {
                let nav = payment_navigation(&step.draft);
                Ok((step, Some(nav)))
            }
        }
    }

    async fn book_by_code(&self, work: &mut Session, code: &str) -> Result<Answer, AssistantError> {
        if let Some(flight) = find_in(&work.last_search_results, code) {
            return Ok(select(work, flight));
        }

        match self.call(self.flights.find_by_code(code)).await? {
            Some(flight) => {
                if work.context.from_city.is_none() {
                    work.context.from_city =
                        Some(self.city_for(&flight.departure_city_code, flight.departure_city.as_deref()));
                }
                if work.context.to_city.is_none() {
                    work.context.to_city =
                        Some(self.city_for(&flight.arrival_city_code, flight.arrival_city.as_deref()));
                }
                Ok(select(work, flight))
            }
            None => Ok(Answer::text(format!(
                "I couldn't find that exact flight in your recent search. Here are your last results:\n\n{}\n\nReply with the number or the flight code to select.",
                format_flights(&work.last_search_results)
            ))),
        }
    }

    fn select_index(&self, work: &mut Session, n: usize) -> Answer {
        match n.checked_sub(1).and_then(|i| work.last_search_results.get(i)).cloned() {
            Some(flight) => select(work, flight),
            None => Answer::text(format!(
                "I couldn't find that entry number in your recent results. Reply with the number shown in the list (e.g., \"1\").\n\n{}",
                format_flights(&work.last_search_results)
            )),
        }
    }

    fn select_code(&self, work: &mut Session, code: &str) -> Answer {
        match find_in(&work.last_search_results, code) {
            Some(flight) => select(work, flight),
            None => self.select_index(work, 0),
        }
    }

    fn filter(&self, work: &mut Session, message: &str) -> Answer {
        let filtered = filter::apply_filters(&work.last_search_results, message);
        if filtered.is_empty() {
            return Answer::text(
                "No flights matched that filter. Your previous results are still available; try a different filter or reply with a number to pick.",
            );
        }
        let reply = format!("Here are filtered flights:\n\n{}", format_flights(&filtered));
        let count = filtered.len();
        work.last_search_results = filtered;
        Answer {
            results_count: Some(count),
            ..Answer::text(reply)
        }
    }

    async fn search(&self, work: &mut Session, message: &str) -> Result<Answer, AssistantError> {
        let date = dates::parse_relative_date(message);
        let (from, to) = self.extract_route(message, &work.context);

        let (Some(from), Some(to)) = (from, to) else {
            return Ok(Answer::text(self.clarify(work, message).await));
        };

        let flights = self.call(self.flights.find_by_route(&from.iata, &to.iata)).await?;
        info!(from = %from.iata, to = %to.iata, results = flights.len(), "Route search");

        if flights.is_empty() {
            return Ok(Answer::text(format!(
                "I couldn't find any flights from {} to {}. Want me to try a different date or a nearby airport?",
                from.city, to.city
            )));
        }

        let reply = format!(
            "Found {} flights from {} to {}{}.\n\n{}\n\nReply with the number to select, or say 'sort by cheapest' or 'show evening flights after 7pm'.",
            flights.len(),
            from.city,
            to.city,
            date.as_deref().map(|d| format!(" on {}", d)).unwrap_or_default(),
            format_flights(&flights)
        );
        let count = flights.len();
        work.context = SearchContext {
            from_city: Some(from),
            to_city: Some(to),
            date,
        };
        work.last_search_results = flights;
        work.clear_booking();

        Ok(Answer {
            results_count: Some(count),
            ..Answer::text(reply)
        })
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Origin and destination from `message`, falling back to the previous
    /// search for whichever side is missing.
    fn extract_route(&self, message: &str, context: &SearchContext) -> (Option<City>, Option<City>) {
        let lower = message.to_lowercase();
        let mut from = None;
        let mut to = None;

        let pair = text::captures(r"\bfrom\s+([a-z][a-z .]*?)\s+(?:to|->|→)\s+([a-z][a-z .]*)", &lower)
            .or_else(|| text::captures(r"([a-z][a-z .]*?)\s+(?:to|->|→)\s+([a-z][a-z .]*)", &lower));
        if let Some(caps) = pair {
            from = caps
                .get(1)
                .and_then(|s| s.as_deref())
                .and_then(|s| self.resolve_phrase(s));
            to = caps
                .get(2)
                .and_then(|s| s.as_deref())
                .and_then(|s| self.resolve_phrase(s));
        }

        let from = from.or_else(|| context.from_city.clone());
        let to = to.or_else(|| context.to_city.clone());
        if from.is_some() && to.is_some() {
            return (from, to);
        }

        // Pull city-like tokens out of the sentence.
        let found: Vec<City> = lower
            .split(|c: char| !c.is_alphabetic())
            .filter(|t| t.len() >= 3 && !STOPWORDS.contains(t))
            .take(12)
            .filter_map(|t| self.resolve_known(t))
            .collect();

        let from = from.or_else(|| found.first().cloned());
        let to = to.or_else(|| {
            found
                .iter()
                .find(|c| from.as_ref().map_or(true, |f| f.iata != c.iata))
                .cloned()
        });
        (from, to)
    }

    /// Resolve one side of "X to Y" after dropping filler words.
    fn resolve_phrase(&self, raw: &str) -> Option<City> {
        let words: Vec<&str> = raw
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| !w.is_empty() && !STOPWORDS.contains(w))
            .collect();
        if words.is_empty() {
            return None;
        }
        self.resolver.resolve(&words.join(" "))
    }

    /// Like `resolve`, but only accepts cities the catalog knows.
    fn resolve_known(&self, token: &str) -> Option<City> {
        self.resolver
            .resolve(token)
            .filter(|c| self.resolver.catalog().by_code(&c.iata).is_some())
    }

    fn city_for(&self, code: &str, name: Option<&str>) -> City {
        self.resolver
            .catalog()
            .by_code(code)
            .cloned()
            .unwrap_or_else(|| City::new(name.unwrap_or(code), code.to_uppercase()))
    }

    async fn clarify(&self, work: &Session, message: &str) -> String {
        let Some(help) = &self.help else {
            return CLARIFY.to_string();
        };

        let history = work
            .history
            .iter()
            .rev()
            .skip(1)
            .take(self.settings.help_history_turns)
            .rev()
            .cloned()
            .collect();
        let context = HelpContext {
            history,
            last_results: work.last_search_results.len(),
        };

        match tokio::time::timeout(
            self.settings.lookup_timeout,
            help.ask(SYSTEM_PROMPT, message, &context),
        )
        .await
        {
            Ok(Ok(Some(text))) => text,
            Ok(Ok(None)) => CLARIFY.to_string(),
            Ok(Err(e)) => {
                warn!(responder = help.name(), error = %e, "Help responder failed; using canned reply");
                CLARIFY.to_string()
            }
            Err(_) => {
                warn!(responder = help.name(), "Help responder timed out; using canned reply");
                CLARIFY.to_string()
            }
        }
    }

    /// Run a collaborator call under the lookup timeout.
    async fn call<T, F>(&self, fut: F) -> Result<T, AssistantError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.settings.lookup_timeout, fut).await {
            Ok(result) => result.map_err(AssistantError::from),
            Err(_) => Err(StoreError::Timeout(self.settings.lookup_timeout.as_secs()).into()),
        }
    }
}

fn routing_context(session: &Session) -> RoutingContext {
    RoutingContext {
        result_codes: session
            .last_search_results
            .iter()
            .map(|f| f.flight_number.clone())
            .collect(),
        awaiting_count: matches!(session.booking, BookingState::AwaitingCount { .. }),
        in_draft: session.draft().is_some(),
    }
}

fn find_in(results: &[Flight], code: &str) -> Option<Flight> {
    results
        .iter()
        .find(|f| f.flight_number.eq_ignore_ascii_case(code))
        .cloned()
}

fn select(work: &mut Session, flight: Flight) -> Answer {
    let reply = format!(
        "You selected ✈️ {} {}. How many passengers? Reply with a number, and I'll collect details one-by-one.",
        flight.airline, flight.flight_number
    );
    work.booking = BookingState::AwaitingCount { flight };
    Answer::text(reply)
}

fn new_booking(
    draft: &BookingDraft,
    user_id: &str,
    status: PaymentStatus,
    payment: Option<serde_json::Value>,
) -> NewBooking {
    NewBooking {
        user_id: user_id.to_string(),
        flight_id: draft.flight.id.clone(),
        passengers: draft.passengers.clone(),
        selected_seats: draft.selected_seats().to_vec(),
        total_amount: draft
            .total_amount()
            .unwrap_or_else(|| draft.flight.fare_for(draft.passengers.len())),
        travel_class: draft.travel_class,
        payment_status: status,
        payment,
    }
}

fn payment_navigation(draft: &BookingDraft) -> Navigation {
    Navigation {
        path: "/payment".to_string(),
        state: serde_json::json!({ "booking": draft.view() }),
    }
}

fn price_label(flight: &Flight) -> String {
    flight
        .price
        .map(|p| format!("₹{}", draft::format_amount(p)))
        .unwrap_or_else(|| "₹N/A".to_string())
}

fn describe(flight: &Flight) -> String {
    format!(
        "✈️ {} {} at {} ({})",
        flight.airline,
        flight.flight_number,
        flight.departure_time,
        price_label(flight)
    )
}

/// Numbered listing of at most [`MAX_LISTED`] flights.
pub fn format_flights(flights: &[Flight]) -> String {
    if flights.is_empty() {
        return "No flights found.".to_string();
    }
    flights
        .iter()
        .take(MAX_LISTED)
        .enumerate()
        .map(|(i, f)| {
            format!(
                "{}. ✈️ {} {}\n   {} → {}\n   {}",
                i + 1,
                f.airline,
                f.flight_number,
                f.departure_time,
                f.arrival_time,
                price_label(f)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
