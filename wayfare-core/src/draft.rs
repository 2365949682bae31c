//! Booking draft state machine.
//!
//! A draft is created once the passenger count is known and walks through
//! name → age → gender for every passenger, then one seat preference per
//! passenger, then the auto/manual seat-flow choice, seat assignment and
//! confirmation. Each [`Stage`] carries only what that step needs, and
//! [`advance`] is a pure `(draft, text) → (draft, reply, action)` step.
//! Anything that needs a collaborator (booked seats, persistence) is returned
//! as an [`Action`] for the engine to carry out, after which it feeds the
//! outcome back through [`BookingDraft::apply_auto_assignment`],
//! [`BookingDraft::apply_manual_seats`] or [`BookingDraft::confirm`].
//!
//! Invalid input never moves the cursor or the stage; it only re-prompts.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::AssistantError;
use crate::models::{
    Flight, Gender, Passenger, PassengerType, SeatPreference, SeatType, SeatZone, TravelClass,
};
use crate::text;

pub const MAX_PASSENGERS: usize = 20;

const CONFIRM_PATTERN: &str = r"^(confirm|yes|book|proceed|pay|checkout)$";
const AUTO_PATTERN: &str = r"\b(auto|auto-assign|auto assign|assign seats|assign them|assign)\b";
const MANUAL_PATTERN: &str =
    r"\b(manual|manually|i'?ll choose|i will choose|i'?ll pick|i will pick|choose myself|pick seats|choose seats|select seats|choose|pick)\b";
const OPEN_SELECTION_PATTERN: &str = r"\b(choose seats?|pick seats?|select seats?)\b";
const CHANGE_SEATS_PATTERN: &str = r"\b(change seats?|manual|manually|choose seats?|pick seats?)\b";

/// True for a bare confirmation keyword such as "confirm" or "pay".
pub fn is_confirmation(message: &str) -> bool {
    text::is_match(CONFIRM_PATTERN, &message.trim().to_lowercase())
}

// ============================================================================
// Session-level booking state
// ============================================================================

/// Where the session is in the booking flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BookingState {
    #[default]
    Idle,
    /// A flight is selected; waiting for the passenger count.
    AwaitingCount { flight: Flight },
    Drafting(BookingDraft),
}

impl BookingState {
    pub fn selected_flight(&self) -> Option<&Flight> {
        match self {
            BookingState::Idle => None,
            BookingState::AwaitingCount { flight } => Some(flight),
            BookingState::Drafting(draft) => Some(&draft.flight),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, BookingState::Idle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatFlow {
    Auto,
    Manual,
}

/// Current step of a draft. Indices point into `BookingDraft::passengers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Stage {
    CollectName { index: usize },
    CollectAge { index: usize },
    CollectGender { index: usize },
    CollectSeatPreferences { index: usize },
    CollectSeatFlow,
    /// Seats are held; waiting for an explicit confirmation.
    SeatAssignment { seats: Vec<String> },
    /// Waiting for the external seat-selection surface.
    CollectManualChoice,
    /// Confirmed and ready for payment.
    Completed {
        seats: Vec<String>,
        booking_id: Option<String>,
    },
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::CollectName { .. } => "collect_name",
            Stage::CollectAge { .. } => "collect_age",
            Stage::CollectGender { .. } => "collect_gender",
            Stage::CollectSeatPreferences { .. } => "collect_seat_preferences",
            Stage::CollectSeatFlow => "collect_seat_flow",
            Stage::SeatAssignment { .. } => "seat_assignment",
            Stage::CollectManualChoice => "collect_manual_choice",
            Stage::Completed { .. } => "completed",
        }
    }

    /// Passenger the stage is working on; zero once collection is over.
    pub fn index(&self) -> usize {
        match self {
            Stage::CollectName { index }
            | Stage::CollectAge { index }
            | Stage::CollectGender { index }
            | Stage::CollectSeatPreferences { index } => *index,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub flight: Flight,
    /// Fixed length for the lifetime of the draft.
    pub passengers: Vec<Passenger>,
    pub travel_class: TravelClass,
    pub seat_flow: Option<SeatFlow>,
    pub stage: Stage,
}

/// Side effect the engine must perform after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    /// Fetch booked seats, run the allocator, then `apply_auto_assignment`.
    AssignSeats,
    /// Hand off to the seat-selection surface.
    OpenSeatSelection,
    /// Persist if authenticated, then `confirm`.
    Confirm,
    /// Already confirmed; send the caller to payment again.
    OpenPayment,
}

#[derive(Debug, Clone)]
pub struct Step {
    pub draft: BookingDraft,
    pub reply: String,
    pub action: Action,
}

impl Step {
    fn reply(draft: BookingDraft, reply: impl Into<String>) -> Self {
        Self {
            draft,
            reply: reply.into(),
            action: Action::None,
        }
    }

    fn with(draft: BookingDraft, reply: impl Into<String>, action: Action) -> Self {
        Self {
            draft,
            reply: reply.into(),
            action,
        }
    }
}

impl BookingDraft {
    /// New draft for `count` passengers, each starting as an empty adult record.
    pub fn new(flight: Flight, count: usize) -> Self {
        Self {
            flight,
            passengers: vec![Passenger::default(); count],
            travel_class: TravelClass::Economy,
            seat_flow: None,
            stage: Stage::CollectName { index: 0 },
        }
    }

    pub fn expected_passengers(&self) -> usize {
        self.passengers.len()
    }

    pub fn current_index(&self) -> usize {
        self.stage.index()
    }

    pub fn selected_seats(&self) -> &[String] {
        match &self.stage {
            Stage::SeatAssignment { seats } | Stage::Completed { seats, .. } => seats,
            _ => &[],
        }
    }

    pub fn booking_id(&self) -> Option<&str> {
        match &self.stage {
            Stage::Completed { booking_id, .. } => booking_id.as_deref(),
            _ => None,
        }
    }

    pub fn ready_for_payment(&self) -> bool {
        matches!(self.stage, Stage::Completed { .. })
    }

    /// `price × passengers` once seats are held.
    pub fn total_amount(&self) -> Option<f64> {
        match self.stage {
            Stage::SeatAssignment { .. } | Stage::Completed { .. } => {
                Some(self.flight.fare_for(self.passengers.len()))
            }
            _ => None,
        }
    }

    /// `Err` carries the prompt for the first missing field.
    pub fn validate_complete(&self) -> Result<(), String> {
        if let Some(i) = self.passengers.iter().position(|p| !p.is_complete()) {
            let field = match &self.stage {
                Stage::CollectAge { .. } => "age",
                Stage::CollectGender { .. } => "gender",
                Stage::CollectName { .. } => "name",
                _ => missing_field(&self.passengers[i]),
            };
            let index = match &self.stage {
                Stage::CollectName { index } | Stage::CollectAge { index } | Stage::CollectGender { index } => *index,
                _ => i,
            };
            return Err(format!(
                "I still need complete details. We're at **{field}** for passenger #{}.",
                index + 1
            ));
        }
        Ok(())
    }

    /// Outcome of the seat allocator for an auto seat flow. `None` falls back
    /// to the manual hand-off.
    pub fn apply_auto_assignment(mut self, seats: Option<Vec<String>>) -> Step {
        match seats {
            Some(seats) if seats.len() == self.passengers.len() => {
                self.seat_flow = Some(SeatFlow::Auto);
                let listing = seat_listing(&self.passengers, &seats);
                self.stage = Stage::SeatAssignment { seats };
                let total = self.flight.fare_for(self.passengers.len());
                Step::reply(
                    self,
                    format!(
                        "I've assigned seats:\n{listing}\n\nTotal: **₹{}**\n\nReply **confirm** to proceed to payment, or **change seats** to pick manually.",
                        format_amount(total)
                    ),
                )
            }
            _ => {
                self.seat_flow = Some(SeatFlow::Manual);
                self.stage = Stage::CollectManualChoice;
                Step::reply(
                    self,
                    "I couldn't auto-assign seats for everyone. Reply **choose seats** to pick them yourself.",
                )
            }
        }
    }

    /// Seats picked on the seat-selection surface. Legal only in the manual
    /// flow before confirmation.
    pub fn apply_manual_seats(
        mut self,
        seats: &[String],
        booked: &[String],
    ) -> Result<Step, AssistantError> {
        let in_manual_flow = self.seat_flow == Some(SeatFlow::Manual)
            && matches!(
                self.stage,
                Stage::CollectManualChoice | Stage::SeatAssignment { .. }
            );
        if !in_manual_flow {
            return Err(AssistantError::InvalidSeats(format!(
                "seat selection is not open at stage {}",
                self.stage.name()
            )));
        }

        let seats: Vec<String> = seats.iter().map(|s| s.trim().to_uppercase()).collect();
        if seats.len() != self.passengers.len() {
            return Err(AssistantError::InvalidSeats(format!(
                "expected {} seat(s), got {}",
                self.passengers.len(),
                seats.len()
            )));
        }
        if seats.iter().any(|s| s.is_empty()) {
            return Err(AssistantError::InvalidSeats("empty seat identifier".to_string()));
        }
        let unique: HashSet<&String> = seats.iter().collect();
        if unique.len() != seats.len() {
            return Err(AssistantError::InvalidSeats("duplicate seats".to_string()));
        }
        let taken: Vec<String> = seats
            .iter()
            .filter(|s| booked.iter().any(|b| b.eq_ignore_ascii_case(s)))
            .cloned()
            .collect();
        if !taken.is_empty() {
            return Err(AssistantError::InvalidSeats(format!(
                "already booked: {}",
                taken.join(", ")
            )));
        }

        let listing = seat_listing(&self.passengers, &seats);
        self.stage = Stage::SeatAssignment { seats };
        let total = self.flight.fare_for(self.passengers.len());
        Ok(Step::reply(
            self,
            format!(
                "Seats saved:\n{listing}\n\nTotal: **₹{}**\n\nReply **confirm** to proceed to payment.",
                format_amount(total)
            ),
        ))
    }

    /// Mark the draft ready for payment. `booking_id` is `Some` when the
    /// engine persisted it for an authenticated caller.
    pub fn confirm(mut self, booking_id: Option<String>) -> Step {
        let seats = self.selected_seats().to_vec();
        let total = format_amount(self.flight.fare_for(self.passengers.len()));
        let reply = if booking_id.is_some() {
            format!("Booking created! Total: ₹{total}\nRedirecting to payment...")
        } else {
            format!("You're almost done. Total: ₹{total}\nPlease log in to complete payment. Redirecting to payment...")
        };
        self.stage = Stage::Completed { seats, booking_id };
        Step::with(self, reply, Action::OpenPayment)
    }

    pub fn view(&self) -> DraftView {
        DraftView {
            flight: self.flight.clone(),
            passenger_data: self.passengers.clone(),
            expected_passengers: self.expected_passengers(),
            current_index: self.current_index(),
            stage: self.stage.name().to_string(),
            travel_class: self.travel_class.as_str().to_string(),
            seat_flow: self.seat_flow,
            selected_seats: self.selected_seats().to_vec(),
            total_amount: self.total_amount(),
            ready_for_payment: self.ready_for_payment(),
            booking_id: self.booking_id().map(str::to_string),
        }
    }
}

/// Flat wire shape of a draft, as the UI consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftView {
    pub flight: Flight,
    pub passenger_data: Vec<Passenger>,
    pub expected_passengers: usize,
    pub current_index: usize,
    pub stage: String,
    pub travel_class: String,
    pub seat_flow: Option<SeatFlow>,
    pub selected_seats: Vec<String>,
    pub total_amount: Option<f64>,
    pub ready_for_payment: bool,
    pub booking_id: Option<String>,
}

// ============================================================================
// Transitions
// ============================================================================

/// Feed one user message into the draft.
pub fn advance(draft: BookingDraft, message: &str) -> Step {
    let message = message.trim();

    if is_confirmation(message) {
        return on_confirm(draft);
    }

    match draft.stage.clone() {
        Stage::CollectName { index } => collect_name(draft, index, message),
        Stage::CollectAge { index } => collect_age(draft, index, message),
        Stage::CollectGender { index } => collect_gender(draft, index, message),
        Stage::CollectSeatPreferences { index } => collect_seat_preference(draft, index, message),
        Stage::CollectSeatFlow => collect_seat_flow(draft, message),
        Stage::SeatAssignment { .. } => {
            if text::is_match(CHANGE_SEATS_PATTERN, &message.to_lowercase()) {
                open_manual_selection(draft)
            } else {
                Step::reply(
                    draft,
                    "Reply **confirm** to proceed to payment, or **change seats** to pick manually.",
                )
            }
        }
        Stage::CollectManualChoice => {
            if text::is_match(OPEN_SELECTION_PATTERN, &message.to_lowercase()) {
                open_manual_selection(draft)
            } else {
                Step::reply(draft, "Reply **choose seats** to open seat selection.")
            }
        }
        Stage::Completed { .. } => Step::reply(
            draft,
            "Your booking is ready for payment. Reply **pay** to continue, or **cancel** to discard it.",
        ),
    }
}

fn on_confirm(draft: BookingDraft) -> Step {
    if let Err(prompt) = draft.validate_complete() {
        return Step::reply(draft, prompt);
    }
    match draft.stage {
        Stage::CollectSeatPreferences { index } => {
            let prompt = seat_preference_prompt(&draft.passengers[index], index);
            Step::reply(draft, format!("Seat preferences first. {prompt}"))
        }
        Stage::CollectSeatFlow => Step::reply(draft, seat_flow_prompt()),
        Stage::CollectManualChoice => Step::reply(
            draft,
            "Please choose seats first. Reply **choose seats** to open seat selection.",
        ),
        Stage::SeatAssignment { .. } => Step::with(draft, String::new(), Action::Confirm),
        Stage::Completed { .. } => Step::with(draft, "Redirecting to payment...", Action::OpenPayment),
        // Unreachable once every passenger is complete.
        Stage::CollectName { .. } | Stage::CollectAge { .. } | Stage::CollectGender { .. } => {
            Step::reply(draft, seat_flow_prompt())
        }
    }
}

fn collect_name(mut draft: BookingDraft, index: usize, message: &str) -> Step {
    let Some(name) = extract_name(message) else {
        return Step::reply(
            draft,
            format!(
                "I didn't catch a valid name. Please type the full name for passenger #{} (e.g., \"Rahul Sharma\").",
                index + 1
            ),
        );
    };
    let reply = format!(
        "Got it, name: **{name}**. Now please provide age for passenger #{} (e.g., \"29\").",
        index + 1
    );
    draft.passengers[index].full_name = Some(name);
    draft.stage = Stage::CollectAge { index };
    Step::reply(draft, reply)
}

fn collect_age(mut draft: BookingDraft, index: usize, message: &str) -> Step {
    let Some(age) = extract_age(message) else {
        return Step::reply(
            draft,
            format!("Please provide a valid age (1-120) for passenger #{}.", index + 1),
        );
    };
    let passenger = &mut draft.passengers[index];
    passenger.age = Some(age);
    passenger.kind = PassengerType::from_age(age);
    draft.stage = Stage::CollectGender { index };
    Step::reply(
        draft,
        format!(
            "Age recorded: **{age}**. Now provide gender for passenger #{} (Male / Female / Other).",
            index + 1
        ),
    )
}

fn collect_gender(mut draft: BookingDraft, index: usize, message: &str) -> Step {
    let Some(gender) = extract_gender(message) else {
        return Step::reply(
            draft,
            format!(
                "Please reply with gender: **Male**, **Female**, or **Other** for passenger #{}.",
                index + 1
            ),
        );
    };
    draft.passengers[index].gender = Some(gender);

    let next = index + 1;
    if next < draft.passengers.len() {
        draft.stage = Stage::CollectName { index: next };
        return Step::reply(
            draft,
            format!("Recorded! Now please provide **full name** for passenger #{}.", next + 1),
        );
    }

    draft.stage = Stage::CollectSeatPreferences { index: 0 };
    let summary = draft
        .passengers
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "{}. **{}**, Age: {}, Gender: {}, Type: {}",
                i + 1,
                p.display_name(),
                p.age.map(|a| a.to_string()).unwrap_or_default(),
                p.gender.map(|g| g.as_str()).unwrap_or_default(),
                p.kind.as_str()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let prompt = seat_preference_prompt(&draft.passengers[0], 0);
    let reply = format!(
        "Thanks! I have details for all {} passenger(s):\n\n{summary}\n\nNow let's set **seat preferences**. {prompt}",
        draft.passengers.len()
    );
    Step::reply(draft, reply)
}

fn collect_seat_preference(mut draft: BookingDraft, index: usize, message: &str) -> Step {
    draft.passengers[index].seat_pref = extract_seat_preference(message);

    let next = index + 1;
    if next < draft.passengers.len() {
        let prompt = seat_preference_prompt(&draft.passengers[next], next);
        draft.stage = Stage::CollectSeatPreferences { index: next };
        return Step::reply(draft, format!("Got it! {prompt}"));
    }

    draft.stage = Stage::CollectSeatFlow;
    Step::reply(
        draft,
        format!("Perfect! I have seat preferences for all passengers.\n\n{}", seat_flow_prompt()),
    )
}

fn collect_seat_flow(mut draft: BookingDraft, message: &str) -> Step {
    let lower = message.to_lowercase();
    if text::is_match(AUTO_PATTERN, &lower) {
        draft.seat_flow = Some(SeatFlow::Auto);
        return Step::with(draft, String::new(), Action::AssignSeats);
    }
    if text::is_match(MANUAL_PATTERN, &lower) {
        draft.seat_flow = Some(SeatFlow::Manual);
        draft.stage = Stage::CollectManualChoice;
        return Step::reply(draft, "Okay, reply **choose seats** to open seat selection.");
    }
    Step::reply(
        draft,
        "Reply **auto** to auto-assign seats, or **manual** to choose yourself.",
    )
}

fn open_manual_selection(mut draft: BookingDraft) -> Step {
    draft.seat_flow = Some(SeatFlow::Manual);
    draft.stage = Stage::CollectManualChoice;
    let reply = format!(
        "Opening seat selection. Please choose {} seat(s).",
        draft.passengers.len()
    );
    Step::with(draft, reply, Action::OpenSeatSelection)
}

fn seat_preference_prompt(passenger: &Passenger, index: usize) -> String {
    format!(
        "For passenger #{} (**{}**), reply with `window`, `aisle`, `middle` or `no preference`, optionally with `front`, `back`, `near wings` or `near exit`.",
        index + 1,
        passenger.display_name()
    )
}

fn seat_flow_prompt() -> &'static str {
    "Would you like me to:\n1. **Auto-assign seats** based on preferences\n2. **Let you choose seats manually**\n\nReply `auto` or `manual`."
}

fn missing_field(p: &Passenger) -> &'static str {
    if p.full_name.is_none() {
        "name"
    } else if p.age.is_none() {
        "age"
    } else {
        "gender"
    }
}

fn seat_listing(passengers: &[Passenger], seats: &[String]) -> String {
    passengers
        .iter()
        .zip(seats)
        .map(|(p, s)| format!("{}: **{}**", p.display_name(), s))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whole amounts print without decimals.
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{:.0}", amount)
    } else {
        format!("{:.2}", amount)
    }
}

// ============================================================================
// Field extraction
// ============================================================================

/// Passenger count: a number 1-20 or a word one..five.
pub fn extract_passenger_count(message: &str) -> Option<usize> {
    let lower = message.to_lowercase();
    if let Some(n) = text::capture(r"\b(\d{1,2})\b", &lower, 1).and_then(|d| d.parse::<usize>().ok()) {
        return (1..=MAX_PASSENGERS).contains(&n).then_some(n);
    }
    match text::capture(r"\b(one|two|three|four|five)\b", &lower, 1)?.as_str() {
        "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        _ => None,
    }
}

pub fn extract_name(message: &str) -> Option<String> {
    let trimmed = message.trim();
    let raw = if let Some(caps) = text::captures(r"([A-Za-z][A-Za-z'.\-]+)\s+([A-Za-z'.\-]+)\s*\(", trimmed) {
        format!("{} {}", caps.get(1)?.as_deref()?, caps.get(2)?.as_deref()?)
    } else if let Some(caps) = text::captures(r"^([A-Za-z][A-Za-z'\-]*)\s+([A-Za-z][A-Za-z'\-]*)\b", trimmed) {
        format!("{} {}", caps.get(1)?.as_deref()?, caps.get(2)?.as_deref()?)
    } else {
        trimmed
            .split_whitespace()
            .next()?
            .chars()
            .filter(|c| c.is_ascii_alphabetic() || *c == '\'' || *c == '-')
            .collect()
    };

    let name = text::title_case(&raw);
    (name.chars().count() >= 2 && name.chars().any(|c| c.is_alphabetic())).then_some(name)
}

pub fn extract_age(message: &str) -> Option<u8> {
    let age: u32 = text::capture(r"\b(\d{1,3})\b", message, 1)?.parse().ok()?;
    (1..=120).contains(&age).then_some(age as u8)
}

/// Any token that starts "male", "female" or "other" (e.g. `m`, `fem`), or
/// non-binary.
pub fn extract_gender(message: &str) -> Option<Gender> {
    for token in message
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphabetic() && c != '-')
        .filter(|t| !t.is_empty())
    {
        if token == "nonbinary" || token == "non-binary" {
            return Some(Gender::Other);
        }
        for (word, gender) in [
            ("male", Gender::Male),
            ("female", Gender::Female),
            ("other", Gender::Other),
        ] {
            if word.starts_with(token) {
                return Some(gender);
            }
        }
    }
    None
}

/// Map free text to a seat preference; unmatched parts stay `no_pref`.
pub fn extract_seat_preference(message: &str) -> SeatPreference {
    let lower = message.to_lowercase();
    let mut pref = SeatPreference::default();

    if text::is_match(r"\b(window|win|wnd)\b", &lower) {
        pref.seat_type = SeatType::Window;
    }
    if text::is_match(r"\b(aisle|ais)\b", &lower) {
        pref.seat_type = SeatType::Aisle;
    }
    if text::is_match(r"\b(middle|mid)\b", &lower) {
        pref.seat_type = SeatType::Middle;
    }

    if text::is_match(r"\b(front|forward)\b", &lower) {
        pref.location = SeatZone::Front;
    }
    if text::is_match(r"\b(back|rear|rearward)\b", &lower) {
        pref.location = SeatZone::Back;
    }
    if text::is_match(r"\bwings?\b", &lower) {
        pref.location = SeatZone::NearWings;
    }
    if text::is_match(r"\bexit\b", &lower) {
        pref.location = SeatZone::NearExit;
    }
    pref
}
