//! Intent decoding.
//!
//! Every message is decoded into exactly one [`Intent`] by walking [`ROUTES`]
//! in priority order; the first route whose decoder returns `Some` wins.
//! While a booking is in progress only the global routes (greeting, reset,
//! cancel, suggestion) can preempt the booking flow, so "2" or "after 7pm"
//! typed mid-draft is never read as a selection or a filter.

use crate::filter;
use crate::text;

const GREETING_PATTERN: &str = r"^(hi|hello|hey)\b";
const RESET_PATTERN: &str = r"^(?:reset|start over|clear chat)(?:\s+(?:chat|session|everything|all))?\W*$";
const CANCEL_PATTERN: &str = r"\b(cancel booking|discard booking|clear booking|reset booking|cancel)\b";
const SUGGEST_PATTERN: &str =
    r"\b(what do you think|any suggestions?|recommend|which should i pick|help me choose|which is better)\b";
const BOOK_CODE_PATTERN: &str = r"\b(?:book|finali[sz]e|confirm)\b\s*(?:flight\s+)?([a-z0-9]{1,3}[- ]?\d{2,5})\b";
const BOOK_NUMBER_PATTERN: &str = r"^(?:book|finali[sz]e)?\s*#?\s*(\d{1,2})\s*$";
const ROUTE_PATTERN: &str = r"(?:\bfrom\s+|^)[a-z][a-z ]*?\s+(?:to|->|→)\s+[a-z]";
const SEARCH_PATTERN: &str = r"\b(find|search|new search|look for|another flight|different flight)\b";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    Reset,
    CancelBooking,
    Suggest,
    /// Message belongs to the passenger-count or draft flow.
    BookingFlow,
    /// Explicit "book <code>".
    BookByCode(String),
    /// 1-based position in the last result set.
    SelectIndex(usize),
    SelectCode(String),
    Filter,
    Search,
}

/// What the decoder may know about the session.
#[derive(Debug, Clone, Default)]
pub struct RoutingContext {
    pub result_codes: Vec<String>,
    pub awaiting_count: bool,
    pub in_draft: bool,
}

impl RoutingContext {
    pub fn has_results(&self) -> bool {
        !self.result_codes.is_empty()
    }

    fn mid_booking(&self) -> bool {
        self.awaiting_count || self.in_draft
    }
}

pub struct Route {
    pub name: &'static str,
    pub decode: fn(&str, &RoutingContext) -> Option<Intent>,
}

pub const ROUTES: &[Route] = &[
    Route {
        name: "greeting",
        decode: greeting,
    },
    Route {
        name: "reset",
        decode: reset,
    },
    Route {
        name: "cancel",
        decode: cancel,
    },
    Route {
        name: "suggest",
        decode: suggest,
    },
    Route {
        name: "booking_flow",
        decode: booking_flow,
    },
    Route {
        name: "book_by_number",
        decode: book_by_number,
    },
    Route {
        name: "book_by_code",
        decode: book_by_code,
    },
    Route {
        name: "results",
        decode: against_results,
    },
    Route {
        name: "search",
        decode: search,
    },
];

/// Decode `message` against the session's routing context.
pub fn decode(message: &str, ctx: &RoutingContext) -> Intent {
    let lower = message.trim().to_lowercase();
    ROUTES
        .iter()
        .find_map(|r| (r.decode)(&lower, ctx))
        .unwrap_or(Intent::Search)
}

fn greeting(msg: &str, _: &RoutingContext) -> Option<Intent> {
    text::is_match(GREETING_PATTERN, msg).then_some(Intent::Greeting)
}

fn reset(msg: &str, _: &RoutingContext) -> Option<Intent> {
    text::is_match(RESET_PATTERN, msg).then_some(Intent::Reset)
}

fn cancel(msg: &str, _: &RoutingContext) -> Option<Intent> {
    text::is_match(CANCEL_PATTERN, msg).then_some(Intent::CancelBooking)
}

fn suggest(msg: &str, _: &RoutingContext) -> Option<Intent> {
    text::is_match(SUGGEST_PATTERN, msg).then_some(Intent::Suggest)
}

fn booking_flow(_: &str, ctx: &RoutingContext) -> Option<Intent> {
    ctx.mid_booking().then_some(Intent::BookingFlow)
}

/// "book 2", "finalize #3": a position in the last results, not a code.
fn book_by_number(msg: &str, ctx: &RoutingContext) -> Option<Intent> {
    if !ctx.has_results() {
        return None;
    }
    text::capture(BOOK_NUMBER_PATTERN, msg, 1)
        .and_then(|n| n.parse().ok())
        .map(Intent::SelectIndex)
}

fn book_by_code(msg: &str, ctx: &RoutingContext) -> Option<Intent> {
    if !ctx.has_results() {
        return None;
    }
    let code = text::capture(BOOK_CODE_PATTERN, msg, 1)
        .filter(|c| c.chars().any(|ch| ch.is_ascii_alphabetic()))?;
    Some(Intent::BookByCode(code.replace(' ', "").to_uppercase()))
}

fn against_results(msg: &str, ctx: &RoutingContext) -> Option<Intent> {
    if !ctx.has_results() {
        return None;
    }

    // A bare number is always a pick, even out of range.
    if let Some(n) = text::capture(r"^#?(\d{1,3})\.?$", msg, 1).and_then(|n| n.parse().ok()) {
        return Some(Intent::SelectIndex(n));
    }

    if looks_like_route(msg) {
        return None;
    }

    if filter::has_directive(msg) {
        return Some(Intent::Filter);
    }

    for token in msg.split(|c: char| !c.is_ascii_alphanumeric() && c != '-') {
        if token.is_empty() {
            continue;
        }
        if let Some(code) = ctx.result_codes.iter().find(|c| c.eq_ignore_ascii_case(token)) {
            return Some(Intent::SelectCode(code.clone()));
        }
    }

    let leading = text::capture(r"^(?:option\s+|flight\s+|number\s+|#)?(\d{1,2})\b", msg, 1)
        .and_then(|n| n.parse::<usize>().ok())
        .filter(|n| (1..=ctx.result_codes.len()).contains(n));
    leading.map(Intent::SelectIndex)
}

fn search(_: &str, _: &RoutingContext) -> Option<Intent> {
    Some(Intent::Search)
}

/// True when the message reads as a request for a new route search.
pub fn looks_like_route(msg: &str) -> bool {
    text::is_match(ROUTE_PATTERN, msg) || text::is_match(SEARCH_PATTERN, msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_results() -> RoutingContext {
        RoutingContext {
            result_codes: vec!["6E201".into(), "AI540".into(), "SG102".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_route_order_is_stable() {
        let names: Vec<_> = ROUTES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "greeting",
                "reset",
                "cancel",
                "suggest",
                "booking_flow",
                "book_by_number",
                "book_by_code",
                "results",
                "search"
            ]
        );
    }

    #[test]
    fn test_global_routes_preempt_booking_flow() {
        let ctx = RoutingContext {
            in_draft: true,
            ..with_results()
        };
        assert_eq!(decode("Hello there", &ctx), Intent::Greeting);
        assert_eq!(decode("start over", &ctx), Intent::Reset);
        assert_eq!(decode("please cancel", &ctx), Intent::CancelBooking);
        assert_eq!(decode("reset booking", &ctx), Intent::CancelBooking);
        assert_eq!(decode("what do you think?", &ctx), Intent::Suggest);
    }

    #[test]
    fn test_booking_flow_guard_blocks_selection_and_filters() {
        let ctx = RoutingContext {
            in_draft: true,
            ..with_results()
        };
        assert_eq!(decode("2", &ctx), Intent::BookingFlow);
        assert_eq!(decode("after 7pm", &ctx), Intent::BookingFlow);
        assert_eq!(decode("book AI540", &ctx), Intent::BookingFlow);

        let ctx = RoutingContext {
            awaiting_count: true,
            ..with_results()
        };
        assert_eq!(decode("3", &ctx), Intent::BookingFlow);
    }

    #[test]
    fn test_selection_against_results() {
        let ctx = with_results();
        assert_eq!(decode("1", &ctx), Intent::SelectIndex(1));
        assert_eq!(decode("9", &ctx), Intent::SelectIndex(9));
        assert_eq!(decode("sg102 please", &ctx), Intent::SelectCode("SG102".into()));
        assert_eq!(decode("option 2", &ctx), Intent::SelectIndex(2));
        assert_eq!(decode("book ai540", &ctx), Intent::BookByCode("AI540".into()));
    }

    #[test]
    fn test_book_by_number_selects_position() {
        let ctx = with_results();
        assert_eq!(decode("book 2", &ctx), Intent::SelectIndex(2));
        assert_eq!(decode("finalize #3", &ctx), Intent::SelectIndex(3));
        assert_eq!(decode("Finalise 1", &ctx), Intent::SelectIndex(1));
        assert_eq!(decode("book 12", &ctx), Intent::SelectIndex(12));
        assert_eq!(decode("book 6E201", &ctx), Intent::BookByCode("6E201".into()));
        assert_eq!(decode("book 2", &RoutingContext::default()), Intent::Search);
    }

    #[test]
    fn test_filters_need_results() {
        assert_eq!(decode("cheapest", &with_results()), Intent::Filter);
        assert_eq!(decode("evening flights", &with_results()), Intent::Filter);
        assert_eq!(decode("cheapest", &RoutingContext::default()), Intent::Search);
        assert_eq!(decode("1", &RoutingContext::default()), Intent::Search);
    }

    #[test]
    fn test_new_route_is_a_search_even_with_results() {
        let ctx = with_results();
        assert_eq!(decode("flights from mumbai to goa tomorrow", &ctx), Intent::Search);
        assert_eq!(decode("find cheap flights to goa", &ctx), Intent::Search);
        assert_eq!(decode("chennai to delhi today", &ctx), Intent::Search);
    }
}
