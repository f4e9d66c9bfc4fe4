//! Signal extraction from raw draw announcements.
//!
//! Every function here is pure: it takes the announcement text and returns an
//! optional structured value. Absence of a marker is never an error, callers
//! treat `None` (or `false`) as "no signal".

use std::sync::OnceLock;

use regex::Regex;

/// Word characters for the standalone-letter check: letters, digits, underscore.
const WORD_CHARS: &str = r"\p{L}\p{N}_";

static GAME_NUMBER: OnceLock<Regex> = OnceLock::new();
static FIRST_GROUP: OnceLock<Regex> = OnceLock::new();
static CARD_TOKEN: OnceLock<Regex> = OnceLock::new();
static QUEEN_CARD: OnceLock<Regex> = OnceLock::new();
static JACK: OnceLock<Regex> = OnceLock::new();
static KING: OnceLock<Regex> = OnceLock::new();
static ACE: OnceLock<Regex> = OnceLock::new();
static QUEEN: OnceLock<Regex> = OnceLock::new();
static DOUBLE_JACK: OnceLock<Regex> = OnceLock::new();

#[expect(
    clippy::expect_used,
    reason = "Static regex patterns validated by the unit tests below"
)]
fn compiled(cell: &'static OnceLock<Regex>, pattern: impl FnOnce() -> String) -> &'static Regex {
    cell.get_or_init(|| Regex::new(&pattern()).expect("static regex pattern is valid"))
}

/// Matches `token` only when it is not glued to another word character.
fn standalone(token: &str) -> String {
    format!("(?:^|[^{WORD_CHARS}])(?:{token})(?:[^{WORD_CHARS}]|$)")
}

fn game_number_re() -> &'static Regex {
    compiled(&GAME_NUMBER, || r"#[nN](\d+)\.?".to_string())
}

fn first_group_re() -> &'static Regex {
    compiled(&FIRST_GROUP, || r"\(.*?\)".to_string())
}

fn card_token_re() -> &'static Regex {
    compiled(&CARD_TOKEN, || r"[AKQJ0-9]+[♥♠♦♣❤]\x{FE0F}?".to_string())
}

fn queen_card_re() -> &'static Regex {
    compiled(&QUEEN_CARD, || r"Q[♥♠♦♣❤]\x{FE0F}?".to_string())
}

/// Figure signals detected in one announcement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FigureSignals {
    pub has_jack: bool,
    pub has_king: bool,
    pub has_ace: bool,
}

/// Game number from a `#N744` style marker.
///
/// The `N` is case-insensitive and may be followed by a period. Digit runs
/// that do not fit a `u32` are treated as absent.
#[must_use]
pub fn extract_game_number(text: &str) -> Option<u32> {
    game_number_re()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Content of the first `(...)` group, parentheses stripped.
///
/// The match is non-greedy and stops at the first closing parenthesis. An
/// empty group counts as no group.
#[must_use]
pub fn extract_first_group_content(text: &str) -> Option<&str> {
    let group = first_group_re().find(text)?;
    let content = group.as_str().trim_matches(|c| c == '(' || c == ')');
    (!content.is_empty()).then_some(content)
}

/// First two card tokens of the first group, concatenated in order.
#[must_use]
pub fn extract_first_two_cards(text: &str) -> Option<String> {
    let content = extract_first_group_content(text)?;
    let mut cards = card_token_re().find_iter(content);
    let first = cards.next()?;
    let second = cards.next()?;
    Some(format!("{}{}", first.as_str(), second.as_str()))
}

/// Jack/King/Ace presence using the French figure names.
#[must_use]
pub fn extract_figure_signals(text: &str) -> FigureSignals {
    let jack = compiled(&JACK, || standalone("[JjVv]|Valet"));
    let king = compiled(&KING, || standalone("[KkRr]|Roi"));
    let ace = compiled(&ACE, || standalone("[Aa]|As"));

    FigureSignals {
        has_jack: jack.is_match(text),
        has_king: king.is_match(text),
        has_ace: ace.is_match(text),
    }
}

/// Whether the first group carries a standalone `Q` or the word "Dame".
#[must_use]
pub fn contains_queen_in_first_group(text: &str) -> bool {
    let queen = compiled(&QUEEN, || standalone("[Qq]|Dame"));
    extract_first_group_content(text).is_some_and(|group| queen.is_match(group))
}

/// Two `J` anywhere in the group, case-insensitive, letters in between allowed.
#[must_use]
pub fn has_double_jack(group: &str) -> bool {
    compiled(&DOUBLE_JACK, || r"(?i)J.*J".to_string()).is_match(group)
}

/// First Queen card token (`Q` plus suit glyph) found in `group`.
#[must_use]
pub fn find_queen_card(group: &str) -> Option<&str> {
    queen_card_re().find(group).map(|m| m.as_str())
}

/// Whether `text` carries any of the finalization glyphs in `indicators`.
#[must_use]
pub fn has_completion_indicator<S: AsRef<str>>(text: &str, indicators: &[S]) -> bool {
    indicators
        .iter()
        .map(AsRef::as_ref)
        .any(|glyph| !glyph.is_empty() && text.contains(glyph))
}
