//! Rule table mapping figure signals to a Queen forecast.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::extraction::{FigureSignals, has_double_jack};

/// Forecast rule selected for an announcement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DameRule {
    /// Two Jacks in the first group.
    ImmediateDoubleJack,
    /// Lone Jack, or King together with Jack.
    Immediate,
    /// King without Ace.
    NextDraw,
    /// King and Ace.
    WaitOne,
}

impl DameRule {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ImmediateDoubleJack => "Q_IMMEDIATE_JJ",
            Self::Immediate => "Q_IMMEDIATE",
            Self::NextDraw => "Q_NEXT_DRAW",
            Self::WaitOne => "Q_WAIT_1",
        }
    }

    /// Encoded form reported as the last prediction, e.g. `Q:Q_NEXT_DRAW`.
    #[must_use]
    pub fn encoded(&self) -> String {
        format!("Q:{}", self.as_str())
    }

    /// Headline and trigger annotation used in the announcement text.
    pub(crate) const fn label(rule: Option<Self>) -> (&'static str, Option<&'static str>) {
        match rule {
            Some(Self::ImmediateDoubleJack) => ("IMMINENTE", Some("JJ")),
            Some(Self::Immediate) => ("IMMINENTE", Some("J/K+J")),
            Some(Self::NextDraw) => ("PROCHAIN", Some("K seul")),
            Some(Self::WaitOne) => ("ATTENTE 1", Some("A+K")),
            None => ("EN COURS", None),
        }
    }
}

impl fmt::Display for DameRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the rule for an announcement, first match wins.
///
/// The double-Jack scan runs on the raw group before the J/K/A flags are
/// consulted, so it overrides the single-Jack and King+Jack rules.
#[must_use]
pub fn select_rule(signals: FigureSignals, first_group: &str) -> Option<DameRule> {
    if has_double_jack(first_group) {
        return Some(DameRule::ImmediateDoubleJack);
    }

    let FigureSignals {
        has_jack: jack,
        has_king: king,
        has_ace: ace,
    } = signals;

    if (jack && !king && !ace) || (king && jack) {
        Some(DameRule::Immediate)
    } else if king && !ace {
        Some(DameRule::NextDraw)
    } else if king && ace {
        Some(DameRule::WaitOne)
    } else {
        None
    }
}
