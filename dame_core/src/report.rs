//! `N-2 → N` Queen cycle analysis over the draw history.
//!
//! Read-only: building a report never touches predictor state.

use std::fmt;

use crate::extraction::find_queen_card;
use crate::history::DrawHistory;

/// Minimum number of recorded draws for an analysis.
pub const MIN_HISTORY_FOR_REPORT: usize = 3;
/// History rows shown at the top of the report.
pub const HISTORY_ROWS_SHOWN: usize = 10;
/// Cycle records shown, newest last.
pub const CYCLES_SHOWN: usize = 5;

/// A Queen at game `target` with no Queen two games earlier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleRecord {
    pub trigger_game: u32,
    pub trigger_cards: Option<String>,
    pub target_game: u32,
    pub queen_card: String,
}

/// One line of the history summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub game_number: u32,
    pub first_two_cards: Option<String>,
    pub first_group: String,
    pub has_queen: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    /// Fewer than [`MIN_HISTORY_FOR_REPORT`] draws recorded.
    Insufficient { recorded: usize },
    Analysis {
        recorded: usize,
        rows: Vec<HistoryRow>,
        /// Every cycle found, ascending by target game.
        cycles: Vec<CycleRecord>,
        /// Failure threshold reached: render the alert title.
        alert: bool,
    },
}

impl CycleReport {
    /// Analyse `history`; `alert` selects the failure-threshold title.
    #[must_use]
    pub fn build(history: &DrawHistory, alert: bool) -> Self {
        let recorded = history.len();
        if recorded < MIN_HISTORY_FOR_REPORT {
            return Self::Insufficient { recorded };
        }

        let skip = recorded.saturating_sub(HISTORY_ROWS_SHOWN);
        let rows = history
            .iter()
            .skip(skip)
            .map(|(game_number, record)| HistoryRow {
                game_number,
                first_two_cards: record.first_two_cards.clone(),
                first_group: record.first_group.clone(),
                has_queen: find_queen_card(&record.first_group).is_some(),
            })
            .collect();

        Self::Analysis {
            recorded,
            rows,
            cycles: find_cycles(history),
            alert,
        }
    }

    /// The last [`CYCLES_SHOWN`] cycles, newest last.
    #[must_use]
    pub fn recent_cycles(&self) -> &[CycleRecord] {
        match self {
            Self::Insufficient { .. } => &[],
            Self::Analysis { cycles, .. } => {
                &cycles[cycles.len().saturating_sub(CYCLES_SHOWN)..]
            }
        }
    }
}

/// Every `N-2 → N` cycle in `history`, ascending by target game.
#[must_use]
pub fn find_cycles(history: &DrawHistory) -> Vec<CycleRecord> {
    history
        .iter()
        .filter_map(|(game_number, record)| {
            let queen_card = find_queen_card(&record.first_group)?;
            let trigger_game = game_number.checked_sub(2)?;
            let trigger = history.get(trigger_game)?;
            if find_queen_card(&trigger.first_group).is_some() {
                return None;
            }
            Some(CycleRecord {
                trigger_game,
                trigger_cards: trigger.first_two_cards.clone(),
                target_game: game_number,
                queen_card: queen_card.to_string(),
            })
        })
        .collect()
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (recorded, rows, cycles, alert) = match self {
            Self::Insufficient { recorded } => {
                return write!(
                    f,
                    "⚠️ Historique insuffisant ({recorded}/{MIN_HISTORY_FOR_REPORT} tirages). Attendez plus de résultats."
                );
            }
            Self::Analysis {
                recorded,
                rows,
                cycles,
                alert,
            } => (recorded, rows, cycles, alert),
        };

        writeln!(f, "📊 *HISTORIQUE* : {recorded} tirages enregistrés")?;
        writeln!(f)?;
        for row in rows {
            let marker = if row.has_queen { " 👸" } else { "" };
            writeln!(
                f,
                "*N{}* : {} | ({}){marker}",
                row.game_number,
                row.first_two_cards.as_deref().unwrap_or("N/A"),
                row.first_group
            )?;
        }
        writeln!(f)?;

        if cycles.is_empty() {
            writeln!(f, "⚠️ *AUCUN CYCLE VALIDE DÉTECTÉ*")?;
            return write!(f, "Aucun cycle (N-2) → (N) avec Dame n'a été trouvé.");
        }

        let title = if *alert {
            "🚨 MODE INTELLIGENT REQUIS"
        } else {
            "🔍 ANALYSE DES CYCLES DAME"
        };
        writeln!(f, "*{title}*")?;
        writeln!(f, "*CYCLE DE LA DAME : (N-2) → (N)*")?;
        writeln!(f, "{} cycle(s) détecté(s) :", cycles.len())?;

        for record in self.recent_cycles() {
            write!(
                f,
                "\n*Déclencheur* : `{}` (jeu #N{})\n*Carte* : `{}` au numéro `#N{}`\n",
                record.trigger_cards.as_deref().unwrap_or("N/A"),
                record.trigger_game,
                record.queen_card,
                record.target_game
            )?;
        }
        Ok(())
    }
}
