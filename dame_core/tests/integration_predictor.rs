//! End-to-end tests for the predictor.
//!
//! These tests drive a `Predictor` only through `ingest` and the mode
//! accessors, the way the Telegram transport does:
//! - forecasts are created from in-progress announcements in active mode
//! - finalized announcements resolve forecasts and feed the history
//! - the failure streak raises the operator signal exactly once

use dame_core::extraction::{
    extract_first_group_content, extract_first_two_cards, extract_game_number,
};
use dame_core::{Action, CycleReport, DameRule, Mode, PredictionStatus, Predictor};

fn active_predictor() -> Predictor {
    let mut predictor = Predictor::default();
    predictor.set_mode(true);
    predictor
}

#[test]
fn test_extraction_contracts() {
    assert_eq!(extract_game_number("🔵#N744. ✅ 18(8♠10♦)"), Some(744));
    assert_eq!(extract_game_number("no marker"), None);
    assert_eq!(
        extract_first_group_content("18(8♠10♦) - 26(K♣9♥)"),
        Some("8♠10♦")
    );
    assert_eq!(
        extract_first_two_cards("#N1. 18(8♠10♦4♣) - 26(K♣9♥)"),
        Some("8♠10♦".to_string())
    );
}

#[test]
fn test_lone_king_predicts_three_ahead() {
    let mut predictor = active_predictor();

    let action = predictor.ingest("#N100. ⏳ 5(K♠3♦) - 7(4♣9♥)", Some(1));

    let Action::SendPrediction { target_game, text } = action else {
        panic!("expected a prediction, got {action:?}");
    };
    assert_eq!(target_game, 103);
    assert!(text.contains("statut :⏳"));

    let prediction = predictor.prediction(103).expect("prediction stored");
    assert_eq!(prediction.rule, Some(DameRule::NextDraw));
    assert_eq!(prediction.status, PredictionStatus::Pending);
    assert_eq!(prediction.source_game, 100);
}

#[test]
fn test_queen_at_target_confirms() {
    let mut predictor = active_predictor();
    predictor.ingest("#N100. ⏳ 5(K♠3♦) - 7(4♣9♥)", None);
    predictor.attach_message(103, 42);

    let action = predictor.ingest("#N103. ✅ 9(Q♥3♠) - 4(5♦6♣)", None);

    assert_eq!(
        action,
        Action::EditMessage {
            target_game: 103,
            message_id: Some(42),
            text: "🎯103🎯: Dame (Q) *PROCHAIN* (K seul) statut :✅".to_string(),
        }
    );
    assert_eq!(
        predictor.prediction(103).map(|p| p.status),
        Some(PredictionStatus::Correct)
    );
    assert_eq!(predictor.consecutive_failures(), 0);
}

#[test]
fn test_two_failures_raise_threshold_signal() {
    let mut predictor = active_predictor();

    // First forecast: N102, window closes after N105.
    predictor.ingest("#N100. ⏳ 5(J♠3♦) - 7(4♣9♥)", None);
    for game in 102..=105 {
        let action = predictor.ingest(&format!("#N{game}. ✅ 5(4♠3♦)"), None);
        assert_eq!(action, Action::None);
    }
    let first = predictor.ingest("#N106. ✅ 5(4♠3♦)", None);
    assert!(matches!(
        first,
        Action::EditMessage { target_game: 102, ref text, .. } if text.ends_with("statut :❌")
    ));
    assert_eq!(predictor.consecutive_failures(), 1);

    // Second forecast: N112.
    predictor.ingest("#N110. ⏳ 5(J♠3♦) - 7(4♣9♥)", None);
    let second = predictor.ingest("#N116. ✅ 5(4♠3♦)", None);

    assert_eq!(second, Action::FailureThresholdReached { target_game: 112 });
    assert_eq!(predictor.consecutive_failures(), 2);
    assert_eq!(
        predictor.prediction(112).map(|p| p.status),
        Some(PredictionStatus::Failed)
    );
    // The mode stays active until the operator answers.
    assert_eq!(predictor.mode(), Mode::Active);
}

#[test]
fn test_history_keeps_ten_newest() {
    let mut predictor = Predictor::default();

    for game in 1..=11 {
        predictor.ingest(&format!("#N{game}. ✅ 5(4♠3♦)"), None);
    }

    assert_eq!(predictor.history().len(), 10);
    assert!(!predictor.history().contains(1));
    assert!(predictor.history().contains(11));
}

#[test]
fn test_dormant_mode_never_predicts() {
    let mut predictor = Predictor::default();

    let action = predictor.ingest("#N100. ⏳ 5(K♠3♦) - 7(4♣9♥)", None);

    assert_eq!(action, Action::None);
    assert_eq!(predictor.predictions().count(), 0);
}

#[test]
fn test_repeated_text_predicts_once() {
    let mut predictor = Predictor::default();
    let text = "#N100. ⏳ 5(K♠3♦) - 7(4♣9♥)";

    assert_eq!(predictor.ingest(text, None), Action::None);
    predictor.set_mode(true);
    assert!(matches!(
        predictor.ingest(text, None),
        Action::SendPrediction { .. }
    ));
    assert_eq!(predictor.ingest(text, None), Action::None);
    assert_eq!(predictor.predictions().count(), 1);
}

#[test]
fn test_edited_announcement_can_predict_again() {
    let mut predictor = active_predictor();

    predictor.ingest("#N100. ⏳ 5(K♠3♦)", None);
    let action = predictor.ingest("#N100. ⏳ 5(K♠J♦)", None);

    // New cards mean a new fingerprint for the same game.
    assert_eq!(
        action,
        Action::SendPrediction {
            target_game: 102,
            text: "🎯102🎯: Dame (Q) *IMMINENTE* (J/K+J) statut :⏳".to_string(),
        }
    );
    assert_eq!(predictor.predictions().count(), 2);
}

#[test]
fn test_cycle_report_from_ingested_draws() {
    let mut predictor = Predictor::default();
    predictor.ingest("#N20. ✅ 5(K♠3♦)", None);
    predictor.ingest("#N21. ✅ 5(4♠3♦)", None);
    predictor.ingest("#N22. ✅ 5(Q♥3♦)", None);

    let report = predictor.cycle_report();
    let CycleReport::Analysis { cycles, alert, .. } = &report else {
        panic!("expected an analysis, got {report:?}");
    };
    assert!(!alert);
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].trigger_game, 20);
    assert_eq!(cycles[0].trigger_cards.as_deref(), Some("K♠3♦"));
    assert_eq!(cycles[0].queen_card, "Q♥");

    let rendered = report.to_string();
    assert!(rendered.contains("#N22"));
    assert!(rendered.contains("👸"));
}

#[test]
fn test_status_reflects_mode_and_history() {
    let mut predictor = active_predictor();
    predictor.ingest("#N1. ✅ 5(4♠3♦)", None);

    let status = predictor.status();
    assert_eq!(status.mode, Mode::Active);
    assert_eq!(status.history_size, 1);
    assert_eq!(status.last_prediction, None);

    predictor.set_mode(false);
    assert_eq!(predictor.status().mode, Mode::Dormant);
}

#[test]
fn test_counter_reset_keeps_dedup() {
    let mut predictor = active_predictor();
    predictor.ingest("#N1440. ✅ 5(4♠3♦)", None);

    let first = predictor.ingest("#N5. ⏳ 5(K♠3♦)", None);
    assert!(matches!(first, Action::SendPrediction { target_game: 8, .. }));
    assert_eq!(predictor.ingest("#N5. ⏳ 5(K♠3♦)", None), Action::None);

    // Far enough from zero for the pruning horizon to apply.
    let first = predictor.ingest("#N50. ⏳ 5(K♠3♦)", None);
    assert!(matches!(first, Action::SendPrediction { target_game: 53, .. }));
    assert_eq!(predictor.ingest("#N50. ⏳ 5(K♠3♦)", None), Action::None);
}

#[test]
fn test_missing_first_group_never_predicts() {
    let mut predictor = active_predictor();
    assert_eq!(predictor.ingest("#N100. ⏳ K♠ 3♦", None), Action::None);
    assert_eq!(predictor.predictions().count(), 0);
}

#[test]
fn test_missing_game_number_is_ignored() {
    let mut predictor = active_predictor();
    assert_eq!(predictor.ingest("⏳ 5(K♠3♦)", None), Action::None);
    assert_eq!(predictor.predictions().count(), 0);
    assert!(predictor.history().is_empty());
}
