use super::card::{Card, CardKind};
use super::config::Scoring;
use super::difficulty::Difficulty;
use super::error::GameError;
use super::rules::{Effect, evaluate};

fn face_up(mut cards: Vec<Card>) -> Vec<Card> {
    for card in &mut cards {
        card.flip_up();
    }
    cards
}

#[test]
fn match_marks_every_card_and_scores_prior_combo() {
    let config = Difficulty::Easy.config();
    let mut cards = face_up(vec![
        Card::new(2, CardKind::Normal),
        Card::new(1, CardKind::Normal),
        Card::new(2, CardKind::Normal),
    ]);

    let evaluation = evaluate(&mut cards, &[0, 2], &config, 2, &Scoring::default()).unwrap();

    assert!(evaluation.is_match);
    assert_eq!(evaluation.points(), 10 + 2 * 5);
    assert!(cards[0].is_matched() && cards[2].is_matched());
    assert!(!cards[1].is_matched());
    assert_eq!(
        evaluation.effects,
        vec![Effect::Matched {
            set_id: 2,
            indices: vec![0, 2],
            points: 10,
            combo_bonus: 10,
        }]
    );
}

#[test]
fn first_match_of_a_streak_has_no_combo_bonus() {
    let config = Difficulty::Easy.config();
    let mut cards = face_up(vec![Card::new(0, CardKind::Normal), Card::new(0, CardKind::Normal)]);
    let evaluation = evaluate(&mut cards, &[0, 1], &config, 0, &Scoring::default()).unwrap();
    assert_eq!(evaluation.points(), 10);
}

#[test]
fn mismatch_charges_time_and_a_heart_and_leaves_cards_up() {
    let config = Difficulty::Easy.config();
    let mut cards = face_up(vec![Card::new(0, CardKind::Normal), Card::new(1, CardKind::Normal)]);

    let evaluation = evaluate(&mut cards, &[1, 0], &config, 4, &Scoring::default()).unwrap();

    assert!(!evaluation.is_match);
    assert_eq!(evaluation.points(), 0);
    assert_eq!(evaluation.time_penalty(), 5);
    assert!(evaluation.effects.contains(&Effect::HeartLost));
    assert!(cards.iter().all(|c| c.is_face_up() && !c.is_matched()));
}

#[test]
fn partial_agreement_in_three_card_mode_is_a_plain_mismatch() {
    let config = Difficulty::Hell.config();
    let mut cards = face_up(vec![
        Card::new(5, CardKind::Normal),
        Card::new(5, CardKind::Normal),
        Card::new(6, CardKind::Normal),
    ]);

    let evaluation = evaluate(&mut cards, &[0, 1, 2], &config, 0, &Scoring::default()).unwrap();

    assert!(!evaluation.is_match);
    assert!(cards.iter().all(|c| !c.is_matched()));
    assert_eq!(evaluation.time_penalty(), 20);
}

#[test]
fn three_card_set_matches_as_one() {
    let config = Difficulty::Hell.config();
    let mut cards = face_up(vec![
        Card::new(5, CardKind::Normal),
        Card::new(5, CardKind::Normal),
        Card::new(5, CardKind::Normal),
    ]);
    let evaluation = evaluate(&mut cards, &[2, 0, 1], &config, 1, &Scoring::default()).unwrap();
    assert!(evaluation.is_match);
    assert_eq!(evaluation.points(), 30 + 5);
}

#[test]
fn bonus_set_adds_fixed_points() {
    let config = Difficulty::Medium.config();
    let mut cards = face_up(vec![
        Card::new(1008, CardKind::Bonus),
        Card::new(1008, CardKind::Bonus),
    ]);
    let evaluation = evaluate(&mut cards, &[0, 1], &config, 0, &Scoring::default()).unwrap();
    assert!(evaluation.is_bonus_match());
    assert_eq!(evaluation.points(), 15 + 50);
}

#[test]
fn hidden_set_decorates_a_normal_match() {
    let config = Difficulty::Easy.config();
    let mut cards = face_up(vec![
        Card::new(3, CardKind::Hidden),
        Card::new(3, CardKind::Hidden),
    ]);
    let evaluation = evaluate(&mut cards, &[0, 1], &config, 0, &Scoring::default()).unwrap();
    assert!(evaluation.is_match);
    assert!(evaluation.is_hidden_match());
    assert_eq!(evaluation.points(), 10);
    assert!(matches!(evaluation.effects[0], Effect::Matched { .. }));
}

#[test]
fn malformed_selections_are_invalid_transitions() {
    let config = Difficulty::Easy.config();
    let mut cards = face_up(vec![
        Card::new(0, CardKind::Normal),
        Card::new(0, CardKind::Normal),
        Card::new(-1, CardKind::Bomb),
    ]);
    let scoring = Scoring::default();

    for selection in [&[0][..], &[0, 0], &[0, 2], &[0, 9], &[0, 1, 2]] {
        let err = evaluate(&mut cards, selection, &config, 0, &scoring).unwrap_err();
        assert!(
            matches!(err, GameError::InvalidTransition { .. }),
            "{selection:?}"
        );
        assert!(err.is_recoverable());
    }

    evaluate(&mut cards, &[0, 1], &config, 0, &scoring).unwrap();
    let err = evaluate(&mut cards, &[0, 1], &config, 0, &scoring).unwrap_err();
    assert!(matches!(err, GameError::InvalidTransition { .. }));
}
