use kakijun::core::{
    match_strokes, Direction, LearningStore, MemoryStorage, Point, Position, StrokeLength,
    DEFAULT_CONFIDENCE,
};
use kakijun::{
    analyze, CharacterEntry, Recognizer, RecognizerState, ReferenceDatabase, StrokeDescriptor,
    StrokeEvent,
};

fn stroke(direction: Direction, length: StrokeLength, position: Position) -> StrokeDescriptor {
    StrokeDescriptor::new(direction, length, position, Point::default(), Point::default())
}

fn a_and_i() -> Vec<CharacterEntry> {
    vec![
        CharacterEntry {
            character: "あ".to_string(),
            strokes: vec![
                stroke(Direction::Horizontal, StrokeLength::Medium, Position::Top),
                stroke(Direction::Vertical, StrokeLength::Long, Position::Left),
                stroke(Direction::Complex, StrokeLength::Long, Position::Right),
            ],
            total_strokes: 3,
        },
        CharacterEntry {
            character: "い".to_string(),
            strokes: vec![
                stroke(Direction::Vertical, StrokeLength::Long, Position::Left),
                stroke(Direction::Vertical, StrokeLength::Long, Position::Right),
            ],
            total_strokes: 2,
        },
    ]
}

fn confidence(candidates: &[kakijun::Candidate], character: &str) -> f64 {
    candidates
        .iter()
        .find(|c| c.character == character)
        .map(|c| c.confidence)
        .unwrap()
}

#[test]
fn one_horizontal_top_stroke_ranks_a_above_i() {
    let db = a_and_i();
    let drawn = analyze(Point::new(100.0, 50.0), Point::new(300.0, 55.0), 450.0, 450.0);
    assert_eq!(drawn.direction, Direction::Horizontal);
    assert_eq!(drawn.position, Position::Top);

    let candidates = match_strokes(&[drawn], &db);
    assert_eq!(candidates[0].character, "あ");
    assert!(confidence(&candidates, "あ") > confidence(&candidates, "い"));
    assert!(confidence(&candidates, "い") >= 0.0);
}

#[test]
fn complete_a_scores_full_confidence() {
    let db = a_and_i();
    let candidates = match_strokes(&db[0].strokes, &db);
    assert_eq!(candidates[0].character, "あ");
    assert_eq!(candidates[0].confidence, 100.0);
}

#[test]
fn repeated_feedback_reinforces_a_single_pattern() {
    let mut store = LearningStore::in_memory();
    let strokes = vec![
        stroke(Direction::DiagonalRight, StrokeLength::Medium, Position::Left),
        stroke(Direction::Vertical, StrokeLength::Long, Position::Right),
    ];

    store.record_session("session_1", &strokes, "い");
    store.learn_from_feedback("session_1", "か");
    store.record_session("session_2", &strokes, "い");
    store.learn_from_feedback("session_2", "か");

    let patterns = store.patterns("か");
    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0].frequency, 2);
}

#[test]
fn frequent_learned_pattern_exceeds_base_scale() {
    let mut store = LearningStore::in_memory();
    let strokes = vec![
        stroke(Direction::DiagonalRight, StrokeLength::Medium, Position::Left),
        stroke(Direction::Vertical, StrokeLength::Long, Position::Right),
    ];
    for _ in 0..5 {
        store.add_learning_data("か", &strokes, DEFAULT_CONFIDENCE);
    }

    let db = ReferenceDatabase::builtin();
    let results = store.match_with_learning(&strokes, db.all());
    let ka = results.iter().find(|c| c.character == "か").unwrap();
    assert!(ka.is_learned);
    assert!(ka.confidence >= 120.0);
    assert_eq!(results[0].character, "か");
}

#[test]
fn feedback_for_unrecorded_session_changes_nothing() {
    let storage = MemoryStorage::new();
    let mut store = LearningStore::load(Box::new(storage.clone()));
    let strokes = vec![stroke(Direction::Complex, StrokeLength::Long, Position::Center)];
    store.record_session("session_1", &strokes, "の");
    let before = store.sessions().to_vec();

    assert!(!store.learn_from_feedback("session_unknown", "か"));
    assert!(store.stats().is_empty());
    assert_eq!(store.sessions(), before.as_slice());

    let reloaded = LearningStore::load(Box::new(storage));
    assert!(reloaded.stats().is_empty());
    assert_eq!(reloaded.sessions(), before.as_slice());
}

#[test]
fn taught_character_survives_restart() {
    let storage = MemoryStorage::new();
    let paths = [
        vec![Point::new(100.0, 100.0), Point::new(150.0, 150.0), Point::new(200.0, 200.0)],
        vec![Point::new(300.0, 100.0), Point::new(250.0, 150.0), Point::new(200.0, 200.0)],
    ];

    {
        let learning = LearningStore::load(Box::new(storage.clone()));
        let mut recognizer = Recognizer::new(ReferenceDatabase::builtin(), learning);
        for path in &paths {
            assert!(matches!(recognizer.end_stroke(path), StrokeEvent::Candidates(_)));
        }
        let ticket = recognizer.request_feedback().unwrap();
        let committed = recognizer.resolve_feedback(ticket, "ゑ").unwrap();
        assert_eq!(committed.character, "ゑ");
        assert_eq!(recognizer.state(), RecognizerState::Empty);
    }

    let learning = LearningStore::load(Box::new(storage));
    let mut recognizer = Recognizer::new(ReferenceDatabase::builtin(), learning);
    for path in &paths {
        recognizer.end_stroke(path);
    }
    let top = recognizer.top_candidate().unwrap();
    assert_eq!(top.character, "ゑ");
    assert!(top.is_learned);

    let committed = match recognizer.end_stroke(&[Point::new(10.0, 10.0)]) {
        StrokeEvent::Committed(committed) => committed,
        other => panic!("unexpected event {:?}", other),
    };
    assert_eq!(committed.character, "ゑ");
    assert!(!committed.learned);
}
