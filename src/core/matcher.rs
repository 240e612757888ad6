use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::database::CharacterEntry;
use super::stroke::{Direction, Position, StrokeDescriptor, StrokeLength};

const DIRECTION_EXACT: f64 = 50.0;
const DIRECTION_COMPLEX_LENIENCY: f64 = 15.0;
const POSITION_WEIGHT: f64 = 35.0;
const LENGTH_EXACT: f64 = 15.0;
const LENGTH_NEAR_MISS: f64 = 8.0;

const STROKE_MAX_SCORE: f64 = 100.0;
const STROKE_COUNT_PENALTY: f64 = 5.0;

/// A character with its score at a point in time.
///
/// Base scores stay within 0..=100; learned scores can exceed 100 and are
/// only meaningful relative to each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub character: String,
    pub confidence: f64,
    pub is_learned: bool,
}

impl Candidate {
    pub fn new(character: impl Into<String>, confidence: f64) -> Self {
        Self {
            character: character.into(),
            confidence,
            is_learned: false,
        }
    }
}

/// Score the strokes written so far against every database entry.
///
/// Returns one candidate per entry, best first. Entries with equal
/// confidence keep their database order.
pub fn match_strokes(user_strokes: &[StrokeDescriptor], database: &[CharacterEntry]) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = database
        .iter()
        .map(|entry| Candidate::new(entry.character.clone(), score_entry(user_strokes, entry)))
        .collect();

    rank(&mut candidates);
    candidates
}

/// Stable descending sort by confidence
pub(crate) fn rank(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });
}

fn score_entry(user_strokes: &[StrokeDescriptor], entry: &CharacterEntry) -> f64 {
    // partial match: only the strokes written so far are compared
    let evaluated = user_strokes.len().min(entry.strokes.len());
    if evaluated == 0 {
        return 0.0;
    }

    let total: f64 = user_strokes
        .iter()
        .zip(&entry.strokes)
        .map(|(user, reference)| score_stroke(user, reference))
        .sum();
    let max_possible = STROKE_MAX_SCORE * evaluated as f64;

    let count_gap = user_strokes.len().abs_diff(entry.total_strokes) as f64;
    let adjusted = (total - count_gap * STROKE_COUNT_PENALTY).max(0.0);

    (100.0 * adjusted / max_possible).min(100.0).round()
}

fn score_stroke(user: &StrokeDescriptor, reference: &StrokeDescriptor) -> f64 {
    direction_score(user.direction, reference.direction)
        + position_score(user.position, reference.position)
        + length_score(user.length, reference.length)
}

fn direction_score(user: Direction, reference: Direction) -> f64 {
    if user == reference {
        DIRECTION_EXACT
    } else if user == Direction::Complex || reference == Direction::Complex {
        DIRECTION_COMPLEX_LENIENCY
    } else {
        0.0
    }
}

fn position_score(user: Position, reference: Position) -> f64 {
    if user == reference {
        POSITION_WEIGHT
    } else {
        (position_similarity(user, reference) * POSITION_WEIGHT).round()
    }
}

fn length_score(user: StrokeLength, reference: StrokeLength) -> f64 {
    if user == reference {
        LENGTH_EXACT
    } else {
        LENGTH_NEAR_MISS
    }
}

/// Closeness of two positions on the shared 0..=2 ordinal axis, in 0..=1
pub fn position_similarity(a: Position, b: Position) -> f64 {
    let distance = a.ordinal().abs_diff(b.ordinal()) as f64;
    (1.0 - distance / 2.0).max(0.0)
}
