//! Drawing session protocol.
//!
//! A [`Recognizer`] tracks one character at a time:
//!
//! ```text
//! Empty ──stroke──▶ Drawing ──confirm / tap──────────────────────▶ Closed ──▶ Empty
//!                      │                                            ▲
//!                      └─request_feedback─▶ AwaitingConfirmation ───┘
//!                                              (resolve_feedback)
//! ```
//!
//! `Closed` is never observed from outside: committing a character returns a
//! [`CommittedCharacter`] and leaves the recognizer `Empty`.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::error::{RecognizerError, Result};
use crate::core::{
    analyze, CanvasSize, Candidate, LearningStore, Point, ReferenceDatabase, StrokeDescriptor,
};

/// Placeholder committed when nothing scored above zero
pub const UNKNOWN_CHARACTER: &str = "?";

/// Pointer travel (in pixels) below which a press counts as a tap
pub const DEFAULT_TAP_THRESHOLD: f64 = 5.0;

/// Produces opaque ids for drawing attempts
pub trait SessionIdSource {
    fn next_id(&mut self) -> String;
}

/// `session_<unix millis>_<random suffix>`
#[derive(Debug, Default)]
pub struct ClockSessionIds;

impl SessionIdSource for ClockSessionIds {
    fn next_id(&mut self) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("session_{}_{}", Utc::now().timestamp_millis(), &suffix[..9])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognizerState {
    Empty,
    Drawing,
    AwaitingConfirmation,
}

impl RecognizerState {
    fn name(&self) -> &'static str {
        match self {
            RecognizerState::Empty => "empty",
            RecognizerState::Drawing => "drawing",
            RecognizerState::AwaitingConfirmation => "awaiting confirmation",
        }
    }
}

/// A finished character handed to the output consumer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommittedCharacter {
    pub character: String,
    pub session_id: String,
    pub strokes: Vec<StrokeDescriptor>,
    /// Whether the learning store was taught this character
    pub learned: bool,
}

/// Outcome of a finished pointer path
#[derive(Debug, Clone, PartialEq)]
pub enum StrokeEvent {
    /// The path was analyzed; ranked candidates for all strokes so far
    Candidates(Vec<Candidate>),
    /// A tap finalized the character in progress
    Committed(CommittedCharacter),
    /// Nothing happened
    Ignored,
}

/// One-shot continuation for a feedback request.
///
/// Bound to a single drawing attempt and consumed by
/// [`Recognizer::resolve_feedback`] or [`Recognizer::abandon_feedback`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a feedback ticket must be resolved or abandoned"]
pub struct FeedbackTicket {
    session_id: String,
    suggested: String,
}

impl FeedbackTicket {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Top candidate at the time feedback was requested
    pub fn suggested(&self) -> &str {
        &self.suggested
    }
}

pub struct Recognizer {
    database: ReferenceDatabase,
    learning: LearningStore,
    canvas: CanvasSize,
    tap_threshold: f64,
    session_ids: Box<dyn SessionIdSource>,
    state: RecognizerState,
    strokes: Vec<StrokeDescriptor>,
    candidates: Vec<Candidate>,
    session_id: Option<String>,
}

impl Recognizer {
    pub fn new(database: ReferenceDatabase, learning: LearningStore) -> Self {
        Self {
            database,
            learning,
            canvas: CanvasSize::default(),
            tap_threshold: DEFAULT_TAP_THRESHOLD,
            session_ids: Box::new(ClockSessionIds),
            state: RecognizerState::Empty,
            strokes: Vec::new(),
            candidates: Vec::new(),
            session_id: None,
        }
    }

    pub fn with_canvas(mut self, canvas: CanvasSize) -> Self {
        self.canvas = canvas;
        self
    }

    pub fn with_tap_threshold(mut self, tap_threshold: f64) -> Self {
        self.tap_threshold = tap_threshold;
        self
    }

    pub fn with_session_ids(mut self, session_ids: Box<dyn SessionIdSource>) -> Self {
        self.session_ids = session_ids;
        self
    }

    /// Handle a finished pointer path in device pixels
    pub fn end_stroke(&mut self, points: &[Point]) -> StrokeEvent {
        let (first, last) = match (points.first(), points.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return StrokeEvent::Ignored,
        };

        let moved = points
            .iter()
            .any(|p| first.distance_to(p) > self.tap_threshold);

        if !moved {
            // a tap finalizes the character unless feedback is pending
            if self.state != RecognizerState::Drawing {
                return StrokeEvent::Ignored;
            }
            return match self.confirm() {
                Ok(committed) => StrokeEvent::Committed(committed),
                Err(_) => StrokeEvent::Ignored,
            };
        }

        match self.add_stroke(first, last) {
            Ok(candidates) => StrokeEvent::Candidates(candidates),
            Err(e) => {
                debug!("Stroke ignored: {}", e);
                StrokeEvent::Ignored
            }
        }
    }

    /// Append a stroke given by its endpoints and rank the candidates
    pub fn add_stroke(&mut self, start: Point, end: Point) -> Result<Vec<Candidate>> {
        if self.state == RecognizerState::AwaitingConfirmation {
            return Err(self.invalid_state("empty or drawing"));
        }

        let descriptor = analyze(start, end, self.canvas.width, self.canvas.height);
        self.strokes.push(descriptor);

        if self.session_id.is_none() {
            self.session_id = Some(self.session_ids.next_id());
        }
        self.state = RecognizerState::Drawing;

        self.candidates = self
            .learning
            .match_with_learning(&self.strokes, self.database.all());
        debug!(
            stroke = self.strokes.len(),
            direction = %descriptor.direction,
            length = %descriptor.length,
            position = %descriptor.position,
            top = self.candidates.first().map(|c| c.character.as_str()).unwrap_or(UNKNOWN_CHARACTER),
            "Analyzed stroke"
        );

        Ok(self.candidates.clone())
    }

    /// Finalize with the best current guess, without teaching the store
    pub fn confirm(&mut self) -> Result<CommittedCharacter> {
        if self.state != RecognizerState::Drawing {
            return Err(self.invalid_state("drawing"));
        }

        let character = self.best_guess();
        let session_id = self.current_session_id();
        self.learning
            .record_session(&session_id, &self.strokes, &character);

        Ok(self.close(character, session_id, false))
    }

    /// Freeze the strokes and hand out a ticket for the feedback UI
    pub fn request_feedback(&mut self) -> Result<FeedbackTicket> {
        if self.state != RecognizerState::Drawing {
            return Err(self.invalid_state("drawing"));
        }

        self.state = RecognizerState::AwaitingConfirmation;
        Ok(FeedbackTicket {
            session_id: self.current_session_id(),
            suggested: self.best_guess(),
        })
    }

    /// Finalize with `chosen` as the truth and teach the store.
    ///
    /// An invalid `chosen` consumes the ticket and returns the recognizer to
    /// `Drawing` so feedback can be requested again.
    pub fn resolve_feedback(&mut self, ticket: FeedbackTicket, chosen: &str) -> Result<CommittedCharacter> {
        self.check_ticket(&ticket)?;

        let chosen = match normalize_character(chosen) {
            Ok(chosen) => chosen,
            Err(e) => {
                self.state = RecognizerState::Drawing;
                return Err(e);
            }
        };

        self.learning
            .record_session(&ticket.session_id, &self.strokes, &ticket.suggested);
        self.learning.learn_from_feedback(&ticket.session_id, &chosen);

        Ok(self.close(chosen, ticket.session_id, true))
    }

    /// Drop a pending feedback request and keep drawing
    pub fn abandon_feedback(&mut self, ticket: FeedbackTicket) -> Result<()> {
        self.check_ticket(&ticket)?;
        self.state = RecognizerState::Drawing;
        Ok(())
    }

    /// Teach the store about an already committed character
    pub fn learn_from_feedback(&mut self, session_id: &str, character: &str) -> Result<bool> {
        let character = normalize_character(character)?;
        Ok(self.learning.learn_from_feedback(session_id, &character))
    }

    /// Discard the character in progress without recording it
    pub fn clear(&mut self) {
        self.reset_attempt();
    }

    pub fn state(&self) -> RecognizerState {
        self.state
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    pub fn strokes(&self) -> &[StrokeDescriptor] {
        &self.strokes
    }

    /// Ranking after the most recent stroke
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn top_candidate(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn database(&self) -> &ReferenceDatabase {
        &self.database
    }

    pub fn learning(&self) -> &LearningStore {
        &self.learning
    }

    pub fn learning_mut(&mut self) -> &mut LearningStore {
        &mut self.learning
    }

    fn best_guess(&self) -> String {
        self.learning
            .match_with_learning(&self.strokes, self.database.all())
            .into_iter()
            .next()
            .filter(|c| c.confidence > 0.0)
            .map(|c| c.character)
            .unwrap_or_else(|| UNKNOWN_CHARACTER.to_string())
    }

    fn current_session_id(&mut self) -> String {
        if self.session_id.is_none() {
            self.session_id = Some(self.session_ids.next_id());
        }
        self.session_id.clone().unwrap_or_default()
    }

    fn check_ticket(&self, ticket: &FeedbackTicket) -> Result<()> {
        if self.state != RecognizerState::AwaitingConfirmation
            || self.session_id.as_deref() != Some(ticket.session_id.as_str())
        {
            return Err(RecognizerError::StaleFeedback(ticket.session_id.clone()));
        }
        Ok(())
    }

    fn close(&mut self, character: String, session_id: String, learned: bool) -> CommittedCharacter {
        let strokes = std::mem::take(&mut self.strokes);
        info!(
            character = character.as_str(),
            session_id = session_id.as_str(),
            strokes = strokes.len(),
            learned,
            "Committed character"
        );
        self.reset_attempt();

        CommittedCharacter {
            character,
            session_id,
            strokes,
            learned,
        }
    }

    fn reset_attempt(&mut self) {
        self.state = RecognizerState::Empty;
        self.strokes.clear();
        self.candidates.clear();
        self.session_id = None;
    }

    fn invalid_state(&self, expected: &'static str) -> RecognizerError {
        RecognizerError::InvalidState {
            expected,
            found: self.state.name(),
        }
    }
}

/// Trim and require exactly one glyph
fn normalize_character(character: &str) -> Result<String> {
    let trimmed = character.trim();
    if trimmed.chars().count() != 1 || trimmed == UNKNOWN_CHARACTER {
        return Err(RecognizerError::InvalidCharacter(character.to_string()));
    }
    Ok(trimmed.to_string())
}
