//! Stroke-order hiragana recognition.
//!
//! Strokes are reduced to categorical descriptors, scored against a reference
//! table of canonical stroke sequences, and re-ranked with patterns the user
//! taught through corrections. See [`recognizer::Recognizer`] for the drawing
//! session protocol.

pub mod cli;
pub mod config;
pub mod core;
pub mod recognizer;

pub use crate::core::{
    analyze, Candidate, CanvasSize, CharacterEntry, LearningStore, Point, RecognizerError,
    ReferenceDatabase, StrokeDescriptor,
};
pub use config::Config;
pub use recognizer::{CommittedCharacter, FeedbackTicket, Recognizer, RecognizerState, StrokeEvent};
