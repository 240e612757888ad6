pub mod database;
pub mod error;
pub mod learning;
pub mod matcher;
pub mod storage;
pub mod stroke;

pub use database::{CharacterEntry, ReferenceDatabase, HIRAGANA};
pub use error::{RecognizerError, Result};
pub use learning::{CharacterStats, LearnedPattern, LearningStore, Session, DEFAULT_CONFIDENCE};
pub use matcher::{match_strokes, Candidate};
pub use storage::{FileStorage, MemoryStorage, SnapshotStorage};
pub use stroke::{analyze, CanvasSize, Direction, Point, Position, StrokeDescriptor, StrokeLength};
