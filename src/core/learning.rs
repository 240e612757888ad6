use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::database::CharacterEntry;
use super::error::Result;
use super::matcher::{self, Candidate};
use super::storage::{MemoryStorage, SnapshotStorage};
use super::stroke::StrokeDescriptor;

/// Key the snapshot is stored under
pub const STORAGE_KEY: &str = "characterLearningData";

/// Trust assigned to a pattern taught through feedback
pub const DEFAULT_CONFIDENCE: f64 = 100.0;

/// Similarity above which a new observation reinforces an existing pattern
const MERGE_THRESHOLD: f64 = 0.8;
/// Similarity above which a learned pattern contributes a candidate
const MATCH_THRESHOLD: f64 = 0.6;

const FREQUENCY_BONUS_STEP: f64 = 5.0;
const FREQUENCY_BONUS_CAP: f64 = 20.0;

const MAX_SESSIONS: usize = 100;
const PERSISTED_SESSIONS: usize = 50;

/// One user-taught instance of a character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnedPattern {
    pub character: String,
    pub strokes: Vec<StrokeDescriptor>,
    /// Trust assigned at creation time
    pub confidence: f64,
    /// How many observations were merged into this pattern
    pub frequency: u32,
    /// Last time the pattern was created or reinforced
    pub timestamp: DateTime<Utc>,
}

/// Link between a drawn stroke sequence, the guess and an optional correction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub strokes: Vec<StrokeDescriptor>,
    pub suggested_character: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_character: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterStats {
    pub patterns: usize,
    pub total_frequency: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LearningSnapshot {
    #[serde(default)]
    learning_data: BTreeMap<String, Vec<LearnedPattern>>,
    #[serde(default)]
    sessions: Vec<Session>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LearningSnapshotRef<'a> {
    learning_data: &'a BTreeMap<String, Vec<LearnedPattern>>,
    sessions: &'a [Session],
}

/// Similarity of two stroke sequences in 0..=1.
///
/// Sequences of different length never match; each aligned pair earns 0.4
/// for direction, 0.4 for position and 0.2 for length.
pub fn pattern_similarity(a: &[StrokeDescriptor], b: &[StrokeDescriptor]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    // tenths, so thresholds compare exactly
    let total: u32 = a
        .iter()
        .zip(b)
        .map(|(x, y)| {
            let mut units: u32 = 0;
            if x.direction == y.direction {
                units += 4;
            }
            if x.position == y.position {
                units += 4;
            }
            if x.length == y.length {
                units += 2;
            }
            units
        })
        .sum();

    total as f64 / (10 * a.len()) as f64
}

/// Persisted corpus of user-taught patterns and recent sessions
pub struct LearningStore {
    patterns: BTreeMap<String, Vec<LearnedPattern>>,
    sessions: Vec<Session>,
    storage: Box<dyn SnapshotStorage>,
}

impl std::fmt::Debug for LearningStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LearningStore")
            .field("patterns", &self.patterns)
            .field("sessions", &self.sessions.len())
            .finish()
    }
}

impl LearningStore {
    /// Restore the store from `storage`.
    ///
    /// A missing or unreadable snapshot yields an empty store.
    pub fn load(storage: Box<dyn SnapshotStorage>) -> Self {
        let (patterns, sessions) = match Self::read_snapshot(storage.as_ref()) {
            Ok(Some(snapshot)) => (snapshot.learning_data, snapshot.sessions),
            Ok(None) => (BTreeMap::new(), Vec::new()),
            Err(e) => {
                warn!("Failed to load learning data, starting empty: {}", e);
                (BTreeMap::new(), Vec::new())
            }
        };

        let store = Self {
            patterns,
            sessions,
            storage,
        };
        info!(
            characters = store.patterns.len(),
            sessions = store.sessions.len(),
            "Loaded learning data"
        );
        store
    }

    /// A store backed by a fresh in-process map
    pub fn in_memory() -> Self {
        Self::load(Box::new(MemoryStorage::new()))
    }

    fn read_snapshot(storage: &dyn SnapshotStorage) -> Result<Option<LearningSnapshot>> {
        match storage.get_item(STORAGE_KEY)? {
            Some(content) => Ok(Some(serde_json::from_str(&content)?)),
            None => Ok(None),
        }
    }

    /// Fold one observation of `character` into the corpus
    pub fn add_learning_data(&mut self, character: &str, strokes: &[StrokeDescriptor], confidence: f64) {
        let now = Utc::now();
        let existing = self.patterns.entry(character.to_string()).or_default();

        // first sufficiently similar pattern wins, not the most similar
        match existing
            .iter_mut()
            .find(|p| pattern_similarity(strokes, &p.strokes) > MERGE_THRESHOLD)
        {
            Some(similar) => {
                similar.frequency += 1;
                similar.timestamp = now;
                debug!(character, frequency = similar.frequency, "Reinforced learned pattern");
            }
            None => {
                existing.push(LearnedPattern {
                    character: character.to_string(),
                    strokes: strokes.to_vec(),
                    confidence,
                    frequency: 1,
                    timestamp: now,
                });
                info!(character, strokes = strokes.len(), "Learned new pattern");
            }
        }

        self.persist();
    }

    /// Base ranking raised by any sufficiently similar learned pattern.
    ///
    /// Learned confidence is `100 * similarity` plus a frequency bonus and is
    /// not clamped to 100.
    pub fn match_with_learning(
        &self,
        user_strokes: &[StrokeDescriptor],
        database: &[CharacterEntry],
    ) -> Vec<Candidate> {
        let mut results = matcher::match_strokes(user_strokes, database);

        for (character, learned) in &self.patterns {
            for pattern in learned {
                let similarity = pattern_similarity(user_strokes, &pattern.strokes);
                if similarity <= MATCH_THRESHOLD {
                    continue;
                }

                let bonus = (pattern.frequency as f64 * FREQUENCY_BONUS_STEP).min(FREQUENCY_BONUS_CAP);
                let learned_confidence = similarity * 100.0 + bonus;

                match results.iter_mut().find(|c| &c.character == character) {
                    Some(existing) => {
                        existing.confidence = existing.confidence.max(learned_confidence);
                        existing.is_learned = true;
                    }
                    None => results.push(Candidate {
                        character: character.clone(),
                        confidence: learned_confidence,
                        is_learned: true,
                    }),
                }
            }
        }

        matcher::rank(&mut results);
        results
    }

    /// Teach the store that `session_id` was really `correct_character`.
    ///
    /// Returns `false` without touching anything when the session is unknown.
    pub fn learn_from_feedback(&mut self, session_id: &str, correct_character: &str) -> bool {
        let strokes = match self.sessions.iter_mut().find(|s| s.session_id == session_id) {
            Some(session) => {
                session.correct_character = Some(correct_character.to_string());
                session.strokes.clone()
            }
            None => {
                debug!(session_id, "Feedback for unknown session ignored");
                return false;
            }
        };

        self.add_learning_data(correct_character, &strokes, DEFAULT_CONFIDENCE);
        info!(session_id, correct_character, "Learned from feedback");
        true
    }

    pub fn record_session(&mut self, session_id: &str, strokes: &[StrokeDescriptor], suggested_character: &str) {
        self.sessions.push(Session {
            session_id: session_id.to_string(),
            strokes: strokes.to_vec(),
            suggested_character: suggested_character.to_string(),
            correct_character: None,
            timestamp: Utc::now(),
        });

        if self.sessions.len() > MAX_SESSIONS {
            let overflow = self.sessions.len() - MAX_SESSIONS;
            self.sessions.drain(..overflow);
        }

        self.persist();
    }

    /// Pattern count and frequency sum for every character with patterns
    pub fn stats(&self) -> BTreeMap<String, CharacterStats> {
        self.patterns
            .iter()
            .filter(|(_, learned)| !learned.is_empty())
            .map(|(character, learned)| {
                let stats = CharacterStats {
                    patterns: learned.len(),
                    total_frequency: learned.iter().map(|p| p.frequency).sum(),
                };
                (character.clone(), stats)
            })
            .collect()
    }

    /// Forget everything, including the durable snapshot
    pub fn reset(&mut self) {
        self.patterns.clear();
        self.sessions.clear();
        if let Err(e) = self.storage.remove_item(STORAGE_KEY) {
            warn!("Failed to erase learning data: {}", e);
        }
        info!("Learning data reset");
    }

    /// Write the pattern map and the most recent sessions
    pub fn save(&mut self) -> Result<()> {
        let keep_from = self.sessions.len().saturating_sub(PERSISTED_SESSIONS);
        let snapshot = LearningSnapshotRef {
            learning_data: &self.patterns,
            sessions: &self.sessions[keep_from..],
        };
        let content = serde_json::to_string(&snapshot)?;
        self.storage.set_item(STORAGE_KEY, &content)
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            warn!("Failed to save learning data: {}", e);
        }
    }

    pub fn patterns(&self, character: &str) -> &[LearnedPattern] {
        self.patterns
            .get(character)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn session(&self, session_id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.session_id == session_id)
    }
}
