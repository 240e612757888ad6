use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{RecognizerError, Result};
use super::stroke::{Direction, Point, Position, StrokeDescriptor, StrokeLength};

/// Base hiragana offered as corrections
pub const HIRAGANA: [&str; 46] = [
    "あ", "い", "う", "え", "お",
    "か", "き", "く", "け", "こ",
    "さ", "し", "す", "せ", "そ",
    "た", "ち", "つ", "て", "と",
    "な", "に", "ぬ", "ね", "の",
    "は", "ひ", "ふ", "へ", "ほ",
    "ま", "み", "む", "め", "も",
    "や", "ゆ", "よ",
    "ら", "り", "る", "れ", "ろ",
    "わ", "を", "ん",
];

/// Canonical stroke sequence for one character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterEntry {
    pub character: String,
    pub strokes: Vec<StrokeDescriptor>,
    /// Expected stroke count; `0` in a database file means "same as strokes"
    #[serde(default)]
    pub total_strokes: usize,
}

/// Immutable reference table the base matcher scores against
#[derive(Debug, Clone)]
pub struct ReferenceDatabase {
    entries: Vec<CharacterEntry>,
}

impl ReferenceDatabase {
    /// Build a database from entries, rejecting ones the matcher cannot use
    pub fn from_entries(mut entries: Vec<CharacterEntry>) -> Result<Self> {
        for entry in &mut entries {
            if entry.character.chars().count() != 1 {
                return Err(RecognizerError::InvalidEntry(format!(
                    "{:?} is not a single character",
                    entry.character
                )));
            }
            if entry.strokes.is_empty() {
                return Err(RecognizerError::InvalidEntry(format!(
                    "{} has no strokes",
                    entry.character
                )));
            }
            if entry.total_strokes == 0 {
                entry.total_strokes = entry.strokes.len();
            }
        }

        Ok(Self { entries })
    }

    /// Load a database from a JSON array of entries
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let entries: Vec<CharacterEntry> = serde_json::from_str(&content)?;
        Self::from_entries(entries)
    }

    /// The built-in hiragana table
    pub fn builtin() -> Self {
        Self {
            entries: builtin_entries(),
        }
    }

    pub fn all(&self) -> &[CharacterEntry] {
        &self.entries
    }

    pub fn get(&self, character: &str) -> Option<&CharacterEntry> {
        self.entries.iter().find(|e| e.character == character)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ReferenceDatabase {
    fn default() -> Self {
        Self::builtin()
    }
}

fn stroke(
    direction: Direction,
    length: StrokeLength,
    position: Position,
    start: (f64, f64),
    end: (f64, f64),
) -> StrokeDescriptor {
    StrokeDescriptor::new(
        direction,
        length,
        position,
        Point::new(start.0, start.1),
        Point::new(end.0, end.1),
    )
}

fn entry(character: &str, strokes: Vec<StrokeDescriptor>) -> CharacterEntry {
    CharacterEntry {
        character: character.to_string(),
        total_strokes: strokes.len(),
        strokes,
    }
}

fn builtin_entries() -> Vec<CharacterEntry> {
    use Direction::*;
    use Position::*;
    use StrokeLength::*;

    vec![
        entry("あ", vec![
            stroke(Horizontal, Medium, Top, (0.25, 0.15), (0.75, 0.15)),
            stroke(Vertical, Long, Left, (0.3, 0.25), (0.25, 0.85)),
            stroke(Complex, Long, Right, (0.6, 0.25), (0.7, 0.85)),
        ]),
        entry("い", vec![
            stroke(Vertical, Long, Left, (0.3, 0.2), (0.3, 0.8)),
            stroke(Vertical, Long, Right, (0.7, 0.2), (0.7, 0.8)),
        ]),
        entry("う", vec![
            stroke(Horizontal, Long, Middle, (0.15, 0.35), (0.85, 0.35)),
            stroke(Complex, Long, Center, (0.5, 0.45), (0.6, 0.8)),
        ]),
        entry("お", vec![
            stroke(Horizontal, Medium, Top, (0.2, 0.2), (0.7, 0.2)),
            stroke(Horizontal, Medium, Middle, (0.2, 0.5), (0.8, 0.5)),
            stroke(Vertical, Long, Right, (0.7, 0.3), (0.7, 0.8)),
        ]),
        entry("え", vec![
            stroke(Horizontal, Long, Top, (0.2, 0.25), (0.8, 0.25)),
            stroke(Complex, Long, Center, (0.3, 0.45), (0.7, 0.8)),
        ]),
        entry("か", vec![
            stroke(Horizontal, Medium, Top, (0.3, 0.2), (0.7, 0.2)),
            stroke(Vertical, Long, Left, (0.35, 0.3), (0.3, 0.8)),
            stroke(Complex, Long, Right, (0.6, 0.4), (0.75, 0.8)),
        ]),
        entry("き", vec![
            stroke(Horizontal, Medium, Top, (0.2, 0.2), (0.6, 0.2)),
            stroke(Vertical, Long, Left, (0.25, 0.3), (0.2, 0.8)),
            stroke(Horizontal, Medium, Middle, (0.4, 0.5), (0.8, 0.5)),
            stroke(Vertical, Medium, Right, (0.7, 0.3), (0.75, 0.8)),
        ]),
        entry("く", vec![
            stroke(Complex, Long, Center, (0.6, 0.2), (0.3, 0.8)),
        ]),
        entry("け", vec![
            stroke(Horizontal, Medium, Top, (0.2, 0.2), (0.6, 0.2)),
            stroke(Vertical, Long, Left, (0.25, 0.3), (0.2, 0.8)),
            stroke(Complex, Long, Right, (0.5, 0.4), (0.8, 0.8)),
        ]),
        entry("こ", vec![
            stroke(Horizontal, Long, Top, (0.2, 0.3), (0.8, 0.3)),
            stroke(Horizontal, Long, Bottom, (0.2, 0.7), (0.8, 0.7)),
        ]),
        entry("さ", vec![
            stroke(Horizontal, Medium, Top, (0.3, 0.2), (0.7, 0.2)),
            stroke(Vertical, Medium, Center, (0.5, 0.3), (0.45, 0.6)),
            stroke(Horizontal, Long, Bottom, (0.2, 0.7), (0.8, 0.7)),
        ]),
        entry("し", vec![
            stroke(Complex, Long, Center, (0.5, 0.2), (0.3, 0.8)),
        ]),
        entry("す", vec![
            stroke(Horizontal, Medium, Top, (0.3, 0.25), (0.7, 0.25)),
            stroke(Complex, Long, Center, (0.5, 0.4), (0.4, 0.8)),
        ]),
        entry("せ", vec![
            stroke(Horizontal, Medium, Top, (0.3, 0.2), (0.7, 0.2)),
            stroke(Vertical, Medium, Center, (0.5, 0.3), (0.45, 0.6)),
            stroke(Complex, Long, Bottom, (0.2, 0.7), (0.8, 0.8)),
        ]),
        entry("そ", vec![
            stroke(Complex, Long, Center, (0.3, 0.2), (0.7, 0.8)),
        ]),
        entry("た", vec![
            stroke(Horizontal, Medium, Top, (0.3, 0.15), (0.7, 0.15)),
            stroke(Vertical, Medium, Left, (0.35, 0.25), (0.3, 0.6)),
            stroke(Horizontal, Long, Middle, (0.2, 0.4), (0.8, 0.4)),
            stroke(Vertical, Long, Center, (0.5, 0.5), (0.45, 0.85)),
        ]),
        entry("ち", vec![
            stroke(Horizontal, Medium, Top, (0.3, 0.3), (0.7, 0.3)),
            stroke(Complex, Long, Center, (0.5, 0.4), (0.4, 0.8)),
        ]),
        entry("つ", vec![
            stroke(Complex, Medium, Center, (0.4, 0.3), (0.6, 0.6)),
        ]),
        entry("て", vec![
            stroke(Horizontal, Long, Top, (0.2, 0.3), (0.8, 0.3)),
            stroke(Vertical, Long, Right, (0.7, 0.4), (0.75, 0.8)),
        ]),
        entry("と", vec![
            stroke(Horizontal, Medium, Top, (0.3, 0.25), (0.7, 0.25)),
            stroke(Complex, Long, Center, (0.5, 0.4), (0.6, 0.8)),
        ]),
        entry("な", vec![
            stroke(Horizontal, Medium, Top, (0.3, 0.2), (0.7, 0.2)),
            stroke(Vertical, Medium, Left, (0.35, 0.3), (0.3, 0.6)),
            stroke(Horizontal, Medium, Middle, (0.45, 0.5), (0.75, 0.5)),
            stroke(Vertical, Long, Right, (0.7, 0.3), (0.75, 0.85)),
        ]),
        entry("に", vec![
            stroke(Horizontal, Long, Top, (0.2, 0.3), (0.8, 0.3)),
            stroke(Vertical, Short, Left, (0.3, 0.4), (0.25, 0.6)),
            stroke(Horizontal, Long, Bottom, (0.2, 0.7), (0.8, 0.7)),
        ]),
        entry("ぬ", vec![
            stroke(Complex, Medium, Left, (0.3, 0.3), (0.4, 0.6)),
            stroke(Complex, Long, Right, (0.5, 0.2), (0.7, 0.8)),
        ]),
        entry("ね", vec![
            stroke(Complex, Medium, Left, (0.3, 0.2), (0.4, 0.5)),
            stroke(Complex, Long, Right, (0.5, 0.3), (0.7, 0.8)),
        ]),
        entry("の", vec![
            stroke(Complex, Long, Center, (0.3, 0.3), (0.7, 0.7)),
        ]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_is_consistent() {
        let db = ReferenceDatabase::builtin();
        assert_eq!(db.len(), 25);
        for entry in db.all() {
            assert_eq!(entry.total_strokes, entry.strokes.len(), "{}", entry.character);
            assert!(HIRAGANA.contains(&entry.character.as_str()));
        }
    }

    #[test]
    fn test_get() {
        let db = ReferenceDatabase::builtin();
        assert_eq!(db.get("き").map(|e| e.total_strokes), Some(4));
        assert!(db.get("ん").is_none());
    }

    #[test]
    fn test_from_entries_rejects_bad_entries() {
        let multi = CharacterEntry {
            character: "あい".to_string(),
            strokes: vec![StrokeDescriptor::fallback()],
            total_strokes: 1,
        };
        assert!(ReferenceDatabase::from_entries(vec![multi]).is_err());

        let empty = CharacterEntry {
            character: "あ".to_string(),
            strokes: vec![],
            total_strokes: 3,
        };
        assert!(ReferenceDatabase::from_entries(vec![empty]).is_err());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"character": "く", "strokes": [
                {{"direction": "complex", "length": "long", "position": "center",
                  "startPoint": {{"x": 0.6, "y": 0.2}}, "endPoint": {{"x": 0.3, "y": 0.8}}}}
            ]}}]"#
        )
        .unwrap();

        let db = ReferenceDatabase::from_json_file(file.path()).unwrap();
        assert_eq!(db.len(), 1);
        let entry = &db.all()[0];
        assert_eq!(entry.total_strokes, 1);
        assert_eq!(entry.strokes[0].direction, Direction::Complex);
        assert_eq!(entry.strokes[0].start, Point::new(0.6, 0.2));
    }
}
