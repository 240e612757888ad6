use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::core::{analyze, Candidate, Point};
use crate::recognizer::{CommittedCharacter, Recognizer, StrokeEvent};

const SHOWN_CANDIDATES: usize = 5;

#[derive(Parser)]
#[command(name = "kakijun")]
#[command(about = "Stroke-order hiragana recognition that learns from your corrections")]
#[command(version)]
pub struct Args {
    /// Data directory (defaults to the user config directory)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Describe a single stroke given its endpoints in pixels
    Analyze {
        /// Start point as X,Y
        #[arg(long, value_parser = parse_point)]
        start: Point,
        /// End point as X,Y
        #[arg(long, value_parser = parse_point)]
        end: Point,
        /// Canvas width (defaults to the configured canvas)
        #[arg(long)]
        width: Option<f64>,
        /// Canvas height (defaults to the configured canvas)
        #[arg(long)]
        height: Option<f64>,
    },
    /// Recognize a character from a JSON file of pointer paths and commit it
    Recognize {
        /// JSON array of strokes, each an array of {"x", "y"} points
        file: PathBuf,
    },
    /// Draw the strokes in a file and teach them as the given character
    Teach {
        file: PathBuf,
        character: String,
    },
    /// Correct a previously committed character
    Correct {
        session_id: String,
        character: String,
    },
    /// Show learned patterns per character
    Stats,
    /// Forget all learned patterns and sessions
    Reset,
    /// List the reference database
    Database,
}

fn parse_point(value: &str) -> std::result::Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got {:?}", value))?;
    let x = x.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok(Point::new(x, y))
}

fn read_paths(path: &Path) -> Result<Vec<Vec<Point>>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse strokes in {}", path.display()))
}

fn draw(recognizer: &mut Recognizer, paths: &[Vec<Point>]) {
    for (index, points) in paths.iter().enumerate() {
        match recognizer.end_stroke(points) {
            StrokeEvent::Candidates(candidates) => {
                println!("✏️  Stroke {}:", recognizer.stroke_count());
                print_candidates(&candidates);
            }
            StrokeEvent::Committed(committed) => {
                println!("👆 Tap at path {} committed the character", index + 1);
                print_committed(&committed);
            }
            StrokeEvent::Ignored => println!("⏭️  Path {} ignored", index + 1),
        }
    }
}

fn print_candidates(candidates: &[Candidate]) {
    for candidate in candidates.iter().take(SHOWN_CANDIDATES) {
        let marker = if candidate.is_learned { " (learned)" } else { "" };
        println!("    {} {:.0}{}", candidate.character, candidate.confidence, marker);
    }
}

fn print_committed(committed: &CommittedCharacter) {
    println!(
        "✅ {} (session {}, {} strokes)",
        committed.character,
        committed.session_id,
        committed.strokes.len()
    );
}

pub fn handle_analyze(
    start: Point,
    end: Point,
    width: Option<f64>,
    height: Option<f64>,
    data_dir: Option<PathBuf>,
) -> Result<()> {
    let config = Config::new(data_dir)?;
    let width = width.unwrap_or(config.canvas_width);
    let height = height.unwrap_or(config.canvas_height);

    let descriptor = analyze(start, end, width, height);
    println!("{}", serde_json::to_string_pretty(&descriptor)?);
    Ok(())
}

pub fn handle_recognize(file: &Path, data_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(data_dir)?;
    let mut recognizer = config.recognizer()?;
    let paths = read_paths(file)?;

    draw(&mut recognizer, &paths);

    if recognizer.stroke_count() > 0 {
        let committed = recognizer.confirm()?;
        print_committed(&committed);
        println!("💡 Wrong? Run: kakijun correct {} <character>", committed.session_id);
    }
    Ok(())
}

pub fn handle_teach(file: &Path, character: &str, data_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(data_dir)?;
    let mut recognizer = config.recognizer()?;
    let paths = read_paths(file)?;

    draw(&mut recognizer, &paths);

    if recognizer.stroke_count() == 0 {
        anyhow::bail!("No strokes to teach in {}", file.display());
    }

    let ticket = recognizer.request_feedback()?;
    println!("🤔 Suggested: {}", ticket.suggested());
    let committed = recognizer.resolve_feedback(ticket, character)?;
    println!("📚 Learned {} (session {})", committed.character, committed.session_id);
    Ok(())
}

pub fn handle_correct(session_id: &str, character: &str, data_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(data_dir)?;
    let mut recognizer = config.recognizer()?;

    if recognizer.learn_from_feedback(session_id, character)? {
        println!("📚 Session {} learned as {}", session_id, character.trim());
    } else {
        println!("No session found with id {}", session_id);
    }
    Ok(())
}

pub fn handle_stats(data_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(data_dir)?;
    let store = config.learning_store();
    let stats = store.stats();

    if stats.is_empty() {
        println!("No learned patterns yet.");
        return Ok(());
    }

    println!("📊 Learned characters ({}):", stats.len());
    for (character, stat) in &stats {
        println!(
            "  {} - {} patterns, frequency {}",
            character, stat.patterns, stat.total_frequency
        );
    }
    println!("🗂️  Sessions kept: {}", store.sessions().len());
    Ok(())
}

pub fn handle_reset(data_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(data_dir)?;
    let mut store = config.learning_store();
    store.reset();
    println!("🧹 Learning data reset");
    Ok(())
}

pub fn handle_database(data_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(data_dir)?;
    let database = config.load_database()?;

    println!("📖 Reference characters ({}):", database.len());
    for entry in database.all() {
        let strokes: Vec<String> = entry
            .strokes
            .iter()
            .map(|s| format!("{}/{}/{}", s.direction, s.length, s.position))
            .collect();
        println!("  {} [{}] {}", entry.character, entry.total_strokes, strokes.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("10,20.5").unwrap(), Point::new(10.0, 20.5));
        assert_eq!(parse_point(" 1 , 2 ").unwrap(), Point::new(1.0, 2.0));
        assert!(parse_point("10").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "kakijun", "--data-dir", "/tmp/k", "analyze", "--start", "0,0", "--end", "100,5",
        ])
        .unwrap();
        assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/k")));
        assert!(matches!(args.command, Commands::Analyze { width: None, .. }));
    }

    #[test]
    fn test_teach_then_stats() {
        let dir = tempfile::TempDir::new().unwrap();
        let strokes = dir.path().join("strokes.json");
        std::fs::write(
            &strokes,
            r#"[[{"x": 100, "y": 100}, {"x": 200, "y": 200}], [{"x": 300, "y": 100}, {"x": 200, "y": 200}]]"#,
        )
        .unwrap();

        let data_dir = Some(dir.path().join("data"));
        handle_teach(&strokes, "ん", data_dir.clone()).unwrap();
        handle_teach(&strokes, "ん", data_dir.clone()).unwrap();

        let store = Config::new(data_dir.clone()).unwrap().learning_store();
        assert_eq!(store.stats()["ん"].total_frequency, 2);

        handle_reset(data_dir.clone()).unwrap();
        let store = Config::new(data_dir).unwrap().learning_store();
        assert!(store.stats().is_empty());
    }
}
