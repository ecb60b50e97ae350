//! Pattern files.
//!
//! ```toml
//! total_beats = 32
//!
//! [[notes]]
//! beat = 0
//! note = "C4"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use sg_ir::{Pattern, PitchTable, MAX_TOTAL_BEATS};

#[derive(Debug)]
pub enum PatternFileError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
    /// A note name missing from the pitch table
    UnknownNote(String),
    BeatOutOfRange { beat: usize, total_beats: usize },
    NoBeats,
    TooManyBeats(usize),
}

impl std::fmt::Display for PatternFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternFileError::Io(e) => write!(f, "pattern file IO error: {}", e),
            PatternFileError::Parse(e) => write!(f, "malformed pattern file: {}", e),
            PatternFileError::Serialize(e) => write!(f, "could not encode pattern: {}", e),
            PatternFileError::UnknownNote(name) => write!(f, "unknown note '{}'", name),
            PatternFileError::BeatOutOfRange { beat, total_beats } => {
                write!(f, "beat {} out of range (pattern has {} beats)", beat, total_beats)
            }
            PatternFileError::NoBeats => write!(f, "pattern must have at least one beat"),
            PatternFileError::TooManyBeats(n) => {
                write!(f, "pattern has {} beats, at most {} are supported", n, MAX_TOTAL_BEATS)
            }
        }
    }
}

impl std::error::Error for PatternFileError {}

impl From<std::io::Error> for PatternFileError {
    fn from(e: std::io::Error) -> Self {
        PatternFileError::Io(e)
    }
}

impl From<toml::de::Error> for PatternFileError {
    fn from(e: toml::de::Error) -> Self {
        PatternFileError::Parse(e)
    }
}

impl From<toml::ser::Error> for PatternFileError {
    fn from(e: toml::ser::Error) -> Self {
        PatternFileError::Serialize(e)
    }
}

#[derive(Serialize, Deserialize)]
struct PatternFile {
    total_beats: usize,
    #[serde(default)]
    notes: Vec<NoteEntry>,
}

#[derive(Serialize, Deserialize)]
struct NoteEntry {
    beat: usize,
    note: String,
}

pub fn parse_pattern(src: &str, pitches: &PitchTable) -> Result<Pattern, PatternFileError> {
    let file: PatternFile = toml::from_str(src)?;
    if file.total_beats == 0 {
        return Err(PatternFileError::NoBeats);
    }
    if file.total_beats > MAX_TOTAL_BEATS {
        return Err(PatternFileError::TooManyBeats(file.total_beats));
    }

    let mut pattern = Pattern::new(file.total_beats);
    for entry in &file.notes {
        if entry.beat >= file.total_beats {
            return Err(PatternFileError::BeatOutOfRange {
                beat: entry.beat,
                total_beats: file.total_beats,
            });
        }
        let note = pitches
            .lookup(&entry.note)
            .ok_or_else(|| PatternFileError::UnknownNote(entry.note.clone()))?;
        pattern.insert(entry.beat, note);
    }
    Ok(pattern)
}

/// Cells are written beat by beat, lowest pitch first.
pub fn pattern_to_toml(pattern: &Pattern, pitches: &PitchTable) -> Result<String, PatternFileError> {
    let file = PatternFile {
        total_beats: pattern.total_beats(),
        notes: pattern
            .active_cells()
            .map(|(beat, note)| NoteEntry {
                beat,
                note: pitches.name(note).to_string(),
            })
            .collect(),
    };
    Ok(toml::to_string(&file)?)
}

pub fn load_pattern(path: &Path, pitches: &PitchTable) -> Result<Pattern, PatternFileError> {
    let src = std::fs::read_to_string(path)?;
    parse_pattern(&src, pitches)
}

pub fn save_pattern(path: &Path, pattern: &Pattern, pitches: &PitchTable) -> Result<(), PatternFileError> {
    std::fs::write(path, pattern_to_toml(pattern, pitches)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_aliases() {
        let table = PitchTable::standard();
        let src = r#"
total_beats = 8

[[notes]]
beat = 0
note = "C4"

[[notes]]
beat = 3
note = "Db4"
"#;
        let pattern = parse_pattern(src, &table).unwrap();
        assert_eq!(pattern.total_beats(), 8);
        assert!(pattern.is_active(0, table.lookup("C4").unwrap()));
        assert!(pattern.is_active(3, table.lookup("C#4").unwrap()));
        assert_eq!(pattern.active_cells().count(), 2);
    }

    #[test]
    fn rejects_bad_cells() {
        let table = PitchTable::standard();
        let unknown = "total_beats = 4\n[[notes]]\nbeat = 0\nnote = \"H2\"\n";
        assert!(matches!(
            parse_pattern(unknown, &table),
            Err(PatternFileError::UnknownNote(n)) if n == "H2"
        ));

        let late = "total_beats = 4\n[[notes]]\nbeat = 4\nnote = \"C4\"\n";
        assert!(matches!(
            parse_pattern(late, &table),
            Err(PatternFileError::BeatOutOfRange { beat: 4, total_beats: 4 })
        ));

        assert!(matches!(parse_pattern("total_beats = 0\n", &table), Err(PatternFileError::NoBeats)));
        assert!(matches!(
            parse_pattern("total_beats = 100000000000\n", &table),
            Err(PatternFileError::TooManyBeats(100_000_000_000))
        ));
        assert!(parse_pattern("total_beats = 256\n", &table).is_ok());
    }

    #[test]
    fn written_file_reads_back() {
        let table = PitchTable::standard();
        let mut pattern = Pattern::new(16);
        pattern.insert(0, table.lookup("C#4").unwrap());
        pattern.insert(15, table.lookup("C7").unwrap());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beat.toml");
        save_pattern(&path, &pattern, &table).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("total_beats = 16"));
        assert!(text.contains("C#4/Db4"));
        assert_eq!(load_pattern(&path, &table).unwrap(), pattern);
    }
}
