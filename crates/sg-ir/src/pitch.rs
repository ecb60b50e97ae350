//! Pitch table: note names mapped to frequencies.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use arrayvec::ArrayString;
use core::fmt;

/// Longest accepted note name, e.g. `"C#1/Db1"`.
pub const MAX_NAME_LEN: usize = 8;

/// Index of a note in its [`PitchTable`].
///
/// Ids follow the table's declared order, so comparing two ids compares
/// their pitch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteId(pub u8);

impl NoteId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A named pitch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pitch {
    pub name: ArrayString<MAX_NAME_LEN>,
    /// Frequency in Hz
    pub frequency: f32,
}

/// Reasons a custom pitch table is rejected.
#[derive(Clone, Debug, PartialEq)]
pub enum PitchTableError {
    Empty,
    TooManyNotes(usize),
    NameTooLong(alloc::string::String),
    DuplicateName(alloc::string::String),
    BadFrequency { name: alloc::string::String, frequency: f32 },
    NotAscending { name: alloc::string::String },
}

impl fmt::Display for PitchTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PitchTableError::Empty => write!(f, "pitch table is empty"),
            PitchTableError::TooManyNotes(n) => write!(f, "pitch table has {} notes (max 256)", n),
            PitchTableError::NameTooLong(name) => {
                write!(f, "note name '{}' is longer than {} bytes", name, MAX_NAME_LEN)
            }
            PitchTableError::DuplicateName(name) => write!(f, "note name '{}' appears twice", name),
            PitchTableError::BadFrequency { name, frequency } => {
                write!(f, "note '{}' has invalid frequency {}", name, frequency)
            }
            PitchTableError::NotAscending { name } => {
                write!(f, "note '{}' is not higher than the note before it", name)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PitchTableError {}

/// Ordered note table, lowest to highest pitch.
///
/// The name index is built once; lookups accept the declared name or any
/// `/`-separated alias of it (`"C#4"`, `"Db4"` and `"C#4/Db4"` all resolve
/// to the same note).
#[derive(Clone, Debug)]
pub struct PitchTable {
    pitches: Vec<Pitch>,
    by_name: BTreeMap<ArrayString<MAX_NAME_LEN>, NoteId>,
}

const STANDARD: [(&str, f32); 73] = [
    ("C1", 32.7), ("C#1/Db1", 34.65), ("D1", 36.71), ("D#1/Eb1", 38.89),
    ("E1", 41.2), ("F1", 43.65), ("F#1/Gb1", 46.25), ("G1", 49.0),
    ("G#1/Ab1", 51.91), ("A1", 55.0), ("A#1/Bb1", 58.27), ("B1", 61.74),
    ("C2", 65.41), ("C#2/Db2", 69.3), ("D2", 73.42), ("D#2/Eb2", 77.78),
    ("E2", 82.41), ("F2", 87.31), ("F#2/Gb2", 92.5), ("G2", 98.0),
    ("G#2/Ab2", 103.83), ("A2", 110.0), ("A#2/Bb2", 116.54), ("B2", 123.47),
    ("C3", 130.81), ("C#3/Db3", 138.59), ("D3", 146.83), ("D#3/Eb3", 155.56),
    ("E3", 164.81), ("F3", 174.61), ("F#3/Gb3", 185.0), ("G3", 196.0),
    ("G#3/Ab3", 207.65), ("A3", 220.0), ("A#3/Bb3", 233.08), ("B3", 246.94),
    ("C4", 261.63), ("C#4/Db4", 277.18), ("D4", 293.66), ("D#4/Eb4", 311.13),
    ("E4", 329.63), ("F4", 349.23), ("F#4/Gb4", 369.99), ("G4", 392.0),
    ("G#4/Ab4", 415.3), ("A4", 440.0), ("A#4/Bb4", 466.16), ("B4", 493.88),
    ("C5", 523.25), ("C#5/Db5", 554.37), ("D5", 587.33), ("D#5/Eb5", 622.25),
    ("E5", 659.26), ("F5", 698.46), ("F#5/Gb5", 739.99), ("G5", 783.99),
    ("G#5/Ab5", 830.61), ("A5", 880.0), ("A#5/Bb5", 932.33), ("B5", 987.77),
    ("C6", 1046.5), ("C#6/Db6", 1108.73), ("D6", 1174.66), ("D#6/Eb6", 1244.51),
    ("E6", 1318.51), ("F6", 1396.91), ("F#6/Gb6", 1479.98), ("G6", 1567.98),
    ("G#6/Ab6", 1661.22), ("A6", 1760.0), ("A#6/Bb6", 1864.66), ("B6", 1975.53),
    ("C7", 2093.0),
];

impl PitchTable {
    /// The built-in six-octave table, C1 through C7.
    pub fn standard() -> Self {
        match Self::from_entries(STANDARD.iter().copied()) {
            Ok(table) => table,
            Err(e) => unreachable!("built-in pitch table is invalid: {}", e),
        }
    }

    /// Build a table from `(name, frequency)` pairs in ascending pitch order.
    pub fn from_entries<'a, I>(entries: I) -> Result<Self, PitchTableError>
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        let mut pitches: Vec<Pitch> = Vec::new();
        let mut by_name = BTreeMap::new();

        for (name, frequency) in entries {
            let owned = || alloc::string::String::from(name);
            let full = ArrayString::from(name).map_err(|_| PitchTableError::NameTooLong(owned()))?;

            if !(frequency.is_finite() && frequency > 0.0) {
                return Err(PitchTableError::BadFrequency { name: owned(), frequency });
            }
            if pitches.last().is_some_and(|prev| prev.frequency >= frequency) {
                return Err(PitchTableError::NotAscending { name: owned() });
            }
            if pitches.len() > u8::MAX as usize {
                return Err(PitchTableError::TooManyNotes(pitches.len() + 1));
            }

            let id = NoteId(pitches.len() as u8);
            for key in core::iter::once(name).chain(name.split('/')).filter(|k| !k.is_empty()) {
                // Every alias is a substring of `full`, so it fits.
                let key = ArrayString::from(key).unwrap_or(full);
                if by_name.insert(key, id).is_some_and(|prev| prev != id) {
                    return Err(PitchTableError::DuplicateName(alloc::string::String::from(key.as_str())));
                }
            }
            pitches.push(Pitch { name: full, frequency });
        }

        if pitches.is_empty() {
            return Err(PitchTableError::Empty);
        }
        Ok(Self { pitches, by_name })
    }

    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }

    /// Resolve a note name or alias.
    pub fn lookup(&self, name: &str) -> Option<NoteId> {
        let key = ArrayString::<MAX_NAME_LEN>::from(name.trim()).ok()?;
        self.by_name.get(&key).copied()
    }

    /// Frequency of `note`. Panics on an id from another table.
    pub fn frequency(&self, note: NoteId) -> f32 {
        self.pitches[note.index()].frequency
    }

    /// Declared name of `note`. Panics on an id from another table.
    pub fn name(&self, note: NoteId) -> &str {
        self.pitches[note.index()].name.as_str()
    }

    /// All notes, lowest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (NoteId, &Pitch)> + '_ {
        self.pitches
            .iter()
            .enumerate()
            .map(|(i, p)| (NoteId(i as u8), p))
    }
}

impl Default for PitchTable {
    fn default() -> Self {
        Self::standard()
    }
}
