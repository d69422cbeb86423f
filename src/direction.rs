//! Direction names, aliases and the fixed reverse table
//!
//! Exits are keyed by plain strings because games invent their own exit names
//! ("portal", "enter", "climb"). The ten compass/vertical directions get
//! aliases, a reverse, and a canonical iteration order; everything else is
//! carried through lower-cased and has no reverse.

use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Up,
    Down,
    Northeast,
    Northwest,
    Southeast,
    Southwest,
}

pub const ALL_DIRECTIONS: [Direction; 10] = [
    Direction::North,
    Direction::South,
    Direction::East,
    Direction::West,
    Direction::Up,
    Direction::Down,
    Direction::Northeast,
    Direction::Northwest,
    Direction::Southeast,
    Direction::Southwest,
];

lazy_static! {
    static ref DIRECTION_NAMES: HashMap<&'static str, Direction> = {
        let mut m = HashMap::new();
        for dir in ALL_DIRECTIONS.iter() {
            m.insert(dir.as_str(), *dir);
            m.insert(dir.short(), *dir);
        }
        m
    };
}

impl Direction {
    /// Look up a full name or alias, ignoring case and surrounding whitespace
    pub fn parse(name: &str) -> Option<Direction> {
        let lowered = name.trim().to_ascii_lowercase();
        DIRECTION_NAMES.get(lowered.as_str()).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Northeast => "northeast",
            Direction::Northwest => "northwest",
            Direction::Southeast => "southeast",
            Direction::Southwest => "southwest",
        }
    }

    pub fn short(&self) -> &'static str {
        match self {
            Direction::North => "n",
            Direction::South => "s",
            Direction::East => "e",
            Direction::West => "w",
            Direction::Up => "u",
            Direction::Down => "d",
            Direction::Northeast => "ne",
            Direction::Northwest => "nw",
            Direction::Southeast => "se",
            Direction::Southwest => "sw",
        }
    }

    pub fn reverse(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Northeast => Direction::Southwest,
            Direction::Southwest => Direction::Northeast,
            Direction::Northwest => Direction::Southeast,
            Direction::Southeast => Direction::Northwest,
        }
    }

    /// Grid movement for the four cardinal directions; y grows southward
    pub fn grid_offset(&self) -> Option<(i32, i32)> {
        match self {
            Direction::North => Some((0, -1)),
            Direction::South => Some((0, 1)),
            Direction::East => Some((1, 0)),
            Direction::West => Some((-1, 0)),
            _ => None,
        }
    }

    pub fn is_diagonal(&self) -> bool {
        matches!(
            self,
            Direction::Northeast | Direction::Northwest | Direction::Southeast | Direction::Southwest
        )
    }

    /// Position in the canonical iteration order, only the first six rank ahead
    /// of the alphabetical tail
    fn rank(&self) -> Option<u8> {
        match self {
            Direction::North => Some(0),
            Direction::South => Some(1),
            Direction::East => Some(2),
            Direction::West => Some(3),
            Direction::Up => Some(4),
            Direction::Down => Some(5),
            _ => None,
        }
    }
}

/// Expand aliases and lower-case; unknown exit names pass through lower-cased
pub fn normalize_direction(name: &str) -> String {
    match Direction::parse(name) {
        Some(dir) => dir.as_str().to_string(),
        None => name.trim().to_ascii_lowercase(),
    }
}

/// Reverse of a direction name or alias, `None` outside the fixed set
pub fn reverse_direction(name: &str) -> Option<&'static str> {
    Direction::parse(name).map(|dir| dir.reverse().as_str())
}

/// Canonical ordering: north, south, east, west, up, down, then everything
/// else alphabetically
pub fn compare_directions(a: &str, b: &str) -> Ordering {
    let rank_a = Direction::parse(a).and_then(|d| d.rank());
    let rank_b = Direction::parse(b).and_then(|d| d.rank());
    match (rank_a, rank_b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => normalize_direction(a).cmp(&normalize_direction(b)),
    }
}

pub fn sort_directions<S: AsRef<str>>(dirs: &mut [S]) {
    dirs.sort_by(|a, b| compare_directions(a.as_ref(), b.as_ref()));
}

/// Recognize a movement command: a bare direction or alias, or `go <dir>`.
/// Non-standard exit names only count when prefixed with `go`.
pub fn parse_movement_command(command: &str) -> Option<String> {
    let trimmed = command.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(dir) = Direction::parse(trimmed) {
        return Some(dir.as_str().to_string());
    }
    let lowered = trimmed.to_ascii_lowercase();
    let rest = lowered.strip_prefix("go ")?.trim();
    if rest.is_empty() || rest.contains(char::is_whitespace) {
        return None;
    }
    Some(normalize_direction(rest))
}
