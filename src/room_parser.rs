//! Room text recognition
//!
//! Works backward from the most recent exits line in a window of received
//! lines, collecting the room title and description above it. Two layouts are
//! understood:
//!
//! ```text
//! The Temple Square                    --<
//! You are standing in a large ...      The Temple Square
//! [Exits: n s e]                       You are standing in a large ...
//!                                      >-- Exits:NSE
//! ```
//!
//! The parser never fails. A window without a recognizable room gives `None`
//! and the caller simply has nothing to merge.

use crate::ansi::strip_ansi;
use crate::config::ParserConfig;
use crate::direction::normalize_direction;
use log::{log_enabled, trace, Level};
use regex::Regex;

/// Candidate room recovered from game text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub title: String,
    pub description: String,
    /// Normalized exit directions in the order the game listed them
    pub exits: Vec<String>,
    /// Index of the exits line within the parsed window
    pub exit_line: usize,
    /// Bracket marker lines, for callers that hide them from display
    pub markers: Option<MarkerRange>,
}

/// Window indices of the open and close marker lines of a bracketed room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerRange {
    pub open: usize,
    pub close: usize,
}

impl MarkerRange {
    pub fn contains(&self, index: usize) -> bool {
        index == self.open || index == self.close
    }
}

lazy_static! {
    // "<20hp 100mv Exits:N(S)E>", ">-- Exits:NSE", or "Exits:none>" in a dead end
    static ref COMPACT_EXITS: Regex =
        Regex::new(r"Exits:([NSEWUD()]*|none)(?:>|\s*$)").unwrap();
    static ref BRACKET_EXITS: Regex =
        Regex::new(r"(?i)^\s*\[\s*exits?:\s*(.*?)\s*\]\s*$").unwrap();
    static ref LIST_EXITS: Regex =
        Regex::new(r"(?i)^\s*(?:obvious\s+)?exits?:\s*(.*?)\s*$").unwrap();
    static ref PROMPT: Regex = Regex::new(r"^\s*<[^>]*>").unwrap();
}

const EXIT_STOPWORDS: &[&str] = &[
    "and", "or", "none", "exit", "exits", "obvious", "the", "closed", "open", "door",
];

const STATUS_PHRASES: &[&str] = &[
    "you feel",
    "is lying here",
    "are lying here",
    "is standing here",
    "are standing here",
    "is sitting here",
    "is resting here",
    "is sleeping here",
    "is floating here",
    "has arrived",
    "you hear",
    "hits you",
    "misses you",
    "you hit ",
    "you miss ",
    "you are hungry",
    "you are thirsty",
    "tells you",
];

const PRESENCE_PREFIXES: &[&str] = &[
    "a small ",
    "a large ",
    "an ",
    "some ",
    "there is ",
    "there are ",
];

/// Exit directions named on a line, or `None` if the line is not an exits line.
/// When a line carries several compact exit runs, the last one wins.
pub fn find_exits(line: &str) -> Option<Vec<String>> {
    if let Some(caps) = COMPACT_EXITS.captures_iter(line).last() {
        return Some(parse_compact_exits(&caps[1]));
    }
    if let Some(caps) = BRACKET_EXITS.captures(line) {
        return Some(parse_exit_list(&caps[1]));
    }
    if let Some(caps) = LIST_EXITS.captures(line) {
        return Some(parse_exit_list(&caps[1]));
    }
    None
}

/// One letter per direction; parenthesized letters are closed doors
fn parse_compact_exits(letters: &str) -> Vec<String> {
    let mut exits: Vec<String> = Vec::new();
    for ch in letters.chars() {
        let dir = match ch {
            'N' => "north",
            'S' => "south",
            'E' => "east",
            'W' => "west",
            'U' => "up",
            'D' => "down",
            _ => continue,
        };
        if !exits.iter().any(|e| e == dir) {
            exits.push(dir.to_string());
        }
    }
    exits
}

fn parse_exit_list(list: &str) -> Vec<String> {
    let lowered = list.to_ascii_lowercase();
    let mut exits: Vec<String> = Vec::new();
    for token in lowered.split(|c: char| c == ',' || c.is_whitespace()) {
        let token = token.trim_matches(|c: char| !c.is_ascii_alphabetic());
        if token.is_empty() || EXIT_STOPWORDS.contains(&token) {
            continue;
        }
        if !token.chars().all(|c| c.is_ascii_alphabetic()) {
            continue;
        }
        let dir = normalize_direction(token);
        if !exits.contains(&dir) {
            exits.push(dir);
        }
    }
    exits
}

/// Collects decision notes when a trace was asked for, and mirrors them to
/// the `trace` log level
struct Tracer<'a> {
    notes: Option<&'a mut Vec<String>>,
}

impl Tracer<'_> {
    fn note<F: FnOnce() -> String>(&mut self, message: F) {
        let logging = log_enabled!(Level::Trace);
        if self.notes.is_none() && !logging {
            return;
        }
        let message = message();
        if logging {
            trace!("room parser: {}", message);
        }
        if let Some(notes) = self.notes.as_mut() {
            notes.push(message);
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoomTextParser {
    config: ParserConfig,
    extra_status: Vec<String>,
}

impl Default for RoomTextParser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl RoomTextParser {
    pub fn new(config: ParserConfig) -> Self {
        let extra_status = config
            .extra_status_phrases
            .iter()
            .map(|p| p.to_lowercase())
            .collect();
        Self {
            config,
            extra_status,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Extract the most recent room from a window of lines
    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> Option<RoomInfo> {
        self.parse_inner(lines, &mut Tracer { notes: None })
    }

    /// Same as [`parse`](Self::parse), also returning the decisions taken
    pub fn parse_with_trace<S: AsRef<str>>(&self, lines: &[S]) -> (Option<RoomInfo>, Vec<String>) {
        let mut notes = Vec::new();
        let room = self.parse_inner(lines, &mut Tracer { notes: Some(&mut notes) });
        (room, notes)
    }

    fn parse_inner<S: AsRef<str>>(&self, lines: &[S], tracer: &mut Tracer) -> Option<RoomInfo> {
        let cleaned: Vec<String> = lines
            .iter()
            .map(|l| strip_ansi(l.as_ref()).trim_end().to_string())
            .collect();

        let (exit_line, exits) = match self.last_exits_line(&cleaned) {
            Some(found) => found,
            None => {
                tracer.note(|| format!("no exits line in {} lines", cleaned.len()));
                return None;
            }
        };
        tracer.note(|| format!("exits line {} gives {:?}", exit_line, exits));

        if let Some(markers) = self.bracketed_block(&cleaned, exit_line) {
            tracer.note(|| {
                format!(
                    "bracketed block between lines {} and {}",
                    markers.open, markers.close
                )
            });
            let block: Vec<&str> = ((markers.open + 1)..markers.close)
                .map(|i| cleaned[i].trim())
                .filter(|t| {
                    if t.is_empty() {
                        return false;
                    }
                    if self.is_status_line(t) {
                        tracer.note(|| format!("skipping status line {:?}", t));
                        return false;
                    }
                    true
                })
                .collect();
            return self.build_room(&block, exits, exit_line, Some(markers), tracer);
        }

        let block = self.collect_block(&cleaned, exit_line, tracer);
        self.build_room(&block, exits, exit_line, None, tracer)
    }

    /// The close marker prefix is not part of the exit grammar
    fn exit_source<'a>(&self, line: &'a str) -> &'a str {
        let trimmed = line.trim_start();
        trimmed
            .strip_prefix(self.config.close_marker.as_str())
            .unwrap_or(trimmed)
    }

    fn exits_at(&self, line: &str) -> Option<Vec<String>> {
        find_exits(self.exit_source(line))
    }

    fn last_exits_line(&self, lines: &[String]) -> Option<(usize, Vec<String>)> {
        lines
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, line)| self.exits_at(line).map(|exits| (i, exits)))
    }

    fn is_open_marker(&self, line: &str) -> bool {
        !self.config.open_marker.is_empty() && line.trim().starts_with(self.config.open_marker.as_str())
    }

    fn is_close_marker(&self, line: &str) -> bool {
        !self.config.close_marker.is_empty()
            && line.trim().starts_with(self.config.close_marker.as_str())
    }

    /// Bracketed layout applies when the latest exits line is the first one at
    /// or after a close marker that has an open marker above it
    fn bracketed_block(&self, lines: &[String], exit_line: usize) -> Option<MarkerRange> {
        let close = (0..=exit_line).rev().find(|&i| self.is_close_marker(&lines[i]))?;
        let first_exits = (close..lines.len()).find(|&i| self.exits_at(&lines[i]).is_some())?;
        if first_exits != exit_line {
            return None;
        }
        let open = (0..close).rev().find(|&i| self.is_open_marker(&lines[i]))?;
        Some(MarkerRange { open, close })
    }

    fn collect_block<'a>(
        &self,
        lines: &'a [String],
        exit_line: usize,
        tracer: &mut Tracer,
    ) -> Vec<&'a str> {
        let mut block = Vec::new();
        let mut blank_run = 0;
        let mut examined = 0;
        let mut index = exit_line;

        while index > 0 {
            index -= 1;
            if examined >= self.config.max_block_lines {
                tracer.note(|| format!("line budget of {} exhausted", self.config.max_block_lines));
                break;
            }
            examined += 1;

            let text = lines[index].trim();
            if text.is_empty() {
                blank_run += 1;
                if blank_run >= 2 {
                    tracer.note(|| format!("two blank lines above line {}", index + 1));
                    break;
                }
                continue;
            }
            blank_run = 0;

            if self.exits_at(text).is_some() {
                tracer.note(|| format!("earlier exits line {} ends the block", index));
                break;
            }
            if self.is_open_marker(text) || self.is_close_marker(text) {
                tracer.note(|| format!("marker line {} ends the block", index));
                break;
            }
            if self.is_status_line(text) {
                tracer.note(|| format!("skipping status line {:?}", text));
                continue;
            }
            block.push(text);
        }

        block.reverse();
        block
    }

    fn is_status_line(&self, text: &str) -> bool {
        if PROMPT.is_match(text) {
            return true;
        }
        let lowered = text.to_lowercase();
        if STATUS_PHRASES.iter().any(|p| lowered.contains(p)) {
            return true;
        }
        if self.extra_status.iter().any(|p| lowered.contains(p.as_str())) {
            return true;
        }
        // "A small dog sniffs around here."
        PRESENCE_PREFIXES.iter().any(|p| lowered.starts_with(p)) && lowered.contains(" here")
    }

    fn build_room(
        &self,
        block: &[&str],
        exits: Vec<String>,
        exit_line: usize,
        markers: Option<MarkerRange>,
        tracer: &mut Tracer,
    ) -> Option<RoomInfo> {
        if block.is_empty() {
            tracer.note(|| "no room text above the exits line".to_string());
            return None;
        }

        let title_index = match block.iter().position(|line| looks_like_title(line)) {
            Some(i) => {
                tracer.note(|| format!("title {:?}", block[i]));
                i
            }
            None => {
                tracer.note(|| format!("no title-like line, using {:?}", block[0]));
                0
            }
        };

        Some(RoomInfo {
            title: block[title_index].to_string(),
            description: block[title_index + 1..].join(" "),
            exits,
            exit_line,
            markers,
        })
    }
}

fn looks_like_title(line: &str) -> bool {
    let lowered = line.to_lowercase();
    if lowered.starts_with("you ") {
        return false;
    }
    if PRESENCE_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
        return false;
    }
    let words = line.split_whitespace().count();
    if !(2..=8).contains(&words) {
        return false;
    }
    if !line.chars().next().map_or(false, |c| c.is_uppercase()) {
        return false;
    }
    !line.ends_with(&['.', '!', '?'][..])
}

/// Parse with the default configuration
pub fn parse_room<S: AsRef<str>>(lines: &[S]) -> Option<RoomInfo> {
    RoomTextParser::default().parse(lines)
}
