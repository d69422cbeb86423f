//! Line-by-line glue between a game connection and the map
//!
//! The session watches outgoing commands and incoming lines. Any command arms
//! it: the next room whose exits line arrives after that command is merged
//! into the map. Only a movement command links that room to the one before
//! it; after `recall` or a summon the room is merged unlinked. A refusal
//! message after a movement command removes the exit instead.

use crate::ansi::strip_ansi;
use crate::autowalk::AutoWalk;
use crate::config::MapperConfig;
use crate::direction::parse_movement_command;
use crate::error::{MapperError, Result};
use crate::grid::{GridRenderer, RenderedMap};
use crate::map::Map;
use crate::room_parser::{MarkerRange, RoomTextParser};
use log::{debug, info};
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A room was recognized and merged; `number` is its durable number
    RoomEntered {
        id: String,
        number: usize,
        title: String,
    },
    /// The game refused the last movement command
    MoveFailed { direction: String },
}

#[derive(Debug)]
pub struct MapperSession {
    map: Map,
    parser: RoomTextParser,
    config: MapperConfig,
    window: VecDeque<String>,
    lines_since_command: usize,
    /// A command was sent and no room has been merged since
    awaiting_room: bool,
    /// That command was a movement
    pending_move: bool,
    walk: Option<AutoWalk>,
    last_markers: Option<MarkerRange>,
    failure_messages: Vec<String>,
}

impl MapperSession {
    pub fn new(map: Map, config: MapperConfig) -> Self {
        let failure_messages = config
            .session
            .failure_messages
            .iter()
            .map(|m| m.to_lowercase())
            .collect();
        Self {
            map,
            parser: RoomTextParser::new(config.parser.clone()),
            window: VecDeque::with_capacity(config.session.window_size),
            config,
            lines_since_command: 0,
            // the room shown on connecting counts as an answer
            awaiting_room: true,
            pending_move: false,
            walk: None,
            last_markers: None,
            failure_messages,
        }
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn into_map(self) -> Map {
        self.map
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Recent lines, ANSI stripped, oldest first
    pub fn window(&self) -> impl Iterator<Item = &str> {
        self.window.iter().map(|l| l.as_str())
    }

    pub fn walk(&self) -> Option<&AutoWalk> {
        self.walk.as_ref()
    }

    pub fn is_walking(&self) -> bool {
        self.walk.is_some()
    }

    /// A command the player (or the auto-walk) is sending to the game
    pub fn on_command(&mut self, command: &str) {
        self.lines_since_command = 0;
        self.awaiting_room = true;
        match parse_movement_command(command) {
            Some(direction) => {
                debug!("Movement command {:?}", direction);
                self.map.set_last_direction(&direction);
                self.pending_move = true;
            }
            None => {
                self.map.cancel_pending_direction();
                self.pending_move = false;
            }
        }
    }

    /// A line received from the game
    pub fn on_line(&mut self, raw: &str) -> Option<SessionEvent> {
        self.last_markers = None;
        let line = strip_ansi(raw).trim_end().to_string();
        self.window.push_back(line);
        while self.window.len() > self.config.session.window_size.max(1) {
            self.window.pop_front();
        }
        self.lines_since_command = (self.lines_since_command + 1).min(self.window.len());

        if !self.awaiting_room {
            return None;
        }

        if self.pending_move && self.is_failure(self.window.back()?) {
            return self.move_failed();
        }

        let arrived_from = self.window.len() - self.lines_since_command;
        let window = self.window.make_contiguous();
        let info = self.parser.parse(window)?;
        if info.exit_line < arrived_from {
            return None;
        }

        let id = self.map.add_room_info(&info);
        self.awaiting_room = false;
        self.pending_move = false;
        self.last_markers = info.markers;
        let number = self.map.room_number(&id).unwrap_or_default();
        self.advance_walk();

        Some(SessionEvent::RoomEntered {
            id,
            number,
            title: info.title,
        })
    }

    fn is_failure(&self, line: &str) -> bool {
        let lowered = line.to_lowercase();
        self.failure_messages.iter().any(|m| lowered.contains(m.as_str()))
    }

    fn move_failed(&mut self) -> Option<SessionEvent> {
        self.awaiting_room = false;
        self.pending_move = false;
        let direction = self
            .map
            .remove_failed_exit()
            .or_else(|| self.map.last_direction().map(|d| d.to_string()))?;

        if let Some(walk) = self.walk.as_mut() {
            if !walk.on_move_failed(&self.map) {
                info!("Auto-walk to {:?} abandoned", walk.target());
                self.walk = None;
            }
        }
        Some(SessionEvent::MoveFailed { direction })
    }

    fn advance_walk(&mut self) {
        if let Some(walk) = self.walk.as_mut() {
            if !walk.on_room_entered(&self.map) {
                info!("Auto-walk to {:?} abandoned", walk.target());
                self.walk = None;
            } else if walk.is_finished() {
                info!("Arrived at {:?}", walk.target());
                self.walk = None;
            }
        }
    }

    /// Start walking to a room. Returns the planned directions, or `None`
    /// when no explored route leads there.
    pub fn walk_to(&mut self, target: &str) -> Option<Vec<String>> {
        let walk = AutoWalk::plan(&self.map, target, self.config.autowalk.max_replans)?;
        let steps: Vec<String> = walk.remaining().iter().map(|d| d.to_string()).collect();
        self.walk = if walk.is_finished() { None } else { Some(walk) };
        Some(steps)
    }

    /// [`walk_to`](Self::walk_to) by durable room number
    pub fn walk_to_number(&mut self, number: usize) -> Result<Option<Vec<String>>> {
        let target = self
            .map
            .room_by_number(number)
            .map(|room| room.id.clone())
            .ok_or(MapperError::NoSuchRoom(number))?;
        Ok(self.walk_to(&target))
    }

    /// The command to send next while walking
    pub fn next_walk_step(&self) -> Option<String> {
        self.walk
            .as_ref()
            .and_then(|walk| walk.next_direction())
            .map(|d| d.to_string())
    }

    pub fn cancel_walk(&mut self) {
        if let Some(walk) = self.walk.take() {
            info!("Auto-walk to {:?} cancelled", walk.target());
        }
    }

    /// Window indices of the marker lines of the room parsed from the last
    /// line, so a client can hide them
    pub fn markers_to_suppress(&self) -> Option<MarkerRange> {
        self.last_markers
    }

    /// Map panel around the current room at the configured size
    pub fn render_map(&self, numbered: bool) -> Option<RenderedMap> {
        let renderer = GridRenderer::new(self.config.grid.clone());
        let legend: Option<HashMap<String, usize>> = numbered.then(|| {
            self.map
                .room_numbering()
                .enumerate()
                .map(|(i, id)| (id.to_string(), i + 1))
                .collect()
        });
        renderer.render_map(
            &self.map,
            self.config.grid.width,
            self.config.grid.height,
            legend.as_ref(),
        )
    }
}
