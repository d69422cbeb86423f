//! The world graph: rooms, exits, and how new observations are merged in
//!
//! `Map` owns every `Room` in an arena keyed by room ID. Exits, the current
//! and previous location, and the durable numbering all refer to rooms by ID
//! only, which keeps the structure trivially serializable.

use crate::direction::{compare_directions, normalize_direction, reverse_direction};
use crate::room_id::{content_signature, extract_first_sentence, generate_room_id};
use crate::room_parser::RoomInfo;
use indexmap::IndexSet;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a known exit leads. A direction missing from `Room::exits`
/// altogether has not been observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Exit {
    /// The exit exists but nobody has walked through it yet
    Unexplored,
    To(String),
}

impl Exit {
    pub fn destination(&self) -> Option<&str> {
        match self {
            Exit::Unexplored => None,
            Exit::To(id) => Some(id.as_str()),
        }
    }

    pub fn is_explored(&self) -> bool {
        matches!(self, Exit::To(_))
    }
}

// Persisted as the destination ID, or "" while unexplored
impl From<String> for Exit {
    fn from(id: String) -> Self {
        if id.is_empty() {
            Exit::Unexplored
        } else {
            Exit::To(id)
        }
    }
}

impl From<Exit> for String {
    fn from(exit: Exit) -> String {
        match exit {
            Exit::Unexplored => String::new(),
            Exit::To(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    #[serde(alias = "ID")]
    pub id: String,
    #[serde(alias = "Title")]
    pub title: String,
    #[serde(alias = "Description", default)]
    pub description: String,
    #[serde(alias = "FirstSentence", default)]
    pub first_sentence: String,
    #[serde(alias = "Exits", default, deserialize_with = "null_as_default::deserialize")]
    pub exits: BTreeMap<String, Exit>,
    #[serde(alias = "VisitCount", default)]
    pub visit_count: u32,
}

impl Room {
    /// Build an unmerged candidate; its ID is assigned by `Map::add_or_update_room`
    pub fn new<I, S>(title: &str, description: &str, exits: I) -> Room
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let exits = exits
            .into_iter()
            .map(|dir| (normalize_direction(dir.as_ref()), Exit::Unexplored))
            .filter(|(dir, _)| !dir.is_empty())
            .collect();
        Room {
            id: String::new(),
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            first_sentence: extract_first_sentence(description.trim()).trim().to_string(),
            exits,
            visit_count: 1,
        }
    }

    pub fn from_info(info: &RoomInfo) -> Room {
        Room::new(&info.title, &info.description, &info.exits)
    }

    pub fn exit(&self, direction: &str) -> Option<&Exit> {
        self.exits.get(&normalize_direction(direction))
    }

    pub fn exit_names(&self) -> Vec<&str> {
        self.exits.keys().map(|k| k.as_str()).collect()
    }

    /// Exits in canonical direction order
    pub fn sorted_exits(&self) -> Vec<(&str, &Exit)> {
        let mut exits: Vec<(&str, &Exit)> = self.exits.iter().map(|(d, e)| (d.as_str(), e)).collect();
        exits.sort_by(|a, b| compare_directions(a.0, b.0));
        exits
    }

    /// Title, first sentence and exit set, without the distance component
    pub fn signature(&self) -> String {
        content_signature(&self.title, &self.description, &self.exit_names())
    }
}

mod empty_as_none {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let value: Option<String> = Option::deserialize(deserializer)?;
        Ok(value.filter(|s| !s.is_empty()))
    }
}

// Nil maps and slices come through as `null`
mod null_as_default {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Map {
    #[serde(alias = "Rooms", default, deserialize_with = "null_as_default::deserialize")]
    pub(crate) rooms: BTreeMap<String, Room>,
    #[serde(alias = "CurrentRoomID", default, with = "empty_as_none")]
    pub(crate) current_room_id: Option<String>,
    #[serde(alias = "PreviousRoomID", default, with = "empty_as_none")]
    pub(crate) previous_room_id: Option<String>,
    #[serde(alias = "LastDirection", default, with = "empty_as_none")]
    pub(crate) last_direction: Option<String>,
    /// Append-only discovery order; a room's number is its position plus one
    #[serde(alias = "RoomNumbering", default, deserialize_with = "null_as_default::deserialize")]
    pub(crate) room_numbering: IndexSet<String>,
    /// `last_direction` has not been used by a merge yet
    #[serde(skip)]
    pub(crate) direction_pending: bool,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn current_room_id(&self) -> Option<&str> {
        self.current_room_id.as_deref()
    }

    pub fn previous_room_id(&self) -> Option<&str> {
        self.previous_room_id.as_deref()
    }

    pub fn current_room(&self) -> Option<&Room> {
        self.current_room_id.as_ref().and_then(|id| self.rooms.get(id))
    }

    pub fn previous_room(&self) -> Option<&Room> {
        self.previous_room_id.as_ref().and_then(|id| self.rooms.get(id))
    }

    pub fn last_direction(&self) -> Option<&str> {
        self.last_direction.as_deref()
    }

    /// Record the movement command about to be sent; an empty string clears it.
    /// The direction links only the next merged room.
    pub fn set_last_direction(&mut self, direction: &str) {
        let normalized = normalize_direction(direction);
        self.last_direction = if normalized.is_empty() {
            None
        } else {
            Some(normalized)
        };
        self.direction_pending = self.last_direction.is_some();
    }

    /// Whether the next merge will link through `last_direction`
    pub fn has_pending_direction(&self) -> bool {
        self.direction_pending
    }

    /// The next room arrives some other way than walking (recall, summon,
    /// login), so it must not be linked to the current room
    pub fn cancel_pending_direction(&mut self) {
        self.direction_pending = false;
    }

    /// Move the current location to a known room without linking anything,
    /// used when the player is teleported or the mapper lost track
    pub fn set_current_room(&mut self, id: &str) -> bool {
        if !self.rooms.contains_key(id) {
            return false;
        }
        if self.current_room_id.as_deref() != Some(id) {
            self.previous_room_id = self.current_room_id.take();
            self.current_room_id = Some(id.to_string());
        }
        true
    }

    /// The first room ever discovered; distances are measured from here
    pub fn room_zero(&self) -> Option<&str> {
        self.room_numbering.get_index(0).map(|id| id.as_str())
    }

    pub fn room_numbering(&self) -> impl Iterator<Item = &str> {
        self.room_numbering.iter().map(|id| id.as_str())
    }

    /// 1-indexed durable number of a room
    pub fn room_number(&self, id: &str) -> Option<usize> {
        self.room_numbering.get_index_of(id).map(|i| i + 1)
    }

    pub fn room_by_number(&self, number: usize) -> Option<&Room> {
        let index = number.checked_sub(1)?;
        let id = self.room_numbering.get_index(index)?;
        self.rooms.get(id)
    }

    /// Rooms whose title contains `query`, ignoring case, in numbering order
    pub fn find_rooms_by_title(&self, query: &str) -> Vec<&Room> {
        let needle = query.trim().to_lowercase();
        self.room_numbering
            .iter()
            .filter_map(|id| self.rooms.get(id))
            .filter(|room| room.title.to_lowercase().contains(&needle))
            .collect()
    }

    /// Append rooms missing from the numbering, in sorted ID order.
    /// Returns true when anything was added.
    pub(crate) fn complete_numbering(&mut self) -> bool {
        let before = self.room_numbering.len();
        for id in self.rooms.keys() {
            if !self.room_numbering.contains(id) {
                self.room_numbering.insert(id.clone());
            }
        }
        self.room_numbering.len() != before
    }

    /// Merge a freshly parsed room into the graph and make it the current room.
    /// Returns the ID of the room the player is now in.
    pub fn add_or_update_room(&mut self, candidate: Room) -> String {
        debug_assert!(
            !candidate.title.trim().is_empty(),
            "room candidate without a title"
        );

        let known = if self.direction_pending {
            self.known_exit_revisit(&candidate)
        } else {
            self.undirected_match(&candidate)
        };

        let resolved = match known {
            Some(id) => {
                debug!("Revisiting {:?}", id);
                self.merge_revisit(&id, &candidate);
                id
            }
            None => {
                let distance = self.candidate_distance();
                let id = generate_room_id(
                    &candidate.title,
                    &candidate.description,
                    &candidate.exit_names(),
                    distance,
                );
                if self.rooms.contains_key(&id) {
                    debug!("Recognized {:?} by content and distance", id);
                    self.merge_revisit(&id, &candidate);
                } else {
                    self.create_room(&id, candidate);
                }
                id
            }
        };

        if self.direction_pending {
            self.link_from_current(&resolved);
        }
        self.direction_pending = false;

        if self.current_room_id.as_deref() != Some(resolved.as_str()) {
            self.previous_room_id = self.current_room_id.take();
            self.current_room_id = Some(resolved.clone());
        }
        resolved
    }

    pub fn add_room_info(&mut self, info: &RoomInfo) -> String {
        self.add_or_update_room(Room::from_info(info))
    }

    /// The current room's exit in the last direction already leads to a room
    /// with the candidate's content
    fn known_exit_revisit(&self, candidate: &Room) -> Option<String> {
        let current = self.current_room_id.as_ref()?;
        let direction = self.last_direction.as_ref()?;
        let destination = self.rooms.get(current)?.exits.get(direction)?.destination()?;
        let room = self.rooms.get(destination)?;
        if room.signature() == candidate.signature() {
            Some(destination.to_string())
        } else {
            None
        }
    }

    /// A room arrived without a movement: the current room seen again, or
    /// the only known room with this content
    fn undirected_match(&self, candidate: &Room) -> Option<String> {
        let signature = candidate.signature();
        if let Some(current) = self.current_room() {
            if current.signature() == signature {
                return Some(current.id.clone());
            }
        }
        let mut matches = self.rooms.values().filter(|room| room.signature() == signature);
        match (matches.next(), matches.next()) {
            (Some(room), None) => Some(room.id.clone()),
            _ => None,
        }
    }

    /// Hop count from room zero to the room about to be entered
    fn candidate_distance(&self) -> Option<u32> {
        if self.rooms.is_empty() {
            return Some(0);
        }
        let current = self.current_room_id.as_deref()?;
        let zero = self.room_zero()?;
        self.distance_between(current, zero).map(|d| d as u32 + 1)
    }

    fn merge_revisit(&mut self, id: &str, candidate: &Room) {
        if let Some(room) = self.rooms.get_mut(id) {
            room.visit_count += 1;
            for direction in candidate.exits.keys() {
                room.exits
                    .entry(direction.clone())
                    .or_insert(Exit::Unexplored);
            }
        }
    }

    fn create_room(&mut self, id: &str, candidate: Room) {
        let mut room = candidate;
        room.id = id.to_string();
        room.visit_count = 1;
        info!(
            "New room #{}: {} ({} exits)",
            self.room_numbering.len() + 1,
            room.title,
            room.exits.len()
        );
        self.rooms.insert(id.to_string(), room);
        self.room_numbering.insert(id.to_string());
    }

    /// Record the step just taken and a tentative way back. The way back is
    /// only written when the entered room has no known destination in that
    /// direction yet; an explored reverse exit is never overwritten.
    fn link_from_current(&mut self, resolved: &str) {
        let (current, direction) = match (&self.current_room_id, &self.last_direction) {
            (Some(c), Some(d)) => (c.clone(), d.clone()),
            _ => return,
        };
        if current == resolved {
            return;
        }

        if let Some(room) = self.rooms.get_mut(&current) {
            let previous = room
                .exits
                .insert(direction.clone(), Exit::To(resolved.to_string()));
            if let Some(Exit::To(old)) = previous {
                if old != resolved {
                    warn!(
                        "Exit {} from {:?} now leads to {:?} instead of {:?}",
                        direction, current, resolved, old
                    );
                }
            }
        }

        if let Some(back) = reverse_direction(&direction) {
            if let Some(room) = self.rooms.get_mut(resolved) {
                let known = room.exits.get(back).map_or(false, |e| e.is_explored());
                if !known {
                    room.exits.insert(back.to_string(), Exit::To(current));
                }
            }
        }
    }

    /// Forget an exit entirely. Returns true when it existed.
    pub fn remove_exit(&mut self, room_id: &str, direction: &str) -> bool {
        let direction = normalize_direction(direction);
        match self.rooms.get_mut(room_id) {
            Some(room) => room.exits.remove(&direction).is_some(),
            None => false,
        }
    }

    /// The game refused the last move: drop that exit from the current room so
    /// no path ever proposes it again. Returns the removed direction.
    pub fn remove_failed_exit(&mut self) -> Option<String> {
        let current = self.current_room_id.clone()?;
        let direction = self.last_direction.clone()?;
        self.direction_pending = false;
        if self.remove_exit(&current, &direction) {
            info!("Removed failed exit {} from {:?}", direction, current);
            Some(direction)
        } else {
            debug!("Failed move {} was not a recorded exit of {:?}", direction, current);
            None
        }
    }
}
