//! Breadth-first search over explored exits
//!
//! Neighbours are expanded in canonical direction order (north, south, east,
//! west, up, down, then alphabetical), so among equally short paths the one
//! found first in that order wins and results are reproducible. Unexplored
//! exits and exits pointing at unknown rooms are never followed.

use crate::map::{Map, Room};
use std::collections::{HashMap, HashSet, VecDeque};

/// One step of an annotated path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    pub direction: String,
    pub room_id: String,
    pub room_title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyRoom<'a> {
    pub room: &'a Room,
    pub distance: usize,
}

impl Map {
    /// Explored neighbours of a room in canonical direction order
    pub(crate) fn neighbours<'a>(&'a self, id: &str) -> Vec<(&'a str, &'a str)> {
        match self.rooms.get(id) {
            Some(room) => room
                .sorted_exits()
                .into_iter()
                .filter_map(|(dir, exit)| {
                    let dest = exit.destination()?;
                    self.rooms.contains_key(dest).then_some((dir, dest))
                })
                .collect(),
            None => Vec::new(),
        }
    }

    /// BFS tree rooted at `from`: each reached room maps to the room and
    /// direction it was reached through. Stops early once `target` is reached.
    fn bfs_parents<'a>(
        &'a self,
        from: &'a str,
        target: Option<&str>,
    ) -> HashMap<&'a str, Option<(&'a str, &'a str)>> {
        let mut parents: HashMap<&str, Option<(&str, &str)>> = HashMap::new();
        let mut queue = VecDeque::new();
        parents.insert(from, None);
        queue.push_back(from);

        while let Some(room) = queue.pop_front() {
            if Some(room) == target {
                break;
            }
            for (dir, next) in self.neighbours(room) {
                if parents.contains_key(next) {
                    continue;
                }
                parents.insert(next, Some((room, dir)));
                queue.push_back(next);
            }
        }
        parents
    }

    /// Rooms and directions from `from` to `to`, or `None` when unreachable
    fn route<'a>(&'a self, from: &'a str, to: &str) -> Option<Vec<(&'a str, &'a str)>> {
        if !self.rooms.contains_key(from) || !self.rooms.contains_key(to) {
            return None;
        }
        let parents = self.bfs_parents(from, Some(to));
        let (&target, _) = parents.get_key_value(to)?;

        let mut steps = Vec::new();
        let mut cursor = target;
        while let Some(Some((parent, dir))) = parents.get(cursor) {
            steps.push((*dir, cursor));
            cursor = *parent;
        }
        steps.reverse();
        Some(steps)
    }

    /// Directions leading from the current room to `target`.
    /// `Some(vec![])` when already there, `None` when unreachable.
    pub fn find_path(&self, target: &str) -> Option<Vec<String>> {
        let current = self.current_room_id.as_deref()?;
        let steps = self.route(current, target)?;
        Some(steps.into_iter().map(|(dir, _)| dir.to_string()).collect())
    }

    /// Like [`find_path`](Self::find_path), with each step naming the room it
    /// arrives in
    pub fn find_path_with_rooms(&self, target: &str) -> Option<Vec<PathStep>> {
        let current = self.current_room_id.as_deref()?;
        let steps = self.route(current, target)?;
        Some(
            steps
                .into_iter()
                .map(|(dir, id)| PathStep {
                    direction: dir.to_string(),
                    room_id: id.to_string(),
                    room_title: self.rooms.get(id).map(|r| r.title.clone()).unwrap_or_default(),
                })
                .collect(),
        )
    }

    /// Every room within `max_distance` hops of the current room, nearest
    /// first, ties ordered by title. The current room itself is excluded.
    pub fn find_nearby_rooms(&self, max_distance: usize) -> Option<Vec<NearbyRoom<'_>>> {
        let current = self.current_room_id.as_deref()?;
        if !self.rooms.contains_key(current) {
            return None;
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue = VecDeque::new();
        let mut found = Vec::new();
        seen.insert(current);
        queue.push_back((current, 0usize));

        while let Some((id, distance)) = queue.pop_front() {
            if distance >= max_distance {
                continue;
            }
            for (_, next) in self.neighbours(id) {
                if seen.insert(next) {
                    if let Some(room) = self.rooms.get(next) {
                        found.push(NearbyRoom {
                            room,
                            distance: distance + 1,
                        });
                    }
                    queue.push_back((next, distance + 1));
                }
            }
        }

        found.sort_by(|a, b| {
            a.distance
                .cmp(&b.distance)
                .then_with(|| a.room.title.cmp(&b.room.title))
                .then_with(|| a.room.id.cmp(&b.room.id))
        });
        Some(found)
    }

    /// Hop count between two rooms along explored exits
    pub fn distance_between(&self, from: &str, to: &str) -> Option<usize> {
        self.route(from, to).map(|steps| steps.len())
    }
}
