//! Walking a planned route one command at a time
//!
//! The plan is a queue of directions computed by BFS. After each arrival the
//! walker checks it is still on the planned route and replans from wherever
//! it actually ended up; a refused move replans around the removed exit.

use crate::map::Map;
use crate::pathfinding::PathStep;
use log::{debug, info, warn};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub struct AutoWalk {
    target: String,
    steps: VecDeque<PathStep>,
    replans: usize,
    max_replans: usize,
}

impl AutoWalk {
    /// `None` when the target cannot be reached along explored exits
    pub fn plan(map: &Map, target: &str, max_replans: usize) -> Option<AutoWalk> {
        let steps = map.find_path_with_rooms(target)?;
        info!("Walking to {:?}: {} steps", target, steps.len());
        Some(AutoWalk {
            target: target.to_string(),
            steps: steps.into(),
            replans: 0,
            max_replans,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn next_direction(&self) -> Option<&str> {
        self.steps.front().map(|step| step.direction.as_str())
    }

    pub fn remaining(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.direction.as_str()).collect()
    }

    pub fn is_finished(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn replans(&self) -> usize {
        self.replans
    }

    /// Advance after a room was entered. Returns false when the walk can no
    /// longer continue.
    pub fn on_room_entered(&mut self, map: &Map) -> bool {
        let current = match map.current_room_id() {
            Some(current) => current,
            None => return false,
        };

        if let Some(pos) = self.steps.iter().position(|step| step.room_id == current) {
            self.steps.drain(..=pos);
            return true;
        }
        if current == self.target {
            self.steps.clear();
            return true;
        }

        debug!("Left the planned route at {:?}, replanning", current);
        self.replan(map)
    }

    /// The last move was refused and its exit removed. Returns false when the
    /// walk has to be abandoned.
    pub fn on_move_failed(&mut self, map: &Map) -> bool {
        self.replan(map)
    }

    fn replan(&mut self, map: &Map) -> bool {
        if self.replans >= self.max_replans {
            warn!("Giving up on {:?} after {} replans", self.target, self.replans);
            self.steps.clear();
            return false;
        }
        self.replans += 1;
        match map.find_path_with_rooms(&self.target) {
            Some(steps) => {
                debug!("Replanned to {:?}: {} steps", self.target, steps.len());
                self.steps = steps.into();
                true
            }
            None => {
                warn!("No route left to {:?}", self.target);
                self.steps.clear();
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Room;
    use test_log::test;

    fn walk(map: &mut Map, direction: &str, title: &str, exits: &[&str]) -> String {
        map.set_last_direction(direction);
        map.add_or_update_room(Room::new(title, &format!("The {}.", title), exits))
    }

    /// Hall(north, east) with a north loop Hall -> North -> Corner and an
    /// east way Hall -> East -> Corner, all explored, ending back in the hall
    fn square() -> (Map, String, String) {
        let mut map = Map::new();
        let hall = map.add_or_update_room(Room::new("Hall", "The Hall.", ["north", "east"]));
        walk(&mut map, "north", "North Room", &["south", "east"]);
        let corner = walk(&mut map, "east", "Corner", &["west", "south"]);
        walk(&mut map, "west", "North Room", &["south", "east"]);
        walk(&mut map, "south", "Hall", &["north", "east"]);
        walk(&mut map, "east", "East Room", &["west", "north"]);
        walk(&mut map, "west", "Hall", &["north", "east"]);
        assert_eq!(map.current_room_id(), Some(hall.as_str()));
        (map, hall, corner)
    }

    #[test]
    fn test_walk_follows_plan() {
        let (mut map, _, corner) = square();
        let mut auto = AutoWalk::plan(&map, &corner, 3).unwrap();
        assert_eq!(auto.remaining(), vec!["north", "east"]);
        assert_eq!(auto.target(), corner);

        walk(&mut map, "north", "North Room", &["south", "east"]);
        assert!(auto.on_room_entered(&map));
        assert_eq!(auto.next_direction(), Some("east"));

        walk(&mut map, "east", "Corner", &["west", "south"]);
        assert!(auto.on_room_entered(&map));
        assert!(auto.is_finished());
        assert_eq!(auto.next_direction(), None);
    }

    #[test]
    fn test_failed_move_replans_around_removed_exit() {
        let (mut map, hall, corner) = square();
        // make the east side reach the corner too
        let east = map.room_by_number(4).unwrap().id.clone();
        map.rooms
            .get_mut(&east)
            .unwrap()
            .exits
            .insert("north".to_string(), crate::map::Exit::To(corner.clone()));

        let mut auto = AutoWalk::plan(&map, &corner, 3).unwrap();
        assert_eq!(auto.next_direction(), Some("north"));

        map.set_last_direction("north");
        assert_eq!(map.remove_failed_exit(), Some("north".to_string()));
        assert!(auto.on_move_failed(&map));
        assert_eq!(auto.remaining(), vec!["east", "north"]);
        assert_eq!(auto.replans(), 1);
        assert_eq!(map.current_room_id(), Some(hall.as_str()));
    }

    #[test]
    fn test_gives_up_without_route() {
        let (mut map, _, corner) = square();
        let mut auto = AutoWalk::plan(&map, &corner, 3).unwrap();
        map.set_last_direction("north");
        map.remove_failed_exit();
        assert!(!auto.on_move_failed(&map));
        assert!(auto.is_finished());
    }

    #[test]
    fn test_replan_limit() {
        let (mut map, _, corner) = square();
        let mut auto = AutoWalk::plan(&map, &corner, 0).unwrap();
        map.set_last_direction("east");
        map.remove_failed_exit();
        assert!(!auto.on_move_failed(&map));
    }

    #[test]
    fn test_unreachable_target_has_no_plan() {
        let (map, _, _) = square();
        assert!(AutoWalk::plan(&map, "nowhere", 3).is_none());
    }

    #[test]
    fn test_off_route_arrival_replans() {
        let (mut map, _, corner) = square();
        let mut auto = AutoWalk::plan(&map, &corner, 3).unwrap();
        // went east instead of north
        walk(&mut map, "east", "East Room", &["west", "north"]);
        assert!(auto.on_room_entered(&map));
        assert_eq!(auto.remaining(), vec!["west", "north", "east"]);
        assert_eq!(auto.replans(), 1);
    }
}
