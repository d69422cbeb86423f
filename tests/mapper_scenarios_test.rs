//! End-to-end mapping scenarios through the public API
//!
//! Each test feeds game text the way a client would: commands through
//! `on_command`, received lines through `on_line`, and then checks what the
//! map, the path finder and the grid make of it.

use mudmap::direction::parse_movement_command;
use mudmap::room_id::generate_room_id;
use mudmap::room_parser::find_exits;
use mudmap::{
    build_room_grid, parse_room, render_grid, Exit, Map, MapperConfig, MapperSession,
    MarkerRange, SessionEvent,
};
use test_log::test;

fn session() -> MapperSession {
    MapperSession::new(Map::new(), MapperConfig::default())
}

fn replay(session: &mut MapperSession, transcript: &str) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    for line in transcript.lines() {
        if let Some(command) = line.strip_prefix("> ") {
            session.on_command(command);
        } else if let Some(event) = session.on_line(line) {
            events.push(event);
        }
    }
    events
}

const CORRIDOR: &str = "\
Room Alpha
A bare stone room.
Obvious exits: north
> north
Room Bravo
Another bare stone room.
Obvious exits: north, south
> north
Room Charlie
The last bare stone room.
Obvious exits: south
";

#[test]
fn test_corridor_path_back() {
    let mut s = session();
    let events = replay(&mut s, CORRIDOR);
    assert_eq!(events.len(), 3);

    let map = s.map();
    let alpha = map.room_by_number(1).unwrap().id.clone();
    assert_eq!(map.current_room().unwrap().title, "Room Charlie");
    assert_eq!(
        map.find_path(&alpha),
        Some(vec!["south".to_string(), "south".to_string()])
    );
    let current = map.current_room_id().unwrap().to_string();
    assert_eq!(map.find_path(&current), Some(vec![]));
}

#[test]
fn test_walking_back_reuses_rooms() {
    let mut s = session();
    replay(&mut s, CORRIDOR);
    let transcript = "\
> s
Room Bravo
Another bare stone room.
Obvious exits: north, south
> s
Room Alpha
A bare stone room.
Obvious exits: north
";
    let events = replay(&mut s, transcript);
    let numbers: Vec<usize> = events
        .iter()
        .map(|e| match e {
            SessionEvent::RoomEntered { number, .. } => *number,
            other => panic!("unexpected {:?}", other),
        })
        .collect();
    assert_eq!(numbers, vec![2, 1]);
    assert_eq!(s.map().room_count(), 3);
    assert_eq!(s.map().current_room().unwrap().visit_count, 2);
}

#[test]
fn test_bracketed_room_block() {
    let lines = [
        "Gossip: anyone seen the smith?",
        "--<",
        "Temple Square",
        "You are standing in the temple square.",
        ">-- Exits:NSE",
    ];
    let room = parse_room(&lines).unwrap();
    assert_eq!(room.title, "Temple Square");
    assert_eq!(room.description, "You are standing in the temple square.");
    assert_eq!(room.exits, vec!["north", "south", "east"]);
    assert_eq!(room.markers, Some(MarkerRange { open: 1, close: 4 }));
    assert_eq!(room.exit_line, 4);
}

#[test]
fn test_compact_prompt_exits() {
    assert_eq!(
        find_exits("<20hp 100mv Exits:N(S)E>"),
        Some(vec![
            "north".to_string(),
            "south".to_string(),
            "east".to_string()
        ])
    );

    let lines = [
        "Narrow Bridge",
        "A rope bridge sways over the gorge.",
        "<20hp 100mv Exits:EW>",
    ];
    let room = parse_room(&lines).unwrap();
    assert_eq!(room.title, "Narrow Bridge");
    assert_eq!(room.exits, vec!["east", "west"]);
}

#[test]
fn test_failed_move_never_planned_again() {
    let mut s = session();
    let transcript = "\
Great Hall
A vaulted hall.
[Exits: north east]
> east
Side Chapel
A small chapel.
[Exits: west]
> west
Great Hall
A vaulted hall.
[Exits: north east]
> north
You can't go that way.
";
    let events = replay(&mut s, transcript);
    assert_eq!(
        events.last(),
        Some(&SessionEvent::MoveFailed {
            direction: "north".to_string()
        })
    );

    let map = s.map();
    let hall = map.current_room().unwrap();
    assert_eq!(hall.title, "Great Hall");
    assert_eq!(hall.exit("north"), None);
    assert!(matches!(hall.exit("east"), Some(Exit::To(_))));

    let chapel = map.room_by_number(2).unwrap().id.clone();
    let path = map.find_path(&chapel).unwrap();
    assert_eq!(path, vec!["east"]);
    assert!(map
        .find_nearby_rooms(10)
        .unwrap()
        .iter()
        .all(|n| n.room.title != "Great Hall"));
}

#[test]
fn test_room_id_ignores_exit_order() {
    let orders = [
        ["north", "east", "down"],
        ["down", "north", "east"],
        ["east", "down", "north"],
    ];
    let ids: Vec<String> = orders
        .iter()
        .map(|exits| generate_room_id("Crypt", "Cold stone. Dust.", exits, Some(4)))
        .collect();
    assert!(ids.iter().all(|id| id == &ids[0]));
    assert_eq!(ids[0], "crypt|cold stone.|down,east,north|4");
}

#[test]
fn test_movement_commands() {
    assert_eq!(parse_movement_command("n"), Some("north".to_string()));
    assert_eq!(parse_movement_command("go portal"), Some("portal".to_string()));
    assert_eq!(parse_movement_command("say hello"), None);
}

#[test]
fn test_grid_of_replayed_corridor() {
    let mut s = session();
    replay(&mut s, CORRIDOR);
    let map = s.map();
    let current = map.current_room_id().unwrap();
    let grid = build_room_grid(map, current, 4, 5);
    let text = render_grid(map, &grid, 4, 5, None);
    // the current room sits in the middle row, room alpha falls off the bottom
    assert_eq!(text, "    \n    \n@   \n|   \no   ");
    assert_eq!(grid.len(), 2);
}
