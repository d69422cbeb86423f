//! ASCII map rendering
//!
//! Layout is a BFS from the origin room at (0, 0). Only north/south/east/west
//! move the coordinate; up, down and diagonals are shown as an annotation next
//! to the room's label. A coordinate belongs to whichever room reached it
//! first, so worlds that do not fit a grid cannot wrap around and overwrite
//! earlier placements.
//!
//! Each room takes a 4x2 block of characters:
//!
//! ```text
//! @ ^-o
//! |
//! ```
//!
//! two columns of label, one annotation column, one column for the connector
//! to the east neighbour, and a row below for the connector to the south.

use crate::config::GridConfig;
use crate::direction::Direction;
use crate::map::{Exit, Map, Room};
use log::debug;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

pub const ROOM_PITCH_X: usize = 4;
pub const ROOM_PITCH_Y: usize = 2;
const LABEL_WIDTH: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridCell {
    Room(String),
    /// An exit leads here but its destination has not been explored
    Unexplored,
}

/// Range of room coordinates visible in a viewport, centred on the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl GridBounds {
    /// `None` when not even one room fits
    pub fn for_viewport(width: usize, height: usize) -> Option<GridBounds> {
        let columns = (width / ROOM_PITCH_X) as i32;
        let rows = ((height + 1) / ROOM_PITCH_Y) as i32;
        if columns == 0 || rows == 0 {
            return None;
        }
        let min_x = -((columns - 1) / 2);
        let min_y = -((rows - 1) / 2);
        Some(GridBounds {
            min_x,
            max_x: min_x + columns - 1,
            min_y,
            max_y: min_y + rows - 1,
        })
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomGrid {
    cells: BTreeMap<(i32, i32), GridCell>,
}

impl RoomGrid {
    pub fn get(&self, x: i32, y: i32) -> Option<&GridCell> {
        self.cells.get(&(x, y))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Coordinate of a placed room
    pub fn position_of(&self, room_id: &str) -> Option<(i32, i32)> {
        self.cells.iter().find_map(|(pos, cell)| match cell {
            GridCell::Room(id) if id == room_id => Some(*pos),
            _ => None,
        })
    }

    fn room_at(&self, x: i32, y: i32) -> Option<&str> {
        match self.cells.get(&(x, y)) {
            Some(GridCell::Room(id)) => Some(id.as_str()),
            _ => None,
        }
    }
}

/// Lay out the rooms reachable from `origin` that fit a `width` x `height`
/// character viewport
pub fn build_room_grid(map: &Map, origin: &str, width: usize, height: usize) -> RoomGrid {
    let mut grid = RoomGrid::default();
    let bounds = match GridBounds::for_viewport(width, height) {
        Some(bounds) => bounds,
        None => return grid,
    };
    if map.room(origin).is_none() {
        return grid;
    }

    let mut placed: HashSet<&str> = HashSet::new();
    let mut queue = VecDeque::new();
    grid.cells.insert((0, 0), GridCell::Room(origin.to_string()));
    placed.insert(origin);
    queue.push_back((origin, 0, 0));

    while let Some((id, x, y)) = queue.pop_front() {
        let room = match map.room(id) {
            Some(room) => room,
            None => continue,
        };
        for (dir, exit) in room.sorted_exits() {
            let (dx, dy) = match Direction::parse(dir).and_then(|d| d.grid_offset()) {
                Some(offset) => offset,
                None => continue,
            };
            let (nx, ny) = (x + dx, y + dy);
            if !bounds.contains(nx, ny) || grid.cells.contains_key(&(nx, ny)) {
                continue;
            }
            match exit.destination().and_then(|dest| map.room(dest)) {
                Some(next) => {
                    if placed.contains(next.id.as_str()) {
                        continue;
                    }
                    placed.insert(next.id.as_str());
                    grid.cells.insert((nx, ny), GridCell::Room(next.id.clone()));
                    queue.push_back((next.id.as_str(), nx, ny));
                }
                None => {
                    grid.cells.insert((nx, ny), GridCell::Unexplored);
                }
            }
        }
    }

    debug!("Laid out {} cells around {:?}", grid.len(), origin);
    grid
}

/// Rendered map panel content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMap {
    pub text: String,
    pub title: String,
    pub room_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct GridRenderer {
    style: GridConfig,
}

impl GridRenderer {
    pub fn new(style: GridConfig) -> Self {
        Self { style }
    }

    /// Exactly `height` lines of exactly `width` characters. With a legend,
    /// rooms it lists show their number instead of a glyph.
    pub fn render_grid(
        &self,
        map: &Map,
        grid: &RoomGrid,
        width: usize,
        height: usize,
        legend: Option<&HashMap<String, usize>>,
    ) -> String {
        let mut canvas = vec![vec![' '; width]; height];
        let bounds = match GridBounds::for_viewport(width, height) {
            Some(bounds) => bounds,
            None => return join_canvas(&canvas),
        };

        for (&(x, y), cell) in grid.cells.iter() {
            if !bounds.contains(x, y) {
                continue;
            }
            let col = (x - bounds.min_x) as usize * ROOM_PITCH_X;
            let row = (y - bounds.min_y) as usize * ROOM_PITCH_Y;

            let label = self.label_for(map, cell, legend);
            for (i, ch) in label.chars().take(LABEL_WIDTH).enumerate() {
                put(&mut canvas, row, col + i, ch);
            }
            if let GridCell::Room(id) = cell {
                if let Some(mark) = map.room(id).and_then(|room| self.annotation(room)) {
                    put(&mut canvas, row, col + LABEL_WIDTH, mark);
                }
            }

            if x < bounds.max_x && connected(map, grid, (x, y), (x + 1, y), "east", "west") {
                put(&mut canvas, row, col + LABEL_WIDTH + 1, self.style.horizontal);
            }
            if y < bounds.max_y && connected(map, grid, (x, y), (x, y + 1), "south", "north") {
                put(&mut canvas, row + 1, col, self.style.vertical);
            }
        }

        join_canvas(&canvas)
    }

    /// Lay out and render around the current room
    pub fn render_map(
        &self,
        map: &Map,
        width: usize,
        height: usize,
        legend: Option<&HashMap<String, usize>>,
    ) -> Option<RenderedMap> {
        let current = map.current_room()?;
        let grid = build_room_grid(map, &current.id, width, height);
        Some(RenderedMap {
            text: self.render_grid(map, &grid, width, height, legend),
            title: current.title.clone(),
            room_id: current.id.clone(),
        })
    }

    fn label_for(&self, map: &Map, cell: &GridCell, legend: Option<&HashMap<String, usize>>) -> String {
        match cell {
            GridCell::Unexplored => self.style.unexplored.clone(),
            GridCell::Room(id) => {
                if let Some(number) = legend.and_then(|l| l.get(id)) {
                    // only the last two digits fit the label
                    if *number < 100 {
                        number.to_string()
                    } else {
                        format!("{:02}", number % 100)
                    }
                } else if map.current_room_id() == Some(id.as_str()) {
                    self.style.current.clone()
                } else {
                    self.style.visited.clone()
                }
            }
        }
    }

    fn annotation(&self, room: &Room) -> Option<char> {
        let mut up = false;
        let mut down = false;
        let mut diagonal = false;
        for dir in room.exits.keys().filter_map(|d| Direction::parse(d)) {
            match dir {
                Direction::Up => up = true,
                Direction::Down => down = true,
                d if d.is_diagonal() => diagonal = true,
                _ => {}
            }
        }
        match (up, down) {
            (true, true) => Some(self.style.up_down),
            (true, false) => Some(self.style.up),
            (false, true) => Some(self.style.down),
            (false, false) if diagonal => Some(self.style.diagonal),
            _ => None,
        }
    }
}

/// Free-function form with the default glyphs
pub fn render_grid(
    map: &Map,
    grid: &RoomGrid,
    width: usize,
    height: usize,
    legend: Option<&HashMap<String, usize>>,
) -> String {
    GridRenderer::default().render_grid(map, grid, width, height, legend)
}

/// Two rooms are joined only when each one's exit leads to the other; a room
/// and an unexplored placeholder are joined when the room's exit is unexplored
fn connected(
    map: &Map,
    grid: &RoomGrid,
    from: (i32, i32),
    to: (i32, i32),
    forward: &str,
    backward: &str,
) -> bool {
    match (grid.room_at(from.0, from.1), grid.room_at(to.0, to.1)) {
        (Some(a), Some(b)) => leads_to(map, a, forward, b) && leads_to(map, b, backward, a),
        (Some(a), None) => grid.get(to.0, to.1).is_some() && leads_nowhere_known(map, a, forward),
        (None, Some(b)) => grid.get(from.0, from.1).is_some() && leads_nowhere_known(map, b, backward),
        (None, None) => false,
    }
}

fn leads_to(map: &Map, from: &str, direction: &str, to: &str) -> bool {
    map.room(from)
        .and_then(|room| room.exit(direction))
        .and_then(|exit| exit.destination())
        == Some(to)
}

fn leads_nowhere_known(map: &Map, from: &str, direction: &str) -> bool {
    match map.room(from).and_then(|room| room.exit(direction)) {
        Some(Exit::Unexplored) => true,
        Some(Exit::To(dest)) => map.room(dest).is_none(),
        None => false,
    }
}

fn put(canvas: &mut [Vec<char>], row: usize, col: usize, ch: char) {
    if let Some(cell) = canvas.get_mut(row).and_then(|line| line.get_mut(col)) {
        *cell = ch;
    }
}

fn join_canvas(canvas: &[Vec<char>]) -> String {
    canvas
        .iter()
        .map(|line| line.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Room;

    /// Build a map by hand; an empty destination is an unexplored exit
    fn map_from(rooms: &[(&str, &[(&str, &str)])], current: &str) -> Map {
        let mut map = Map::new();
        for (id, exits) in rooms {
            let mut room = Room::new(&id.to_uppercase(), "", Vec::<String>::new());
            room.id = id.to_string();
            for (dir, dest) in exits.iter() {
                room.exits.insert(dir.to_string(), Exit::from(dest.to_string()));
            }
            map.rooms.insert(id.to_string(), room);
            map.room_numbering.insert(id.to_string());
        }
        assert!(map.set_current_room(current));
        map
    }

    fn lines(text: &str) -> Vec<&str> {
        text.split('\n').collect()
    }

    #[test]
    fn test_viewport_bounds_are_centred() {
        let bounds = GridBounds::for_viewport(12, 7).unwrap();
        assert_eq!(
            bounds,
            GridBounds {
                min_x: -1,
                max_x: 1,
                min_y: -1,
                max_y: 2
            }
        );
        assert!(GridBounds::for_viewport(3, 10).is_none());
        assert!(GridBounds::for_viewport(10, 0).is_none());
    }

    #[test]
    fn test_vertical_corridor() {
        let map = map_from(
            &[
                ("a", &[("north", "b")]),
                ("b", &[("north", "c"), ("south", "a")]),
                ("c", &[("south", "b")]),
            ],
            "c",
        );
        let grid = build_room_grid(&map, "c", 12, 7);
        assert_eq!(grid.position_of("c"), Some((0, 0)));
        assert_eq!(grid.position_of("b"), Some((0, 1)));
        assert_eq!(grid.position_of("a"), Some((0, 2)));

        let text = render_grid(&map, &grid, 12, 7, None);
        assert_eq!(
            lines(&text),
            vec![
                "            ",
                "            ",
                "    @       ",
                "    |       ",
                "    o       ",
                "    |       ",
                "    o       ",
            ]
        );
    }

    #[test]
    fn test_unexplored_exits_and_annotations() {
        let map = map_from(
            &[
                ("hub", &[("east", ""), ("west", "w"), ("up", ""), ("down", "")]),
                ("w", &[("east", "hub"), ("northeast", "")]),
            ],
            "hub",
        );
        let grid = build_room_grid(&map, "hub", 12, 3);
        assert_eq!(grid.get(1, 0), Some(&GridCell::Unexplored));
        assert_eq!(grid.get(-1, 0), Some(&GridCell::Room("w".to_string())));
        assert_eq!(grid.len(), 3);

        let text = render_grid(&map, &grid, 12, 3, None);
        assert_eq!(lines(&text), vec!["o +-@ *-?   ", "            ", "            "]);
    }

    #[test]
    fn test_one_sided_exit_draws_no_connector() {
        let map = map_from(&[("a", &[("east", "b")]), ("b", &[])], "a");
        let grid = build_room_grid(&map, "a", 8, 1);
        assert_eq!(grid.position_of("b"), Some((1, 0)));
        let text = render_grid(&map, &grid, 8, 1, None);
        assert_eq!(text, "@   o   ");
    }

    #[test]
    fn test_legend_numbers_replace_glyphs() {
        let map = map_from(
            &[("a", &[("east", "b")]), ("b", &[("west", "a")])],
            "a",
        );
        let grid = build_room_grid(&map, "a", 8, 1);
        let mut legend = HashMap::new();
        legend.insert("a".to_string(), 1);
        legend.insert("b".to_string(), 12);
        let text = render_grid(&map, &grid, 8, 1, Some(&legend));
        assert_eq!(text, "1  -12  ");
    }

    #[test]
    fn test_wraparound_world_keeps_first_placement() {
        // four rooms in a ring of east exits: a non-Euclidean loop
        let map = map_from(
            &[
                ("a", &[("east", "b")]),
                ("b", &[("east", "c")]),
                ("c", &[("east", "d")]),
                ("d", &[("east", "a")]),
            ],
            "a",
        );
        let grid = build_room_grid(&map, "a", 40, 1);
        assert_eq!(grid.position_of("a"), Some((0, 0)));
        assert_eq!(grid.position_of("d"), Some((3, 0)));
        assert_eq!(grid.len(), 4);
    }

    #[test]
    fn test_out_of_bounds_rooms_are_omitted() {
        let map = map_from(
            &[
                ("a", &[("east", "b")]),
                ("b", &[("east", "c"), ("west", "a")]),
                ("c", &[("west", "b")]),
            ],
            "a",
        );
        // a single column
        let grid = build_room_grid(&map, "a", 4, 1);
        assert_eq!(grid.len(), 1);
        let text = render_grid(&map, &grid, 4, 1, None);
        assert_eq!(text, "@   ");
    }

    #[test]
    fn test_tiny_viewports_never_fail() {
        let map = map_from(&[("a", &[])], "a");
        let grid = build_room_grid(&map, "a", 2, 2);
        assert!(grid.is_empty());
        assert_eq!(render_grid(&map, &grid, 2, 2, None), "  \n  ");
        assert_eq!(render_grid(&map, &grid, 0, 0, None), "");
    }

    #[test]
    fn test_render_map_uses_current_room() {
        let map = map_from(&[("a", &[])], "a");
        let renderer = GridRenderer::new(GridConfig {
            current: "[]".to_string(),
            ..GridConfig::default()
        });
        let rendered = renderer.render_map(&map, 4, 1, None).unwrap();
        assert_eq!(rendered.text, "[]  ");
        assert_eq!(rendered.title, "A");
        assert!(renderer.render_map(&Map::new(), 4, 1, None).is_none());
    }
}
