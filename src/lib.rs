#![crate_name = "mudmap"]

#[macro_use]
extern crate lazy_static;

pub mod ansi;
pub mod autowalk;
pub mod config;
pub mod direction;
pub mod error;
pub mod grid;
pub mod map;
pub mod map_view;
pub mod pathfinding;
pub mod persistence;
pub mod room_id;
pub mod room_parser;
pub mod session;

pub use autowalk::AutoWalk;
pub use config::MapperConfig;
pub use error::{MapperError, Result};
pub use grid::{build_room_grid, render_grid, GridRenderer, RenderedMap, RoomGrid};
pub use map::{Exit, Map, Room};
pub use pathfinding::{NearbyRoom, PathStep};
pub use persistence::map_file_name;
pub use room_parser::{parse_room, MarkerRange, RoomInfo, RoomTextParser};
pub use session::{MapperSession, SessionEvent};
