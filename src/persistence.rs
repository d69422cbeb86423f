//! Map files: one pretty-printed JSON document per server

use crate::error::{MapperError, Result};
use crate::map::Map;
use log::{debug, info, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// File name for the map of `host:port`, e.g. `mud.example.org_4000.json`
pub fn map_file_name(host: &str, port: u16) -> String {
    let safe_host: String = host
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}_{}.json", safe_host, port)
}

impl Map {
    /// Read a map file. Files written before rooms were numbered get a
    /// numbering in sorted ID order, and the upgraded map is written back
    /// straight away so the numbers stay put from now on.
    pub fn load_from_file(path: &Path) -> Result<Map> {
        let text = fs::read_to_string(path).map_err(|e| MapperError::io(path, e))?;
        let mut map: Map = serde_json::from_str(&text).map_err(|source| MapperError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(current) = map.current_room_id.clone() {
            if !map.rooms.contains_key(&current) {
                warn!("Current room {:?} is not in {:?}, forgetting it", current, path);
                map.current_room_id = None;
            }
        }

        if map.complete_numbering() {
            info!(
                "Numbered {} rooms in {:?}, saving upgraded map",
                map.room_numbering.len(),
                path
            );
            map.save_to_file(path)?;
        }

        debug!("Loaded {} rooms from {:?}", map.room_count(), path);
        Ok(map)
    }

    /// Like [`load_from_file`](Self::load_from_file), but a missing file is an
    /// empty map
    pub fn load_or_default(path: &Path) -> Result<Map> {
        match fs::metadata(path) {
            Ok(_) => Map::load_from_file(path),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No map at {:?}, starting empty", path);
                Ok(Map::new())
            }
            Err(e) => Err(MapperError::io(path, e)),
        }
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| MapperError::io(path, e))?;
        debug!("Saved {} rooms to {:?}", self.room_count(), path);
        Ok(())
    }
}
