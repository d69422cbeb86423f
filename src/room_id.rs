//! Content-addressed room identifiers
//!
//! A room ID is `title|first sentence|sorted exits`, lower-cased, with an
//! optional `|distance` suffix holding the BFS hop count from the first room
//! of the session. The suffix is what tells apart the rows of identical
//! "Stone Corridor" rooms that generic areas are built from.

/// Text up to and including the first sentence delimiter (`. `, `! `, `? `),
/// else up to the first newline, else the whole string
pub fn extract_first_sentence(description: &str) -> &str {
    let delimiter = [". ", "! ", "? "]
        .iter()
        .filter_map(|d| description.find(d))
        .min();
    if let Some(pos) = delimiter {
        return &description[..pos + 1];
    }
    match description.find('\n') {
        Some(pos) => &description[..pos],
        None => description,
    }
}

fn sorted_exits<S: AsRef<str>>(exits: &[S]) -> String {
    let mut names: Vec<&str> = exits.iter().map(|e| e.as_ref()).collect();
    names.sort_unstable();
    names.dedup();
    names.join(",")
}

/// Identity of the room's content alone, without the distance component
pub fn content_signature<S: AsRef<str>>(title: &str, description: &str, exits: &[S]) -> String {
    format!(
        "{}|{}|{}",
        title.trim().to_lowercase(),
        extract_first_sentence(description.trim()).trim().to_lowercase(),
        sorted_exits(exits)
    )
}

/// Deterministic room ID; `distance` separates rooms whose content is identical
pub fn generate_room_id<S: AsRef<str>>(
    title: &str,
    description: &str,
    exits: &[S],
    distance: Option<u32>,
) -> String {
    let signature = content_signature(title, description, exits);
    match distance {
        Some(d) => format!("{}|{}", signature, d),
        None => signature,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sentence_delimiters() {
        assert_eq!(
            extract_first_sentence("A dark room. It smells."),
            "A dark room."
        );
        assert_eq!(extract_first_sentence("Look out! Rocks fall."), "Look out!");
        assert_eq!(extract_first_sentence("Really? Yes."), "Really?");
        assert_eq!(
            extract_first_sentence("Is it. Or! Not"),
            "Is it."
        );
    }

    #[test]
    fn test_first_sentence_without_delimiter() {
        assert_eq!(extract_first_sentence("first line\nsecond line"), "first line");
        assert_eq!(extract_first_sentence("just one sentence."), "just one sentence.");
        assert_eq!(extract_first_sentence(""), "");
    }

    #[test]
    fn test_id_ignores_exit_order() {
        let a = generate_room_id("Hall", "A hall.", &["north", "east", "up"], Some(3));
        let b = generate_room_id("Hall", "A hall.", &["up", "north", "east"], Some(3));
        let c = generate_room_id("Hall", "A hall.", &["east", "up", "north"], Some(3));
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_id_is_case_insensitive_and_uses_first_sentence() {
        let a = generate_room_id("Stone Corridor", "Grey stone. A torch burns.", &["north"], None);
        let b = generate_room_id("stone corridor", "grey stone. The torch is out.", &["north"], None);
        assert_eq!(a, b);
        assert_eq!(a, "stone corridor|grey stone.|north");
    }

    #[test]
    fn test_distance_separates_identical_rooms() {
        let exits = ["north", "south"];
        let near = generate_room_id("Stone Corridor", "Grey stone.", &exits, Some(1));
        let far = generate_room_id("Stone Corridor", "Grey stone.", &exits, Some(2));
        assert_ne!(near, far);
        assert_eq!(far, "stone corridor|grey stone.|north,south|2");
    }

    #[test]
    fn test_signature_matches_undistanced_id() {
        let exits = vec!["west".to_string()];
        assert_eq!(
            content_signature("Gate", "The city gate.", &exits),
            generate_room_id("Gate", "The city gate.", &exits, None)
        );
    }
}
