use log::{debug, info};
use mudmap::map_view::{show_map, ViewMode};
use mudmap::{Map, MapperConfig, MapperSession, RoomTextParser, SessionEvent};
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Default)]
struct Options {
    transcript: PathBuf,
    map: Option<PathBuf>,
    config: Option<PathBuf>,
    goto: Option<usize>,
    nearby: Option<usize>,
    view: bool,
    width: Option<usize>,
    height: Option<usize>,
    trace: bool,
}

fn print_usage(program: &str) {
    println!("mudmap - automatic mapper for MUD transcripts");
    println!();
    println!(
        "Usage: {} <transcript> [--map FILE] [--config FILE] [--goto N] [--nearby N] [--view] [--width W] [--height H] [--trace]",
        program
    );
    println!();
    println!("Lines starting with \"> \" in the transcript are commands sent to the game,");
    println!("every other line is game output.");
    println!();
    println!("  --map FILE     load the map from FILE and save it back afterwards");
    println!("  --config FILE  TOML mapper configuration");
    println!("  --goto N       print the route from the current room to room number N");
    println!("  --nearby N     list rooms within N steps of the current room");
    println!("  --view         show the map panel around the current room");
    println!("  --width W      map panel width in characters");
    println!("  --height H     map panel height in lines");
    println!("  --trace        explain how the last room in the transcript was parsed");
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        transcript: PathBuf::from(&args[1]),
        ..Options::default()
    };

    let mut rest = args[2..].iter();
    while let Some(arg) = rest.next() {
        let mut value = |name: &str| {
            rest.next()
                .cloned()
                .ok_or_else(|| format!("{} needs a value", name))
        };
        match arg.as_str() {
            "--map" => options.map = Some(PathBuf::from(value("--map")?)),
            "--config" => options.config = Some(PathBuf::from(value("--config")?)),
            "--goto" => options.goto = Some(parse_number("--goto", &value("--goto")?)?),
            "--nearby" => options.nearby = Some(parse_number("--nearby", &value("--nearby")?)?),
            "--width" => options.width = Some(parse_number("--width", &value("--width")?)?),
            "--height" => options.height = Some(parse_number("--height", &value("--height")?)?),
            "--view" => options.view = true,
            "--trace" => options.trace = true,
            other => return Err(format!("Unknown option: {}", other)),
        }
    }
    Ok(options)
}

fn parse_number(name: &str, value: &str) -> Result<usize, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid number for {}: {}", name, value))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage(&args[0]);
        return Ok(());
    }

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    let mut config = match &options.config {
        Some(path) => match MapperConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => MapperConfig::default(),
    };
    if let Some(width) = options.width {
        config.grid.width = width;
    }
    if let Some(height) = options.height {
        config.grid.height = height;
    }

    let map = match &options.map {
        Some(path) => match Map::load_or_default(path) {
            Ok(map) => map,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => Map::new(),
    };

    let transcript = match fs::read_to_string(&options.transcript) {
        Ok(text) => text,
        Err(e) => {
            eprintln!(
                "Error: Cannot read transcript '{}': {}",
                options.transcript.display(),
                e
            );
            std::process::exit(1);
        }
    };

    debug!("Replaying {:?}", options.transcript);
    let mut session = MapperSession::new(map, config.clone());
    for line in transcript.lines() {
        if let Some(command) = line.strip_prefix("> ") {
            session.on_command(command);
            continue;
        }
        match session.on_line(line) {
            Some(SessionEvent::RoomEntered { number, title, .. }) => {
                println!("[{}] {}", number, title);
            }
            Some(SessionEvent::MoveFailed { direction }) => {
                println!("[-] no exit {}", direction);
            }
            None => {}
        }
    }
    info!("{} rooms mapped", session.map().room_count());

    if options.trace {
        let window: Vec<&str> = session.window().collect();
        let (room, notes) = RoomTextParser::new(config.parser.clone()).parse_with_trace(&window[..]);
        for note in notes {
            println!("trace: {}", note);
        }
        match room {
            Some(room) => println!("trace: parsed {:?} with exits {:?}", room.title, room.exits),
            None => println!("trace: no room"),
        }
    }

    if let Some(distance) = options.nearby {
        match session.map().find_nearby_rooms(distance) {
            Some(rooms) => {
                for nearby in rooms {
                    let number = session.map().room_number(&nearby.room.id).unwrap_or_default();
                    println!("{:>4} {:>3} {}", number, nearby.distance, nearby.room.title);
                }
            }
            None => eprintln!("No current room"),
        }
    }

    if let Some(number) = options.goto {
        match session.walk_to_number(number) {
            Ok(Some(steps)) => println!("{}", steps.join(", ")),
            Ok(None) => eprintln!("No known route to room {}", number),
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    if options.view {
        match show_map(session.map(), ViewMode::Auto, &config) {
            Ok(true) => {}
            Ok(false) => eprintln!("Nothing mapped yet"),
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    let map = session.into_map();
    if let Some(path) = &options.map {
        if let Err(e) = map.save_to_file(path) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
