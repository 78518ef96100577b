//! dynvoice-ctl
//!
//! Talks to a running dynvoice daemon over its event socket.
//!
//! Usage:
//!   dynvoice-ctl ping
//!   dynvoice-ctl status
//!   dynvoice-ctl join <guild> <channel>
//!   dynvoice-ctl leave <guild> <channel>
//!   dynvoice-ctl move <guild> <from> <to>
//!   dynvoice-ctl feed            (forward JSON event lines from stdin)

use serde::Deserialize;
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

/// Response from the daemon.
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum SocketResponse {
    Accepted,
    Guilds { guilds: Vec<Value> },
    Pong,
    Error { error: String },
}

fn print_usage() {
    eprintln!("dynvoice-ctl - Drive a running dynvoice daemon");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  dynvoice-ctl ping                          Check if the daemon is running");
    eprintln!("  dynvoice-ctl status                        Show managed channels per guild");
    eprintln!("  dynvoice-ctl join <guild> <channel>        Report a participant joining");
    eprintln!("  dynvoice-ctl leave <guild> <channel>       Report a participant leaving");
    eprintln!("  dynvoice-ctl move <guild> <from> <to>      Report a participant moving");
    eprintln!("  dynvoice-ctl feed                          Forward JSON event lines from stdin");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  DYNVOICE_EVENT_SOCKET  Path to event socket (default: ./dynvoice.sock)");
}

fn get_socket_path() -> PathBuf {
    std::env::var("DYNVOICE_EVENT_SOCKET")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./dynvoice.sock"))
}

fn connect() -> Result<UnixStream, String> {
    let socket_path = get_socket_path();
    UnixStream::connect(&socket_path).map_err(|e| {
        format!(
            "Failed to connect to dynvoice at {:?}: {}\n\
             Is the daemon running?",
            socket_path, e
        )
    })
}

fn send_line(stream: &mut UnixStream, line: &str) -> Result<SocketResponse, String> {
    writeln!(stream, "{}", line.trim_end()).map_err(|e| e.to_string())?;

    let mut reader = BufReader::new(&*stream);
    let mut response_line = String::new();
    reader
        .read_line(&mut response_line)
        .map_err(|e| e.to_string())?;

    serde_json::from_str(&response_line).map_err(|e| format!("Invalid response: {}", e))
}

fn require(args: &[String], count: usize, usage: &str) -> Vec<String> {
    if args.len() < count + 2 {
        eprintln!("Error: {}", usage);
        std::process::exit(1);
    }
    args[2..2 + count].to_vec()
}

fn voice_update(guild: &str, before: Option<&str>, after: Option<&str>) -> Value {
    json!({
        "event": "voice_state_update",
        "guild_id": guild,
        "before": before,
        "after": after,
    })
}

fn print_response(response: SocketResponse) -> bool {
    match response {
        SocketResponse::Accepted => println!("accepted"),
        SocketResponse::Pong => println!("pong - dynvoice is running"),
        SocketResponse::Guilds { guilds } => {
            if guilds.is_empty() {
                println!("(no guilds)");
            }
            for guild in guilds {
                println!(
                    "guild {} (category {})",
                    guild["guild_id"].as_str().unwrap_or("?"),
                    guild["category_id"].as_str().unwrap_or("?")
                );
                let channels = guild["channels"].as_array().cloned().unwrap_or_default();
                if channels.is_empty() {
                    println!("  (no channels)");
                }
                for channel in channels {
                    println!(
                        "  {:<24} {:>4}  {}",
                        channel["name"].as_str().unwrap_or("?"),
                        channel["occupancy"].as_u64().unwrap_or(0),
                        channel["id"].as_str().unwrap_or("?")
                    );
                }
            }
        }
        SocketResponse::Error { error } => {
            eprintln!("Error: {}", error);
            return false;
        }
    }
    true
}

fn feed(stream: &mut UnixStream) -> Result<bool, String> {
    let mut ok = true;
    for line in std::io::stdin().lock().lines() {
        let line = line.map_err(|e| e.to_string())?;
        if line.trim().is_empty() {
            continue;
        }
        ok &= print_response(send_line(stream, &line)?);
    }
    Ok(ok)
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let cmd = match args[1].as_str() {
        "ping" => json!({ "event": "ping" }),
        "status" => json!({ "event": "status" }),
        "join" => {
            let a = require(&args, 2, "join requires <guild> <channel>");
            voice_update(&a[0], None, Some(a[1].as_str()))
        }
        "leave" => {
            let a = require(&args, 2, "leave requires <guild> <channel>");
            voice_update(&a[0], Some(a[1].as_str()), None)
        }
        "move" => {
            let a = require(&args, 3, "move requires <guild> <from> <to>");
            voice_update(&a[0], Some(a[1].as_str()), Some(a[2].as_str()))
        }
        "feed" => Value::Null,
        "-h" | "--help" | "help" => {
            print_usage();
            std::process::exit(0);
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            std::process::exit(1);
        }
    };

    let result = connect().and_then(|mut stream| {
        if cmd.is_null() {
            feed(&mut stream)
        } else {
            send_line(&mut stream, &cmd.to_string()).map(print_response)
        }
    });

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
