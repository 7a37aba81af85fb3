//! rollcall-admin CLI tool
//!
//! Queries and adjusts invite counts on a running rollcall-node.
//!
//! Usage:
//!   rollcall-admin count <user_id>
//!   rollcall-admin leaderboard [limit]
//!   rollcall-admin set <user_id> <amount>
//!   rollcall-admin who-invited <user_id>
//!   rollcall-admin joined <community_id> <member_id>
//!   rollcall-admin left <community_id> <member_id>
//!   rollcall-admin ping

use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

/// Command-invoking actor with its permission flags.
#[derive(Debug, Serialize)]
struct Actor {
    id: String,
    admin: bool,
}

/// Command sent over the socket.
#[derive(Debug, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
enum Command {
    InviteCount { user_id: String },
    Leaderboard { limit: Option<usize> },
    SetInvites { actor: Actor, user_id: String, amount: i64 },
    WhoInvited { user_id: String },
    MemberJoined { community_id: String, member_id: String },
    MemberLeft { community_id: String, member_id: String },
    Ping,
}

/// One leaderboard row.
#[derive(Debug, Deserialize)]
struct LeaderboardEntry {
    user_id: String,
    name: String,
    invites: i64,
}

/// Response to a command.
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Response {
    Count { user_id: String, invites: i64 },
    Leaderboard { entries: Vec<LeaderboardEntry> },
    Updated { user_id: String, invites: i64 },
    Inviter { user_id: String, inviter_id: String, inviter_name: String },
    NotFound { user_id: String },
    Accepted,
    Error { error: String },
    Pong,
}

fn print_usage() {
    eprintln!("rollcall-admin - Query and adjust invite counts on a rollcall-node");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  rollcall-admin count <user_id>                 Show a user's invite count");
    eprintln!("  rollcall-admin leaderboard [limit]             Top inviters (default 10)");
    eprintln!("  rollcall-admin set <user_id> <amount>          Add a delta to a user's count");
    eprintln!("  rollcall-admin who-invited <user_id>           Show who invited a user");
    eprintln!("  rollcall-admin joined <community_id> <member_id>  Inject a join event");
    eprintln!("  rollcall-admin left <community_id> <member_id>    Inject a leave event");
    eprintln!("  rollcall-admin ping                            Check if the node is running");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ROLLCALL_SOCKET  Path to node socket (default: ./rollcall-data/admin.sock)");
}

fn get_socket_path() -> PathBuf {
    std::env::var("ROLLCALL_SOCKET")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./rollcall-data/admin.sock"))
}

/// The local operator talks over a filesystem socket; holding that
/// socket is the administrative capability.
fn local_actor() -> Actor {
    Actor {
        id: std::env::var("USER").unwrap_or_else(|_| "local-admin".to_string()),
        admin: true,
    }
}

fn send_command(cmd: Command) -> Result<Response, String> {
    let socket_path = get_socket_path();

    let mut stream = UnixStream::connect(&socket_path).map_err(|e| {
        format!(
            "Failed to connect to rollcall-node at {:?}: {}\n\
             Is the rollcall-node running?",
            socket_path, e
        )
    })?;

    // Send command
    let cmd_json = serde_json::to_string(&cmd).map_err(|e| e.to_string())?;
    writeln!(stream, "{}", cmd_json).map_err(|e| e.to_string())?;

    // Read response
    let mut reader = BufReader::new(&stream);
    let mut response_line = String::new();
    reader
        .read_line(&mut response_line)
        .map_err(|e| e.to_string())?;

    serde_json::from_str(&response_line).map_err(|e| format!("Invalid response: {}", e))
}

fn require_arg(args: &[String], idx: usize, what: &str) -> String {
    match args.get(idx) {
        Some(arg) => arg.clone(),
        None => {
            eprintln!("Error: {} requires a {} argument", args[1], what);
            std::process::exit(1);
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let cmd = match args[1].as_str() {
        "count" => Command::InviteCount {
            user_id: require_arg(&args, 2, "user_id"),
        },
        "leaderboard" => {
            let limit = match args.get(2) {
                Some(raw) => match raw.parse() {
                    Ok(limit) => Some(limit),
                    Err(_) => {
                        eprintln!("Error: limit must be a number, got {:?}", raw);
                        std::process::exit(1);
                    }
                },
                None => None,
            };
            Command::Leaderboard { limit }
        }
        "set" => {
            let user_id = require_arg(&args, 2, "user_id");
            let raw = require_arg(&args, 3, "amount");
            let amount = match raw.parse() {
                Ok(amount) => amount,
                Err(_) => {
                    eprintln!("Error: amount must be an integer, got {:?}", raw);
                    std::process::exit(1);
                }
            };
            Command::SetInvites {
                actor: local_actor(),
                user_id,
                amount,
            }
        }
        "who-invited" => Command::WhoInvited {
            user_id: require_arg(&args, 2, "user_id"),
        },
        "joined" => Command::MemberJoined {
            community_id: require_arg(&args, 2, "community_id"),
            member_id: require_arg(&args, 3, "member_id"),
        },
        "left" => Command::MemberLeft {
            community_id: require_arg(&args, 2, "community_id"),
            member_id: require_arg(&args, 3, "member_id"),
        },
        "ping" => Command::Ping,
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

    match send_command(cmd) {
        Ok(response) => match response {
            Response::Count { user_id, invites } => {
                println!("{} has {} invite(s)", user_id, invites);
            }
            Response::Leaderboard { entries } => {
                if entries.is_empty() {
                    println!("(no invites yet)");
                } else {
                    for (rank, entry) in entries.iter().enumerate() {
                        println!(
                            "{}. {} ({}) - {} invite(s)",
                            rank + 1,
                            entry.name,
                            entry.user_id,
                            entry.invites
                        );
                    }
                }
            }
            Response::Updated { user_id, invites } => {
                println!("{} now has {} invite(s)", user_id, invites);
            }
            Response::Inviter {
                user_id,
                inviter_id,
                inviter_name,
            } => {
                println!("{} was invited by {} ({})", user_id, inviter_name, inviter_id);
            }
            Response::NotFound { user_id } => {
                println!("No inviter recorded for {}", user_id);
            }
            Response::Accepted => {
                println!("event queued");
            }
            Response::Error { error } => {
                eprintln!("Error: {}", error);
                std::process::exit(1);
            }
            Response::Pong => {
                println!("pong - rollcall-node is running");
            }
        },
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
