use clap::Parser;
use client::input::{self, Command};
use client::network::{Connection, Liveness};
use client::session::{ClientSession, Intent};
use client::view::{self, View};
use log::{error, info};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// WebSocket endpoint of the game server
    #[arg(short = 's', long, default_value = "ws://127.0.0.1:8080/ws")]
    server: String,

    /// Log in with this name right away
    #[arg(short = 'n', long)]
    name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Starting client...");
    info!("Server: {}", args.server);

    let mut connection = Connection::new(&args.server);
    let mut session = ClientSession::new();

    if let Some(name) = &args.name {
        log_in(&mut connection, &mut session, name).await;
    }

    println!("{}", input::HELP);
    render(&session, &connection);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        let error_deadline = session.error_deadline();
        tokio::select! {
            envelope = connection.next_frame(), if connection.is_connected() => {
                if let Some(envelope) = envelope {
                    session.handle_frame(envelope.frame, Instant::now());
                }
                render(&session, &connection);
            }

            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => break,
                };
                if line.trim().is_empty() {
                    continue;
                }
                match input::parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => println!("{}", input::HELP),
                    Ok(Command::ShowBoard) => print_board(&session),
                    Ok(Command::Login { name }) => {
                        log_in(&mut connection, &mut session, &name).await;
                        render(&session, &connection);
                    }
                    Ok(Command::Intent(intent)) => {
                        let leaving = intent == Intent::Leave;
                        if let Some(frame) = session.handle_intent(intent) {
                            connection.send(frame).await;
                        }
                        if leaving && session.identity().is_none() {
                            connection.close().await;
                        }
                        render(&session, &connection);
                    }
                    Err(message) => println!("{}", message),
                }
            }

            _ = sleep_until_deadline(error_deadline), if error_deadline.is_some() => {
                session.expire_error(Instant::now());
                render(&session, &connection);
            }
        }
    }

    connection.close().await;
    Ok(())
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
        None => std::future::pending::<()>().await,
    }
}

async fn log_in(connection: &mut Connection, session: &mut ClientSession, name: &str) {
    if let Err(e) = connection.connect(name).await {
        error!("Could not connect: {}", e);
        println!("Could not connect as {}: {}", name, e);
        return;
    }
    session.assign_identity(name);
}

fn render(session: &ClientSession, connection: &Connection) {
    if let Some(message) = session.transient_error() {
        println!("! {}", message);
    }
    match view::project(session) {
        View::Lobby { identity: None } => {
            println!("Lobby. Log in with 'login <name>'.");
        }
        View::Lobby {
            identity: Some(name),
        } => {
            println!("Lobby. Logged in as {}. 'join' to find a game.", name);
        }
        View::ResumePrompt {
            opponent, is_bot, ..
        } => {
            let kind = if is_bot { "bot" } else { "player" };
            println!(
                "A game against {} ({}) is still running. 'resume' or 'abandon'?",
                opponent, kind
            );
        }
        View::InQueue {
            position: Some(position),
        } => {
            println!("In queue, position {}.", position);
        }
        View::InQueue { position: None } => {
            println!("In queue, waiting for a match...");
        }
        View::Playing {
            board,
            own_color,
            your_turn,
            opponent,
        } => {
            print!("{}", board);
            if your_turn {
                println!(
                    "Your turn ({}) against {}. 'drop <column>' to move.",
                    own_color, opponent
                );
            } else {
                println!("Waiting for {} to move...", opponent);
            }
        }
        View::GameOver {
            result,
            winner,
            board,
        } => {
            print!("{}", board);
            match winner {
                Some(winner) => println!("Game over: {} ({}). 'again' or 'leave'?", result, winner),
                None => println!("Game over: {}. 'again' or 'leave'?", result),
            }
        }
    }
    if connection.liveness() == Liveness::Errored {
        println!("(connection error, 'login <name>' to reconnect)");
    } else if !connection.is_connected() && session.identity().is_some() {
        println!("(disconnected)");
    }
}

fn print_board(session: &ClientSession) {
    match view::project(session) {
        View::Playing { board, .. } | View::GameOver { board, .. } => print!("{}", board),
        _ => println!("No board to show."),
    }
}
