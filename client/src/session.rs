//! Session state tracking driven by server frames and user intents.

use log::{debug, info, warn};
use shared::{Board, ClientFrame, GameResult, PlayerColor, ServerFrame};
use std::time::{Duration, Instant};

/// How long a rejected-move notice stays on screen before clearing itself.
pub const ERROR_AUTO_CLEAR: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveGame {
    pub game_id: String,
    pub opponent: String,
    pub own_color: PlayerColor,
    pub your_turn: bool,
    pub board: Board,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinishedGame {
    pub result: GameResult,
    pub winner: Option<String>,
    pub final_board: Option<Board>,
    /// Board held when the game ended, shown when the server omits a final
    /// snapshot (forfeits).
    pub last_board: Board,
}

/// Exactly one of these is live at a time; everything the UI needs hangs off
/// the current variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Session {
    Idle,
    AwaitingResume {
        game_id: String,
        opponent: String,
        is_bot: bool,
    },
    Queued {
        position: Option<u32>,
    },
    Active(ActiveGame),
    Finished(FinishedGame),
}

/// Display-only error. `clears_at` is the auto-clear deadline; `None` keeps
/// the message up until a later event resolves it.
#[derive(Debug, Clone, PartialEq)]
pub struct TransientError {
    pub message: String,
    pub clears_at: Option<Instant>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    JoinQueue,
    MakeMove { column: usize },
    Resume,
    Abandon,
    PlayAgain,
    Leave,
}

pub struct ClientSession {
    identity: Option<String>,
    session: Session,
    transient: Option<TransientError>,
}

impl ClientSession {
    pub fn new() -> Self {
        Self {
            identity: None,
            session: Session::Idle,
            transient: None,
        }
    }

    /// A fresh name starts a fresh protocol session; an empty name clears it.
    pub fn assign_identity(&mut self, name: &str) {
        self.identity = if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        };
        self.session = Session::Idle;
        self.transient = None;
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transient_error(&self) -> Option<&str> {
        self.transient.as_ref().map(|error| error.message.as_str())
    }

    pub fn error_deadline(&self) -> Option<Instant> {
        self.transient.as_ref().and_then(|error| error.clears_at)
    }

    /// Drops the current error once its deadline has passed. Harmless when
    /// called late: a superseding transition already took the error with it.
    pub fn expire_error(&mut self, now: Instant) {
        if let Some(deadline) = self.error_deadline() {
            if deadline <= now {
                self.transient = None;
            }
        }
    }

    pub fn handle_frame(&mut self, frame: ServerFrame, now: Instant) {
        match frame {
            ServerFrame::QueueJoined { position } => match &mut self.session {
                Session::Queued { position: current } => {
                    debug!("Queue position {}", position);
                    *current = Some(position);
                }
                _ => debug!("Ignoring queue position update outside the queue"),
            },
            ServerFrame::GameStarted {
                game_id,
                opponent,
                your_turn,
                your_color,
            } => {
                if !matches!(self.session, Session::Queued { .. }) {
                    warn!("Ignoring game_started while not queued");
                    return;
                }
                info!("Game {} started against {} playing {}", game_id, opponent, your_color);
                self.transient = None;
                self.session = Session::Active(ActiveGame {
                    game_id,
                    opponent,
                    own_color: your_color,
                    your_turn,
                    board: Board::empty(),
                });
            }
            ServerFrame::MoveMade {
                column,
                row,
                player,
                board,
            } => match &mut self.session {
                Session::Active(game) => {
                    if game.board == board {
                        debug!("Duplicate board snapshot, nothing to apply");
                        return;
                    }
                    debug!("{} played column {} (row {})", player, column, row);
                    game.board = board;
                    game.your_turn = game.own_color != player;
                }
                _ => warn!("Ignoring a move for a game that is not running"),
            },
            ServerFrame::InvalidMove { reason } => {
                if matches!(self.session, Session::Active(_)) {
                    warn!("Move rejected: {}", reason);
                    self.transient = Some(TransientError {
                        message: reason,
                        clears_at: Some(now + ERROR_AUTO_CLEAR),
                    });
                } else {
                    debug!("Ignoring a move rejection outside a game");
                }
            }
            ServerFrame::GameOver {
                winner,
                result,
                final_board,
            } => match &self.session {
                Session::Active(game) => {
                    let last_board = game.board.clone();
                    info!("Game over: {}", result);
                    self.transient = None;
                    self.session = Session::Finished(FinishedGame {
                        result,
                        winner,
                        final_board,
                        last_board,
                    });
                }
                _ => warn!("Ignoring game_over while no game is running"),
            },
            ServerFrame::GameState {
                game_id,
                opponent,
                your_turn,
                your_color,
                board,
            } => self.apply_snapshot(game_id, opponent, your_turn, your_color, board),
            ServerFrame::OpponentDisconnected { timeout } => {
                if matches!(self.session, Session::Active(_)) {
                    warn!("Opponent disconnected, {}s grace period", timeout);
                    self.transient = Some(TransientError {
                        message: format!(
                            "Opponent disconnected. Waiting {}s for reconnect...",
                            timeout
                        ),
                        clears_at: None,
                    });
                } else {
                    debug!("Ignoring opponent disconnect outside a game");
                }
            }
            ServerFrame::OpponentReconnected => {
                if self.transient.take().is_some() {
                    info!("Opponent reconnected");
                }
            }
            ServerFrame::GameForfeited { winner } => match &self.session {
                Session::Active(game) => {
                    let last_board = game.board.clone();
                    info!("Game forfeited, {} wins", winner);
                    self.transient = None;
                    self.session = Session::Finished(FinishedGame {
                        result: GameResult::Forfeit,
                        winner: Some(winner),
                        final_board: None,
                        last_board,
                    });
                }
                _ => warn!("Ignoring a forfeit while no game is running"),
            },
            ServerFrame::Error { message } => {
                warn!("Server error: {}", message);
                self.transient = Some(TransientError {
                    message,
                    clears_at: None,
                });
            }
            ServerFrame::ExistingSession {
                game_id,
                opponent,
                is_bot,
            } => {
                if matches!(self.session, Session::Idle) {
                    info!("Server holds a live game {} against {}", game_id, opponent);
                    self.session = Session::AwaitingResume {
                        game_id,
                        opponent,
                        is_bot,
                    };
                } else {
                    warn!("Ignoring an existing-session report mid-session");
                }
            }
            ServerFrame::Unknown => debug!("Ignoring an unrecognized frame"),
        }
    }

    /// One game snapshot covers two paths: it completes a resume, and it
    /// resyncs a running game. The game id must match what we hold; our color
    /// never changes within a game, so a snapshot disagreeing on it is bad
    /// data and gets dropped.
    fn apply_snapshot(
        &mut self,
        game_id: String,
        opponent: String,
        your_turn: bool,
        your_color: PlayerColor,
        board: Board,
    ) {
        let resuming = matches!(
            &self.session,
            Session::AwaitingResume { game_id: offered, .. } if *offered == game_id
        );
        if resuming {
            info!("Rejoined game {} against {}", game_id, opponent);
            self.session = Session::Active(ActiveGame {
                game_id,
                opponent,
                own_color: your_color,
                your_turn,
                board,
            });
            return;
        }
        if let Session::Active(game) = &mut self.session {
            if game.game_id == game_id {
                if game.own_color != your_color {
                    warn!("Snapshot for game {} disagrees on our color, dropping it", game_id);
                    return;
                }
                debug!("Resynced game {}", game_id);
                game.your_turn = your_turn;
                game.board = board;
                return;
            }
        }
        warn!("Ignoring a snapshot for game {}", game_id);
    }

    pub fn handle_intent(&mut self, intent: Intent) -> Option<ClientFrame> {
        match intent {
            Intent::JoinQueue => {
                let username = match &self.identity {
                    Some(name) => name.clone(),
                    None => {
                        warn!("Cannot join the queue without a name");
                        return None;
                    }
                };
                match self.session {
                    Session::Idle => {
                        info!("Joining the queue as {}", username);
                        self.session = Session::Queued { position: None };
                        Some(ClientFrame::JoinQueue { username })
                    }
                    Session::Queued { .. } | Session::Active(_) => {
                        debug!("Join request ignored, already queued or playing");
                        None
                    }
                    _ => {
                        debug!("Join request ignored in the current state");
                        None
                    }
                }
            }
            Intent::MakeMove { column } => {
                if matches!(self.session, Session::Active(_)) {
                    debug!("Dropping a disc in column {}", column);
                    Some(ClientFrame::MakeMove { column })
                } else {
                    debug!("No running game to move in");
                    None
                }
            }
            Intent::Resume => match &self.session {
                Session::AwaitingResume { game_id, .. } => {
                    info!("Resuming game {}", game_id);
                    Some(ClientFrame::Reconnect {
                        game_id: game_id.clone(),
                    })
                }
                _ => {
                    debug!("Nothing to resume");
                    None
                }
            },
            Intent::Abandon => {
                if matches!(self.session, Session::AwaitingResume { .. }) {
                    info!("Abandoning the held game");
                    self.session = Session::Idle;
                    self.transient = None;
                    Some(ClientFrame::LeaveGame)
                } else {
                    debug!("Nothing to abandon");
                    None
                }
            }
            Intent::PlayAgain => {
                if !matches!(self.session, Session::Finished(_)) {
                    debug!("No finished game to replay");
                    return None;
                }
                let username = match &self.identity {
                    Some(name) => name.clone(),
                    None => {
                        warn!("Cannot rejoin the queue without a name");
                        return None;
                    }
                };
                info!("Queueing for a rematch as {}", username);
                self.transient = None;
                self.session = Session::Queued { position: None };
                Some(ClientFrame::JoinQueue { username })
            }
            Intent::Leave => match self.session {
                Session::Active(_) | Session::Finished(_) => {
                    info!("Leaving the game");
                    self.session = Session::Idle;
                    self.identity = None;
                    self.transient = None;
                    Some(ClientFrame::LeaveGame)
                }
                _ => {
                    debug!("Nothing to leave");
                    None
                }
            },
        }
    }
}
