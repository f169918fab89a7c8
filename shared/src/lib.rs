use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const BOARD_ROWS: usize = 6;
pub const BOARD_COLS: usize = 7;

/// Disc color, `1` on the wire moves first.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "u8", into = "u8")]
pub enum PlayerColor {
    Red,
    Yellow,
}

impl TryFrom<u8> for PlayerColor {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PlayerColor::Red),
            2 => Ok(PlayerColor::Yellow),
            other => Err(format!("invalid player color {}", other)),
        }
    }
}

impl From<PlayerColor> for u8 {
    fn from(color: PlayerColor) -> u8 {
        match color {
            PlayerColor::Red => 1,
            PlayerColor::Yellow => 2,
        }
    }
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerColor::Red => write!(f, "Red"),
            PlayerColor::Yellow => write!(f, "Yellow"),
        }
    }
}

/// One grid slot, `0` empty, `1`/`2` a placed disc.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "u8", into = "u8")]
pub enum Cell {
    Empty,
    Disc(PlayerColor),
}

impl TryFrom<u8> for Cell {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Cell::Empty),
            other => Ok(Cell::Disc(PlayerColor::try_from(other)?)),
        }
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> u8 {
        match cell {
            Cell::Empty => 0,
            Cell::Disc(color) => u8::from(color),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => write!(f, "."),
            Cell::Disc(PlayerColor::Red) => write!(f, "R"),
            Cell::Disc(PlayerColor::Yellow) => write!(f, "Y"),
        }
    }
}

/// Server-authoritative 6x7 grid, row-major. Frames carrying a grid of any
/// other shape fail to decode.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct Board {
    cells: [[Cell; BOARD_COLS]; BOARD_ROWS],
}

impl Board {
    pub fn empty() -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_COLS]; BOARD_ROWS],
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell; BOARD_COLS]> {
        self.cells.iter()
    }
}

impl TryFrom<Vec<Vec<u8>>> for Board {
    type Error = String;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        if rows.len() != BOARD_ROWS {
            return Err(format!("expected {} rows, got {}", BOARD_ROWS, rows.len()));
        }
        let mut cells = [[Cell::Empty; BOARD_COLS]; BOARD_ROWS];
        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != BOARD_COLS {
                return Err(format!(
                    "row {} has {} cells, expected {}",
                    r,
                    row.len(),
                    BOARD_COLS
                ));
            }
            for (c, value) in row.into_iter().enumerate() {
                cells[r][c] = Cell::try_from(value)?;
            }
        }
        Ok(Self { cells })
    }
}

impl From<Board> for Vec<Vec<u8>> {
    fn from(board: Board) -> Self {
        board
            .cells
            .iter()
            .map(|row| row.iter().map(|cell| u8::from(*cell)).collect())
            .collect()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.iter() {
            for cell in row.iter() {
                write!(f, "{} ", cell)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Outcome from the local player's point of view.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    Win,
    Loss,
    Draw,
    Forfeit,
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Win => write!(f, "win"),
            GameResult::Loss => write!(f, "loss"),
            GameResult::Draw => write!(f, "draw"),
            GameResult::Forfeit => write!(f, "forfeit"),
        }
    }
}

/// Every message travels as `{"type": ..., "payload": ..., "timestamp": ...}`.
/// The tag and payload come from the flattened frame enum.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Envelope<F> {
    #[serde(flatten)]
    pub frame: F,
    pub timestamp: DateTime<Utc>,
}

impl<F> Envelope<F> {
    pub fn now(frame: F) -> Self {
        Self {
            frame,
            timestamp: Utc::now(),
        }
    }
}

/// Inbound frames. Serialization follows the tagged envelope; deserialization
/// is routed by hand through a raw tag/payload intermediate so that a tag
/// outside this vocabulary always decodes to [`ServerFrame::Unknown`],
/// whatever its payload holds, while a known tag still rejects a payload of
/// the wrong shape.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerFrame {
    QueueJoined {
        position: u32,
    },
    #[serde(rename_all = "camelCase")]
    GameStarted {
        game_id: String,
        opponent: String,
        your_turn: bool,
        your_color: PlayerColor,
    },
    MoveMade {
        column: usize,
        row: usize,
        player: PlayerColor,
        board: Board,
    },
    InvalidMove {
        reason: String,
    },
    #[serde(rename_all = "camelCase")]
    GameOver {
        winner: Option<String>,
        result: GameResult,
        final_board: Option<Board>,
    },
    /// Full snapshot, sent when the server re-attaches a live game.
    #[serde(rename_all = "camelCase")]
    GameState {
        game_id: String,
        opponent: String,
        your_turn: bool,
        your_color: PlayerColor,
        board: Board,
    },
    OpponentDisconnected {
        timeout: u32,
    },
    OpponentReconnected,
    GameForfeited {
        winner: String,
    },
    Error {
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    ExistingSession {
        game_id: String,
        opponent: String,
        is_bot: bool,
    },
    /// Tags this client does not speak decode here instead of failing.
    Unknown,
}

/// The envelope body before the tag is interpreted. The payload stays an
/// untyped value until the tag has picked a shape for it.
#[derive(Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    tag: String,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Deserialize)]
struct QueueJoinedPayload {
    position: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameStartedPayload {
    game_id: String,
    opponent: String,
    your_turn: bool,
    your_color: PlayerColor,
}

#[derive(Deserialize)]
struct MoveMadePayload {
    #[serde(default)]
    column: usize,
    #[serde(default)]
    row: usize,
    player: PlayerColor,
    board: Board,
}

#[derive(Deserialize)]
struct InvalidMovePayload {
    reason: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameOverPayload {
    winner: Option<String>,
    result: GameResult,
    final_board: Option<Board>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameStatePayload {
    game_id: String,
    opponent: String,
    your_turn: bool,
    your_color: PlayerColor,
    board: Board,
}

#[derive(Deserialize)]
struct OpponentDisconnectedPayload {
    timeout: u32,
}

#[derive(Deserialize)]
struct GameForfeitedPayload {
    winner: String,
}

#[derive(Deserialize)]
struct ErrorPayload {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExistingSessionPayload {
    game_id: String,
    opponent: String,
    is_bot: bool,
}

impl<'de> Deserialize<'de> for ServerFrame {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawFrame::deserialize(deserializer)?;
        ServerFrame::from_wire(raw).map_err(serde::de::Error::custom)
    }
}

impl ServerFrame {
    fn from_wire(raw: RawFrame) -> Result<Self, serde_json::Error> {
        let RawFrame { tag, payload } = raw;
        let frame = match tag.as_str() {
            "queue_joined" => {
                let p: QueueJoinedPayload = serde_json::from_value(payload)?;
                ServerFrame::QueueJoined {
                    position: p.position,
                }
            }
            "game_started" => {
                let p: GameStartedPayload = serde_json::from_value(payload)?;
                ServerFrame::GameStarted {
                    game_id: p.game_id,
                    opponent: p.opponent,
                    your_turn: p.your_turn,
                    your_color: p.your_color,
                }
            }
            "move_made" => {
                let p: MoveMadePayload = serde_json::from_value(payload)?;
                ServerFrame::MoveMade {
                    column: p.column,
                    row: p.row,
                    player: p.player,
                    board: p.board,
                }
            }
            "invalid_move" => {
                let p: InvalidMovePayload = serde_json::from_value(payload)?;
                ServerFrame::InvalidMove { reason: p.reason }
            }
            "game_over" => {
                let p: GameOverPayload = serde_json::from_value(payload)?;
                ServerFrame::GameOver {
                    winner: p.winner,
                    result: p.result,
                    final_board: p.final_board,
                }
            }
            "game_state" => {
                let p: GameStatePayload = serde_json::from_value(payload)?;
                ServerFrame::GameState {
                    game_id: p.game_id,
                    opponent: p.opponent,
                    your_turn: p.your_turn,
                    your_color: p.your_color,
                    board: p.board,
                }
            }
            "opponent_disconnected" => {
                let p: OpponentDisconnectedPayload = serde_json::from_value(payload)?;
                ServerFrame::OpponentDisconnected { timeout: p.timeout }
            }
            // Carries no data this client consumes; the payload is ignored.
            "opponent_reconnected" => ServerFrame::OpponentReconnected,
            "game_forfeited" => {
                let p: GameForfeitedPayload = serde_json::from_value(payload)?;
                ServerFrame::GameForfeited { winner: p.winner }
            }
            "error" => {
                let p: ErrorPayload = serde_json::from_value(payload)?;
                ServerFrame::Error { message: p.message }
            }
            "existing_session" => {
                let p: ExistingSessionPayload = serde_json::from_value(payload)?;
                ServerFrame::ExistingSession {
                    game_id: p.game_id,
                    opponent: p.opponent,
                    is_bot: p.is_bot,
                }
            }
            _ => ServerFrame::Unknown,
        };
        Ok(frame)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientFrame {
    JoinQueue {
        username: String,
    },
    MakeMove {
        column: usize,
    },
    LeaveGame,
    #[serde(rename_all = "camelCase")]
    Reconnect {
        game_id: String,
    },
}

/// Ranked row served by the leaderboard endpoint next to the socket.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub username: String,
    pub wins: u32,
    pub games: u32,
}
