//! Pure projection from the session to the one screen a UI should show.

use crate::session::{ClientSession, Session};
use shared::{Board, GameResult, PlayerColor};

/// One variant per screen. Deriving this from the session enum means no
/// precedence rules: a session value can only ever project to one screen.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Lobby {
        identity: Option<String>,
    },
    ResumePrompt {
        game_id: String,
        opponent: String,
        is_bot: bool,
    },
    InQueue {
        position: Option<u32>,
    },
    Playing {
        board: Board,
        own_color: PlayerColor,
        your_turn: bool,
        opponent: String,
    },
    GameOver {
        result: GameResult,
        winner: Option<String>,
        board: Board,
    },
}

/// The transient error is deliberately not part of the view; it renders as a
/// banner on top of whichever screen is up, read straight off the session.
pub fn project(session: &ClientSession) -> View {
    match session.session() {
        Session::Idle => View::Lobby {
            identity: session.identity().map(str::to_string),
        },
        Session::AwaitingResume {
            game_id,
            opponent,
            is_bot,
        } => View::ResumePrompt {
            game_id: game_id.clone(),
            opponent: opponent.clone(),
            is_bot: *is_bot,
        },
        Session::Queued { position } => View::InQueue {
            position: *position,
        },
        Session::Active(game) => View::Playing {
            board: game.board.clone(),
            own_color: game.own_color,
            your_turn: game.your_turn,
            opponent: game.opponent.clone(),
        },
        Session::Finished(finished) => View::GameOver {
            result: finished.result,
            winner: finished.winner.clone(),
            board: finished
                .final_board
                .clone()
                .unwrap_or_else(|| finished.last_board.clone()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Intent;
    use pretty_assertions::assert_eq;
    use shared::ServerFrame;
    use std::time::Instant;

    fn board_with(discs: &[(usize, usize, u8)]) -> Board {
        let mut rows = vec![vec![0u8; shared::BOARD_COLS]; shared::BOARD_ROWS];
        for &(row, col, value) in discs {
            rows[row][col] = value;
        }
        Board::try_from(rows).unwrap()
    }

    fn in_game() -> ClientSession {
        let mut session = ClientSession::new();
        session.assign_identity("alice");
        session.handle_intent(Intent::JoinQueue);
        session.handle_frame(
            ServerFrame::GameStarted {
                game_id: "g-1".to_string(),
                opponent: "bob".to_string(),
                your_turn: true,
                your_color: PlayerColor::Red,
            },
            Instant::now(),
        );
        session
    }

    #[test]
    fn test_idle_without_identity_shows_name_form() {
        let session = ClientSession::new();
        assert_eq!(project(&session), View::Lobby { identity: None });
    }

    #[test]
    fn test_idle_with_identity_shows_join_lobby() {
        let mut session = ClientSession::new();
        session.assign_identity("alice");
        assert_eq!(
            project(&session),
            View::Lobby {
                identity: Some("alice".to_string())
            }
        );
    }

    #[test]
    fn test_held_game_shows_resume_prompt() {
        let mut session = ClientSession::new();
        session.assign_identity("alice");
        session.handle_frame(
            ServerFrame::ExistingSession {
                game_id: "g-4".to_string(),
                opponent: "bot-2".to_string(),
                is_bot: true,
            },
            Instant::now(),
        );
        assert_eq!(
            project(&session),
            View::ResumePrompt {
                game_id: "g-4".to_string(),
                opponent: "bot-2".to_string(),
                is_bot: true,
            }
        );
    }

    #[test]
    fn test_queue_shows_wait_with_position() {
        let mut session = ClientSession::new();
        session.assign_identity("alice");
        session.handle_intent(Intent::JoinQueue);
        assert_eq!(project(&session), View::InQueue { position: None });
        session.handle_frame(ServerFrame::QueueJoined { position: 0 }, Instant::now());
        assert_eq!(project(&session), View::InQueue { position: Some(0) });
    }

    #[test]
    fn test_running_game_shows_board() {
        let session = in_game();
        assert_eq!(
            project(&session),
            View::Playing {
                board: Board::empty(),
                own_color: PlayerColor::Red,
                your_turn: true,
                opponent: "bob".to_string(),
            }
        );
    }

    #[test]
    fn test_result_screen_prefers_final_board() {
        let mut session = in_game();
        let final_board = board_with(&[(5, 0, 1)]);
        session.handle_frame(
            ServerFrame::GameOver {
                winner: Some("alice".to_string()),
                result: GameResult::Win,
                final_board: Some(final_board.clone()),
            },
            Instant::now(),
        );
        match project(&session) {
            View::GameOver { board, result, .. } => {
                assert_eq!(board, final_board);
                assert_eq!(result, GameResult::Win);
            }
            other => panic!("expected the result screen, got {:?}", other),
        }
    }

    #[test]
    fn test_result_screen_falls_back_to_last_board() {
        let mut session = in_game();
        let last = board_with(&[(5, 3, 1), (5, 4, 2)]);
        session.handle_frame(
            ServerFrame::MoveMade {
                column: 4,
                row: 5,
                player: PlayerColor::Yellow,
                board: last.clone(),
            },
            Instant::now(),
        );
        session.handle_frame(
            ServerFrame::GameForfeited {
                winner: "alice".to_string(),
            },
            Instant::now(),
        );
        match project(&session) {
            View::GameOver {
                board,
                result,
                winner,
            } => {
                assert_eq!(board, last);
                assert_eq!(result, GameResult::Forfeit);
                assert_eq!(winner.as_deref(), Some("alice"));
            }
            other => panic!("expected the result screen, got {:?}", other),
        }
    }

    #[test]
    fn test_projection_is_stable() {
        let session = in_game();
        assert_eq!(project(&session), project(&session));
    }

    #[test]
    fn test_transient_error_never_changes_the_screen() {
        let mut session = in_game();
        let before = project(&session);
        session.handle_frame(
            ServerFrame::InvalidMove {
                reason: "Column is full".to_string(),
            },
            Instant::now(),
        );
        assert_eq!(project(&session), before);
        assert!(session.transient_error().is_some());
    }
}
