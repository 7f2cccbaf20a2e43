use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    game::SessionUpdate,
    routes::games::{MovePayload, StartGameRequest},
};

/// Messages sent from the gateway process to the backend
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    StartGame {
        #[serde(flatten)]
        request: StartGameRequest,
    },
    Move {
        session_id: Uuid,
        player_id: i64,
        payload: MovePayload,
    },
    GetSession {
        session_id: Uuid,
    },
}

/// Messages sent from the backend to the gateway process
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    SessionUpdate {
        update: SessionUpdate,
    },
    /// A move or start request was refused; the session, if any, is
    /// unchanged.
    Rejected {
        session_id: Option<Uuid>,
        reason: String,
    },
    Error {
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_wire_shape() {
        let json = r#"{"type":"start_game","kind":"hangman","guild_id":1,"player_ids":[5]}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::StartGame { .. }));

        let json = format!(
            r#"{{"type":"move","session_id":"{}","player_id":5,"payload":{{"type":"guess","letter":"a"}}}}"#,
            Uuid::nil()
        );
        let msg: ClientMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(
            msg,
            ClientMessage::Move {
                payload: MovePayload::Guess { letter: 'a' },
                ..
            }
        ));
    }
}
