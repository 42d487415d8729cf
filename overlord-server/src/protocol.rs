//! Wire protocol: client intents and server events (JSON, `type` tagged)

use overlord_core::{ActionError, ClientView, Hex, Side};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque match identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub u64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "match-{}", self.0)
    }
}

/// Message from a client
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientIntent {
    FindMatch {
        #[serde(default)]
        scenario_id: Option<String>,
    },
    PlayCard {
        card_index: usize,
    },
    MoveUnit {
        from: Hex,
        to: Hex,
    },
    Attack {
        from: Hex,
        to: Hex,
    },
    EndTurn,
}

/// Message to a client
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    WaitingForOpponent,
    MatchFound {
        match_id: MatchId,
        side: Side,
    },
    GameState {
        #[serde(flatten)]
        view: Box<ClientView>,
    },
    ActionRejected {
        code: String,
        message: String,
    },
    OpponentDisconnected,
}

impl ServerEvent {
    pub fn rejected(err: &ActionError) -> Self {
        ServerEvent::ActionRejected {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }

    /// Rejection for a frame that is not a valid intent
    pub fn malformed(detail: impl fmt::Display) -> Self {
        ServerEvent::ActionRejected {
            code: "malformed".to_string(),
            message: format!("malformed message: {}", detail),
        }
    }

    pub fn state(view: ClientView) -> Self {
        ServerEvent::GameState {
            view: Box::new(view),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_intents() {
        let find: ClientIntent = serde_json::from_value(json!({ "type": "findMatch" })).unwrap();
        assert_eq!(find, ClientIntent::FindMatch { scenario_id: None });

        let find: ClientIntent =
            serde_json::from_value(json!({ "type": "findMatch", "scenarioId": "omaha-beach" }))
                .unwrap();
        assert_eq!(
            find,
            ClientIntent::FindMatch {
                scenario_id: Some("omaha-beach".to_string())
            }
        );

        let play: ClientIntent =
            serde_json::from_value(json!({ "type": "playCard", "cardIndex": 2 })).unwrap();
        assert_eq!(play, ClientIntent::PlayCard { card_index: 2 });

        let mv: ClientIntent =
            serde_json::from_value(json!({ "type": "moveUnit", "from": "3,2", "to": "4,2" }))
                .unwrap();
        assert_eq!(
            mv,
            ClientIntent::MoveUnit {
                from: Hex::new(3, 2),
                to: Hex::new(4, 2)
            }
        );

        let end: ClientIntent = serde_json::from_value(json!({ "type": "endTurn" })).unwrap();
        assert_eq!(end, ClientIntent::EndTurn);
    }

    #[test]
    fn test_reject_bad_intents() {
        assert!(serde_json::from_value::<ClientIntent>(json!({ "type": "surrender" })).is_err());
        assert!(serde_json::from_value::<ClientIntent>(
            json!({ "type": "attack", "from": "a,b", "to": "1,1" })
        )
        .is_err());
    }

    #[test]
    fn test_event_wire_format() {
        let found = serde_json::to_value(ServerEvent::MatchFound {
            match_id: MatchId(7),
            side: Side::Axis,
        })
        .unwrap();
        assert_eq!(found, json!({ "type": "matchFound", "matchId": 7, "side": "axis" }));

        let event = ServerEvent::rejected(&ActionError::OutOfTurn);
        let rejected = serde_json::to_value(event).unwrap();
        assert_eq!(rejected["type"], "actionRejected");
        assert_eq!(rejected["code"], "out_of_turn");

        let waiting = serde_json::to_value(ServerEvent::WaitingForOpponent).unwrap();
        assert_eq!(waiting, json!({ "type": "waitingForOpponent" }));
    }
}
