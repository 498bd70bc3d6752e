use partydeck_engine::cards::Card;
use partydeck_engine::player::PlayerId;
use partydeck_engine::round::Submission;
use serde::{Deserialize, Serialize};

/// Winner text announced when a round has no winner.
pub const NOBODY: &str = "nobody";

/// What the match tells players. Tags and field names are camelCase on the
/// wire, like every other protocol record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    PlayerCount {
        count: usize,
    },
    Started,
    RoundStarted {
        question: String,
        judge: String,
    },
    Picks {
        picks: Vec<Submission>,
    },
    Outcome {
        winner: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        winner_id: Option<PlayerId>,
    },
    Promoted,
}

impl ServerMessage {
    /// Round-start messages carry the recipient's hand (except to the judge).
    pub fn carries_question(&self) -> bool {
        matches!(self, ServerMessage::RoundStarted { .. })
    }
}

/// A message addressed to one recipient, as it goes over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(flatten)]
    pub message: ServerMessage,
    /// 1-based round number; lifecycle messages outside a round carry 0.
    pub round: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_judge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hand: Option<Vec<Card>>,
}

impl Envelope {
    pub fn new(message: ServerMessage, round: usize) -> Self {
        Self {
            message,
            round,
            is_judge: None,
            hand: None,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partydeck_engine::cards::CardId;
    use partydeck_engine::deck::CardSequence;

    #[test]
    fn round_start_envelope_flattens_message() {
        let envelope = Envelope {
            message: ServerMessage::RoundStarted {
                question: "Q1".into(),
                judge: "P1".into(),
            },
            round: 1,
            is_judge: Some(false),
            hand: Some(vec![Card::new(CardId(5), "a5")]),
        };
        let json: serde_json::Value =
            serde_json::from_str(&envelope.to_json().expect("serialize")).expect("parse");

        assert_eq!(json["type"], "roundStarted");
        assert_eq!(json["question"], "Q1");
        assert_eq!(json["judge"], "P1");
        assert_eq!(json["round"], 1);
        assert_eq!(json["isJudge"], false);
        assert_eq!(json["hand"][0]["value"], "a5");
    }

    #[test]
    fn lifecycle_envelope_omits_optional_fields() {
        let envelope = Envelope::new(ServerMessage::PlayerCount { count: 3 }, 0);
        let json = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(json["type"], "playerCount");
        assert_eq!(json["count"], 3);
        assert!(json.get("isJudge").is_none());
        assert!(json.get("hand").is_none());
    }

    #[test]
    fn envelope_round_trips() {
        let envelope = Envelope::new(
            ServerMessage::Outcome {
                winner: NOBODY.into(),
                winner_id: None,
            },
            2,
        );
        let json = envelope.to_json().expect("serialize");
        let back: Envelope = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, envelope);
    }

    #[test]
    fn picks_and_outcome_use_camel_case_keys() {
        let picks = Envelope::new(
            ServerMessage::Picks {
                picks: vec![Submission {
                    card_id: CardId(9),
                    player_id: PlayerId::from("p2"),
                    value: "a9".into(),
                }],
            },
            1,
        );
        let json = serde_json::to_value(&picks).expect("serialize");
        assert_eq!(json["picks"][0]["cardId"], "0000000000000009");
        assert_eq!(json["picks"][0]["playerId"], "p2");

        let outcome = Envelope::new(
            ServerMessage::Outcome {
                winner: "P2".into(),
                winner_id: Some(PlayerId::from("p2")),
            },
            1,
        );
        let json = serde_json::to_value(&outcome).expect("serialize");
        assert_eq!(json["winnerId"], "p2");
        assert!(json.get("winner_id").is_none());
    }

    #[test]
    fn dealt_hand_ids_come_back_unchanged() {
        let mut deck = CardSequence::with_seed((1..=12).map(|i| format!("a{}", i)), 8);
        let hand: Vec<Card> = std::iter::from_fn(|| deck.draw_top()).collect();
        assert_eq!(hand.len(), 12);

        let envelope = Envelope {
            message: ServerMessage::RoundStarted {
                question: "Q1".into(),
                judge: "P1".into(),
            },
            round: 1,
            is_judge: Some(false),
            hand: Some(hand.clone()),
        };
        let json: serde_json::Value =
            serde_json::from_str(&envelope.to_json().expect("serialize")).expect("parse");
        for (index, card) in hand.iter().enumerate() {
            let wire = json["hand"][index]["id"].as_str().expect("id is a string");
            assert_eq!(wire.parse::<CardId>().expect("hex id"), card.id);
        }

        let back: Envelope = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back.hand, Some(hand));
    }
}
