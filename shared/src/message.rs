//! Wire protocol: a closed set of tagged messages exchanged as newline-delimited JSON.
//!
//! Every message is one JSON object per line, terminated by `\n`. The `t` field is the
//! discriminator; `serde`'s internally-tagged representation maps it directly onto this
//! enum, so encode/decode is a single `serde_json::to_string`/`from_str` call per line.
//! An unrecognised `t` deserializes as `Message::Unknown` rather than failing, matching
//! the "ignore unknown tags" contract rather than rejecting the connection.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Held-input bitmask carried by `in` messages and decoded by `simulation::step`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct InputMask: u32 {
        const UP = 1;
        const DOWN = 2;
        const LEFT = 4;
        const RIGHT = 8;
        const FIRE = 32;
    }
}

/// The body of `map_data`: everything a client needs to render and predict against a
/// map, but not the spawn points a joining player has no use for (those stay
/// server-side, in [`crate::map::MapDescriptor`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapPayload {
    pub id: String,
    pub name: String,
    pub size: (f32, f32),
    pub objects: Vec<crate::map::Polygon>,
}

impl From<&crate::map::MapDescriptor> for MapPayload {
    fn from(map: &crate::map::MapDescriptor) -> Self {
        Self {
            id: map.id.clone(),
            name: map.name.clone(),
            size: (map.width, map.height),
            objects: map.objects.clone(),
        }
    }
}

/// A player's state as it appears inside `game_state`/`game_update`/`player_joined`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerState {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub health: i32,
    pub max_health: i32,
    pub alive: bool,
    pub last_input_seq: i64,
}

/// The complete wire protocol. `#[serde(tag = "t")]` makes every variant decode from a
/// JSON object whose `t` field names the variant (lowercased per `rename_all`), with the
/// remaining fields flattened onto that object — this is the "tagged union" the design
/// notes call for in place of duck-typed message dicts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum Message {
    /// S→C, sent once immediately on accept.
    Welcome {
        your_id: String,
        available_maps: HashMap<String, String>,
    },
    /// C→S liveness probe.
    Ping,
    /// S→C liveness reply, no body.
    Pong,
    /// C→S: list available maps.
    ListMaps,
    /// S→C: reply to `ListMaps`.
    MapsList { maps: HashMap<String, String> },
    /// C→S: join a map; `map` absent or unknown falls back to the default map.
    Join {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        map: Option<String>,
    },
    /// S→C: sent to a joining client before `GameState`.
    MapData { map: MapPayload },
    /// S→C: full authoritative state, sent once right after `MapData`.
    GameState {
        your_player: PlayerState,
        players: HashMap<String, PlayerState>,
    },
    /// S→C: broadcast to the rest of an instance when a new player joins it.
    PlayerJoined { player: PlayerState },
    /// S→C: broadcast to an instance when a member disconnects or leaves.
    PlayerLeft { player_id: String },
    /// C→S: one frame of input.
    In {
        seq: u32,
        k: InputMask,
        dt: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ack: Option<u32>,
    },
    /// S→C: per-tick authoritative snapshot.
    GameUpdate {
        timestamp: f64,
        players: HashMap<String, PlayerState>,
    },
    /// C↔S: instance-scoped if the sender has an instance, global otherwise.
    Chat {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<String>,
        text: String,
    },
    /// Internal, client-local only: never sent by the server.
    #[serde(rename = "_info")]
    Info { event: String },
    /// Server-originated error reply for a handled protocol condition (§7).
    #[serde(rename = "_error")]
    Error { reason: String },
    /// Internal, client-local only: the network layer's own shutdown notice.
    #[serde(rename = "_exit")]
    Exit,
    /// Catch-all for any `t` this version does not recognise. Never constructed by this
    /// crate's own encoder; only produced by the decoder so unknown tags are tolerated
    /// rather than rejected.
    #[serde(other)]
    Unknown,
}

/// A decode error: either malformed JSON or a line exceeding [`crate::MAX_LINE_BYTES`].
#[derive(Debug)]
pub enum CodecError {
    Malformed(serde_json::Error),
    TooLong(usize),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::Malformed(e) => write!(f, "malformed message: {e}"),
            CodecError::TooLong(n) => write!(f, "line too long: {n} bytes"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodecError::Malformed(e) => Some(e),
            CodecError::TooLong(_) => None,
        }
    }
}

/// Decodes one line (without its trailing `\n`) into a [`Message`].
///
/// Empty lines are the caller's concern (§4.1: skipped before reaching the codec, not
/// treated as an error here) and lines over [`crate::MAX_LINE_BYTES`] must be rejected
/// by the caller before they ever reach this function, since the byte cap is a framing
/// concern, not a JSON concern.
pub fn decode(line: &str) -> Result<Message, CodecError> {
    serde_json::from_str(line).map_err(CodecError::Malformed)
}

/// Encodes a [`Message`] as a single line of JSON, without a trailing `\n` — the caller
/// (`Connection::send`) appends the newline and flushes.
pub fn encode(message: &Message) -> Result<String, CodecError> {
    serde_json::to_string(message).map_err(CodecError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trips_welcome() {
        let mut maps = HashMap::new();
        maps.insert("m1".to_string(), "Forest".to_string());
        let msg = Message::Welcome {
            your_id: "p1".to_string(),
            available_maps: maps,
        };
        let line = encode(&msg).unwrap();
        assert_eq!(decode(&line).unwrap(), msg);
    }

    #[test]
    fn unknown_tag_decodes_to_unknown_variant() {
        let decoded = decode(r#"{"t":"totally_unrecognised","foo":1}"#).unwrap();
        assert_eq!(decoded, Message::Unknown);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(decode("{not json").is_err());
    }

    #[test]
    fn input_mask_bits_match_protocol() {
        assert_eq!(InputMask::UP.bits(), 1);
        assert_eq!(InputMask::DOWN.bits(), 2);
        assert_eq!(InputMask::LEFT.bits(), 4);
        assert_eq!(InputMask::RIGHT.bits(), 8);
        assert_eq!(InputMask::FIRE.bits(), 32);
    }

    #[test]
    fn input_message_encodes_k_as_plain_integer() {
        let msg = Message::In {
            seq: 0,
            k: InputMask::RIGHT,
            dt: 1.0 / 60.0,
            ack: None,
        };
        let line = encode(&msg).unwrap();
        assert!(line.contains(r#""k":8"#), "line was: {line}");
        assert_eq!(decode(&line).unwrap(), msg);
    }

    #[test]
    fn ping_has_no_body() {
        let line = encode(&Message::Ping).unwrap();
        assert_eq!(line, r#"{"t":"ping"}"#);
    }

    #[test]
    fn map_data_nests_fields_under_map_with_a_size_tuple() {
        let msg = Message::MapData {
            map: MapPayload {
                id: "m1".to_string(),
                name: "Forest".to_string(),
                size: (800.0, 600.0),
                objects: vec![],
            },
        };
        let line = encode(&msg).unwrap();
        assert_eq!(
            line,
            r#"{"t":"map_data","map":{"id":"m1","name":"Forest","size":[800.0,600.0],"objects":[]}}"#
        );
        assert_eq!(decode(&line).unwrap(), msg);
    }

    #[test]
    fn join_omits_absent_map() {
        let line = encode(&Message::Join { map: None }).unwrap();
        assert_eq!(line, r#"{"t":"join"}"#);
        let line = encode(&Message::Join {
            map: Some("m1".to_string()),
        })
        .unwrap();
        assert_eq!(line, r#"{"t":"join","map":"m1"}"#);
    }
}
