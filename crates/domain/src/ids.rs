//! Opaque identifiers used across the orchestrator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of random bytes backing a [`SceneId`]; hex-encoded this yields
/// the 24-character identifier required by the service boundary.
const SCENE_ID_BYTES: usize = 12;

/// Opaque 24-hex-character scene identifier, generated at synthesis time.
///
/// `rerender` always allocates a fresh one; nothing in the orchestrator
/// derives a `SceneId` from another one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneId(
    #[serde(with = "scene_id_hex")] [u8; SCENE_ID_BYTES],
);

impl SceneId {
    /// Generate a new, globally-unique scene id.
    pub fn new() -> Self {
        let mut bytes = [0u8; SCENE_ID_BYTES];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }
}

impl Default for SceneId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Error returned when a string is not a valid 24-hex-character scene id.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid scene id: {0}")]
pub struct ParseSceneIdError(String);

impl FromStr for SceneId {
    type Err = ParseSceneIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = hex::decode(s).map_err(|_| ParseSceneIdError(s.to_string()))?;
        let bytes: [u8; SCENE_ID_BYTES] = decoded
            .try_into()
            .map_err(|_| ParseSceneIdError(s.to_string()))?;
        Ok(Self(bytes))
    }
}

mod scene_id_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; super::SCENE_ID_BYTES], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<[u8; super::SCENE_ID_BYTES], D::Error> {
        let s = String::deserialize(d)?;
        let decoded = hex::decode(&s).map_err(serde::de::Error::custom)?;
        decoded
            .try_into()
            .map_err(|_| serde::de::Error::custom("scene id must be 24 hex characters"))
    }
}
