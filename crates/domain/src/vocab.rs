//! Fixed, process-lifetime vocabulary tables used by the descriptor
//! synthesizer: moods, weather, times of day, lighting, hero poses,
//! cameras, biomes, and their associated color palettes.
//!
//! These are plain enumerations rather than free strings so that a
//! malformed classification cannot silently reach a provider prompt or a
//! stored record - the compiler enforces the fixed vocabulary the
//! specification calls for.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Intense,
    Mystic,
    Serene,
    Ominous,
    Victorious,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::Intense,
        Mood::Mystic,
        Mood::Serene,
        Mood::Ominous,
        Mood::Victorious,
    ];

    /// Keywords that select this mood, checked in fixed priority order.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Mood::Intense => &["battle", "fight", "fire", "attack", "blood", "storm"],
            Mood::Mystic => &["arcane", "mystic", "ancient", "temple", "spirit", "runic"],
            Mood::Serene => &["calm", "river", "garden", "peaceful", "rest", "glow"],
            Mood::Ominous => &["shadow", "dark", "cursed", "ominous", "fog", "haunted"],
            Mood::Victorious => &["victory", "treasure", "celebration", "light", "reward"],
        }
    }

    /// Fixed 5-entry palette for moods that define one (all of them do).
    pub fn palette(self) -> [&'static str; 5] {
        match self {
            Mood::Intense => ["#ff7847", "#ffb347", "#1f1f1f", "#d13438", "#f0c808"],
            Mood::Mystic => ["#4b3b8f", "#6a4c93", "#a27cfe", "#1b1f3b", "#4ad9d9"],
            Mood::Serene => ["#72ddf7", "#a0f1db", "#fdfcdc", "#f4d35e", "#ee964b"],
            Mood::Ominous => ["#0d0d0d", "#2f2f2f", "#5d1451", "#1a535c", "#4d194d"],
            Mood::Victorious => ["#ffd166", "#06d6a0", "#118ab2", "#073b4c", "#ffe29a"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Intense => "intense",
            Mood::Mystic => "mystic",
            Mood::Serene => "serene",
            Mood::Ominous => "ominous",
            Mood::Victorious => "victorious",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Storm,
    Snow,
    Fog,
    Sunny,
    Ember,
}

impl Weather {
    pub const ALL: [Weather; 5] = [
        Weather::Storm,
        Weather::Snow,
        Weather::Fog,
        Weather::Sunny,
        Weather::Ember,
    ];

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Weather::Storm => &["storm", "rain", "thunder", "lightning"],
            Weather::Snow => &["snow", "ice", "frost"],
            Weather::Fog => &["fog", "mist", "haze"],
            Weather::Sunny => &["sun", "bright", "clear"],
            Weather::Ember => &["lava", "ember", "ash"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Weather::Storm => "storm",
            Weather::Snow => "snow",
            Weather::Fog => "fog",
            Weather::Sunny => "sunny",
            Weather::Ember => "ember",
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Dawn,
    Day,
    Dusk,
    Night,
}

impl TimeOfDay {
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            TimeOfDay::Dawn => &["dawn", "sunrise", "morning"],
            TimeOfDay::Day => &["noon", "bright"],
            TimeOfDay::Dusk => &["dusk", "evening", "sunset"],
            TimeOfDay::Night => &["night", "moon", "stars", "midnight"],
        }
    }

    /// Classification order when keyword matching runs (dawn, day, dusk, night).
    pub const CLASSIFICATION_ORDER: [TimeOfDay; 4] = [
        TimeOfDay::Dawn,
        TimeOfDay::Day,
        TimeOfDay::Dusk,
        TimeOfDay::Night,
    ];

    /// The two values eligible for the uniform-random fallback.
    pub const UNSPECIFIED_FALLBACK: [TimeOfDay; 2] = [TimeOfDay::Day, TimeOfDay::Dusk];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeOfDay::Dawn => "dawn",
            TimeOfDay::Day => "day",
            TimeOfDay::Dusk => "dusk",
            TimeOfDay::Night => "night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lighting {
    DramaticRimLight,
    SoftBounceLight,
}

impl Lighting {
    pub fn as_str(self) -> &'static str {
        match self {
            Lighting::DramaticRimLight => "dramatic rim light",
            Lighting::SoftBounceLight => "soft bounce light",
        }
    }
}

impl fmt::Display for Lighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeroPose {
    HeroicStance,
    WeaponDrawn,
    CautiousApproach,
    TriumphantRaise,
    QuietContemplation,
}

impl HeroPose {
    pub const ALL: [HeroPose; 5] = [
        HeroPose::HeroicStance,
        HeroPose::WeaponDrawn,
        HeroPose::CautiousApproach,
        HeroPose::TriumphantRaise,
        HeroPose::QuietContemplation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HeroPose::HeroicStance => "heroic stance, chin raised",
            HeroPose::WeaponDrawn => "weapon drawn, ready to act",
            HeroPose::CautiousApproach => "cautious approach, low and alert",
            HeroPose::TriumphantRaise => "triumphant fist raised skyward",
            HeroPose::QuietContemplation => "quiet contemplation, gazing into the distance",
        }
    }
}

impl fmt::Display for HeroPose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Camera {
    WideEstablishing,
    CloseUp,
    OverTheShoulder,
    LowAngleHero,
    DutchTilt,
}

impl Camera {
    pub const ALL: [Camera; 5] = [
        Camera::WideEstablishing,
        Camera::CloseUp,
        Camera::OverTheShoulder,
        Camera::LowAngleHero,
        Camera::DutchTilt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Camera::WideEstablishing => "wide establishing shot",
            Camera::CloseUp => "close-up shot",
            Camera::OverTheShoulder => "over-the-shoulder shot",
            Camera::LowAngleHero => "low-angle heroic shot",
            Camera::DutchTilt => "dutch tilt",
        }
    }
}

impl fmt::Display for Camera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    EnchantedForest,
    SunScorchedDesert,
    AncientSettlement,
    SacredRuins,
    MossyDungeonHall,
    FogLacedAlley,
    OrbitalObservationDeck,
    CelestialAmphitheater,
    MysticCrossroads,
}

impl Biome {
    pub fn as_str(self) -> &'static str {
        match self {
            Biome::EnchantedForest => "enchanted forest",
            Biome::SunScorchedDesert => "sun-scorched desert",
            Biome::AncientSettlement => "ancient settlement",
            Biome::SacredRuins => "sacred ruins",
            Biome::MossyDungeonHall => "mossy dungeon hall",
            Biome::FogLacedAlley => "fog-laced alley",
            Biome::OrbitalObservationDeck => "orbital observation deck",
            Biome::CelestialAmphitheater => "celestial amphitheater",
            Biome::MysticCrossroads => "mystic crossroads",
        }
    }

    /// Genre-keyed default biome, used when `currentLocation` doesn't match
    /// a location keyword set.
    pub fn genre_default(genre: &str) -> Option<Biome> {
        match genre.to_ascii_lowercase().as_str() {
            "fantasy" => Some(Biome::MossyDungeonHall),
            "mystery" => Some(Biome::FogLacedAlley),
            "sci-fi" | "scifi" | "sci fi" => Some(Biome::OrbitalObservationDeck),
            "mythical" => Some(Biome::CelestialAmphitheater),
            _ => None,
        }
    }
}

impl fmt::Display for Biome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Genre-keyed default palettes, used when mood's fixed palette doesn't
/// apply (it always does - kept for the rare case a caller wants a
/// genre-only palette lookup, e.g. in tests).
pub fn genre_palette(genre: &str) -> Option<[&'static str; 5]> {
    match genre.to_ascii_lowercase().as_str() {
        "mystery" => Some(["#1b1b2f", "#16213e", "#0f3460", "#53354a", "#e84545"]),
        "sci-fi" | "scifi" | "sci fi" => Some(["#0f2027", "#203a43", "#2c5364", "#00b4d8", "#90e0ef"]),
        "mythical" => Some(["#331832", "#c84b31", "#f3ecc8", "#daa49a", "#c1a57b"]),
        _ => None,
    }
}
