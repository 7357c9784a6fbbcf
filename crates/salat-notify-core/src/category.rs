//! Notification categories and their alert assets.
//!
//! The inbound `type` code is decoded once into [`Category`]; sound, accent
//! color and channel presentation are exhaustive matches over that enum.

use serde::{Deserialize, Serialize};

/// Type code used when an inbound request carries none.
pub const DEFAULT_TYPE_CODE: i32 = 9;

/// Five prayer slots plus the reminder categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Subuh,
    Dzuhur,
    Ashar,
    Maghrib,
    Isya,
    Dzikir,
    Tilawah,
    Doa,
    Other,
}

/// Sound played with a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "asset", rename_all = "snake_case")]
pub enum Sound {
    /// Bundled audio resource, relative to the application's resources.
    Asset(&'static str),
    /// The platform's default notification alert.
    PlatformDefault,
}

/// LED blink timing shared by every category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightPattern {
    pub argb: u32,
    pub on_ms: u32,
    pub off_ms: u32,
}

/// Four-stage vibration waveform: delay, buzz, pause, buzz.
pub const VIBRATION_PATTERN: [u64; 4] = [0, 500, 200, 500];

const ADZAN_ASSET: &str = "raw/adzan";
const LIGHT_ON_MS: u32 = 1000;
const LIGHT_OFF_MS: u32 = 3000;

impl Category {
    /// Decode the wire `type` code. Unknown codes map to `Other`.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Category::Subuh,
            1 => Category::Dzuhur,
            2 => Category::Ashar,
            3 => Category::Maghrib,
            4 => Category::Isya,
            7 => Category::Dzikir,
            8 => Category::Tilawah,
            10 => Category::Doa,
            _ => Category::Other,
        }
    }

    pub fn is_prayer(self) -> bool {
        matches!(
            self,
            Category::Subuh | Category::Dzuhur | Category::Ashar | Category::Maghrib | Category::Isya
        )
    }

    pub fn sound(self) -> Sound {
        if self.is_prayer() {
            Sound::Asset(ADZAN_ASSET)
        } else {
            Sound::PlatformDefault
        }
    }

    pub fn accent_argb(self) -> u32 {
        match self {
            Category::Subuh => 0xFF8B_5CF6,
            Category::Dzuhur => 0xFFF5_9E0B,
            Category::Ashar => 0xFFEF_4444,
            Category::Maghrib => 0xFFEC_4899,
            Category::Isya => 0xFF3B_82F6,
            Category::Dzikir => 0xFF06_B6D4,
            Category::Tilawah => 0xFF10_B981,
            Category::Doa => 0xFFA8_55F7,
            Category::Other => 0xFF05_9669,
        }
    }

    pub fn light(self) -> LightPattern {
        LightPattern {
            argb: self.accent_argb(),
            on_ms: LIGHT_ON_MS,
            off_ms: LIGHT_OFF_MS,
        }
    }
}

/// Importance level of a notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Default,
    High,
}

/// Everything needed to create a channel on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSpec {
    pub id: String,
    pub name: String,
    pub description: String,
    pub importance: Importance,
    pub lights: bool,
    pub vibration: bool,
    pub show_badge: bool,
}

const CHANNEL_DESCRIPTION: &str = "Notifikasi ibadah harian";

/// Known channel keys and their display names.
const CHANNEL_NAMES: &[(&str, &str)] = &[
    ("prayer_critical_v10", "Adzan & Waktu Sholat"),
    ("dzikir_critical_v10", "Pengingat Dzikir"),
    ("tilawah_critical_v10", "Pengingat Tilawah"),
    ("doa_critical_v10", "Pengingat Doa"),
];

impl ChannelSpec {
    /// Build the channel for `key`. Unknown keys keep their id but take
    /// `fallback_name` as the display name.
    pub fn for_key(key: &str, fallback_name: &str) -> Self {
        let name = CHANNEL_NAMES
            .iter()
            .find(|(id, _)| *id == key)
            .map(|(_, name)| *name)
            .unwrap_or(fallback_name);
        Self {
            id: key.to_string(),
            name: name.to_string(),
            description: CHANNEL_DESCRIPTION.to_string(),
            importance: Importance::High,
            lights: true,
            vibration: true,
            show_badge: true,
        }
    }
}
