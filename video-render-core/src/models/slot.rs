use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which kind of stream a delivered frame belongs to.
///
/// Mirrors the numeric `type` the native engine stamps on every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamType {
    Local,
    Remote,
    DeviceTest,
    VideoSource,
}

impl StreamType {
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Local),
            1 => Some(Self::Remote),
            2 => Some(Self::DeviceTest),
            3 => Some(Self::VideoSource),
            _ => None,
        }
    }

    pub fn as_raw(self) -> u8 {
        match self {
            Self::Local => 0,
            Self::Remote => 1,
            Self::DeviceTest => 2,
            Self::VideoSource => 3,
        }
    }
}

/// Per-channel key identifying which logical stream a set of renderers presents.
///
/// String form: `"local"`, `"videosource"`, or the decimal remote uid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SlotKey {
    Local,
    VideoSource,
    Remote(u32),
}

impl SlotKey {
    /// Slot of remote user `uid`. Uid 0 is the local user and has no remote slot.
    pub fn remote(uid: u32) -> Option<Self> {
        (uid != 0).then_some(Self::Remote(uid))
    }

    /// Maps a frame's stream type and uid to the slot its renderers live under.
    ///
    /// Device-test frames never resolve: they are only rendered by
    /// development builds of the native SDK.
    pub fn resolve(stream_type: StreamType, uid: u32) -> Option<Self> {
        match stream_type {
            StreamType::Local | StreamType::Remote if uid == 0 => Some(Self::Local),
            StreamType::Local | StreamType::Remote => Some(Self::Remote(uid)),
            StreamType::VideoSource => Some(Self::VideoSource),
            StreamType::DeviceTest => None,
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::VideoSource => f.write_str("videosource"),
            Self::Remote(uid) => write!(f, "{uid}"),
        }
    }
}

impl FromStr for SlotKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "videosource" => Ok(Self::VideoSource),
            other => other
                .parse::<u32>()
                .ok()
                .and_then(Self::remote)
                .ok_or_else(|| format!("invalid slot key: {other:?}")),
        }
    }
}

impl From<SlotKey> for String {
    fn from(slot: SlotKey) -> Self {
        slot.to_string()
    }
}

impl TryFrom<String> for SlotKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
