use serde::{Deserialize, Serialize};

/// Resolved, playable metadata for one song.
///
/// Immutable once produced by the resolver; the queue owns its copy and
/// the session state clones it when the track becomes current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub title: String,
    /// Opaque playable reference, handed back to the resolver to open the
    /// audio stream.
    pub locator: String,
    /// Track length in seconds. 0 = unknown (e.g. live streams).
    pub duration_secs: u64,
    pub thumbnail: String,
}

impl Track {
    pub fn new(
        title: impl Into<String>,
        locator: impl Into<String>,
        duration_secs: u64,
        thumbnail: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            locator: locator.into(),
            duration_secs,
            thumbnail: thumbnail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_camel_case() {
        let track = Track::new(
            "Never Gonna Give You Up",
            "yt:dQw4w9WgXcQ",
            212,
            "https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg",
        );

        let json = serde_json::to_value(&track).expect("serialize");
        assert_eq!(json["title"], "Never Gonna Give You Up");
        assert_eq!(json["locator"], "yt:dQw4w9WgXcQ");
        assert_eq!(json["durationSecs"], 212);

        let back: Track = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, track);
    }
}
