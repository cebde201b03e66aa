// Recent content list
//
// Tracks recently launched content for quick access from the File menu.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default recent content file path
const RECENT_CONTENT_FILE: &str = "recent_content.toml";

/// Maximum number of entries to track
const MAX_RECENT_CONTENT: usize = 10;

/// Recently launched content, most recent first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecentContentList {
    entries: Vec<RecentContentEntry>,
}

/// Entry for one piece of launched content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentContentEntry {
    /// Path to the content file
    pub path: PathBuf,

    /// Display name (file name without extension)
    pub display_name: String,
}

impl RecentContentList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the list from the default file, or start empty.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Load the list from the default file.
    pub fn load() -> Result<Self, io::Error> {
        let contents = fs::read_to_string(RECENT_CONTENT_FILE)?;
        toml::from_str(&contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Save the list to the default file.
    pub fn save(&self) -> Result<(), io::Error> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(RECENT_CONTENT_FILE, contents)
    }

    /// Add content to the list, moving it to the top if already present.
    pub fn add<P: AsRef<Path>>(&mut self, path: P) {
        let path = path.as_ref();

        self.entries.retain(|entry| entry.path != path);

        let display_name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("Unknown")
            .to_string();

        self.entries.insert(
            0,
            RecentContentEntry {
                path: path.to_path_buf(),
                display_name,
            },
        );
        self.entries.truncate(MAX_RECENT_CONTENT);
    }

    pub fn entries(&self) -> &[RecentContentEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
