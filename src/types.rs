use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

// DTOs for the listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirEntryDto {
    pub name: String,
    pub relpath: String,
    pub mtime: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntryDto {
    pub name: String,
    pub relpath: String,
    pub size: u64,
    pub size_human: String,
    pub mtime: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirListing {
    pub cwd: String,
    pub dirs: Vec<DirEntryDto>,
    pub files: Vec<FileEntryDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub name: String,
    pub relpath: String,
    /// Name to fetch this file under `/drop/`.
    pub shortcut: String,
    pub size: u64,
    pub size_human: String,
    pub mtime: Option<String>,
}

/// Formats a byte count as `1.5KB`, one decimal, binary units up to PB.
pub fn human_size(bytes: u64) -> String {
    let mut n = bytes as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if n < 1024.0 {
            return format!("{:.1}{}", n, unit);
        }
        n /= 1024.0;
    }
    format!("{:.1}PB", n)
}

/// Local-time `YYYY-MM-DD HH:MM:SS`.
pub fn format_mtime(t: SystemTime) -> String {
    DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string()
}
