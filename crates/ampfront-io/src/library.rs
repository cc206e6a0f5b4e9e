//! Track list built from the waveform files under a mount root.

use crate::{Error, Result};
use std::io;
use std::path::{Path, PathBuf};

/// The `.wav` files found under a mount root, with one selected for playback.
///
/// Tracks are stored relative to the root and kept sorted. Scanning selects
/// the first track.
#[derive(Debug, Clone)]
pub struct TrackList {
    root: PathBuf,
    tracks: Vec<PathBuf>,
    selected: Option<usize>,
}

impl TrackList {
    /// Scans `root` recursively for `.wav` files (any letter case).
    ///
    /// Unreadable subdirectories are skipped. An unreadable root is an error.
    pub fn scan<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let entries = std::fs::read_dir(&root).map_err(|e| Error::open(&root, e))?;

        let mut tracks = Vec::new();
        collect_tracks(&root, entries, &mut tracks);
        tracks.sort();

        tracing::debug!(root = %root.display(), count = tracks.len(), "track scan finished");
        let selected = if tracks.is_empty() { None } else { Some(0) };
        Ok(Self {
            root,
            tracks,
            selected,
        })
    }

    /// Mount root the tracks are relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Track paths relative to the root.
    pub fn tracks(&self) -> &[PathBuf] {
        &self.tracks
    }

    /// Number of tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether no tracks were found.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Full path of the selected track.
    pub fn selected(&self) -> Option<PathBuf> {
        self.selected.map(|i| self.root.join(&self.tracks[i]))
    }

    /// Index of the selected track.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Selects a track by its name relative to the root. A leading `/` is
    /// accepted, so `/album/song.wav` and `album/song.wav` are the same track.
    pub fn select(&mut self, name: &str) -> Result<PathBuf> {
        let relative = Path::new(name.trim_start_matches('/'));
        match self.tracks.iter().position(|t| t == relative) {
            Some(i) => {
                self.selected = Some(i);
                Ok(self.root.join(relative))
            }
            None => Err(Error::open(
                self.root.join(relative),
                io::Error::new(io::ErrorKind::NotFound, "not in track list"),
            )),
        }
    }

    /// Selects a track by index. Returns false if out of range.
    pub fn select_index(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
}

fn collect_tracks(root: &Path, entries: std::fs::ReadDir, tracks: &mut Vec<PathBuf>) {
    for entry in entries.filter_map(|entry| entry.ok()) {
        let path = entry.path();
        if path.is_dir() {
            match std::fs::read_dir(&path) {
                Ok(children) => collect_tracks(root, children, tracks),
                Err(e) => tracing::debug!(dir = %path.display(), error = %e, "skipping directory"),
            }
        } else if is_wav(&path)
            && let Ok(relative) = path.strip_prefix(root)
        {
            tracks.push(relative.to_path_buf());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn mount() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("album/disc2")).unwrap();
        for name in [
            "b.wav",
            "a.WAV",
            "notes.txt",
            "album/one.wav",
            "album/disc2/two.wav",
            "album/cover.jpg",
        ] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        dir
    }

    #[test]
    fn test_scan_finds_wav_recursively_sorted() {
        let dir = mount();
        let list = TrackList::scan(dir.path()).unwrap();
        let names: Vec<_> = list.tracks().iter().map(|p| p.to_string_lossy().into_owned()).collect();
        assert_eq!(
            names,
            vec!["a.WAV", "album/disc2/two.wav", "album/one.wav", "b.wav"]
        );
        assert_eq!(list.selected(), Some(dir.path().join("a.WAV")));
    }

    #[test]
    fn test_select_by_relative_name() {
        let dir = mount();
        let mut list = TrackList::scan(dir.path()).unwrap();
        let path = list.select("/album/one.wav").unwrap();
        assert_eq!(path, dir.path().join("album/one.wav"));
        assert_eq!(list.selected_index(), Some(2));

        let err = list.select("missing.wav").unwrap_err();
        assert!(err.is_unplayable());
        assert_eq!(list.selected_index(), Some(2));
    }

    #[test]
    fn test_empty_root_selects_nothing() {
        let dir = TempDir::new().unwrap();
        let mut list = TrackList::scan(dir.path()).unwrap();
        assert!(list.is_empty());
        assert_eq!(list.selected(), None);
        assert!(!list.select_index(0));
    }

    #[test]
    fn test_missing_root_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(TrackList::scan(dir.path().join("nope")).is_err());
    }
}
