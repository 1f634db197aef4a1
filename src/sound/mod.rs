//! Sound assets and the catalog that names them.
//!
//! A [`Sound`] is a directory of interchangeable files.  Each play request
//! rotates to the next file, and a request that arrives while the previous
//! file is still playing is refused, so a sound never overlaps itself.
//!
//! The [`channels`] submodule routes sounds onto virtual channels.

pub mod channels;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rand::Rng;

use crate::app::ports::SoundBackend;
use crate::config::SoundConfig;
use crate::error::SoundError;

/// What a play request did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// A new file started.
    Started(PathBuf),
    /// The previous file is still playing; nothing started.
    AlreadyPlaying,
    /// The sound has no files.
    NoFiles,
}

impl PlayOutcome {
    /// The sound is audible after the request (new or continuing playback).
    pub fn is_audible(&self) -> bool {
        !matches!(self, Self::NoFiles)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Sound
// ═══════════════════════════════════════════════════════════════

pub struct Sound<B: SoundBackend> {
    name: String,
    dir: PathBuf,
    files: Vec<PathBuf>,
    /// Index of the file played most recently.
    index: usize,
    current: Option<B::Handle>,
}

impl<B: SoundBackend> Sound<B> {
    /// Build a sound from every regular file in `dir`, starting the
    /// rotation at a random file.
    pub fn from_dir(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        let mut sound = Self::with_files(name, Vec::new(), 0);
        sound.dir = dir.into();
        sound.refresh_files();
        sound
    }

    /// Build a sound from an explicit file list.  The first play request
    /// uses the file after `start_index`.
    pub fn with_files(name: impl Into<String>, files: Vec<PathBuf>, start_index: usize) -> Self {
        let index = if files.is_empty() { 0 } else { start_index % files.len() };
        Self {
            name: name.into(),
            dir: PathBuf::new(),
            files,
            index,
            current: None,
        }
    }

    /// Re-list the sound's directory.
    pub fn refresh_files(&mut self) {
        let mut files: Vec<PathBuf> = match fs::read_dir(&self.dir) {
            Ok(entries) => entries
                .filter_map(Result::ok)
                .map(|e| e.path())
                .filter(|p| p.is_file())
                .collect(),
            Err(e) => {
                warn!("Sound '{}': cannot list {}: {}", self.name, self.dir.display(), e);
                Vec::new()
            }
        };
        files.sort();

        if files.is_empty() {
            warn!("Sound '{}': no files found in {}", self.name, self.dir.display());
            self.index = 0;
        } else {
            debug!("Sound '{}': found {} files in {}", self.name, files.len(), self.dir.display());
            self.index = rand::rng().random_range(0..files.len());
        }
        self.files = files;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    fn next_file(&mut self) -> Option<&Path> {
        if self.files.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.files.len();
        Some(&self.files[self.index])
    }

    pub fn is_playing(&mut self, backend: &mut B) -> bool {
        match self.current.as_mut() {
            Some(handle) => backend.is_playing(handle),
            None => false,
        }
    }

    /// Start the next file unless the current one is still playing.
    pub fn play_next(&mut self, backend: &mut B) -> Result<PlayOutcome, SoundError> {
        if self.is_playing(backend) {
            warn!("Sound '{}': play requested but already in progress", self.name);
            return Ok(PlayOutcome::AlreadyPlaying);
        }
        let Some(file) = self.next_file().map(Path::to_path_buf) else {
            warn!("Sound '{}': play requested but no files available", self.name);
            return Ok(PlayOutcome::NoFiles);
        };
        let handle = backend.play(&file)?;
        info!("Sound '{}': playing {}", self.name, file.display());
        self.current = Some(handle);
        Ok(PlayOutcome::Started(file))
    }

    /// Stop the current file if it is still playing.
    pub fn stop_current(&mut self, backend: &mut B) -> Result<(), SoundError> {
        if !self.is_playing(backend) {
            return Ok(());
        }
        if let Some(handle) = self.current.as_mut() {
            backend.stop(handle)?;
            debug!("Sound '{}': stopped", self.name);
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════
//  Catalog
// ═══════════════════════════════════════════════════════════════

/// Name → [`Sound`] table, built once at process entry.
pub struct SoundCatalog<B: SoundBackend> {
    sounds: HashMap<String, Sound<B>>,
}

impl<B: SoundBackend> Default for SoundCatalog<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: SoundBackend> SoundCatalog<B> {
    pub fn new() -> Self {
        Self {
            sounds: HashMap::new(),
        }
    }

    /// Build every configured sound from its directory.
    pub fn from_config(sounds: &[SoundConfig]) -> Self {
        let mut catalog = Self::new();
        for s in sounds {
            catalog.insert(Sound::from_dir(s.name.clone(), s.dir.clone()));
        }
        catalog
    }

    /// Add a sound, replacing any existing sound of the same name.
    pub fn insert(&mut self, sound: Sound<B>) {
        self.sounds.insert(sound.name.clone(), sound);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sounds.contains_key(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Sound<B>> {
        self.sounds.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Sound<B>> {
        self.sounds.values_mut()
    }
}
