//! Animation Clip Lookup
//!
//! The simulation never touches textures; it only asks whether a named
//! animation exists and how many frames it has. Rendering code owns the
//! actual images. Missing names are not errors: callers get `None` and keep
//! whatever they were showing (or skip the spawn).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AssetError;

/// Metadata for one named animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    pub frame_count: usize,
    /// Playback rate in frames per second
    #[serde(default = "default_fps")]
    pub fps: f32,
}

fn default_fps() -> f32 {
    12.0
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, frame_count: usize, fps: f32) -> Self {
        Self {
            name: name.into(),
            frame_count,
            fps,
        }
    }

    /// Playback rate must be a finite, non-negative number.
    pub fn validate(&self) -> Result<(), AssetError> {
        if !self.fps.is_finite() || self.fps < 0.0 {
            return Err(AssetError::Validation(format!(
                "clip '{}' has fps {}",
                self.name, self.fps
            )));
        }
        Ok(())
    }
}

/// Name-based animation lookup service.
pub trait AnimationLibrary {
    fn exists(&self, name: &str) -> bool;
    fn fetch(&self, name: &str) -> Option<&AnimationClip>;
}

/// In-memory clip table, usually loaded from a RON list.
#[derive(Debug, Default, Clone)]
pub struct ClipLibrary {
    clips: HashMap<String, AnimationClip>,
}

impl ClipLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_clips(clips: impl IntoIterator<Item = AnimationClip>) -> Self {
        let mut library = Self::new();
        for clip in clips {
            library.insert(clip);
        }
        library
    }

    /// Load a `[AnimationClip]` list from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let library = Self::from_ron_str(&contents)?;
        log::debug!("loaded {} animation clips from {}", library.len(), path.display());
        Ok(library)
    }

    pub fn from_ron_str(contents: &str) -> Result<Self, AssetError> {
        let clips: Vec<AnimationClip> = ron::from_str(contents)?;
        for clip in &clips {
            clip.validate()?;
        }
        Ok(Self::from_clips(clips))
    }

    pub fn insert(&mut self, clip: AnimationClip) {
        self.clips.insert(clip.name.clone(), clip);
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

impl AnimationLibrary for ClipLibrary {
    fn exists(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    fn fetch(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.get(name)
    }
}
