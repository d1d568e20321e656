//! Animal catalog
//!
//! The fixed list of species that can appear on screen. Pure data: loaded
//! once at startup and shared read-only by every spawned instance.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// An 8-bit RGBA color, stored on the wire as 0xAARRGGBB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    pub const fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 0xFF
    }
}

impl From<u32> for Rgba {
    fn from(argb: u32) -> Self {
        Self::from_argb(argb)
    }
}

impl From<Rgba> for u32 {
    fn from(c: Rgba) -> Self {
        c.to_argb()
    }
}

/// A species definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalDef {
    /// Stable species id (lowercase English)
    pub id: String,
    /// Name shown while the animal is shaking
    pub display_name: String,
    /// Sound written out as text ("Woof woof!")
    pub vocalization: String,
    /// Image asset reference for the renderer
    pub visual_ref: String,
    /// Sound asset reference, resolved once by the sound bank
    pub sound_ref: String,
    /// Emoji fallback when the image asset is missing
    #[serde(default)]
    pub emoji: String,
    /// Background tint
    pub color: Rgba,
}

impl AnimalDef {
    /// Build a definition following the `sound_<id>` / `img_<id>` asset naming
    pub fn new(id: &str, display_name: &str, vocalization: &str, emoji: &str, argb: u32) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            vocalization: vocalization.to_string(),
            visual_ref: format!("img_{id}"),
            sound_ref: format!("sound_{id}"),
            emoji: emoji.to_string(),
            color: Rgba::from_argb(argb),
        }
    }
}

/// Immutable, ordered list of species
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    animals: Vec<Arc<AnimalDef>>,
}

impl Catalog {
    pub fn new(animals: impl IntoIterator<Item = AnimalDef>) -> Self {
        Self {
            animals: animals.into_iter().map(Arc::new).collect(),
        }
    }

    /// Farm animals and pets, then wild animals
    pub fn builtin() -> Self {
        Self::new([
            AnimalDef::new("dog", "Dog", "Woof woof!", "🐕", 0xFFFFD7A8),
            AnimalDef::new("cat", "Cat", "Meow meow!", "🐈", 0xFFFFB3C6),
            AnimalDef::new("horse", "Horse", "Neigh!", "🐴", 0xFFC8A070),
            AnimalDef::new("cow", "Cow", "Moo moo!", "🐄", 0xFFF0F0E8),
            AnimalDef::new("chicken", "Chicken", "Cock-a-doodle-doo!", "🐓", 0xFFFFCC80),
            AnimalDef::new("chick", "Chick", "Cheep cheep!", "🐥", 0xFFFFE860),
            AnimalDef::new("sheep", "Sheep", "Baa baa!", "🐑", 0xFFE0E8E0),
            AnimalDef::new("goat", "Goat", "Meh meh!", "🐐", 0xFFDDD8B8),
            AnimalDef::new("lion", "Lion", "Roar!", "🦁", 0xFFFFF0A8),
            AnimalDef::new("elephant", "Elephant", "Pawoo!", "🐘", 0xFFD8D0F0),
            AnimalDef::new("wolf", "Wolf", "Awoo!", "🐺", 0xFF9AABBC),
            AnimalDef::new("boar", "Boar", "Oink oink!", "🐗", 0xFFD4A07A),
            AnimalDef::new("crow", "Crow", "Caw caw!", "🐦‍⬛", 0xFF8898A8),
            AnimalDef::new("sparrow", "Sparrow", "Chirp chirp!", "🐦", 0xFFD0B890),
        ])
    }

    /// Parse a JSON array of definitions
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let defs: Vec<AnimalDef> = serde_json::from_str(json)?;
        Ok(Self::new(defs))
    }

    pub fn len(&self) -> usize {
        self.animals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animals.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<AnimalDef>> {
        self.animals.get(index)
    }

    pub fn find(&self, id: &str) -> Option<&Arc<AnimalDef>> {
        self.animals.iter().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<AnimalDef>> {
        self.animals.iter()
    }
}
