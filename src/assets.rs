//! Target images
//!
//! The sim never waits on images. A level is laid out from the built-in
//! placeholder table right away; whatever an [`AssetProvider`] delivers later
//! only replaces the visuals of targets already in the world.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::AssetError;
use crate::sim::world::Classification;
use crate::tuning::display_name;

pub const REAL_COLOR: &str = "#3498db";
pub const AI_COLOR: &str = "#e74c3c";

/// Visual payload of one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetImage {
    pub display_text: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub color: String,
}

impl TargetImage {
    /// Text-only tile, e.g. "AI: Floating dog head"
    pub fn placeholder(text: &str, classification: Classification) -> Self {
        Self {
            display_text: format!("{}: {}", classification.label(), text),
            image_url: None,
            color: color_for(classification).to_string(),
        }
    }

    pub fn with_url(text: &str, url: &str, classification: Classification) -> Self {
        Self {
            display_text: text.to_string(),
            image_url: Some(url.to_string()),
            color: color_for(classification).to_string(),
        }
    }
}

fn color_for(classification: Classification) -> &'static str {
    match classification {
        Classification::Real => REAL_COLOR,
        Classification::Ai => AI_COLOR,
    }
}

/// Real and AI images for one category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetSet {
    pub real: Vec<TargetImage>,
    pub ai: Vec<TargetImage>,
}

impl TargetSet {
    pub fn is_empty(&self) -> bool {
        self.real.is_empty() && self.ai.is_empty()
    }

    pub fn list(&self, classification: Classification) -> &[TargetImage] {
        match classification {
            Classification::Real => &self.real,
            Classification::Ai => &self.ai,
        }
    }

    /// Hand-written table for known categories, generic five-and-five for
    /// anything else
    pub fn builtin(category: &str) -> Self {
        match PLACEHOLDERS.iter().find(|(id, _, _)| *id == category) {
            Some((_, real, ai)) => Self {
                real: real
                    .iter()
                    .map(|t| TargetImage::placeholder(t, Classification::Real))
                    .collect(),
                ai: ai
                    .iter()
                    .map(|t| TargetImage::placeholder(t, Classification::Ai))
                    .collect(),
            },
            None => Self::generic(category),
        }
    }

    pub fn generic(category: &str) -> Self {
        let name = display_name(category);
        Self {
            real: (1..=5)
                .map(|i| TargetImage::placeholder(&format!("{} {}", name, i), Classification::Real))
                .collect(),
            ai: [
                format!("{} with extra parts", name),
                format!("Floating {}", name),
                format!("{} in impossible pose", name),
                format!("Glowing {}", name),
                format!("{} with wrong colors", name),
            ]
            .iter()
            .map(|t| TargetImage::placeholder(t, Classification::Ai))
            .collect(),
        }
    }
}

/// Non-blocking image source
pub trait AssetProvider {
    /// Start loading a category. Repeated requests are fine.
    fn request(&mut self, category: &str);

    /// `None` while still loading. A result is handed out once per request.
    fn poll(&mut self, category: &str) -> Option<Result<TargetSet, AssetError>>;
}

/// Provider that answers every request with the placeholder table
#[derive(Debug, Default)]
pub struct BuiltinAssets {
    pending: VecDeque<String>,
}

impl AssetProvider for BuiltinAssets {
    fn request(&mut self, category: &str) {
        if !self.pending.iter().any(|c| c == category) {
            self.pending.push_back(category.to_string());
        }
    }

    fn poll(&mut self, category: &str) -> Option<Result<TargetSet, AssetError>> {
        let idx = self.pending.iter().position(|c| c == category)?;
        self.pending.remove(idx);
        Some(Ok(TargetSet::builtin(category)))
    }
}

/// One image entry in `images/<category>/manifest.json`
#[derive(Debug, Clone, Deserialize)]
struct ManifestEntry {
    file: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Manifest {
    #[serde(default)]
    real: Vec<ManifestEntry>,
    #[serde(default)]
    ai: Vec<ManifestEntry>,
}

/// Parse a category manifest. Entry urls are resolved against
/// `images/<category>/<real|ai>/`; missing captions use the file stem.
pub fn parse_manifest(category: &str, json: &str) -> Result<TargetSet, AssetError> {
    let manifest: Manifest = serde_json::from_str(json).map_err(|e| AssetError::Manifest {
        category: category.to_string(),
        reason: e.to_string(),
    })?;

    let convert = |entries: &[ManifestEntry], classification: Classification| {
        let folder = match classification {
            Classification::Real => "real",
            Classification::Ai => "ai",
        };
        entries
            .iter()
            .map(|entry| {
                let caption = entry.text.clone().unwrap_or_else(|| file_stem(&entry.file));
                let url = format!("images/{}/{}/{}", category, folder, entry.file);
                TargetImage::with_url(&caption, &url, classification)
            })
            .collect::<Vec<_>>()
    };

    Ok(TargetSet {
        real: convert(&manifest.real, Classification::Real),
        ai: convert(&manifest.ai, Classification::Ai),
    })
}

fn file_stem(file: &str) -> String {
    match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file.to_string(),
    }
}

type Placeholders = (&'static str, [&'static str; 5], [&'static str; 5]);

const PLACEHOLDERS: [Placeholders; 15] = [
    (
        "dogs",
        ["Golden Retriever", "German Shepherd", "Labrador", "Poodle", "Beagle"],
        [
            "Dog with 6 legs",
            "Floating dog head",
            "Dog with human hands",
            "Glowing dog eyes",
            "Dog in impossible pose",
        ],
    ),
    (
        "cats",
        ["Persian Cat", "Siamese Cat", "Maine Coon", "Tabby Cat", "Orange Cat"],
        [
            "Cat with wings",
            "Cat with extra tails",
            "Floating cat",
            "Cat with human face",
            "Glowing cat",
        ],
    ),
    (
        "cars",
        ["Sedan", "SUV", "Sports Car", "Truck", "Hatchback"],
        ["Car with legs", "Flying car", "Car with eyes", "Transparent car", "Car in water"],
    ),
    (
        "food",
        ["Pizza", "Burger", "Salad", "Pasta", "Sandwich"],
        ["Floating food", "Food with faces", "Glowing food", "Food in space", "Melting food"],
    ),
    (
        "nature",
        ["Forest", "Mountain", "Ocean", "Sunset", "Lake"],
        [
            "Floating trees",
            "Rainbow mountains",
            "Glowing ocean",
            "Purple sky",
            "Upside down lake",
        ],
    ),
    (
        "buildings",
        ["House", "Skyscraper", "Church", "Bridge", "Castle"],
        [
            "Floating building",
            "Building with legs",
            "Glowing building",
            "Upside down building",
            "Building in space",
        ],
    ),
    (
        "people",
        ["Portrait", "Family", "Friends", "Wedding", "Graduation"],
        [
            "Extra fingers",
            "Floating hands",
            "Glowing eyes",
            "Wrong proportions",
            "Merged faces",
        ],
    ),
    (
        "animals",
        ["Lion", "Elephant", "Bird", "Fish", "Bear"],
        [
            "Lion with wings",
            "Elephant with trunk",
            "Bird with arms",
            "Fish with legs",
            "Bear with horns",
        ],
    ),
    (
        "art",
        ["Painting", "Sculpture", "Drawing", "Photography", "Mural"],
        ["Floating art", "Glowing art", "Melting art", "Art with faces", "Upside down art"],
    ),
    (
        "music",
        ["Guitar", "Piano", "Drums", "Violin", "Microphone"],
        [
            "Floating instrument",
            "Glowing instrument",
            "Instrument with eyes",
            "Melting instrument",
            "Instrument in space",
        ],
    ),
    (
        "fashion",
        ["Dress", "Suit", "Shoes", "Hat", "Jacket"],
        [
            "Floating clothes",
            "Glowing clothes",
            "Clothes with faces",
            "Melting clothes",
            "Clothes in space",
        ],
    ),
    (
        "space",
        ["Earth", "Moon", "Stars", "Galaxy", "Nebula"],
        [
            "Floating planet",
            "Glowing planet",
            "Planet with face",
            "Melting planet",
            "Planet with legs",
        ],
    ),
    (
        "fantasy",
        ["Dragon", "Unicorn", "Castle", "Wizard", "Fairy"],
        [
            "Floating fantasy",
            "Glowing fantasy",
            "Fantasy with extra parts",
            "Melting fantasy",
            "Fantasy in wrong setting",
        ],
    ),
    (
        "abstract",
        ["Shapes", "Colors", "Patterns", "Textures", "Lines"],
        [
            "Floating abstract",
            "Glowing abstract",
            "Abstract with faces",
            "Melting abstract",
            "Abstract in space",
        ],
    ),
    (
        "minimalist",
        ["Simple design", "Clean lines", "White space", "Basic shapes", "Monochrome"],
        [
            "Floating minimalist",
            "Glowing minimalist",
            "Minimalist with extra",
            "Melting minimalist",
            "Minimalist in space",
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let set = TargetSet::builtin("dogs");
        assert_eq!(set.real.len(), 5);
        assert_eq!(set.ai.len(), 5);
        assert_eq!(set.real[0].display_text, "REAL: Golden Retriever");
        assert_eq!(set.ai[0].display_text, "AI: Dog with 6 legs");
        assert_eq!(set.ai[0].color, AI_COLOR);
    }

    #[test]
    fn test_generic_placeholders() {
        let set = TargetSet::builtin("robots");
        assert_eq!(set.real[4].display_text, "REAL: Robots 5");
        assert_eq!(set.ai[1].display_text, "AI: Floating Robots");
    }

    #[test]
    fn test_builtin_provider_answers_once() {
        let mut assets = BuiltinAssets::default();
        assert!(assets.poll("cats").is_none());
        assets.request("cats");
        assets.request("cats");
        assert!(matches!(assets.poll("cats"), Some(Ok(_))));
        assert!(assets.poll("cats").is_none());
    }

    #[test]
    fn test_parse_manifest() {
        let json = r#"{"real": [{"file": "lab.jpg"}], "ai": [{"file": "x.png", "text": "Six legs"}]}"#;
        let set = parse_manifest("dogs", json).unwrap();
        assert_eq!(set.real[0].display_text, "lab");
        assert_eq!(set.real[0].image_url.as_deref(), Some("images/dogs/real/lab.jpg"));
        assert_eq!(set.ai[0].display_text, "Six legs");
        assert_eq!(set.ai[0].color, AI_COLOR);
    }

    #[test]
    fn test_parse_manifest_error() {
        let err = parse_manifest("dogs", "[1, 2").unwrap_err();
        assert!(matches!(err, AssetError::Manifest { .. }));
    }
}
