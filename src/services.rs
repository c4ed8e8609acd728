//! External collaborators handed to the sim
//!
//! The sim never reaches for globals: storage, sound and image loading are
//! passed in as trait objects so native runs and tests can swap them.

use crate::assets::{AssetProvider, BuiltinAssets};
use crate::audio::{AudioSink, NullAudio, SoundEvent};
use crate::persistence::{MemoryStore, SaveStore};

pub struct Services {
    pub store: Box<dyn SaveStore>,
    pub audio: Box<dyn AudioSink>,
    pub assets: Box<dyn AssetProvider>,
}

impl Services {
    pub fn new(
        store: Box<dyn SaveStore>,
        audio: Box<dyn AudioSink>,
        assets: Box<dyn AssetProvider>,
    ) -> Self {
        Self {
            store,
            audio,
            assets,
        }
    }

    /// In-memory save, no sound, placeholder images
    pub fn headless() -> Self {
        Self::new(
            Box::new(MemoryStore::new()),
            Box::new(NullAudio),
            Box::new(BuiltinAssets::default()),
        )
    }

    pub fn play(&mut self, event: SoundEvent) {
        self.audio.play(event);
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::headless()
    }
}
