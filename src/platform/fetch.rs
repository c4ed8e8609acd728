//! Image loading over fetch
//!
//! Each category ships `images/<category>/manifest.json` listing its real and
//! AI pictures. Requests run on the browser's event loop; the sim polls for
//! results between ticks and never waits.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use super::manifest_url;
use crate::assets::{AssetProvider, TargetSet, parse_manifest};
use crate::error::AssetError;

/// `None` while in flight
type Slot = Option<Result<TargetSet, AssetError>>;

#[derive(Debug, Default, Clone)]
pub struct FetchAssets {
    slots: Rc<RefCell<HashMap<String, Slot>>>,
}

impl FetchAssets {
    pub fn new() -> Self {
        Self::default()
    }
}

async fn fetch_text(url: &str) -> Result<String, String> {
    let window = web_sys::window().ok_or("no window")?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| format!("{:?}", e))?;
    let response: Response = response.dyn_into().map_err(|_| "not a Response")?;
    if !response.ok() {
        return Err(format!("HTTP {}", response.status()));
    }
    let text = JsFuture::from(response.text().map_err(|e| format!("{:?}", e))?)
        .await
        .map_err(|e| format!("{:?}", e))?;
    text.as_string().ok_or_else(|| "body is not text".to_string())
}

async fn load_category(category: String) -> Result<TargetSet, AssetError> {
    let json = fetch_text(&manifest_url(&category))
        .await
        .map_err(|reason| AssetError::Fetch {
            category: category.clone(),
            reason,
        })?;
    parse_manifest(&category, &json)
}

impl AssetProvider for FetchAssets {
    fn request(&mut self, category: &str) {
        if self.slots.borrow().contains_key(category) {
            return;
        }
        self.slots.borrow_mut().insert(category.to_string(), None);
        log::info!("Loading images for '{}'", category);

        let slots = self.slots.clone();
        let category = category.to_string();
        wasm_bindgen_futures::spawn_local(async move {
            let result = load_category(category.clone()).await;
            slots.borrow_mut().insert(category, Some(result));
        });
    }

    fn poll(&mut self, category: &str) -> Option<Result<TargetSet, AssetError>> {
        let mut slots = self.slots.borrow_mut();
        if !matches!(slots.get(category), Some(Some(_))) {
            return None;
        }
        slots.remove(category).flatten()
    }
}
