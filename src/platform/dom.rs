//! DOM overlays, HUD and shop buttons
//!
//! The page carries one `.ui-overlay` per non-canvas mode. Overlays are only
//! touched when the mode changes; the HUD is refreshed every frame while
//! playing and the shop whenever its contents change.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement};

use super::fail_message;
use crate::sim::{FrameSnapshot, GameMode, GameState, Hud, LevelSummary, ShopView};

/// Overlay element shown for a mode. Category select is canvas only.
pub fn overlay_id(mode: GameMode) -> Option<&'static str> {
    match mode {
        GameMode::MainMenu => Some("mainMenu"),
        GameMode::CategorySelect => None,
        GameMode::Playing => Some("gameHUD"),
        GameMode::Paused => Some("pauseMenu"),
        GameMode::LevelComplete => Some("levelComplete"),
        GameMode::LevelFailed => Some("levelFailed"),
        GameMode::UpgradeShop => Some("upgradeShopUI"),
    }
}

pub struct DomUi {
    document: Document,
    mode: Option<GameMode>,
    shop: Option<ShopView>,
    last_hud: Option<Hud>,
}

impl DomUi {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            mode: None,
            shop: None,
            last_hud: None,
        }
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(el) = self.document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn button(&self, id: &str) -> Option<HtmlButtonElement> {
        self.document
            .get_element_by_id(id)?
            .dyn_into::<HtmlButtonElement>()
            .ok()
    }

    /// Sync the page with this frame
    pub fn sync(&mut self, frame: &FrameSnapshot<'_>, state: &GameState, tick: u64) {
        if self.mode != Some(frame.mode) {
            self.show_overlay(frame.mode);
            match frame.mode {
                GameMode::LevelComplete => {
                    if let Some(summary) = frame.summary {
                        self.show_summary(summary);
                    }
                }
                GameMode::LevelFailed => self.set_text("failMessage", fail_message(tick)),
                _ => {}
            }
            self.mode = Some(frame.mode);
            self.last_hud = None;
        }

        match frame.mode {
            GameMode::Playing => {
                if self.last_hud.as_ref() != Some(&frame.hud) {
                    self.update_hud(&frame.hud);
                    self.last_hud = Some(frame.hud.clone());
                }
            }
            GameMode::UpgradeShop => {
                let shop = ShopView::capture(state);
                if self.shop.as_ref() != Some(&shop) {
                    self.update_shop(&shop);
                    self.shop = Some(shop);
                }
            }
            _ => {}
        }
    }

    fn show_overlay(&self, mode: GameMode) {
        if let Ok(overlays) = self.document.query_selector_all(".ui-overlay") {
            for i in 0..overlays.length() {
                if let Some(el) = overlays.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                    let _ = el.class_list().add_1("hidden");
                }
            }
        }
        if let Some(el) = overlay_id(mode).and_then(|id| self.document.get_element_by_id(id)) {
            let _ = el.class_list().remove_1("hidden");
        }
    }

    fn update_hud(&self, hud: &Hud) {
        self.set_text("scoreDisplay", &hud.score.to_string());
        self.set_text("weaponDisplay", &hud.weapon);

        if let Some(fill) = self
            .document
            .get_element_by_id("healthFill")
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            let width = format!("{}%", hud.health_fraction() * 100.0);
            let _ = fill.style().set_property("width", &width);
        }
    }

    fn show_summary(&self, summary: &LevelSummary) {
        self.set_text("completionMessage", &summary.message);

        let Some(breakdown) = self.document.get_element_by_id("scoreBreakdown") else {
            return;
        };
        let mut html = format!(
            "<p>Final Score: {}</p><p>Points Earned This Level: {}</p>",
            summary.score, summary.points_earned
        );
        if summary.new_high_score {
            html.push_str("<p>New high score!</p>");
        }
        if let Some(id) = &summary.unlocked_category {
            html.push_str(&format!(
                "<p class=\"unlock\">NEW LEVEL UNLOCKED!</p><p>\"{}\" is now available!</p>",
                crate::tuning::display_name(id)
            ));
        }
        html.push_str("<p>Visit the shop to unlock new weapons and upgrades!</p>");
        breakdown.set_inner_html(&html);
    }

    fn update_shop(&self, shop: &ShopView) {
        self.set_text("pointsDisplay", &shop.points.to_string());

        for row in &shop.upgrades {
            let id = format!("{}Upgrade", row.key.as_str());
            if let Some(button) = self.button(&id) {
                match row.next_cost {
                    Some(cost) => {
                        button.set_text_content(Some(&format!("Upgrade ({})", cost)));
                        button.set_disabled(!row.affordable);
                    }
                    None => {
                        button.set_text_content(Some("Max Level"));
                        button.set_disabled(true);
                    }
                }
            }
            self.set_text(
                &format!("{}Level", row.key.as_str()),
                &format!("{}/{}", row.level, row.max_level),
            );
        }

        for row in shop.weapons.iter().skip(1) {
            if let Some(button) = self.button(&format!("buyWeapon{}", row.index)) {
                if row.unlocked {
                    button.set_text_content(Some("Owned"));
                    button.set_disabled(true);
                } else {
                    button.set_text_content(Some(&format!("Buy ({})", row.cost)));
                    button.set_disabled(row.cost > shop.points);
                }
            }
        }

        if let Some(button) = self.button("unlockCategory") {
            if shop.categories.iter().all(|c| c.unlocked) {
                button.set_text_content(Some("All Unlocked"));
                button.set_disabled(true);
            } else {
                button.set_text_content(Some(&format!("Unlock ({})", shop.category_cost)));
                button.set_disabled(shop.category_cost > shop.points);
            }
        }
    }
}
