//! Sprite assets
//!
//! Images load lazily; every draw site checks `complete()` and falls back
//! to a solid-color rectangle, so the game stays playable if an asset
//! never arrives.

use web_sys::HtmlImageElement;

/// Sprite URL for a gallery character (the gallery itself lives outside
/// the engine; unknown names get the default character)
pub fn character_sprite_url(character: &str) -> &'static str {
    match character {
        "billy" => "assets/billy.svg",
        "sally" => "assets/sally.svg",
        "tommy" => "assets/tommy.svg",
        _ => "assets/nelly.svg",
    }
}

/// Loaded (or still loading) sprite set
pub struct Assets {
    pub player: HtmlImageElement,
    pub background: HtmlImageElement,
    pub obstacles: [HtmlImageElement; 3],
}

impl Assets {
    /// Kick off loading for the full sprite set. `None` when image
    /// elements cannot be created at all (no DOM).
    pub fn load(character: &str) -> Option<Self> {
        let make = |src: &str| -> Option<HtmlImageElement> {
            let img = HtmlImageElement::new().ok()?;
            img.set_src(src);
            Some(img)
        };

        Some(Self {
            player: make(character_sprite_url(character))?,
            background: make("assets/background.png")?,
            obstacles: [
                make("assets/obstacle_1.svg")?,
                make("assets/obstacle_2.svg")?,
                make("assets/obstacle_3.svg")?,
            ],
        })
    }

    /// Aspect-corrected width of one background tile when scaled to cover
    /// the given viewport height. `None` until the image reports its
    /// natural dimensions.
    pub fn background_span(&self, view_height: f32) -> Option<f32> {
        let w = self.background.natural_width();
        let h = self.background.natural_height();
        if self.background.complete() && w > 0 && h > 0 {
            Some(view_height * w as f32 / h as f32)
        } else {
            None
        }
    }
}

/// True when an image is ready to draw
pub fn ready(img: &HtmlImageElement) -> bool {
    img.complete() && img.natural_width() > 0
}
