//! Canvas2D render adapter
//!
//! A pure projection of the world snapshot onto the canvas: no game-logic
//! decisions, no state mutation. Missing sprites degrade to solid-color
//! rectangles.

pub mod assets;

pub use assets::Assets;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::consts::*;
use crate::sim::{Star, World};

const BACKGROUND_FALLBACK: &str = "#fce4ec";
const PLAYER_FALLBACK: &str = "#90a4ae";
const OBSTACLE_FALLBACK: &str = "#ef5350";
const GROUND_COLOR: &str = "rgba(255, 255, 255, 0.5)";
const STAR_FILL: &str = "#facc15";
const STAR_STROKE: &str = "#eab308";
/// Inner-vertex inset of the star polygon
const STAR_INSET: f64 = 0.5;

pub struct Renderer {
    ctx: CanvasRenderingContext2d,
    assets: Option<Assets>,
}

impl Renderer {
    pub fn new(canvas: &HtmlCanvasElement, character: &str) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let assets = Assets::load(character);
        if assets.is_none() {
            log::warn!("sprite loading unavailable, drawing fallback shapes");
        }
        Ok(Self { ctx, assets })
    }

    /// Aspect-corrected background tile width, once the image has loaded
    pub fn background_span(&self, view_height: f32) -> Option<f32> {
        self.assets
            .as_ref()
            .and_then(|a| a.background_span(view_height))
    }

    /// Draw one frame from the world snapshot
    pub fn render(&self, world: &World) {
        let ctx = &self.ctx;
        let w = world.view.width as f64;
        let h = world.view.height as f64;

        ctx.clear_rect(0.0, 0.0, w, h);
        self.draw_background(world);

        // Ground strip is visual only; the clamp lives in the simulation
        ctx.set_fill_style_str(GROUND_COLOR);
        ctx.fill_rect(0.0, world.view.ground_top() as f64, w, GROUND_HEIGHT as f64);

        self.draw_player(world);
        self.draw_obstacles(world);
        for star in &world.stars {
            self.draw_star(star);
        }
    }

    fn draw_background(&self, world: &World) {
        let ctx = &self.ctx;
        let w = world.view.width as f64;
        let h = world.view.height as f64;

        let bg = self
            .assets
            .as_ref()
            .map(|a| &a.background)
            .filter(|img| assets::ready(img));

        match bg {
            Some(img) => {
                // Tile from the scrolled offset until the surface is covered
                let span = world.bg_span as f64;
                let mut x = world.bg_offset as f64;
                while x < w {
                    let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                        img, x, 0.0, span, h,
                    );
                    x += span;
                }
            }
            None => {
                ctx.set_fill_style_str(BACKGROUND_FALLBACK);
                ctx.fill_rect(0.0, 0.0, w, h);
            }
        }
    }

    fn draw_player(&self, world: &World) {
        // Flicker while invincible: skip alternating frame bands
        if world.invincibility > 0 && (world.frame / FLICKER_BAND) % 2 != 0 {
            return;
        }

        let ctx = &self.ctx;
        let p = &world.player;
        let sprite = self
            .assets
            .as_ref()
            .map(|a| &a.player)
            .filter(|img| assets::ready(img));

        match sprite {
            Some(img) => {
                let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                    img,
                    p.pos.x as f64,
                    p.pos.y as f64,
                    p.size.x as f64,
                    p.size.y as f64,
                );
            }
            None => {
                ctx.set_fill_style_str(PLAYER_FALLBACK);
                ctx.fill_rect(
                    p.pos.x as f64,
                    p.pos.y as f64,
                    p.size.x as f64,
                    p.size.y as f64,
                );
            }
        }
    }

    fn draw_obstacles(&self, world: &World) {
        let ctx = &self.ctx;
        for obs in &world.obstacles {
            let sprite = self
                .assets
                .as_ref()
                .and_then(|a| a.obstacles.get(obs.kind as usize))
                .filter(|img| assets::ready(img));

            match sprite {
                Some(img) => {
                    let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                        img,
                        obs.pos.x as f64,
                        obs.pos.y as f64,
                        obs.size.x as f64,
                        obs.size.y as f64,
                    );
                }
                None => {
                    ctx.set_fill_style_str(OBSTACLE_FALLBACK);
                    ctx.fill_rect(
                        obs.pos.x as f64,
                        obs.pos.y as f64,
                        obs.size.x as f64,
                        obs.size.y as f64,
                    );
                }
            }
        }
    }

    /// Stars are drawn as a ten-vertex path, not an image
    fn draw_star(&self, star: &Star) {
        let ctx = &self.ctx;
        let cx = (star.pos.x + star.size.x / 2.0) as f64;
        let cy = (star.pos.y + star.size.y / 2.0) as f64;
        let radius = (star.size.x / 1.5) as f64;

        ctx.save();
        ctx.begin_path();
        let _ = ctx.translate(cx, cy);
        ctx.move_to(0.0, -radius);
        for _ in 0..5 {
            let _ = ctx.rotate(std::f64::consts::PI / 5.0);
            ctx.line_to(0.0, -radius * STAR_INSET);
            let _ = ctx.rotate(std::f64::consts::PI / 5.0);
            ctx.line_to(0.0, -radius);
        }
        ctx.close_path();
        ctx.set_fill_style_str(STAR_FILL);
        ctx.fill();
        ctx.set_stroke_style_str(STAR_STROKE);
        ctx.set_line_width(2.0);
        ctx.stroke();
        ctx.restore();
    }
}
