use std::time::Duration;

use drape::{
    AssetProgress, DrawSurface, EventLoop, ProgressFeed, RevealShell, RevealState, Shade,
    ShellConfig, TimedProgress, Vec2, VerletWorld,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("drape demo starting");
}

// ---- Canvas surface ----

struct CanvasSurface {
    canvas: web::HtmlCanvasElement,
    ctx: web::CanvasRenderingContext2d,
}

impl CanvasSurface {
    fn find(canvas_id: &str) -> Option<Self> {
        let document = web::window()?.document()?;
        let canvas = document
            .get_element_by_id(canvas_id)?
            .dyn_into::<web::HtmlCanvasElement>()
            .ok()?;
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<web::CanvasRenderingContext2d>()
            .ok()?;
        Some(CanvasSurface { canvas, ctx })
    }

    fn trace(&self, points: &[Vec2<f32>]) {
        self.ctx.begin_path();
        if let Some((first, rest)) = points.split_first() {
            self.ctx.move_to(first.x as f64, first.y as f64);
            for p in rest {
                self.ctx.line_to(p.x as f64, p.y as f64);
            }
        }
        self.ctx.close_path();
    }
}

impl DrawSurface<f32> for CanvasSurface {
    /// Layout size; the backing store follows it so one unit is one CSS pixel.
    fn size(&self) -> (f32, f32) {
        let width = self.canvas.client_width().max(0) as u32;
        let height = self.canvas.client_height().max(0) as u32;
        if self.canvas.width() != width || self.canvas.height() != height {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
        }
        (width as f32, height as f32)
    }

    fn clear(&mut self) {
        let (w, h) = (self.canvas.width() as f64, self.canvas.height() as f64);
        self.ctx.clear_rect(0.0, 0.0, w, h);
    }

    #[allow(deprecated)]
    fn fill_polygon(&mut self, points: &[Vec2<f32>], shade: Shade<f32>) {
        self.trace(points);
        self.ctx.set_fill_style(&JsValue::from_str(&shade.to_string()));
        self.ctx.fill();
    }

    #[allow(deprecated)]
    fn stroke_polygon(&mut self, points: &[Vec2<f32>], shade: Shade<f32>, line_width: f32) {
        self.trace(points);
        self.ctx.set_stroke_style(&JsValue::from_str(&shade.to_string()));
        self.ctx.set_line_width(line_width as f64);
        self.ctx.stroke();
    }
}

// ---- Reveal ----

/// A cloth reveal over `<canvas id=canvas_id>`, driven by `frame` from `requestAnimationFrame`.
#[wasm_bindgen]
pub struct ClothReveal {
    events: EventLoop,
    shell: RevealShell<VerletWorld<f32>>,
}

#[wasm_bindgen]
impl ClothReveal {
    /// With `asset_count` the loader counts `asset_loaded` calls; without it,
    /// it counts up on a timer.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, asset_count: Option<u32>) -> ClothReveal {
        let events = EventLoop::new();
        let config: ShellConfig<f32> = ShellConfig::new();
        let surface = CanvasSurface::find(canvas_id)
            .map(|s| Box::new(s) as Box<dyn DrawSurface<f32>>);
        let feed = match asset_count {
            Some(n) => ProgressFeed::Assets(AssetProgress::new(n as usize)),
            None => ProgressFeed::Timed(TimedProgress::new()),
        };
        let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
        let world = VerletWorld::new(config.overlay.solver.clone());
        let shell = RevealShell::mount(
            &events,
            world,
            surface,
            config,
            Box::new(SmallRng::seed_from_u64(seed)),
            feed,
        );
        ClothReveal { events, shell }
    }

    /// Advance by `dt_ms` milliseconds and draw one frame.
    pub fn frame(&self, dt_ms: f64) {
        let dt = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        self.events.advance(Duration::from_secs_f64(dt / 1000.0));
    }

    /// One asset finished loading, or failed to.
    pub fn asset_loaded(&self) {
        self.shell.asset_settled();
    }

    pub fn set_progress(&self, percent: u32) {
        self.shell.report_progress(percent);
    }

    pub fn progress(&self) -> u8 {
        self.shell.progress()
    }

    pub fn is_finished(&self) -> bool {
        self.shell.state() == RevealState::Finished
    }

    pub fn content_visible(&self) -> bool {
        self.shell.content_visible()
    }

    pub fn loader_label(&self) -> Option<String> {
        self.shell.loader_label()
    }
}
