//! Tactical board preview built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`SwarmScheduler`] with one
//! swarm per visible unit and implements [`eframe::App`] to draw every
//! swarm from a fresh snapshot each frame.

use eframe::App;
use glam::Vec2;
use log::{info, warn};
use swarm_core::{
    ParticleSample, RoleColor, ShapeClass, SwarmConfig, SwarmHandle, SwarmScheduler,
    types::LOCAL_SIZE,
};

/// Cells per board side.
pub const BOARD_SIDE: usize = 6;
/// Side length of one board cell, in board units.
pub const CELL_SIZE: f32 = 40.0;
/// Offset of a swarm's local square inside its cell.
const CELL_INSET: f32 = (CELL_SIZE - LOCAL_SIZE) * 0.5;
/// Particle diameter before scaling.
const PARTICLE_SIZE: f32 = 2.0;

/// Starting units: board cell, unit type, side.
const PLACEMENTS: [(usize, &str, &str); 6] = [
    (5, "interceptor", "player"),
    (10, "support", "player"),
    (15, "tank", "player"),
    (20, "tank", "enemy"),
    (25, "interceptor", "enemy"),
    (30, "support", "enemy"),
];

/// A unit placed on the board and the swarm currently drawing it.
#[derive(Debug)]
struct Unit {
    cell: usize,
    shape: ShapeClass,
    role: RoleColor,
    handle: Option<SwarmHandle>,
}

/// Main application state for the board preview.
///
/// ### Fields
/// - `scheduler` - Drives one swarm per visible unit.
/// - `units` - Board placements; `handle` is `None` while hidden.
/// - `visible` - Whether units are currently on screen.
/// - `show_outlines` - Draw each unit's silhouette behind its particles.
/// - `zoom` - Board-to-screen scale factor.
/// - `pan` - Screen-space pan offset in pixels.
/// - `hovered_cell` - Board cell under the pointer during the last frame.
pub struct Viewer {
    scheduler: SwarmScheduler,
    units: Vec<Unit>,
    visible: bool,
    show_outlines: bool,
    zoom: f32,
    pan: egui::Vec2,
    hovered_cell: Option<usize>,
}

impl Viewer {
    /// Creates the viewer and starts a swarm for every placed unit.
    ///
    /// ### Errors
    /// Fails if `cfg` is invalid or a tick loop cannot be spawned.
    pub fn new(cfg: SwarmConfig) -> swarm_core::Result<Self> {
        let scheduler = SwarmScheduler::new(cfg)?;
        let mut units = Vec::with_capacity(PLACEMENTS.len());
        for (cell, kind, side) in PLACEMENTS {
            units.push(Unit {
                cell,
                shape: kind.parse()?,
                role: side.parse()?,
                handle: None,
            });
        }

        let mut viewer = Self {
            scheduler,
            units,
            visible: false,
            show_outlines: true,
            zoom: 2.0,
            pan: egui::vec2(0.0, 0.0),
            hovered_cell: None,
        };
        viewer.show_units()?;
        Ok(viewer)
    }

    /// Starts a swarm for every unit that does not have one.
    fn show_units(&mut self) -> swarm_core::Result<()> {
        for unit in &mut self.units {
            if unit.handle.is_none() {
                unit.handle = Some(self.scheduler.new_swarm(unit.shape, unit.role)?);
            }
        }
        self.visible = true;
        Ok(())
    }

    /// Destroys every unit's swarm, as when the board leaves the screen.
    fn hide_units(&mut self) {
        for unit in &mut self.units {
            if let Some(handle) = unit.handle.take()
                && let Err(e) = self.scheduler.destroy_swarm(handle)
            {
                warn!("failed to destroy {handle}: {e}");
            }
        }
        self.visible = false;
    }

    /// Replaces every swarm with a freshly spawned one.
    fn respawn(&mut self) {
        self.hide_units();
        if let Err(e) = self.show_units() {
            warn!("respawn failed: {e}");
        }
    }

    /// Sum of ticks completed by all live swarms.
    fn total_ticks(&self) -> u64 {
        self.units
            .iter()
            .filter_map(|u| u.handle)
            .filter_map(|h| self.scheduler.tick_count(h).ok())
            .sum()
    }

    /// Top-left corner of a swarm's local square, in board units.
    fn local_origin(cell: usize) -> Vec2 {
        let col = (cell % BOARD_SIDE) as f32;
        let row = (cell / BOARD_SIDE) as f32;
        Vec2::new(col * CELL_SIZE + CELL_INSET, row * CELL_SIZE + CELL_INSET)
    }

    /// Converts a board-space position to screen-space.
    ///
    /// The board is centered in `rect`, scaled by `zoom` and offset by
    /// `pan`. Board y grows downward like screen y.
    fn board_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let half = BOARD_SIDE as f32 * CELL_SIZE * 0.5;
        let center = rect.center();
        egui::pos2(
            center.x + (p.x - half) * self.zoom + self.pan.x,
            center.y + (p.y - half) * self.zoom + self.pan.y,
        )
    }

    /// Inverse of [`Viewer::board_to_screen`].
    fn screen_to_board(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let half = BOARD_SIDE as f32 * CELL_SIZE * 0.5;
        let center = rect.center();
        Vec2::new(
            (p.x - center.x - self.pan.x) / self.zoom + half,
            (p.y - center.y - self.pan.y) / self.zoom + half,
        )
    }

    /// Board cell under a board-space position, if any.
    fn cell_at(p: Vec2) -> Option<usize> {
        let side = BOARD_SIDE as f32 * CELL_SIZE;
        if p.x < 0.0 || p.y < 0.0 || p.x >= side || p.y >= side {
            return None;
        }
        let col = (p.x / CELL_SIZE) as usize;
        let row = (p.y / CELL_SIZE) as usize;
        Some(row * BOARD_SIDE + col)
    }

    fn rgba(rgb: [u8; 3], alpha: f32) -> egui::Color32 {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        egui::Color32::from_rgba_unmultiplied(rgb[0], rgb[1], rgb[2], a)
    }

    /// Builds the top panel UI (visibility, respawn, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.visible { "⏸ Hide" } else { "▶ Show" })
                    .clicked()
                {
                    if self.visible {
                        self.hide_units();
                    } else if let Err(e) = self.show_units() {
                        warn!("failed to show units: {e}");
                    }
                }

                if ui.button("Respawn").clicked() {
                    self.respawn();
                }

                ui.checkbox(&mut self.show_outlines, "Outlines");

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.5..=8.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (live swarms, ticks, tick period).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!(
                    "tick = {} ms",
                    self.scheduler.config().tick_period_ms
                ));
                ui.separator();
                ui.label(format!("ticks = {}", self.total_ticks()));
                ui.label(format!("swarms = {}", self.scheduler.live_count()));
                if let Some(cell) = self.hovered_cell {
                    ui.separator();
                    ui.label(format!("cell = {cell}"));
                }
            });
        });
    }

    /// Draws one unit: silhouette outline, then its particles.
    fn paint_unit(&self, painter: &egui::Painter, rect: egui::Rect, unit: &Unit, particles: &[ParticleSample]) {
        let origin = Self::local_origin(unit.cell);

        if self.show_outlines {
            let [r, g, b, a] = unit.role.outline_rgba();
            let stroke = egui::Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(r, g, b, a));
            let points: Vec<egui::Pos2> = unit
                .shape
                .outline(48)
                .into_iter()
                .map(|p| self.board_to_screen(origin + p, rect))
                .collect();
            painter.add(egui::Shape::closed_line(points, stroke));
        }

        let fill = unit.role.fill_rgb();
        for p in particles {
            let center = self.board_to_screen(origin + p.pos, rect);
            let radius = PARTICLE_SIZE * 0.5 * p.scale * self.zoom;
            painter.circle_filled(center, radius, Self::rgba(fill, p.opacity));
        }
    }

    /// Builds the central panel where the board and swarms are drawn.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            if response.dragged() {
                self.pan += response.drag_delta();
            }

            self.hovered_cell = response
                .hover_pos()
                .and_then(|p| Self::cell_at(self.screen_to_board(p, rect)));

            // Board cells.
            let cell_fill = egui::Color32::from_rgb(0x1f, 0x29, 0x37);
            let cell_stroke = egui::Stroke::new(1.0, egui::Color32::from_rgb(0x37, 0x41, 0x51));
            for cell in 0..BOARD_SIDE * BOARD_SIDE {
                let top_left = Self::local_origin(cell) - Vec2::splat(CELL_INSET);
                let min = self.board_to_screen(top_left, rect);
                let max = self.board_to_screen(top_left + Vec2::splat(CELL_SIZE), rect);
                let cell_rect = egui::Rect::from_min_max(min, max);
                painter.rect_filled(cell_rect, 0.0, cell_fill);
                painter.rect_stroke(cell_rect, 0.0, cell_stroke, egui::StrokeKind::Inside);
            }

            // Swarms, each from one consistent snapshot.
            for unit in &self.units {
                let Some(handle) = unit.handle else {
                    continue;
                };
                match self.scheduler.read_particles(handle) {
                    Ok(particles) => self.paint_unit(&painter, rect, unit, &particles),
                    Err(e) => warn!("skipping unit in cell {}: {e}", unit.cell),
                }
            }

            // Swarms tick on their own threads; keep redrawing to show it.
            if self.visible {
                ctx.request_repaint();
            }
        });
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        info!("closing board with {} live swarms", self.scheduler.live_count());
        self.hide_units();
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_central_panel(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::new(0.0, 0.0), egui::vec2(800.0, 600.0))
    }

    fn fast_viewer() -> Viewer {
        Viewer::new(SwarmConfig {
            tick_period_ms: 5,
            ..SwarmConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn board_to_screen_and_back_is_roundtrip() {
        let mut viewer = fast_viewer();
        viewer.zoom = 3.0;
        viewer.pan = egui::vec2(-12.0, 9.5);
        let rect = test_rect();

        let eps = 1e-3;
        for p in [Vec2::ZERO, Vec2::new(120.0, 120.0), Vec2::new(239.0, 7.5)] {
            let back = viewer.screen_to_board(viewer.board_to_screen(p, rect), rect);
            assert!(
                (back - p).abs().max_element() < eps,
                "roundtrip mismatch: p={p:?}, back={back:?}"
            );
        }
    }

    #[test]
    fn board_center_maps_to_rect_center() {
        let viewer = fast_viewer();
        let rect = test_rect();
        let p = viewer.board_to_screen(Vec2::splat(120.0), rect);
        assert_eq!(p, rect.center());
    }

    #[test]
    fn local_square_is_centered_in_its_cell() {
        assert_eq!(Viewer::local_origin(0), Vec2::new(4.0, 4.0));
        assert_eq!(Viewer::local_origin(5), Vec2::new(204.0, 4.0));
        assert_eq!(Viewer::local_origin(10), Vec2::new(164.0, 44.0));
    }

    #[test]
    fn cell_lookup_covers_board_only() {
        assert_eq!(Viewer::cell_at(Vec2::new(1.0, 1.0)), Some(0));
        assert_eq!(Viewer::cell_at(Vec2::new(205.0, 45.0)), Some(11));
        assert_eq!(Viewer::cell_at(Vec2::new(-1.0, 10.0)), None);
        assert_eq!(Viewer::cell_at(Vec2::new(10.0, 240.0)), None);
    }

    #[test]
    fn new_viewer_shows_one_swarm_per_unit() {
        let viewer = fast_viewer();
        assert!(viewer.visible);
        assert_eq!(viewer.scheduler.live_count(), PLACEMENTS.len());
        assert!(viewer.units.iter().all(|u| u.handle.is_some()));

        let tanks: Vec<&Unit> = viewer
            .units
            .iter()
            .filter(|u| u.shape == ShapeClass::Square)
            .collect();
        assert_eq!(tanks.len(), 2);
        assert_ne!(tanks[0].role, tanks[1].role);
    }

    #[test]
    fn hide_destroys_every_swarm() {
        let mut viewer = fast_viewer();

        viewer.hide_units();

        assert!(!viewer.visible);
        assert_eq!(viewer.scheduler.live_count(), 0);
        assert!(viewer.units.iter().all(|u| u.handle.is_none()));
        assert_eq!(viewer.total_ticks(), 0);
    }

    #[test]
    fn respawn_replaces_handles() {
        let mut viewer = fast_viewer();
        let before: Vec<SwarmHandle> = viewer.units.iter().filter_map(|u| u.handle).collect();

        viewer.respawn();

        let after: Vec<SwarmHandle> = viewer.units.iter().filter_map(|u| u.handle).collect();
        assert_eq!(after.len(), before.len());
        assert!(after.iter().all(|h| !before.contains(h)));
        assert_eq!(viewer.scheduler.live_count(), PLACEMENTS.len());
    }

    #[test]
    fn opacity_maps_to_alpha() {
        let c = Viewer::rgba([10, 20, 30], 1.0);
        assert_eq!(c.a(), 255);
        let c = Viewer::rgba([10, 20, 30], 0.0);
        assert_eq!(c.a(), 0);
    }
}
