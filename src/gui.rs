//! Native GUI viewer using egui
//!
//! Animated epicycle chains in a 2D plot, with live pipeline controls

use eframe::egui;
use tracing::{info, warn};

use crate::config::{Config, Scene, SceneData, SceneSource};
use crate::fourier::epicycle::{chain_pose, circle_outline, Animator};
use crate::fourier::spectrum::residual_energy;
use crate::fourier::Point;
use crate::render::plot_extent;

/// Circle outlines match the classic gray at half alpha.
const CIRCLE_COLOR: egui::Color32 = egui::Color32::from_rgba_premultiplied(102, 102, 102, 128);
const ARROW_COLOR: egui::Color32 = egui::Color32::from_rgb(70, 130, 180);
const TRACE_COLOR: egui::Color32 = egui::Color32::from_rgb(214, 39, 40);
const POLYGON_COLOR: egui::Color32 = egui::Color32::GRAY;

const OUTLINE_SEGMENTS: usize = 100;

/// Run the native GUI viewer
pub fn run_viewer(config: Config, initial_scene: Option<String>) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 800.0])
            .with_title("Epicycler"),
        ..Default::default()
    };

    eframe::run_native(
        "Epicycler",
        options,
        Box::new(|cc| Ok(Box::new(EpicycleApp::new(cc, config, initial_scene)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}

struct EpicycleApp {
    config: Config,
    /// Working copy of the selected scene; sliders edit it in place.
    scene: Option<Scene>,
    data: Option<SceneData>,
    animator: Option<Animator>,
    residual: Option<f64>,
    scene_error: Option<String>,
    // Playback state
    playing: bool,
    steps_per_tick: usize,
    // UI state
    show_grid: bool,
    show_circles: bool,
    show_polygon: bool,
}

impl EpicycleApp {
    fn new(cc: &eframe::CreationContext<'_>, config: Config, initial_scene: Option<String>) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let first_id = initial_scene.or_else(|| config.scenes.first().map(|s| s.id.clone()));

        let mut app = Self {
            config,
            scene: None,
            data: None,
            animator: None,
            residual: None,
            scene_error: None,
            playing: true,
            steps_per_tick: 2,
            show_grid: false,
            show_circles: true,
            show_polygon: true,
        };

        if let Some(id) = first_id {
            app.load_scene(&id);
        } else {
            app.scene_error = Some("No scenes configured".to_string());
        }

        app
    }

    fn load_scene(&mut self, id: &str) {
        let scene = match self.config.get_scene(id) {
            Some(s) => s.clone(),
            None => {
                warn!("Scene not found for id: {}", id);
                return;
            }
        };

        info!("Loading scene: {}", id);
        self.scene = Some(scene);
        self.realize_scene();
        self.playing = true;
    }

    /// Run the pipeline for the working scene and restart the animation.
    fn realize_scene(&mut self) {
        let Some(scene) = &mut self.scene else {
            return;
        };

        match scene.realize() {
            Ok(data) => {
                // Pin the drawn seed so slider changes rework the same
                // polygon instead of drawing a new one.
                scene.seed = Some(data.seed);
                self.residual = if data.samples.is_empty() {
                    None
                } else {
                    Some(residual_energy(&data.samples, &data.chain))
                };
                self.animator = Some(Animator::new(data.chain.clone()));
                self.data = Some(data);
                self.scene_error = None;
            }
            Err(e) => {
                warn!("Scene setup failed: {}", e);
                self.scene_error = Some(e.to_string());
                self.data = None;
                self.animator = None;
                self.residual = None;
            }
        }
    }

    /// New random draw for scenes that have one.
    fn regenerate(&mut self) {
        if let Some(scene) = &mut self.scene {
            scene.seed = None;
            self.realize_scene();
            self.playing = true;
        }
    }

    fn restart_animation(&mut self) {
        if let Some(animator) = &mut self.animator {
            animator.reset();
        }
        self.playing = true;
    }
}

impl eframe::App for EpicycleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());

        // Keep repainting so the animation runs without input events
        ctx.request_repaint();

        // Advance the animation
        if self.playing {
            if let Some(animator) = &mut self.animator {
                for _ in 0..self.steps_per_tick {
                    animator.advance();
                    if animator.is_closed() {
                        // One full loop is traced; hold the finished curve.
                        self.playing = false;
                        break;
                    }
                }
            }
        }

        // Left panel - scene selection and pipeline controls
        egui::SidePanel::left("scenes_panel").min_width(250.0).show(ctx, |ui| {
            ui.heading("Scenes");
            ui.separator();

            let selected_id = self.scene.as_ref().map(|s| s.id.clone());
            let mut to_load: Option<String> = None;
            for scene in &self.config.scenes {
                let is_selected = selected_id.as_deref() == Some(scene.id.as_str());
                if ui.selectable_label(is_selected, &scene.name).clicked() && !is_selected {
                    to_load = Some(scene.id.clone());
                }
            }
            if let Some(id) = to_load {
                self.load_scene(&id);
            }

            ui.separator();

            // Pipeline sliders for polygon-backed scenes
            let mut changed = false;
            let mut has_random = false;
            if let Some(scene) = &mut self.scene {
                match &mut scene.source {
                    SceneSource::RandomPolygon {
                        points,
                        bound,
                        samples,
                        components,
                    } => {
                        has_random = true;
                        changed |= ui
                            .add(egui::Slider::new(points, 3..=64).text("Points"))
                            .changed();
                        changed |= ui
                            .add(egui::Slider::new(bound, 1..=100).text("Bound"))
                            .changed();
                        changed |= ui
                            .add(egui::Slider::new(samples, 8..=1024).text("Samples"))
                            .changed();
                        // The circle count can never exceed the sample count.
                        if *components > *samples {
                            *components = *samples;
                            changed = true;
                        }
                        changed |= ui
                            .add(egui::Slider::new(components, 0..=*samples).text("Circles"))
                            .changed();
                    }
                    SceneSource::Polygon {
                        samples, components, ..
                    } => {
                        changed |= ui
                            .add(egui::Slider::new(samples, 8..=1024).text("Samples"))
                            .changed();
                        if *components > *samples {
                            *components = *samples;
                            changed = true;
                        }
                        changed |= ui
                            .add(egui::Slider::new(components, 0..=*samples).text("Circles"))
                            .changed();
                    }
                    SceneSource::Chain { .. } => {
                        ui.label("Hand-built chain");
                    }
                    SceneSource::RandomChain { count } => {
                        has_random = true;
                        changed |= ui
                            .add(egui::Slider::new(count, 1..=30).text("Circles"))
                            .changed();
                    }
                }
            }
            if changed {
                self.realize_scene();
                self.playing = true;
            }

            if has_random {
                ui.horizontal(|ui| {
                    if ui.button("Regenerate").clicked() {
                        self.regenerate();
                    }
                    if let Some(data) = &self.data {
                        ui.label(format!("seed {}", data.seed));
                    }
                });
            }

            ui.separator();
            ui.checkbox(&mut self.show_polygon, "Show polygon");
            ui.checkbox(&mut self.show_circles, "Show circles");
            ui.checkbox(&mut self.show_grid, "Grid");

            if let Some(residual) = self.residual {
                ui.separator();
                ui.label(format!("Residual energy: {:.3e}", residual));
            }

            if let Some(error) = &self.scene_error {
                ui.separator();
                ui.colored_label(egui::Color32::RED, error);
            }
        });

        // Bottom panel - playback controls
        egui::TopBottomPanel::bottom("controls_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let label = if self.playing { "Pause" } else { "Play" };
                if ui.button(label).clicked() {
                    self.playing = !self.playing;
                }
                if ui.button("Restart").clicked() {
                    self.restart_animation();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.steps_per_tick, 1..=50).text("Speed"));

                ui.separator();
                if let Some(animator) = &self.animator {
                    ui.label(format!("frame {}", animator.frame()));
                    if animator.is_closed() {
                        ui.colored_label(egui::Color32::LIGHT_GREEN, "loop closed");
                    }
                }
            });
        });

        // Central panel - the animated chain
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(data) = &self.data else {
                ui.label("Nothing to draw");
                return;
            };
            let Some(animator) = &self.animator else {
                return;
            };

            // Pose at the last recorded frame, so the arrows end exactly
            // on the trace's newest point.
            let t = animator.frame().saturating_sub(1) as f64;
            let pose = chain_pose(animator.chain(), t);

            let extent = plot_extent(&data.chain);
            let plot = egui_plot::Plot::new("epicycle_plot")
                .data_aspect(1.0)
                .allow_drag(true)
                .allow_zoom(true)
                .allow_scroll(true)
                .show_axes(false)
                .show_grid(self.show_grid)
                .include_x(-extent)
                .include_x(extent)
                .include_y(-extent)
                .include_y(extent);

            plot.show(ui, |plot_ui| {
                if self.show_polygon {
                    if let Some(polygon) = &data.polygon {
                        plot_ui.line(
                            plot_line(&polygon.closed_points(), POLYGON_COLOR, 1.0)
                                .name("polygon"),
                        );
                    }
                }

                if self.show_circles {
                    for circle in &pose.circles {
                        let outline = circle_outline(circle.center, circle.radius, OUTLINE_SEGMENTS);
                        plot_ui.line(plot_line(&outline, CIRCLE_COLOR, 2.0));
                    }
                    for arrow in &pose.arrows {
                        plot_ui.line(plot_line(&[arrow.start, arrow.end], ARROW_COLOR, 2.0));
                    }
                }

                if animator.trace().len() >= 2 {
                    plot_ui.line(plot_line(animator.trace(), TRACE_COLOR, 1.5).name("trace"));
                }
            });
        });
    }
}

fn plot_line(points: &[Point], color: egui::Color32, width: f32) -> egui_plot::Line {
    egui_plot::Line::new(egui_plot::PlotPoints::from_iter(
        points.iter().map(|p| [p.re, p.im]),
    ))
    .color(color)
    .width(width)
}
