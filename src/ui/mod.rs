//! Desktop window built with eframe/egui.
//!
//! The window owns a [`Session`] and renders it every frame. Generation runs
//! on the tokio runtime entered by `main`; its events come back over an
//! unbounded channel that is drained at the start of each frame.

pub mod thumbnails;

use crate::generator::{EventSink, StoryGenerator};
use crate::models::{AddOutcome, GenerationEvent, MAX_IMAGES};
use crate::session::{Session, Warning};
use egui::{Color32, RichText, TextureHandle};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

const BACKGROUND: Color32 = Color32::from_rgb(10, 10, 10);
const CARD: Color32 = Color32::from_rgb(22, 22, 22);
const CARD_BORDER: Color32 = Color32::from_rgb(42, 42, 42);
const MUTED: Color32 = Color32::from_rgb(136, 136, 136);
const DANGER: Color32 = Color32::from_rgb(255, 107, 107);

/// Forwards worker events to the window and wakes it up.
struct RepaintingSink {
    tx: UnboundedSender<GenerationEvent>,
    ctx: egui::Context,
}

impl EventSink for RepaintingSink {
    fn emit(&self, event: GenerationEvent) {
        self.tx.emit(event);
        self.ctx.request_repaint();
    }
}

pub struct StoryApp {
    session: Session,
    generator: Option<Arc<StoryGenerator>>,
    thumbnails: Vec<Option<TextureHandle>>,
    events_tx: UnboundedSender<GenerationEvent>,
    events_rx: UnboundedReceiver<GenerationEvent>,
}

impl StoryApp {
    /// `generator` is `None` when no chat credential is configured.
    pub fn new(cc: &eframe::CreationContext<'_>, generator: Option<Arc<StoryGenerator>>) -> Self {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = BACKGROUND;
        cc.egui_ctx.set_visuals(visuals);

        let (events_tx, events_rx) = unbounded_channel();

        Self {
            session: Session::new(generator.is_some()),
            generator,
            thumbnails: vec![None; MAX_IMAGES],
            events_tx,
            events_rx,
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            if let Some(message) = self.session.apply(event) {
                show_dialog(rfd::MessageLevel::Error, "Error", &message);
            }
        }
    }

    fn load_images(&mut self, ctx: &egui::Context) {
        if let Err(warning) = self.session.check_can_add() {
            show_warning(warning);
            return;
        }

        let Some(files) = rfd::FileDialog::new()
            .set_title("Select Images")
            .add_filter("Images", &IMAGE_EXTENSIONS)
            .pick_files()
        else {
            return;
        };

        match self.session.add_images(files) {
            AddOutcome::Added(_) => self.refresh_thumbnails(ctx),
            AddOutcome::Full => show_warning(Warning::SelectionFull),
            AddOutcome::Nothing => {}
        }
    }

    fn clear_all(&mut self, ctx: &egui::Context) {
        self.session.clear_all();
        self.refresh_thumbnails(ctx);
    }

    fn start_generation(&mut self, ctx: &egui::Context) {
        let job = match self.session.start_generation() {
            Ok(job) => job,
            Err(warning) => {
                show_warning(warning);
                return;
            }
        };

        let Some(generator) = &self.generator else {
            return;
        };

        tracing::info!("Starting generation {} with {} image(s)", job.id, job.images.len());
        let sink = Arc::new(RepaintingSink {
            tx: self.events_tx.clone(),
            ctx: ctx.clone(),
        });
        generator.spawn(job, sink);
    }

    fn refresh_thumbnails(&mut self, ctx: &egui::Context) {
        let images = self.session.images();
        self.thumbnails = (0..MAX_IMAGES)
            .map(|slot| images.get(slot).and_then(|path| load_texture(ctx, slot, path)))
            .collect();
    }

    fn card<R>(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui) -> R) -> R {
        egui::Frame::new()
            .fill(CARD)
            .stroke(egui::Stroke::new(1.0, CARD_BORDER))
            .corner_radius(egui::CornerRadius::same(20))
            .inner_margin(egui::Margin::same(25))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                add_contents(ui)
            })
            .inner
    }

    fn header(ui: &mut egui::Ui) {
        Self::card(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new("Story Creator").size(32.0).strong().color(Color32::WHITE));
                ui.add_space(8.0);
                ui.label(
                    RichText::new("Upload your images and let AI create your story")
                        .size(15.0)
                        .color(MUTED),
                );
            });
        });
    }

    fn image_slots(&self, ui: &mut egui::Ui) {
        Self::card(ui, |ui| {
            ui.columns(MAX_IMAGES, |columns| {
                for (slot, column) in columns.iter_mut().enumerate() {
                    let loaded = self.session.images().get(slot).is_some();
                    let border = if loaded {
                        Color32::from_rgb(74, 74, 74)
                    } else {
                        Color32::from_rgb(58, 58, 58)
                    };

                    egui::Frame::new()
                        .fill(Color32::from_rgb(26, 26, 26))
                        .stroke(egui::Stroke::new(2.0, border))
                        .corner_radius(egui::CornerRadius::same(15))
                        .inner_margin(egui::Margin::same(10))
                        .show(column, |ui| {
                            ui.set_min_height(220.0);
                            ui.centered_and_justified(|ui| match &self.thumbnails[slot] {
                                Some(texture) => {
                                    ui.add(egui::Image::from_texture(texture).shrink_to_fit());
                                }
                                None => {
                                    ui.label(
                                        RichText::new(format!("Image {}", slot + 1))
                                            .size(14.0)
                                            .color(Color32::from_rgb(85, 85, 85)),
                                    );
                                }
                            });
                        });
                }
            });
        });
    }

    fn story_panel(&self, ui: &mut egui::Ui) {
        Self::card(ui, |ui| {
            ui.label(RichText::new("Your Story").size(18.0).strong().color(Color32::WHITE));
            ui.separator();
            ui.add_space(10.0);
            ui.add(
                egui::Label::new(
                    RichText::new(self.session.display())
                        .size(15.0)
                        .color(Color32::from_rgb(204, 204, 204)),
                )
                .wrap()
                .selectable(true),
            );
        });
    }
}

impl eframe::App for StoryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.spacing_mut().item_spacing.y = 25.0;
                    ui.add_space(15.0);

                    Self::header(ui);
                    self.image_slots(ui);

                    ui.horizontal(|ui| {
                        let add = egui::Button::new(RichText::new("Add Images").size(14.0).strong())
                            .min_size(egui::vec2(160.0, 44.0));
                        if ui.add(add).clicked() {
                            self.load_images(ctx);
                        }

                        let clear = egui::Button::new(
                            RichText::new("Clear All").size(14.0).strong().color(DANGER),
                        )
                        .min_size(egui::vec2(160.0, 44.0));
                        if ui.add(clear).clicked() {
                            self.clear_all(ctx);
                        }
                    });

                    Self::card(ui, |ui| {
                        ui.label(
                            RichText::new("Story Theme (Optional)")
                                .size(15.0)
                                .strong()
                                .color(Color32::from_rgb(204, 204, 204)),
                        );
                        ui.add_space(10.0);
                        ui.add(
                            egui::TextEdit::singleline(&mut self.session.theme)
                                .hint_text(
                                    "e.g., An adventure, a romantic moment, a funny situation...",
                                )
                                .desired_width(f32::INFINITY)
                                .margin(egui::Margin::same(12)),
                        );
                    });

                    let generate = ui.add_enabled(
                        self.session.can_generate(),
                        egui::Button::new(RichText::new("Generate Story").size(16.0).strong())
                            .min_size(egui::vec2(ui.available_width(), 52.0)),
                    );
                    if generate.clicked() {
                        self.start_generation(ctx);
                    }

                    self.story_panel(ui);
                });
        });
    }
}

fn load_texture(ctx: &egui::Context, slot: usize, path: &Path) -> Option<TextureHandle> {
    match thumbnails::load_thumbnail(path) {
        Ok(image) => Some(ctx.load_texture(
            format!("slot-{}-{}", slot, path.display()),
            image,
            egui::TextureOptions::LINEAR,
        )),
        Err(e) => {
            tracing::warn!("Could not preview {}: {}", path.display(), e);
            None
        }
    }
}

fn show_warning(warning: Warning) {
    show_dialog(rfd::MessageLevel::Warning, warning.title(), &warning.to_string());
}

fn show_dialog(level: rfd::MessageLevel, title: &str, description: &str) {
    rfd::MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(description)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

/// Open the window and block until it is closed.
pub fn run(generator: Option<Arc<StoryGenerator>>) -> anyhow::Result<()> {
    let mut viewport = egui::ViewportBuilder::default()
        .with_title("Story Creator")
        .with_inner_size([1000.0, 700.0]);
    if let Some(icon) = thumbnails::load_icon(Path::new(".")) {
        viewport = viewport.with_icon(icon);
    }

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Story Creator",
        options,
        Box::new(move |cc| Ok(Box::new(StoryApp::new(cc, generator)))),
    )
    .map_err(|e| anyhow::anyhow!("Window error: {}", e))
}
