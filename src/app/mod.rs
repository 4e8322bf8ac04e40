use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Rect};

use crate::kanji::{CharacterData, DualGraph, build_dual_graph};

mod flat;
mod perspective;
mod physics;
mod renderer;
mod ui;
mod view_state;

use flat::FlatRenderer;
use perspective::PerspectiveRenderer;
use renderer::{FrameInput, GraphRenderer};
use view_state::{RenderStyle, ViewState};

/// Seconds a new panel size must hold before the renderer sees it.
const RESIZE_DEBOUNCE_SECS: f64 = 0.12;
/// Delay before the automatic fit after a renderer mounts on a narrow viewport.
const AUTO_FIT_DELAY_SECS: f64 = 0.4;
const NARROW_VIEWPORT_PX: f32 = 768.0;

pub struct KanjiAtlasApp {
    data_dir: PathBuf,
    initial_focus: String,
    state: AppState,
    reload_rx: Option<Receiver<Result<CharacterData, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<CharacterData, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct SearchCache {
    query: String,
    /// Matching (character id, row label) pairs, best score first.
    rows: Vec<(String, String)>,
}

struct MountedRenderer {
    style: RenderStyle,
    renderer: Box<dyn GraphRenderer>,
    mounted_at: f64,
    auto_fit_pending: bool,
}

struct ViewModel {
    data: CharacterData,
    focus_id: String,
    dual: DualGraph,
    view: ViewState,
    mounted: Option<MountedRenderer>,
    /// Bumped whenever the node/link set handed to the renderer changes
    /// (focus rebuild or variant toggle), so the layout re-syncs exactly once.
    graph_revision: u64,
    shown_reverse_links: bool,
    /// Monotonic counter; any change tells the renderer to refit the view.
    focus_trigger: u64,
    committed_bounds: Option<Rect>,
    pending_bounds: Option<(Rect, f64)>,
    search: String,
    search_cache: Option<SearchCache>,
    pending_navigation: Option<String>,
}

impl KanjiAtlasApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, data_dir: PathBuf, initial_focus: String) -> Self {
        let state = Self::start_load(data_dir.clone());
        Self {
            data_dir,
            initial_focus,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(data_dir: PathBuf) -> Receiver<Result<CharacterData, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result =
                crate::kanji::load_character_data(&data_dir).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(data_dir: PathBuf) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(data_dir),
        }
    }
}

impl eframe::App for KanjiAtlasApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(data) => AppState::Ready(Box::new(ViewModel::new(
                            data,
                            self.initial_focus.clone(),
                        ))),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading composition dictionary...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load character data");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.data_dir.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.data_dir.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(match result {
                                Ok(data) => {
                                    let focus = model.focus_id.clone();
                                    AppState::Ready(Box::new(ViewModel::new(data, focus)))
                                }
                                Err(error) => AppState::Error(error),
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}

impl ViewModel {
    fn new(data: CharacterData, focus_id: String) -> Self {
        let dual = build_dual_graph(&data.index, &data.tiers, &focus_id);
        let view = ViewState::default();
        let shown_reverse_links = view.show_reverse_links();
        Self {
            data,
            focus_id,
            dual,
            view,
            mounted: None,
            graph_revision: 0,
            shown_reverse_links,
            focus_trigger: 0,
            committed_bounds: None,
            pending_bounds: None,
            search: String::new(),
            search_cache: None,
            pending_navigation: None,
        }
    }

    fn show(&mut self, ctx: &Context, reload_requested: &mut bool, is_loading: bool) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("kanji-atlas");
                    ui.separator();
                    ui.label(format!("focus: {}", self.focus_id));
                    ui.label(format!(
                        "dictionary: {} characters",
                        self.data.index.character_count()
                    ));
                    let variant = self.dual.variant(self.view.show_reverse_links());
                    ui.label(format!(
                        "graph: {} nodes / {} links",
                        variant.node_count(),
                        variant.link_count()
                    ));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload data"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading composition dictionary...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });

        if let Some(id) = self.pending_navigation.take() {
            self.navigate_to(id);
        }
    }

    fn draw_graph(&mut self, ui: &mut egui::Ui) {
        let now = ui.input(|input| input.time);
        let rect = self.committed_graph_rect(ui.max_rect(), now);
        if rect.width() < 1.0 || rect.height() < 1.0 {
            ui.label("Viewport too small to render the graph.");
            return;
        }

        if self.shown_reverse_links != self.view.show_reverse_links() {
            self.shown_reverse_links = self.view.show_reverse_links();
            self.graph_revision += 1;
        }

        let style = self.view.render_style();
        let needs_mount = self
            .mounted
            .as_ref()
            .is_none_or(|mounted| mounted.style != style);
        if needs_mount {
            // Style switches never keep the old projection warm; the new
            // renderer lays out from scratch.
            let renderer: Box<dyn GraphRenderer> = match style {
                RenderStyle::Flat => Box::new(FlatRenderer::new()),
                RenderStyle::Perspective => Box::new(PerspectiveRenderer::new()),
            };
            self.mounted = Some(MountedRenderer {
                style,
                renderer,
                mounted_at: now,
                auto_fit_pending: true,
            });
        }

        let Some(mounted) = self.mounted.as_mut() else {
            return;
        };

        if mounted.auto_fit_pending && now - mounted.mounted_at > AUTO_FIT_DELAY_SECS {
            mounted.auto_fit_pending = false;
            if rect.width() < NARROW_VIEWPORT_PX {
                self.focus_trigger += 1;
            }
        }

        let dt = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);
        let frame = FrameInput {
            focus_id: &self.focus_id,
            graph_revision: self.graph_revision,
            focus_trigger: self.focus_trigger,
            show_flow_particles: self.view.show_flow_particles(),
            auto_rotate: self.view.auto_rotate(),
            dt,
        };
        let variant = self.dual.variant(self.shown_reverse_links);

        let output = mounted.renderer.show(ui, rect, variant, &frame);

        if output.keep_animating {
            ui.ctx().request_repaint();
        }
        if let Some(id) = output.navigate_to {
            self.pending_navigation = Some(id);
        }
    }

    /// Debounced viewport measurement: a new size must stay stable briefly
    /// before the renderer re-projects to it.
    fn committed_graph_rect(&mut self, available: Rect, now: f64) -> Rect {
        let Some(committed) = self.committed_bounds else {
            self.committed_bounds = Some(available);
            return available;
        };

        let unchanged = (committed.min - available.min).length() < 1.0
            && (committed.max - available.max).length() < 1.0;
        if unchanged {
            self.pending_bounds = None;
            return committed;
        }

        match self.pending_bounds {
            Some((pending, since))
                if (pending.min - available.min).length() < 1.0
                    && (pending.max - available.max).length() < 1.0 =>
            {
                if now - since >= RESIZE_DEBOUNCE_SECS {
                    self.committed_bounds = Some(available);
                    self.pending_bounds = None;
                    return available;
                }
            }
            _ => {
                self.pending_bounds = Some((available, now));
            }
        }

        committed
    }

    /// The only coupling to navigation: a node activation (graph click,
    /// search result, details row) lands here. Rebuilds the dual graph once
    /// and remounts the renderer so the new focus lays out fresh.
    fn navigate_to(&mut self, id: String) {
        if id == self.focus_id {
            return;
        }

        self.focus_id = id;
        self.dual = build_dual_graph(&self.data.index, &self.data.tiers, &self.focus_id);
        self.graph_revision += 1;
        self.focus_trigger += 1;
        self.mounted = None;
    }

    fn request_fit(&mut self) {
        self.focus_trigger += 1;
    }
}
