//! Movie Mingle - Rust Edition
//! Desktop movie discovery client for TMDB with persistent favourites

// Hide console window on Windows release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// Use mimalloc for faster memory allocation (Linux, macOS)
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use tracing::Level;

mod api;
mod cancel;
mod config;
mod favourites;
mod models;
mod state;
mod view;

use api::TmdbClient;
use cancel::CancelToken;
use config::AppConfig;
use favourites::{FavouritesStore, FileStorage};
use models::*;
use state::{add_favourite_notice, DetailView, ShellState};
use view::{CardContext, UiAction};

/// Env var holding tracing directives; RUST_LOG is the fallback
const LOG_ENV: &str = "MOVIE_MINGLE_LOG";
const CONSOLE_LOG_LIMIT: usize = 500;

/// Install the stderr tracing subscriber
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn,movie_mingle=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Application icon: blue rounded square with a film strip and a play button
fn load_icon() -> egui::IconData {
    let size: usize = 64;
    let mut rgba = vec![0u8; size * size * 4];

    for y in 0..size {
        for x in 0..size {
            let idx = (y * size + x) * 4;
            let nx = x as f32 / size as f32;
            let ny = y as f32 / size as f32;

            let corner_radius = 0.125;
            let in_rounded_rect = {
                let dx = if nx < corner_radius { corner_radius - nx }
                         else if nx > 1.0 - corner_radius { nx - (1.0 - corner_radius) }
                         else { 0.0 };
                let dy = if ny < corner_radius { corner_radius - ny }
                         else if ny > 1.0 - corner_radius { ny - (1.0 - corner_radius) }
                         else { 0.0 };
                dx * dx + dy * dy <= corner_radius * corner_radius
            };
            if !in_rounded_rect {
                continue;
            }

            // Blue gradient (#3b82f6 to #1d4ed8)
            let t = nx * 0.5 + ny * 0.5;
            let bg = [
                (59.0 + (29.0 - 59.0) * t) as u8,
                (130.0 + (78.0 - 130.0) * t) as u8,
                (246.0 + (216.0 - 246.0) * t) as u8,
            ];

            // Sprocket holes along the top and bottom edges
            let in_strip = ny < 0.2 || ny > 0.8;
            let in_hole = in_strip
                && (nx * 8.0).fract() > 0.3
                && (nx * 8.0).fract() < 0.7
                && ((0.06..0.14).contains(&ny) || (0.86..0.94).contains(&ny));

            // Play triangle in the middle
            let px = nx - 0.38;
            let py = ny - 0.5;
            let in_play = (0.0..=0.3).contains(&px) && py.abs() <= (0.3 - px) * 0.6;

            let color = if in_hole || in_play {
                [255, 255, 255]
            } else if in_strip {
                [17, 24, 39]
            } else {
                bg
            };
            rgba[idx..idx + 3].copy_from_slice(&color);
            rgba[idx + 3] = 255;
        }
    }

    egui::IconData {
        rgba,
        width: size as u32,
        height: size as u32,
    }
}

/// Background task messages
enum TaskResult {
    Catalog {
        section: Section,
        token: CancelToken,
        outcome: Result<Vec<MovieDetail>, String>,
    },
    Search {
        query: String,
        token: CancelToken,
        outcome: Result<Vec<MovieDetail>, String>,
    },
}

fn main() -> Result<(), eframe::Error> {
    init_tracing();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1250.0, 800.0])
            .with_min_inner_size([720.0, 480.0])
            .with_icon(load_icon()),
        vsync: true,
        ..Default::default()
    };

    eframe::run_native(
        "Movie Mingle",
        options,
        Box::new(|cc| {
            // Posters are loaded straight from their URIs
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(MovieApp::new(cc)))
        }),
    )
}

struct MovieApp {
    config: AppConfig,
    client: TmdbClient,
    state: ShellState,
    favourites: FavouritesStore,

    // Background task channel
    task_receiver: Receiver<TaskResult>,
    task_sender: Sender<TaskResult>,
    egui_ctx: egui::Context,

    pending_jump: Option<Anchor>,
    show_settings: bool,
    api_key_input: String,
    language_input: String,

    // Console log
    console_log: Vec<String>,
}

impl MovieApp {
    fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = AppConfig::load();
        let client = TmdbClient::from_config(&config);
        let storage_dir = AppConfig::config_dir();
        let favourites = FavouritesStore::open(Box::new(FileStorage::new(&storage_dir)));
        let (task_sender, task_receiver) = channel();

        cc.egui_ctx.set_visuals(if config.dark_mode { egui::Visuals::dark() } else { egui::Visuals::light() });

        let mut app = Self {
            api_key_input: config.api_key.clone(),
            language_input: config.language.clone(),
            config,
            client,
            state: ShellState::new(),
            favourites,
            task_receiver,
            task_sender,
            egui_ctx: cc.egui_ctx.clone(),
            pending_jump: None,
            show_settings: false,
            console_log: Vec::new(),
        };

        app.log(Level::INFO, "Movie Mingle started");
        app.log(Level::INFO, &format!("Favourites stored in {}", storage_dir.display()));
        if !app.config.has_api_key() {
            app.log(Level::WARN, &format!("No TMDB API key configured; set {} or add it in Settings", config::API_KEY_ENV));
        }
        app.surface_storage_warning();
        app.start_catalog_fetches();
        app
    }

    fn log(&mut self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!("{}", message),
            Level::WARN => tracing::warn!("{}", message),
            Level::INFO => tracing::info!("{}", message),
            _ => tracing::debug!("{}", message),
        }

        let timestamp = chrono::Local::now().format("%H:%M:%S");
        self.console_log.push(format!("[{}] [{}] {}", timestamp, level, message));
        if self.console_log.len() > CONSOLE_LOG_LIMIT {
            self.console_log.remove(0);
        }
    }

    /// The three catalog sections are fetched once, at startup
    fn start_catalog_fetches(&mut self) {
        for section in Section::ALL {
            let token = self.state.catalog_mut(section).begin();
            let client = self.client.clone();
            let sender = self.task_sender.clone();
            let repaint = self.egui_ctx.clone();

            self.log(Level::INFO, &format!("Fetching {}", section.noun()));
            thread::spawn(move || {
                let outcome = client.fetch_section(section).map_err(|e| e.to_string());
                if token.is_cancelled() {
                    tracing::debug!(?section, "dropping cancelled catalog response");
                    return;
                }
                let _ = sender.send(TaskResult::Catalog { section, token, outcome });
                repaint.request_repaint();
            });
        }
    }

    /// Called after every edit of the search box
    fn on_search_changed(&mut self) {
        let Some(request) = self.state.search.text_changed() else {
            return;
        };

        let client = self.client.clone();
        let sender = self.task_sender.clone();
        let repaint = self.egui_ctx.clone();

        tracing::debug!(query = %request.query, "starting search");
        thread::spawn(move || {
            let outcome = client.search_by_title(&request.query).map_err(|e| e.to_string());
            if request.token.is_cancelled() {
                tracing::debug!(query = %request.query, "dropping superseded search response");
                return;
            }
            let _ = sender.send(TaskResult::Search {
                query: request.query,
                token: request.token,
                outcome,
            });
            repaint.request_repaint();
        });
    }

    /// Drain finished fetches (non-blocking)
    fn process_task_results(&mut self) {
        while let Ok(result) = self.task_receiver.try_recv() {
            match result {
                TaskResult::Catalog { section, token, outcome } => {
                    let (level, summary) = match &outcome {
                        Ok(movies) => (Level::INFO, format!("Loaded {} {}", movies.len(), section.noun())),
                        Err(e) => (Level::ERROR, format!("Failed to fetch {}: {}", section.noun(), e)),
                    };
                    if self.state.catalog_mut(section).apply(&token, outcome) {
                        self.log(level, &summary);
                    }
                }
                TaskResult::Search { query, token, outcome } => {
                    let (level, summary) = match &outcome {
                        Ok(movies) => (Level::INFO, format!("Search '{}' returned {} movies", query, movies.len())),
                        Err(e) => (Level::ERROR, format!("Search '{}' failed: {}", query, e)),
                    };
                    if self.state.search.apply(&token, outcome) {
                        self.log(level, &summary);
                    } else {
                        tracing::debug!(%query, "discarded stale search response");
                    }
                }
            }
        }
    }

    fn apply_action(&mut self, action: UiAction) {
        match action {
            UiAction::AddFavourite(movie) => {
                let title = movie.title.clone();
                let added = self.favourites.add(movie);
                self.state.set_status(add_favourite_notice(added));
                if added {
                    self.log(Level::INFO, &format!("Added '{}' to favourites", title));
                }
            }
            UiAction::RemoveFavourite(id) => {
                if let Some(movie) = self.favourites.remove(id) {
                    self.state.set_status(format!("Removed '{}' from favourites.", movie.title));
                    self.log(Level::INFO, &format!("Removed '{}' from favourites", movie.title));
                }
            }
            UiAction::OpenDetail(movie) => self.state.open_detail(movie),
            UiAction::CloseDetail => self.state.close_detail(),
            UiAction::JumpTo(anchor) => self.pending_jump = Some(anchor),
        }
    }

    /// Storage trouble is reported once, then favourites silently stay in memory
    fn surface_storage_warning(&mut self) {
        if let Some(warning) = self.favourites.take_storage_warning() {
            self.log(Level::WARN, &warning);
            self.state.set_status(warning);
        }
    }

    fn show_top_bar(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        ui.add_space(5.0);
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Movie").strong().size(22.0));
            ui.label(egui::RichText::new("Mingle").strong().size(22.0).color(egui::Color32::from_rgb(59, 130, 246)));
            ui.separator();

            for anchor in Anchor::ALL {
                if ui.link(anchor.label()).clicked() {
                    actions.push(UiAction::JumpTo(anchor));
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("⚙ Settings").clicked() {
                    self.show_settings = !self.show_settings;
                }
                let console_label = if self.config.show_console { "Hide Console" } else { "Console" };
                if ui.button(console_label).clicked() {
                    self.config.show_console = !self.config.show_console;
                    self.config.save();
                }

                let search = ui.add(
                    egui::TextEdit::singleline(self.state.search.text_mut())
                        .hint_text("Search for Movies...")
                        .desired_width(260.0),
                );
                if search.changed() {
                    self.on_search_changed();
                }
                ui.label("🔍");
            });
        });
        ui.add_space(5.0);
    }

    fn show_console(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Console Log");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("🗑 Clear").clicked() {
                    self.console_log.clear();
                }
            });
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in &self.console_log {
                    ui.label(egui::RichText::new(line).monospace().color(view::console_line_color(line)));
                }
            });
    }

    fn show_settings_window(&mut self, ctx: &egui::Context) {
        let mut open = self.show_settings;
        let mut save = false;

        egui::Window::new("Settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                egui::Grid::new("settings_grid")
                    .num_columns(2)
                    .spacing([20.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("TMDB API key:");
                        ui.add(egui::TextEdit::singleline(&mut self.api_key_input).password(true).desired_width(260.0));
                        ui.end_row();

                        ui.label("Language:");
                        ui.add(egui::TextEdit::singleline(&mut self.language_input).desired_width(120.0));
                        ui.end_row();

                        ui.label("Theme:");
                        if ui.checkbox(&mut self.config.dark_mode, "Dark mode").changed() {
                            save = true;
                        }
                        ui.end_row();

                        ui.label("Favourites:");
                        if self.favourites.is_persistent() {
                            ui.label(format!("{} saved", self.favourites.len()));
                        } else {
                            ui.label(egui::RichText::new(format!("{} (not saved this session)", self.favourites.len())).color(egui::Color32::YELLOW));
                        }
                        ui.end_row();
                    });

                ui.separator();
                ui.label(egui::RichText::new("API key and language changes apply on next start.").weak());
                if ui.button("💾 Save").clicked() {
                    self.config.api_key = self.api_key_input.trim().to_string();
                    self.config.language = self.language_input.trim().to_string();
                    save = true;
                }
            });

        if save {
            self.config.save();
            self.log(Level::INFO, "Settings saved");
        }
        self.show_settings = open;
    }
}

impl eframe::App for MovieApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) {
            self.state.cancel_all();
            self.config.save();
        }

        self.process_task_results();

        ctx.set_visuals(if self.config.dark_mode { egui::Visuals::dark() } else { egui::Visuals::light() });

        let mut actions: Vec<UiAction> = Vec::new();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            self.show_top_bar(ui, &mut actions);
        });

        // Bottom panel - Status
        egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.state.search.state().is_loading() {
                    ui.spinner();
                }
                ui.label(self.state.status_message());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("★ {}", self.favourites.len()));
                });
            });
        });

        if self.config.show_console {
            egui::TopBottomPanel::bottom("console_panel")
                .resizable(true)
                .default_height(160.0)
                .show(ctx, |ui| self.show_console(ui));
        }

        let jump = self.pending_jump.take();
        egui::CentralPanel::default().show(ctx, |ui| {
            let cards = CardContext {
                image_base: &self.config.image_base_url,
                favourites: &self.favourites,
            };

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    // Search results appear only while there is search text
                    if self.state.search.is_active() {
                        let has_results = matches!(self.state.search.state(), state::LoadState::Loaded(m) if !m.is_empty());
                        if has_results {
                            view::section_heading(ui, "Searched Movie");
                        }
                        view::load_state_body(ui, self.state.search.state(), &cards, &mut actions);
                    }

                    for section in Section::ALL {
                        let heading = view::section_heading(ui, section.title());
                        if jump == Some(Anchor::Catalog(section)) {
                            heading.scroll_to_me(Some(egui::Align::TOP));
                        }
                        view::load_state_body(ui, self.state.catalog(section).state(), &cards, &mut actions);
                    }

                    let heading = view::section_heading(ui, "Favourite Movies");
                    if jump == Some(Anchor::Favourites) {
                        heading.scroll_to_me(Some(egui::Align::TOP));
                    }
                    view::favourites_section(ui, &cards, &mut actions);
                    ui.add_space(20.0);
                });

            if let DetailView::Open(movie) = self.state.detail() {
                view::detail_window(ctx, movie, &cards, &mut actions);
            }
        });

        if self.show_settings {
            self.show_settings_window(ctx);
        }

        for action in actions {
            self.apply_action(action);
        }
        self.surface_storage_warning();
    }
}
