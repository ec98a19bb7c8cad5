//! Rendering of movie cards, sections, favourites and the detail window
//!
//! Every function here is stateless: it draws what it is given and reports
//! clicks by pushing a [`UiAction`]. The shell applies the actions after the
//! frame has been laid out.

use eframe::egui;

use crate::api::{poster_url, CARD_POSTER_WIDTH, DETAIL_POSTER_WIDTH};
use crate::favourites::FavouritesStore;
use crate::models::{Anchor, MovieDetail, MovieSummary};
use crate::state::LoadState;

const CARD_WIDTH: f32 = 150.0;
const CARD_POSTER_SIZE: egui::Vec2 = egui::vec2(130.0, 195.0);
const DETAIL_POSTER_SIZE: egui::Vec2 = egui::vec2(200.0, 300.0);
const FAVOURITE_POSTER_SIZE: egui::Vec2 = egui::vec2(100.0, 150.0);

/// User interaction reported by the view
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    AddFavourite(MovieSummary),
    RemoveFavourite(i64),
    OpenDetail(MovieDetail),
    CloseDetail,
    JumpTo(Anchor),
}

/// Read-only inputs shared by all cards
pub struct CardContext<'a> {
    pub image_base: &'a str,
    pub favourites: &'a FavouritesStore,
}

pub fn section_heading(ui: &mut egui::Ui, title: &str) -> egui::Response {
    ui.add_space(12.0);
    let response = ui.heading(egui::RichText::new(title).strong().size(24.0));
    ui.separator();
    response
}

/// Body of a section: spinner, inline error, or the card grid
pub fn load_state_body(
    ui: &mut egui::Ui,
    state: &LoadState,
    cards: &CardContext,
    actions: &mut Vec<UiAction>,
) {
    match state {
        LoadState::Idle => {}
        LoadState::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading...");
            });
        }
        LoadState::Failed(message) => {
            ui.label(egui::RichText::new(message).color(egui::Color32::from_rgb(239, 68, 68)));
        }
        LoadState::Loaded(movies) if movies.is_empty() => {
            ui.label(egui::RichText::new("No movies found.").weak());
        }
        LoadState::Loaded(movies) => movie_grid(ui, movies, cards, actions),
    }
}

pub fn movie_grid(
    ui: &mut egui::Ui,
    movies: &[MovieDetail],
    cards: &CardContext,
    actions: &mut Vec<UiAction>,
) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing = egui::vec2(12.0, 12.0);
        for movie in movies {
            movie_card(ui, movie, cards, actions);
        }
    });
}

fn movie_card(ui: &mut egui::Ui, movie: &MovieDetail, cards: &CardContext, actions: &mut Vec<UiAction>) {
    let summary = &movie.summary;

    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(CARD_WIDTH);
        ui.vertical(|ui| {
            let url = poster_url(cards.image_base, CARD_POSTER_WIDTH, summary.poster_path.as_deref());
            let poster_clicked = poster(ui, url, CARD_POSTER_SIZE).clicked();

            let title_clicked = ui
                .add(egui::Label::new(egui::RichText::new(&summary.title).strong()).sense(egui::Sense::click()))
                .on_hover_cursor(egui::CursorIcon::PointingHand)
                .clicked();

            ui.label(egui::RichText::new(format!("Rating: {:.1}", summary.vote_average)).weak());

            let is_favourite = cards.favourites.contains(summary.id);
            let button = if is_favourite {
                egui::Button::new(egui::RichText::new("★ Added to Favourites").color(egui::Color32::GOLD))
            } else {
                egui::Button::new("☆ Add to Favourites")
            };
            if ui.add(button).clicked() {
                actions.push(UiAction::AddFavourite(summary.clone()));
            } else if poster_clicked || title_clicked {
                actions.push(UiAction::OpenDetail(movie.clone()));
            }
        });
    });
}

/// Poster image, or a placeholder box when the movie has none
fn poster(ui: &mut egui::Ui, url: Option<String>, size: egui::Vec2) -> egui::Response {
    let response = match url {
        Some(url) => ui.add(
            egui::Image::new(url)
                .fit_to_exact_size(size)
                .show_loading_spinner(true)
                .sense(egui::Sense::click()),
        ),
        None => {
            let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
            ui.painter().rect_filled(rect, 4.0, ui.visuals().faint_bg_color);
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "No poster",
                egui::FontId::proportional(12.0),
                ui.visuals().weak_text_color(),
            );
            response
        }
    };
    response.on_hover_cursor(egui::CursorIcon::PointingHand)
}

pub fn favourites_section(ui: &mut egui::Ui, cards: &CardContext, actions: &mut Vec<UiAction>) {
    let favourites = cards.favourites.list();
    if favourites.is_empty() {
        ui.label(egui::RichText::new("No favourite movies added yet.").weak());
        return;
    }

    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing = egui::vec2(12.0, 12.0);
        for movie in favourites {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    let url = poster_url(cards.image_base, CARD_POSTER_WIDTH, movie.poster_path.as_deref());
                    if poster(ui, url, FAVOURITE_POSTER_SIZE).clicked() {
                        actions.push(UiAction::OpenDetail(MovieDetail {
                            summary: movie.clone(),
                            overview: String::new(),
                        }));
                    }
                    ui.vertical(|ui| {
                        ui.set_width(180.0);
                        ui.label(egui::RichText::new(&movie.title).strong().size(16.0));
                        ui.label(egui::RichText::new(&movie.release_date).weak());
                        if ui
                            .button(egui::RichText::new("Remove from Favourites").color(egui::Color32::from_rgb(239, 68, 68)))
                            .clicked()
                        {
                            actions.push(UiAction::RemoveFavourite(movie.id));
                        }
                    });
                });
            });
        }
    });
}

/// Modal-style window with one movie's extended fields
pub fn detail_window(
    ctx: &egui::Context,
    movie: &MovieDetail,
    cards: &CardContext,
    actions: &mut Vec<UiAction>,
) {
    let summary = &movie.summary;
    let mut open = true;

    egui::Window::new(summary.title.as_str())
        .id(egui::Id::new("movie_detail"))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .default_width(360.0)
        .show(ctx, |ui| {
            let url = poster_url(cards.image_base, DETAIL_POSTER_WIDTH, summary.poster_path.as_deref());
            ui.vertical_centered(|ui| {
                poster(ui, url, DETAIL_POSTER_SIZE);
            });
            ui.add_space(8.0);

            ui.heading(&summary.title);
            let release = if summary.release_date.is_empty() { "Unknown" } else { summary.release_date.as_str() };
            ui.label(egui::RichText::new(format!("Release Date: {}", release)).weak());
            ui.add_space(4.0);
            if movie.overview.is_empty() {
                ui.label(egui::RichText::new("No overview available.").italics().weak());
            } else {
                ui.label(&movie.overview);
            }
            ui.add_space(4.0);
            ui.label(format!("Rating: {:.1}", summary.vote_average));

            ui.separator();
            ui.horizontal(|ui| {
                if cards.favourites.contains(summary.id) {
                    ui.label(egui::RichText::new("★ In your favourites").color(egui::Color32::GOLD));
                } else if ui.button("☆ Add to Favourites").clicked() {
                    actions.push(UiAction::AddFavourite(summary.clone()));
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Close").clicked() {
                        actions.push(UiAction::CloseDetail);
                    }
                });
            });
        });

    if !open {
        actions.push(UiAction::CloseDetail);
    }
}

/// Colour for a console line by its level tag
pub fn console_line_color(line: &str) -> egui::Color32 {
    if line.contains("[ERROR]") {
        egui::Color32::RED
    } else if line.contains("[WARN]") {
        egui::Color32::YELLOW
    } else if line.contains("[INFO]") {
        egui::Color32::LIGHT_BLUE
    } else {
        egui::Color32::GRAY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_line_color() {
        assert_eq!(console_line_color("[12:00:00] [ERROR] boom"), egui::Color32::RED);
        assert_eq!(console_line_color("[12:00:00] [WARN] hmm"), egui::Color32::YELLOW);
        assert_eq!(console_line_color("[12:00:00] [INFO] ok"), egui::Color32::LIGHT_BLUE);
        assert_eq!(console_line_color("[12:00:00] [DEBUG] x"), egui::Color32::GRAY);
    }
}
