use eframe::egui::{self, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::view_state::RenderStyle;
use super::super::{SearchCache, ViewModel};

const SEARCH_RESULT_LIMIT: usize = 40;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("View");
        ui.separator();
        ui.add_space(4.0);

        ui.horizontal(|ui| {
            let mut style = self.view.render_style();
            let mut changed = false;
            changed |= ui
                .selectable_value(&mut style, RenderStyle::Flat, RenderStyle::Flat.label())
                .on_hover_text("Flat projection with pan and zoom.")
                .changed();
            changed |= ui
                .selectable_value(
                    &mut style,
                    RenderStyle::Perspective,
                    RenderStyle::Perspective.label(),
                )
                .on_hover_text("Perspective projection with an orbit camera.")
                .changed();
            if changed {
                self.view.set_render_style(style);
            }
        });

        ui.add_space(4.0);

        ui.add_enabled_ui(self.view.render_style() == RenderStyle::Perspective, |ui| {
            let mut rotate = self.view.auto_rotate();
            if ui
                .checkbox(&mut rotate, "Auto-rotate")
                .on_hover_text("Orbit the camera at a constant rate; pauses while dragging.")
                .changed()
            {
                self.view.set_auto_rotate(rotate);
            }
        });

        let mut reverse = self.view.show_reverse_links();
        if ui
            .checkbox(&mut reverse, "Show reverse links")
            .on_hover_text("Also show characters that use the focus as a direct component.")
            .changed()
        {
            self.view.set_show_reverse_links(reverse);
        }

        let mut particles = self.view.show_flow_particles();
        if ui
            .checkbox(&mut particles, "Flow particles")
            .on_hover_text("Animate markers along each link from component to composite.")
            .changed()
        {
            self.view.set_show_flow_particles(particles);
        }

        ui.add_space(4.0);
        if ui
            .button("Fit view")
            .on_hover_text("Frame every node in the viewport.")
            .clicked()
        {
            self.request_fit();
        }

        ui.separator();

        ui.label("Search (character, reading, or meaning)");
        let search_response = ui.text_edit_singleline(&mut self.search);
        if search_response.changed() {
            self.search_cache = None;
        }

        self.refresh_search_cache();
        let Some(cache) = &self.search_cache else {
            return;
        };
        if cache.rows.is_empty() {
            ui.small("No matches.");
            return;
        }

        let rows = cache.rows.clone();
        let mut selected_id = None;
        egui::ScrollArea::vertical()
            .id_salt("search_results_scroll")
            .max_height(240.0)
            .auto_shrink([false, false])
            .show_rows(ui, 22.0, rows.len(), |ui, row_range| {
                for index in row_range {
                    let Some((id, label)) = rows.get(index) else {
                        continue;
                    };
                    if ui.link(label).clicked() {
                        selected_id = Some(id.clone());
                    }
                }
            });

        if let Some(id) = selected_id {
            self.pending_navigation = Some(id);
        }
    }

    fn refresh_search_cache(&mut self) {
        let query = self.search.trim().to_owned();
        if query.is_empty() {
            self.search_cache = None;
            return;
        }
        if self
            .search_cache
            .as_ref()
            .is_some_and(|cache| cache.query == query)
        {
            return;
        }

        let matcher = SkimMatcherV2::default();
        let mut scored = if self.data.search.is_empty() {
            // No search list on disk: match directly against dictionary ids.
            self.data
                .index
                .character_ids()
                .filter_map(|id| {
                    matcher
                        .fuzzy_match(id, &query)
                        .map(|score| (score, id.to_owned(), id.to_owned()))
                })
                .collect::<Vec<_>>()
        } else {
            self.data
                .search
                .iter()
                .filter_map(|entry| {
                    let haystack = format!("{} {} {}", entry.id, entry.reading, entry.meaning);
                    matcher.fuzzy_match(&haystack, &query).map(|score| {
                        let label = format!(
                            "{}  {}  {}",
                            entry.id,
                            entry.reading,
                            entry.meaning
                        );
                        (score, entry.id.clone(), label.trim_end().to_owned())
                    })
                })
                .collect::<Vec<_>>()
        };

        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        scored.truncate(SEARCH_RESULT_LIMIT);

        self.search_cache = Some(SearchCache {
            query,
            rows: scored
                .into_iter()
                .map(|(_score, id, label)| (id, label))
                .collect(),
        });
    }
}
