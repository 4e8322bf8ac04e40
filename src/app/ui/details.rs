use eframe::egui::{self, RichText, Ui};

use crate::util::codepoint_label;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Character");
        ui.add_space(6.0);

        ui.label(RichText::new(self.focus_id.as_str()).size(64.0));
        ui.small(codepoint_label(&self.focus_id));
        ui.label(format!(
            "tier: {}",
            self.data.tiers.membership(&self.focus_id).label()
        ));

        if let Some(entry) = self
            .data
            .search
            .iter()
            .find(|entry| entry.id == self.focus_id)
        {
            if !entry.reading.is_empty() {
                ui.label(format!("reading: {}", entry.reading));
            }
            if !entry.meaning.is_empty() {
                ui.label(format!("meaning: {}", entry.meaning));
            }
        }

        if !self.data.index.contains(&self.focus_id) {
            ui.add_space(4.0);
            ui.small("Not in the composition dictionary; shown as an isolated node.");
        }

        ui.separator();
        ui.label(RichText::new("Components").strong());
        let components = self.data.index.direct_components(&self.focus_id).to_vec();
        if components.is_empty() {
            ui.label("Atomic character, no recorded components.");
        } else {
            for id in &components {
                self.character_row(ui, id);
            }
        }

        ui.separator();
        ui.label(RichText::new("Used as a component in").strong());
        let composites = self.data.index.used_as_component_in(&self.focus_id).to_vec();
        if composites.is_empty() {
            ui.label("No recorded composites use this character.");
        } else {
            let mut selected_id = None;
            egui::ScrollArea::vertical()
                .id_salt("composites_scroll")
                .max_height(320.0)
                .auto_shrink([false, false])
                .show_rows(ui, 22.0, composites.len(), |ui, row_range| {
                    for index in row_range {
                        let Some(id) = composites.get(index) else {
                            continue;
                        };
                        let label =
                            format!("{}  ({})", id, self.data.tiers.membership(id).label());
                        if ui.link(label).on_hover_text(codepoint_label(id)).clicked() {
                            selected_id = Some(id.clone());
                        }
                    }
                });

            if let Some(id) = selected_id {
                self.pending_navigation = Some(id);
            }
        }
    }

    fn character_row(&mut self, ui: &mut Ui, id: &str) {
        let label = format!("{}  ({})", id, self.data.tiers.membership(id).label());
        if ui.link(label).on_hover_text(codepoint_label(id)).clicked() {
            self.pending_navigation = Some(id.to_owned());
        }
    }
}
