use std::path::PathBuf;

use crate::models::form::FormState;

const AUDIO_EXTENSIONS: &[&str] = &["m4b", "mp3", "mp4"];

fn pick_input_files() -> Option<Vec<PathBuf>> {
    rfd::FileDialog::new()
        .add_filter("Audio Files", AUDIO_EXTENSIONS)
        .add_filter("All Files", &["*"])
        .pick_files()
}

pub fn file_list(form: &mut FormState, ui: &mut egui::Ui) {
    use egui_extras::{Column, TableBuilder};

    ui.horizontal(|ui| {
        ui.heading("Input Files");

        ui.add_space(10.0);

        if ui.button("Add Files...").clicked()
            && let Some(paths) = pick_input_files()
        {
            form.add_files(paths);
        }

        if ui.button("Clear").clicked() {
            form.clear_files();
        }

        ui.label(format!("{} queued", form.files().len()));
    });

    let text_height = egui::TextStyle::Body
        .resolve(ui.style())
        .size
        .max(ui.spacing().interact_size.y);

    ui.push_id("input_files", |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(30.0))
            .column(Column::remainder())
            .min_scrolled_height(0.0)
            .max_scroll_height(text_height * 5.0)
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("#");
                });
                header.col(|ui| {
                    ui.strong("File");
                });
            })
            .body(|body| {
                body.rows(text_height, form.files().len(), |mut row| {
                    let index = row.index();
                    let file = &form.files()[index];
                    row.col(|ui| {
                        ui.label((index + 1).to_string());
                    });
                    row.col(|ui| {
                        ui.label(file.filename.as_str())
                            .on_hover_text(file.path.display().to_string());
                    });
                });
            });
    });
}
