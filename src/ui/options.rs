use crate::models::form::FormState;

pub fn options_grid(form: &mut FormState, ui: &mut egui::Ui) {
    egui::Grid::new("conversion_options")
        .num_columns(2)
        .show(ui, |ui| {
            let text_width = ui.available_width().min(420.0);

            ui.label("Output Directory");
            ui.horizontal(|ui| {
                if ui
                    .add_sized(
                        [text_width, ui.text_style_height(&egui::TextStyle::Body)],
                        egui::TextEdit::singleline(&mut form.output_dir)
                            .hint_text("converter default"),
                    )
                    .double_clicked()
                    || ui.button("Browse...").clicked()
                {
                    if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                        form.choose_output_dir(dir);
                    }
                }
            });
            ui.end_row();

            ui.separator();
            ui.separator();
            ui.end_row();

            ui.heading("Options");
            ui.end_row();

            ui.checkbox(
                &mut form.options.no_mp4v2,
                "Use ffmpeg for metadata (--no-mp4v2)",
            );
            ui.checkbox(
                &mut form.options.skip_encoding,
                "Skip encoding (--skip-encoding)",
            );
            ui.end_row();

            ui.checkbox(&mut form.options.debug, "Debug mode (--debug)");
            ui.checkbox(&mut form.options.pipe_wav, "Pipe WAV (--pipe-wav)");
            ui.end_row();

            let name_tooltip = "Chapter naming template, expanded by the converter";
            ui.label("Custom Chapter Name")
                .on_hover_text_at_pointer(name_tooltip);
            ui.add_sized(
                [text_width, ui.text_style_height(&egui::TextStyle::Body)],
                egui::TextEdit::singleline(&mut form.custom_name),
            )
            .on_hover_text_at_pointer(name_tooltip);
            ui.end_row();

            ui.label("Converter");
            ui.add_sized(
                [text_width, ui.text_style_height(&egui::TextStyle::Body)],
                egui::TextEdit::singleline(&mut form.tool.program),
            )
            .on_hover_text_at_pointer(format!(
                "Arguments before the flags: {}",
                form.tool.leading_args.join(" ")
            ));
            ui.end_row();
        });
}
