use crate::log_sink::LogBuffer;

// Only the visible rows get widgets, the buffer can grow without bound.
pub fn log_view(log: &LogBuffer, ui: &mut egui::Ui) {
    let row_height = ui.text_style_height(&egui::TextStyle::Monospace);

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show_rows(ui, row_height, log.len(), |ui, rows| {
            for line in &log.lines()[rows] {
                ui.add(egui::Label::new(egui::RichText::new(line).monospace()).extend());
            }
        });
}
