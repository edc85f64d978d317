use std::sync::Arc;

use crate::cli::Cli;
use crate::controller::{Controller, RunState};
use crate::models::form::FormState;
use crate::runner::{Notify, SpawnOptions};
use crate::ui::{file_list::file_list, log_view::log_view, options::options_grid};

impl Notify for egui::Context {
    fn notify(&self) {
        self.request_repaint();
    }
}

pub struct ConverterApp {
    controller: Controller,
}

impl ConverterApp {
    pub fn new(cc: &eframe::CreationContext<'_>, args: Cli) -> Self {
        let mut form: FormState = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        args.apply(&mut form);

        let notify: Arc<dyn Notify> = Arc::new(cc.egui_ctx.clone());

        Self {
            controller: Controller::new(form, SpawnOptions::default(), notify),
        }
    }

    fn accept_dropped_files(&mut self, ctx: &egui::Context) {
        let (hovering, dropped) = ctx.input(|i| {
            let dropped: Vec<_> = i
                .raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect();
            (i.raw.hovered_files.len(), dropped)
        });

        if hovering > 0 {
            egui::Area::new(egui::Id::new("drop_hint"))
                .order(egui::Order::Foreground)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.heading(format!("Release to queue {hovering} file(s)"));
                    });
                });
        }

        if !dropped.is_empty() {
            log::debug!("queued {} dropped file(s)", dropped.len());
            self.controller.form_mut().add_files(dropped);
        }
    }

    fn run_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let preview = self
                .controller
                .form()
                .build_command()
                .iter()
                .map(|arg| arg.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ");
            let start = ui
                .add_enabled(
                    self.controller.can_start(),
                    egui::Button::new("Start Conversion"),
                )
                .on_hover_text(preview);
            if start.clicked() {
                self.controller.start();
            }

            if let RunState::Running { pid } = self.controller.state() {
                ui.spinner();
                match pid {
                    Some(pid) => ui.label(format!("Converting (pid {pid})...")),
                    None => ui.label("Launching..."),
                };
            }
        });
    }
}

impl eframe::App for ConverterApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self.controller.form());
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.poll();

        egui::TopBottomPanel::top("form").show(ctx, |ui| {
            ui.add_space(4.0);
            file_list(self.controller.form_mut(), ui);
            ui.separator();
            options_grid(self.controller.form_mut(), ui);
            ui.separator();
            self.run_controls(ui);
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Log Output");
            log_view(self.controller.log(), ui);
        });

        self.accept_dropped_files(ctx);
    }
}
