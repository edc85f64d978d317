#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

mod app;
mod cli;
mod controller;
mod error;
mod log_sink;
mod models;
mod runner;
mod ui;

use app::ConverterApp;
use clap::Parser;

use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();
    let args = cli::Cli::parse();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 600.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "M4B Converter GUI",
        options,
        Box::new(|cc| Ok(Box::new(ConverterApp::new(cc, args)))),
    )
}
