#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release
#![allow(rustdoc::missing_crate_level_docs)] // it's an example

use eframe::egui;
use zoning_map_view::ZoningMapView;

const DEFAULT_LOCATION: &str = "demos/data/zoning.geojson";

fn main() -> eframe::Result {
    // Log to stdout (if you run with `RUST_LOG=debug`).
    env_logger::init();

    // The GeoJSON to show, as a URL or a local path.
    let location = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1024.0, 768.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Zoning plan",
        options,
        Box::new(|_cc| Ok(Box::new(MyApp::new(location)))),
    )
}

struct MyApp {
    view: ZoningMapView,
}

impl MyApp {
    fn new(location: String) -> Self {
        Self {
            view: ZoningMapView::init(location).with_fit_bounds(true),
        }
    }
}

impl eframe::App for MyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(pos) = self.view.map().mouse_pos {
                    ui.label(format!("{:.5}, {:.5}", pos.lat, pos.lon));
                    ui.separator();
                }
                if self.view.is_loading() {
                    ui.label(format!("Loading {}", self.view.location()));
                } else if let Some(collection) = self.view.collection() {
                    ui.label(format!("{} zones", collection.features.len()));
                } else if let Some(diagnostic) = self.view.diagnostics().last() {
                    ui.colored_label(egui::Color32::RED, diagnostic);
                }
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                ui.add(&mut self.view);
            });
    }
}
