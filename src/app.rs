use std::sync::Arc;

use eframe::egui;

use crate::config::Config;
use crate::data::awc::AwcClient;
use crate::data::model::Product;
use crate::state::AppState;
use crate::ui::{map, panels};
use crate::worker::FetchWorker;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SigmetMapApp {
    pub state: AppState,
    /// `None` in offline mode or when the worker could not be started.
    worker: Option<FetchWorker>,
}

impl SigmetMapApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: &Config) -> Self {
        let mut app = Self {
            state: AppState::default(),
            worker: None,
        };

        if config.offline {
            log::info!("offline mode, advisories are loaded from files only");
            return app;
        }

        let ctx = cc.egui_ctx.clone();
        match AwcClient::new(config)
            .map_err(anyhow::Error::from)
            .and_then(|client| FetchWorker::spawn(Arc::new(client), move || ctx.request_repaint()).map_err(anyhow::Error::from))
        {
            Ok(worker) => {
                app.worker = Some(worker);
                app.request_fetch();
            }
            Err(e) => {
                log::error!("could not start advisory fetcher: {e:#}");
                app.state.status_message = Some(format!("Error: {e:#}"));
            }
        }
        app
    }

    fn request_fetch(&mut self) {
        let Some(worker) = &mut self.worker else {
            return;
        };
        match worker.request(self.state.target_time) {
            Some(generation) => self.state.begin_fetch(generation),
            None => self.state.fetch_unavailable("advisory fetcher is not running"),
        }
    }

    fn poll_worker(&mut self) {
        let Some(worker) = &self.worker else {
            return;
        };
        while let Some(outcome) = worker.try_recv() {
            if self.state.apply_fetch_outcome(outcome) {
                log::info!(
                    "showing {} of {} SIGMETs, {} of {} AIR SIGMETs",
                    self.state.layer(Product::Sigmet).filtered.len(),
                    self.state.layer(Product::Sigmet).raw.len(),
                    self.state.layer(Product::AirSigmet).filtered.len(),
                    self.state.layer(Product::AirSigmet).raw.len(),
                );
            }
        }
    }
}

impl eframe::App for SigmetMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_worker();
        let online = self.worker.is_some();

        // ---- Top panel: menu bar ----
        let refresh = egui::TopBottomPanel::top("top_bar")
            .show(ctx, |ui| panels::top_bar(ui, &mut self.state, online))
            .inner;

        // ---- Left side panel: filters ----
        let time_changed = egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| panels::side_panel(ui, &mut self.state))
            .inner;

        // ---- Central panel: map ----
        egui::CentralPanel::default().show(ctx, |ui| {
            map::advisory_map(ui, &mut self.state);
        });

        if refresh || time_changed {
            self.request_fetch();
        }
    }
}
