use anyhow::Context as _;
use spotmap::{App, AppConfig, Services};

/// Standalone spotting map
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = AppConfig::from_env().context("reading configuration")?;
    log::info!(
        "starting at {} (zoom {})",
        config.initial_center,
        config.initial_zoom
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Monkeys"),
        ..Default::default()
    };

    eframe::run_native(
        "spotmap-app",
        options,
        Box::new(move |cc| Box::new(SpotmapApp::new(cc, config))),
    )
    .map_err(|e| anyhow::anyhow!("eframe: {e}"))?;

    Ok(())
}

/// eframe glue around the application shell
struct SpotmapApp {
    app: App,
}

impl SpotmapApp {
    fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let services = Services::google(&config);
        let ctx = cc.egui_ctx.clone();
        let mut app = App::new(config, services).with_waker(move || ctx.request_repaint());
        app.start();
        Self { app }
    }
}

impl eframe::App for SpotmapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.app.pump();
        self.app.ui(ctx);
    }
}
