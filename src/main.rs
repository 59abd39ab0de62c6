mod app;
mod image_loader;
mod ui;

use app::LightboxApp;
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lightbox=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let app = LightboxApp::new();
    std::process::exit(app.run());
}
