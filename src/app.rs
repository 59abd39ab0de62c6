use std::path::{Path, PathBuf};

use gtk4::prelude::*;
use gtk4::Application;

use lightbox::scanner::{resolve_target, ScanConfig, ScanTarget};
use lightbox::ViewerConfig;

use crate::ui::GalleryWindow;

const APP_ID: &str = "com.lightbox.Gallery";

fn default_pictures_dir() -> Option<PathBuf> {
    directories::UserDirs::new().map(|dirs| {
        dirs.picture_dir()
            .unwrap_or_else(|| dirs.home_dir())
            .to_path_buf()
    })
}

pub struct LightboxApp {
    app: Application,
}

impl LightboxApp {
    pub fn new() -> Self {
        let app = Application::builder()
            .application_id(APP_ID)
            .flags(gio::ApplicationFlags::HANDLES_OPEN)
            .build();

        app.connect_activate(Self::on_activate);
        app.connect_open(Self::on_open);

        Self { app }
    }

    pub fn run(&self) -> i32 {
        self.app.run().into()
    }

    fn on_activate(app: &Application) {
        let dir = default_pictures_dir();
        Self::open_gallery(app, dir.as_deref());
    }

    fn on_open(app: &Application, files: &[gio::File], _hint: &str) {
        let path = files.first().and_then(|f| f.path());
        Self::open_gallery(app, path.as_deref());
    }

    fn open_gallery(app: &Application, path: Option<&Path>) {
        let target = match path {
            Some(path) => resolve_target(path, &ScanConfig::default()).unwrap_or_else(|err| {
                tracing::error!("Failed to scan {:?}: {:#}", path, err);
                ScanTarget {
                    sources: Vec::new(),
                    start_index: 0,
                }
            }),
            None => ScanTarget {
                sources: Vec::new(),
                start_index: 0,
            },
        };

        match GalleryWindow::new(app, target, ViewerConfig::from_env()) {
            // The window keeps itself alive until it is closed.
            Ok(window) => window.present(),
            Err(err) => tracing::error!("Failed to open gallery: {:#}", err),
        }
    }
}

impl Default for LightboxApp {
    fn default() -> Self {
        Self::new()
    }
}
