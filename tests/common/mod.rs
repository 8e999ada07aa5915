use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use searchlens::api::{Backend, HttpBackend};
use searchlens::config::BackendConfig;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

#[allow(dead_code)]
pub fn write_png(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::new_rgb8(width, height)
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("failed to encode png");
    let path = dir.path().join(name);
    fs::write(&path, out.into_inner()).expect("failed to write png");
    path
}

#[allow(dead_code)]
pub fn backend_for(base_url: &str) -> Arc<dyn Backend> {
    let config = BackendConfig {
        base_url: base_url.to_string(),
        ..BackendConfig::default()
    };
    Arc::new(HttpBackend::new(config).expect("failed to build backend"))
}
