use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;

mod backend;
mod config;
mod env;
mod i18n;
mod storage;
mod ui;

#[cfg(test)]
mod test_support;

use config::{DEFAULT_BACKEND_URL, LauncherConfig};

#[derive(Parser, Debug)]
#[command(
    name = "Falcon Launcher",
    author,
    version,
    about = "Desktop front end for a local Minecraft launcher backend"
)]
struct Cli {
    /// Base URL of the launcher backend.
    #[arg(long, value_name = "URL", default_value = DEFAULT_BACKEND_URL)]
    backend_url: String,

    /// Fetch `<locale>.xml` translation documents from this base URL.
    #[arg(long, value_name = "URL")]
    assets_url: Option<String>,

    /// Read `<locale>.xml` translation documents from this directory.
    #[arg(long, value_name = "DIR", conflicts_with = "assets_url")]
    assets_dir: Option<PathBuf>,

    /// Start in this locale and remember it, e.g. `en` or `fa`.
    #[arg(long, value_name = "CODE")]
    locale: Option<String>,

    /// Print launcher version and exit without starting the UI.
    #[arg(long)]
    version_only: bool,
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if cli.version_only {
        println!("Falcon Launcher {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = LauncherConfig::resolve(
        Some(cli.backend_url),
        cli.assets_url,
        cli.assets_dir,
        cli.locale,
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_icon(app_icon())
            .with_min_inner_size(eframe::egui::vec2(960.0, 600.0))
            .with_inner_size(eframe::egui::vec2(1200.0, 720.0)),
        ..Default::default()
    };
    eframe::run_native(
        "Falcon Launcher",
        options,
        Box::new(|cc| Ok(Box::new(ui::LauncherApp::new(cc, config)))),
    )
}

fn app_icon() -> eframe::egui::IconData {
    // 2x2 teal-on-slate placeholder until a real icon ships.
    let rgba: Vec<u8> = vec![
        24, 30, 38, 255, 92, 219, 195, 255, //
        92, 219, 195, 255, 24, 30, 38, 255,
    ];
    eframe::egui::IconData {
        rgba,
        width: 2,
        height: 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_to_local_backend() {
        let cli = Cli::try_parse_from(["falcon-launcher"]).unwrap();
        assert_eq!(cli.backend_url, DEFAULT_BACKEND_URL);
        assert!(cli.assets_url.is_none());
        assert!(cli.assets_dir.is_none());
        assert!(!cli.version_only);
    }

    #[test]
    fn cli_rejects_both_asset_locations() {
        let result = Cli::try_parse_from([
            "falcon-launcher",
            "--assets-url",
            "http://cdn.example",
            "--assets-dir",
            "/tmp/locales",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_accepts_locale_override() {
        let cli = Cli::try_parse_from(["falcon-launcher", "--locale", "fa"]).unwrap();
        assert_eq!(cli.locale.as_deref(), Some("fa"));
    }
}
