/// SCARA robot controller GUI
///
/// Run with: cargo run --bin scara_gui [-- --debug] [-- --config path/to/scara_jog.yaml]

use clap::Parser;
use eframe::egui;
use gethostname::gethostname;
use std::fs::File;
use std::path::PathBuf;

use scara_jog::config_loader::{self, ControllerSettings};
use scara_jog::gui::ControllerGUI;
use scara_jog::serial_link;

#[derive(Parser)]
#[command(author, version, about = "Jog a SCARA arm over a serial link", long_about = None)]
struct Args {
    /// Verbose logging, and mirror the activity log to run_output.log
    #[arg(long)]
    debug: bool,

    /// Settings file (defaults to scara_jog.yaml next to Cargo.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let mut debug_file: Option<File> = None;
    if args.debug {
        match File::create("run_output.log") {
            Ok(file) => debug_file = Some(file),
            Err(e) => log::warn!("Could not create run_output.log: {}", e),
        }
    }

    let hostname = gethostname().to_string_lossy().to_string();
    let config_path = args.config.unwrap_or_else(config_loader::default_config_path);
    let settings = match config_loader::load_controller_settings(&config_path, &hostname) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Warning: Could not load controller settings: {:#}. Using defaults.", e);
            ControllerSettings::default()
        }
    };

    // Ports are enumerated once; the list is not refreshed while running
    let ports = serial_port_list();
    if ports.is_empty() {
        eprintln!("WARNING: No serial ports detected; Send and Play will fail");
    }

    let app = ControllerGUI::new(settings, ports, debug_file);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Robot Controller")
            .with_inner_size([440.0, 560.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "Robot Controller",
        options,
        Box::new(|_cc| Box::new(app)),
    ) {
        eprintln!("GUI error: {}", e);
        std::process::exit(1);
    }
}

fn serial_port_list() -> Vec<String> {
    let ports = serial_link::available_port_names();
    log::info!("Found {} serial port(s)", ports.len());
    ports
}
