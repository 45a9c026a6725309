use eframe::egui;
use egui::Color32;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::checkpoint_csv;
use crate::checkpoints::{Axis, Checkpoint, CheckpointStore, AXIS_COUNT};
use crate::config_loader::ControllerSettings;
use crate::error::{ControllerError, ErrorKind};
use crate::keypad::{KeypadKey, NumericKeypad};
use crate::playback::{Playback, PlaybackEvent};

const SAVE_COLOR: Color32 = Color32::from_rgb(0x0D, 0x92, 0x76);
const SEND_COLOR: Color32 = Color32::from_rgb(0xFC, 0x67, 0x36);
const PLAY_COLOR: Color32 = Color32::from_rgb(0x0B, 0x60, 0xB0);
const CLEAR_COLOR: Color32 = Color32::from_rgb(0xB5, 0xC0, 0xD0);
const STOP_COLOR: Color32 = Color32::from_rgb(0xD3, 0x2F, 0x2F);

const SERIAL_ERROR_MESSAGE: &str = "Failed to establish a serial connection.";

/// Blocking message shown over the main panel until acknowledged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub title: String,
    pub message: String,
    pub is_error: bool,
}

impl Dialog {
    fn info(title: &str, message: impl Into<String>) -> Self {
        Self { title: title.to_string(), message: message.into(), is_error: false }
    }

    fn error(message: impl Into<String>) -> Self {
        Self { title: "Error".to_string(), message: message.into(), is_error: true }
    }
}

pub struct ControllerGUI {
    entries: [String; AXIS_COUNT],
    available_ports: Vec<String>, // Enumerated once at startup
    selected_port: String,
    store: CheckpointStore,
    settings: ControllerSettings,
    keypad: Option<NumericKeypad>,
    dialog: Option<Dialog>,
    playback: Option<Playback>,
    activity_log: String,
    debug_file: Option<File>,
}

impl ControllerGUI {
    pub fn new(settings: ControllerSettings, available_ports: Vec<String>, debug_file: Option<File>) -> Self {
        // Configured port wins if the host actually has it, else the first one found
        let selected_port = settings
            .serial_port
            .as_ref()
            .filter(|p| available_ports.contains(p))
            .cloned()
            .or_else(|| available_ports.first().cloned())
            .unwrap_or_default();

        let mut s = Self {
            entries: Default::default(),
            available_ports,
            selected_port,
            store: CheckpointStore::new(),
            settings,
            keypad: None,
            dialog: None,
            playback: None,
            activity_log: String::new(),
            debug_file,
        };
        if s.available_ports.is_empty() {
            s.log("No serial ports detected");
        } else {
            s.log(&format!("Serial ports: {}", s.available_ports.join(", ")));
        }
        s.log(&format!("Selected port '{}' @{}", s.selected_port, s.settings.baud_rate));
        s
    }

    fn log(&mut self, message: &str) {
        log::info!(target: "controller_gui", "{}", message);
        let stamp = chrono::Local::now().format("%H:%M:%S%.3f");
        let line = format!("[{}] {}\n", stamp, message);
        self.activity_log.push_str(&line);
        // Keep log size manageable
        if self.activity_log.len() > 10000 {
            let mut cut = self.activity_log.len() - 5000;
            while !self.activity_log.is_char_boundary(cut) {
                cut += 1;
            }
            self.activity_log = self.activity_log.split_off(cut);
        }
        if let Some(f) = self.debug_file.as_mut() {
            let _ = f.write_all(line.as_bytes());
        }
    }

    pub fn entry_mut(&mut self, axis: Axis) -> &mut String {
        &mut self.entries[axis.index()]
    }

    pub fn entries(&self) -> &[String; AXIS_COUNT] {
        &self.entries
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    pub fn selected_port(&self) -> &str {
        &self.selected_port
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn dismiss_dialog(&mut self) {
        self.dialog = None;
    }

    /// A playback counts as running until its last event has been polled
    pub fn is_playing(&self) -> bool {
        self.playback.is_some()
    }

    fn report_error(&mut self, action: &str, err: &ControllerError) {
        match err.lines_sent() {
            Some(sent) => self.log(&format!("{} failed ({} line(s) sent): {}", action, sent, err)),
            None => self.log(&format!("{} failed: {}", action, err)),
        }
        let message = match err.kind() {
            ErrorKind::Serial => SERIAL_ERROR_MESSAGE.to_string(),
            ErrorKind::File => format!("Failed to {} checkpoints: {}", action.to_lowercase(), err),
        };
        self.dialog = Some(Dialog::error(message));
    }

    // -------------------- Button handlers --------------------

    pub fn save_checkpoint(&mut self) {
        let values = std::mem::take(&mut self.entries);
        self.log(&format!("Saved checkpoint #{}: {}", self.store.count() + 1, values.join(",")));
        self.store.save(values);
        self.dialog = Some(Dialog::info("Checkpoint Saved", "Current position saved as a checkpoint."));
    }

    pub fn clear_last_checkpoint(&mut self) {
        match self.store.clear_last() {
            Some(cp) => self.log(&format!("Removed checkpoint: {}", cp.values().join(","))),
            None => self.log("Clear Last: no checkpoints"),
        }
        self.dialog = Some(Dialog::info("Clear Last", "The last checkpoint has been removed."));
    }

    pub fn send_values(&mut self) {
        let checkpoint = Checkpoint::new(self.entries.clone());
        let link = self.settings.link(&self.selected_port);
        match link.send_one(&checkpoint) {
            Ok(()) => {
                self.log(&format!("Sent {} to {}", checkpoint.values().join(","), self.selected_port));
                self.entries = Default::default();
                self.dialog = Some(Dialog::info("Values Sent", "Values sent successfully!"));
            }
            Err(e) => self.report_error("Send", &e),
        }
    }

    pub fn play_checkpoints(&mut self) {
        if self.is_playing() {
            self.log("Playback already running");
            return;
        }
        let link = self.settings.link(&self.selected_port);
        self.log(&format!("Playing {} checkpoint(s) on '{}'", self.store.count(), self.selected_port));
        self.playback = Some(Playback::start(link, self.store.snapshot()));
    }

    /// Cancels an in-flight playback. Never writes to the port.
    pub fn emergency_stop(&mut self) {
        let stopping = match self.playback.as_ref() {
            Some(p) if p.is_running() => {
                p.stop();
                true
            }
            _ => false,
        };
        self.log(if stopping { "EMERGENCY STOP: cancelling playback" } else { "EMERGENCY STOP" });
        self.dialog = Some(Dialog::info("Emergency Stop", "Emergency Stop action performed."));
    }

    /// Apply worker events; clears the playback once it has ended
    pub fn poll_playback(&mut self) {
        let events = match self.playback.as_ref() {
            Some(p) => p.poll(),
            None => return,
        };
        for event in events {
            let done = event.is_terminal();
            match event {
                PlaybackEvent::Started { total } => self.log(&format!("Playback started: {} line(s)", total)),
                PlaybackEvent::LineSent { index, total } => {
                    log::debug!(target: "controller_gui", "Playback line {}/{}", index + 1, total);
                }
                PlaybackEvent::Finished { sent } => {
                    self.log(&format!("Playback complete: {} line(s) sent", sent));
                    self.dialog = Some(Dialog::info("Playback Complete", "Checkpoints played successfully!"));
                }
                PlaybackEvent::Stopped { sent, total } => {
                    self.log(&format!("Playback stopped after {} of {} line(s)", sent, total));
                    self.dialog = Some(Dialog::info(
                        "Playback Stopped",
                        format!("Playback stopped after {} of {} checkpoint(s).", sent, total),
                    ));
                }
                PlaybackEvent::Failed { error } => self.report_error("Playback", &error),
            }
            if done {
                self.playback = None;
                break;
            }
        }
    }

    pub fn export_to(&mut self, path: &Path) {
        match checkpoint_csv::export_checkpoints(path, self.store.as_slice()) {
            Ok(()) => {
                self.log(&format!("Exported {} checkpoint(s) to {}", self.store.count(), path.display()));
                self.dialog = Some(Dialog::info(
                    "Export Complete",
                    format!("Checkpoints exported to {} successfully!", path.display()),
                ));
            }
            Err(e) => self.report_error("Export", &e),
        }
    }

    pub fn import_from(&mut self, path: &Path) {
        match checkpoint_csv::import_checkpoints(path) {
            Ok(checkpoints) => {
                self.store.replace_all(checkpoints);
                self.log(&format!("Imported {} checkpoint(s) from {}", self.store.count(), path.display()));
                self.dialog = Some(Dialog::info(
                    "Import Complete",
                    format!("Checkpoints imported from {} successfully!", path.display()),
                ));
            }
            Err(e) => self.report_error("Import", &e),
        }
    }

    fn csv_dialog() -> rfd::FileDialog {
        rfd::FileDialog::new()
            .add_filter("CSV files", &["csv"])
            .set_file_name("checkpoints.csv")
    }

    fn export_with_dialog(&mut self) {
        if let Some(mut path) = Self::csv_dialog().save_file() {
            if path.extension().is_none() {
                path.set_extension("csv");
            }
            self.export_to(&path);
        }
    }

    fn import_with_dialog(&mut self) {
        let picked: Option<PathBuf> = Self::csv_dialog().pick_file();
        if let Some(path) = picked {
            self.import_from(&path);
        }
    }

    // -------------------- Drawing --------------------

    fn colored_button(ui: &mut egui::Ui, text: &str, fill: Color32, text_color: Color32, enabled: bool) -> bool {
        let button = egui::Button::new(egui::RichText::new(text).size(16.0).color(text_color))
            .fill(fill)
            .min_size(egui::vec2(104.0, 32.0));
        ui.add_enabled(enabled, button).clicked()
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        let playing = self.is_playing();

        egui::Grid::new("axis_grid")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("Select COM Port:");
                let shown = if self.selected_port.is_empty() { "(no ports)".to_string() } else { self.selected_port.clone() };
                egui::ComboBox::from_id_source("port_select")
                    .selected_text(shown)
                    .width(160.0)
                    .show_ui(ui, |ui| {
                        for port in &self.available_ports {
                            ui.selectable_value(&mut self.selected_port, port.clone(), port.as_str());
                        }
                    });
                ui.end_row();

                for axis in Axis::ALL {
                    ui.label(format!("{} Axis:", axis));
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut self.entries[axis.index()])
                            .desired_width(160.0)
                            .font(egui::TextStyle::Monospace),
                    );
                    if response.clicked() {
                        self.keypad = Some(NumericKeypad::new(axis));
                    }
                    ui.end_row();
                }
            });

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            if Self::colored_button(ui, "Save", SAVE_COLOR, Color32::BLACK, true) {
                self.save_checkpoint();
            }
            if Self::colored_button(ui, "Send", SEND_COLOR, Color32::WHITE, !playing) {
                self.send_values();
            }
            if Self::colored_button(ui, "Play", PLAY_COLOR, Color32::WHITE, !playing) {
                self.play_checkpoints();
            }
        });
        ui.horizontal(|ui| {
            if Self::colored_button(ui, "Clear Last", CLEAR_COLOR, Color32::BLACK, true) {
                self.clear_last_checkpoint();
            }
            if Self::colored_button(ui, "Stop", STOP_COLOR, Color32::WHITE, true) {
                self.emergency_stop();
            }
        });
        ui.horizontal(|ui| {
            if ui.add(egui::Button::new("Export").min_size(egui::vec2(104.0, 28.0))).clicked() {
                self.export_with_dialog();
            }
            if ui.add(egui::Button::new("Import").min_size(egui::vec2(104.0, 28.0))).clicked() {
                self.import_with_dialog();
            }
            ui.label(format!("Number of Checkpoints: {}", self.store.count()));
        });

        if playing {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Playing checkpoints...");
            });
        }

        ui.add_space(6.0);
        ui.collapsing("Activity log", |ui| {
            ui.horizontal(|ui| {
                if ui.button("Clear log").clicked() {
                    self.activity_log.clear();
                }
                if ui.button("Copy log").clicked() {
                    let log = self.activity_log.clone();
                    ui.output_mut(|o| o.copied_text = log);
                }
            });
            egui::ScrollArea::vertical()
                .max_height(200.0)
                .auto_shrink([false; 2])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut self.activity_log)
                            .desired_width(f32::INFINITY)
                            .interactive(false)
                            .code_editor(),
                    );
                });
        });
    }

    fn show_dialog(&mut self, ctx: &egui::Context) {
        let playing = self.is_playing();
        let Some(dialog) = self.dialog.as_ref() else { return };
        let mut close = false;
        let mut stop = false;
        egui::Window::new(dialog.title.as_str())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                if dialog.is_error {
                    ui.colored_label(STOP_COLOR, dialog.message.as_str());
                } else {
                    ui.label(dialog.message.as_str());
                }
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() || ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        close = true;
                    }
                    // Playback keeps running behind a dialog; Stop must stay reachable
                    if playing && Self::colored_button(ui, "Stop", STOP_COLOR, Color32::WHITE, true) {
                        stop = true;
                    }
                });
            });
        if close {
            self.dialog = None;
        }
        if stop {
            self.emergency_stop();
        }
    }
}

impl eframe::App for ControllerGUI {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_playback();
        if self.playback.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        let modal_open = self.dialog.is_some();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Robot Controller");
            ui.separator();
            ui.add_enabled_ui(!modal_open, |ui| self.draw_controls(ui));
        });

        if let Some(keypad) = self.keypad {
            if !modal_open {
                let target = &mut self.entries[keypad.axis.index()];
                if keypad.show(ctx, target) == Some(KeypadKey::Ok) {
                    self.keypad = None;
                }
            }
        }

        self.show_dialog(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn gui() -> ControllerGUI {
        ControllerGUI::new(ControllerSettings::default(), Vec::new(), None)
    }

    fn fill(gui: &mut ControllerGUI, values: [&str; AXIS_COUNT]) {
        for axis in Axis::ALL {
            *gui.entry_mut(axis) = values[axis.index()].to_string();
        }
    }

    fn wait_for_playback(gui: &mut ControllerGUI) {
        for _ in 0..250 {
            gui.poll_playback();
            if gui.playback.is_none() {
                return;
            }
            thread::sleep(Duration::from_millis(20));
        }
        panic!("playback did not finish");
    }

    #[test]
    fn test_port_selection() {
        let ports = vec!["/dev/ttyUSB0".to_string(), "/dev/ttyACM0".to_string()];
        let g = ControllerGUI::new(ControllerSettings::default(), ports.clone(), None);
        assert_eq!(g.selected_port(), "/dev/ttyUSB0");

        let settings = ControllerSettings { serial_port: Some("/dev/ttyACM0".into()), ..Default::default() };
        let g = ControllerGUI::new(settings, ports, None);
        assert_eq!(g.selected_port(), "/dev/ttyACM0");

        let settings = ControllerSettings { serial_port: Some("/dev/ttyS9".into()), ..Default::default() };
        let g = ControllerGUI::new(settings, Vec::new(), None);
        assert_eq!(g.selected_port(), "");
    }

    #[test]
    fn test_save_appends_and_clears_entries() {
        let mut g = gui();
        fill(&mut g, ["1", "2", "3", "4", "5"]);
        g.save_checkpoint();
        assert_eq!(g.store().count(), 1);
        assert!(g.entries().iter().all(|e| e.is_empty()));
        assert_eq!(g.dialog().unwrap().title, "Checkpoint Saved");
        assert_eq!(g.store().as_slice()[0].value(Axis::A), "4");
    }

    #[test]
    fn test_clear_last_on_empty() {
        let mut g = gui();
        g.clear_last_checkpoint();
        assert_eq!(g.store().count(), 0);
        assert_eq!(g.dialog().unwrap().title, "Clear Last");
    }

    #[test]
    fn test_send_without_port_reports_serial_error() {
        let mut g = gui();
        fill(&mut g, ["1", "2", "3", "4", "5"]);
        g.save_checkpoint();
        fill(&mut g, ["7", "7", "7", "7", "7"]);
        g.send_values();
        let dialog = g.dialog().unwrap();
        assert!(dialog.is_error);
        assert_eq!(dialog.message, SERIAL_ERROR_MESSAGE);
        assert_eq!(g.store().count(), 1);
        // entries are kept so the operator can retry
        assert_eq!(g.entries()[0], "7");
    }

    #[test]
    fn test_play_without_port_reports_serial_error() {
        let mut g = gui();
        g.save_checkpoint();
        g.dismiss_dialog();
        g.play_checkpoints();
        wait_for_playback(&mut g);
        assert!(g.dialog().unwrap().is_error);
        assert_eq!(g.store().count(), 1);
    }

    #[test]
    fn test_second_play_waits_for_first_outcome() {
        let mut g = gui();
        g.save_checkpoint();
        g.dismiss_dialog();
        g.play_checkpoints();
        // Let the worker end without draining its events
        for _ in 0..250 {
            if !g.playback.as_ref().map_or(false, |p| p.is_running()) {
                break;
            }
            thread::sleep(Duration::from_millis(20));
        }
        assert!(g.is_playing());
        g.play_checkpoints();
        assert!(g.activity_log.contains("Playback already running"));

        wait_for_playback(&mut g);
        assert!(g.dialog().unwrap().is_error);
        assert_eq!(g.activity_log.matches("Playback failed").count(), 1);
        assert!(g.activity_log.contains("Playback failed (0 line(s) sent)"));
        assert!(!g.is_playing());
    }

    #[test]
    fn test_stop_when_idle_only_acknowledges() {
        let mut g = gui();
        g.emergency_stop();
        assert_eq!(g.dialog().unwrap().title, "Emergency Stop");
        assert!(!g.is_playing());
    }

    #[test]
    fn test_export_then_import_through_handlers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut g = gui();
        fill(&mut g, ["1", "2", "3", "4", "5"]);
        g.save_checkpoint();
        fill(&mut g, ["10", "20", "30", "40", "50"]);
        g.save_checkpoint();
        g.export_to(&path);
        assert_eq!(g.dialog().unwrap().title, "Export Complete");

        let mut fresh = gui();
        fresh.import_from(&path);
        assert_eq!(fresh.dialog().unwrap().title, "Import Complete");
        let values: Vec<[f64; 5]> = fresh.store().iter().map(|c| c.numeric().unwrap()).collect();
        assert_eq!(values, vec![[1.0, 2.0, 3.0, 4.0, 5.0], [10.0, 20.0, 30.0, 40.0, 50.0]]);
    }

    #[test]
    fn test_failed_import_keeps_existing_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "1,2,3,4,5\n1,2,three,4,5\n").unwrap();

        let mut g = gui();
        fill(&mut g, ["9", "9", "9", "9", "9"]);
        g.save_checkpoint();
        g.import_from(&path);
        let dialog = g.dialog().unwrap();
        assert!(dialog.is_error);
        assert!(dialog.message.starts_with("Failed to import checkpoints:"));
        assert_eq!(g.store().count(), 1);
        assert_eq!(g.store().as_slice()[0].value(Axis::X), "9");
    }

    #[test]
    fn test_export_to_bad_path_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut g = gui();
        g.export_to(&dir.path().join("missing_dir").join("out.csv"));
        assert!(g.dialog().unwrap().message.starts_with("Failed to export checkpoints:"));
    }

    #[test]
    fn test_activity_log_is_capped() {
        let mut g = gui();
        for i in 0..1000 {
            g.log(&format!("entry {}", i));
        }
        assert!(g.activity_log.len() <= 10000);
        assert!(g.activity_log.contains("entry 999"));
    }
}
