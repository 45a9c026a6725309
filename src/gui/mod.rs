/// Robot controller window (eframe/egui)

pub mod controller_gui;

pub use controller_gui::{ControllerGUI, Dialog};
