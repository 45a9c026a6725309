/// SCARA Jog Library
/// 
/// Shared modules for the robot controller GUI

pub mod checkpoints;
pub mod checkpoint_csv;
pub mod config_loader;
pub mod error;
pub mod gui;
pub mod keypad;
pub mod playback;
pub mod serial_link;
