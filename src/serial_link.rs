/// Serial command sender
///
/// The controller never holds the port between user actions: every send
/// opens the port, writes its lines and lets the port drop (closing it).
/// Each command is one ASCII line, `X,Y,Z,A,G\n`, with the axis values
/// exactly as typed.

use std::io::Write;
use std::time::Duration;

use log::{debug, info, warn};

use crate::checkpoints::Checkpoint;
use crate::error::{ControllerError, Result};

pub const DEFAULT_BAUD_RATE: u32 = 9600;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Render one checkpoint as a command line, terminator included
pub fn format_command(checkpoint: &Checkpoint) -> String {
    let mut line = checkpoint.values().join(",");
    line.push('\n');
    line
}

pub fn write_command<W: Write + ?Sized>(writer: &mut W, checkpoint: &Checkpoint) -> std::io::Result<()> {
    writer.write_all(format_command(checkpoint).as_bytes())?;
    writer.flush()
}

/// Write checkpoints in order, flushing after each line, and call
/// `after_line` with the index of each line once it is flushed. Returning
/// `false` ends the run early; the result is then the number of lines
/// written so far. On failure the error carries the lines already written.
pub fn write_commands<W, F>(writer: &mut W, checkpoints: &[Checkpoint], mut after_line: F) -> Result<usize>
where
    W: Write + ?Sized,
    F: FnMut(usize) -> bool,
{
    for (index, checkpoint) in checkpoints.iter().enumerate() {
        write_command(writer, checkpoint)
            .map_err(|source| ControllerError::SerialWrite { sent: index, source })?;
        if !after_line(index) {
            return Ok(index + 1);
        }
    }
    Ok(checkpoints.len())
}

/// Names of the serial ports present on the host, in enumeration order
pub fn available_port_names() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
        Err(e) => {
            warn!(target: "serial_link", "Port enumeration failed: {}", e);
            Vec::new()
        }
    }
}

/// Where and how to open the arm's serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialLink {
    port_path: String,
    baud_rate: u32,
    timeout: Duration,
}

impl SerialLink {
    pub fn new(port_path: impl Into<String>, baud_rate: u32, timeout: Duration) -> Self {
        Self {
            port_path: port_path.into(),
            baud_rate,
            timeout,
        }
    }

    pub fn port_path(&self) -> &str {
        &self.port_path
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    pub fn open(&self) -> Result<Box<dyn serialport::SerialPort>> {
        if self.port_path.trim().is_empty() {
            return Err(ControllerError::NoPortSelected);
        }
        debug!(target: "serial_link", "Opening {} @{} (timeout {:?})", self.port_path, self.baud_rate, self.timeout);
        serialport::new(self.port_path.as_str(), self.baud_rate)
            .timeout(self.timeout)
            .open()
            .map_err(|source| ControllerError::SerialOpen {
                port: self.port_path.clone(),
                baud_rate: self.baud_rate,
                source,
            })
    }

    /// Open, write a single command line, close
    pub fn send_one(&self, checkpoint: &Checkpoint) -> Result<()> {
        let mut port = self.open()?;
        write_command(&mut *port, checkpoint)
            .map_err(|source| ControllerError::SerialWrite { sent: 0, source })?;
        info!(target: "serial_link", "SEND {}: {}", self.port_path, format_command(checkpoint).trim_end());
        Ok(())
    }

    /// Open once, write every checkpoint in order, close once.
    /// An empty list still opens and closes the port.
    pub fn send_all(&self, checkpoints: &[Checkpoint]) -> Result<usize> {
        self.send_all_with(checkpoints, |_| true)
    }

    /// `send_all` with a per-line hook, see `write_commands`
    pub fn send_all_with<F: FnMut(usize) -> bool>(&self, checkpoints: &[Checkpoint], after_line: F) -> Result<usize> {
        let mut port = self.open()?;
        let sent = write_commands(&mut *port, checkpoints, after_line)?;
        info!(target: "serial_link", "SEND {}: {} of {} line(s)", self.port_path, sent, checkpoints.len());
        Ok(sent)
    }
}
