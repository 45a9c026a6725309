/// Checkpoint playback worker
///
/// Replaying a long checkpoint list can take a while at 9600 baud, so the
/// writes run on their own thread and report back over a channel. The GUI
/// drains the channel once per frame. Stop only raises a flag; the worker
/// checks it between lines and never sends anything extra to the arm.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{error, info, warn};

use crate::checkpoints::Checkpoint;
use crate::error::{ControllerError, Result};
use crate::serial_link::SerialLink;

#[derive(Debug)]
pub enum PlaybackEvent {
    Started { total: usize },
    LineSent { index: usize, total: usize },
    Finished { sent: usize },
    Stopped { sent: usize, total: usize },
    /// `error.lines_sent()` tells how far the run got
    Failed { error: ControllerError },
}

impl PlaybackEvent {
    /// True for the last event a run produces
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PlaybackEvent::Finished { .. } | PlaybackEvent::Stopped { .. } | PlaybackEvent::Failed { .. }
        )
    }
}

/// Drive one run through `send`, which gets the checkpoints and a per-line
/// hook (the shape of `SerialLink::send_all_with`). Emits progress, honours
/// `cancel` between lines and always ends with exactly one terminal event.
pub fn run_playback<S>(send: S, checkpoints: &[Checkpoint], cancel: &AtomicBool, events: &Sender<PlaybackEvent>)
where
    S: FnOnce(&[Checkpoint], &mut dyn FnMut(usize) -> bool) -> Result<usize>,
{
    let total = checkpoints.len();
    let _ = events.send(PlaybackEvent::Started { total });
    if cancel.load(Ordering::SeqCst) {
        let _ = events.send(PlaybackEvent::Stopped { sent: 0, total });
        return;
    }

    let mut on_line = |index: usize| {
        let _ = events.send(PlaybackEvent::LineSent { index, total });
        !cancel.load(Ordering::SeqCst)
    };
    let after_line: &mut dyn FnMut(usize) -> bool = &mut on_line;
    let last = match send(checkpoints, after_line) {
        Ok(sent) if sent < total => PlaybackEvent::Stopped { sent, total },
        Ok(sent) => PlaybackEvent::Finished { sent },
        Err(error) => {
            error!(target: "playback", "{}", error);
            PlaybackEvent::Failed { error }
        }
    };
    let _ = events.send(last);
}

/// Handle to a running (or finished) playback thread
pub struct Playback {
    events: Receiver<PlaybackEvent>,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Playback {
    pub fn start(link: SerialLink, checkpoints: Vec<Checkpoint>) -> Self {
        let (tx, rx) = unbounded();
        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_thread = Arc::clone(&cancel);

        let handle = thread::spawn(move || {
            info!(target: "playback", "Playing {} checkpoint(s) on {}", checkpoints.len(), link.port_path());
            // One open and one close for the whole run
            run_playback(
                |list, after_line| link.send_all_with(list, after_line),
                &checkpoints,
                &cancel_thread,
                &tx,
            );
        });

        Self {
            events: rx,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn stop(&self) {
        warn!(target: "playback", "Stop requested");
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Drain whatever events have arrived without blocking
    pub fn poll(&self) -> Vec<PlaybackEvent> {
        self.events.try_iter().collect()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }
}

impl Drop for Playback {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
