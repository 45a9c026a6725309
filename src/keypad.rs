/// On-screen numeric keypad for the axis entries
///
/// Edits go straight into the target field, so the entry updates while the
/// keypad is open. No validation: whatever text is already in the field
/// (typed with a real keyboard, say) is kept and appended to.

use eframe::egui;

use crate::checkpoints::Axis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypadKey {
    Digit(u8),
    Clear,
    Backspace,
    Ok,
}

/// Apply one key press to `text`. Returns true when the keypad should close.
pub fn apply_key(text: &mut String, key: KeypadKey) -> bool {
    match key {
        KeypadKey::Digit(d) => {
            if let Some(c) = char::from_digit(u32::from(d), 10) {
                text.push(c);
            }
            false
        }
        KeypadKey::Clear => {
            text.clear();
            false
        }
        KeypadKey::Backspace => {
            text.pop();
            false
        }
        KeypadKey::Ok => true,
    }
}

/// Keypad window bound to one axis entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericKeypad {
    pub axis: Axis,
}

impl NumericKeypad {
    pub fn new(axis: Axis) -> Self {
        Self { axis }
    }

    /// Draw the keypad; returns the key pressed this frame, already applied to `text`
    pub fn show(&self, ctx: &egui::Context, text: &mut String) -> Option<KeypadKey> {
        let mut pressed = None;
        let key_size = egui::vec2(64.0, 40.0);

        egui::Window::new(format!("Numeric Keypad ({} Axis)", self.axis))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
            .show(ctx, |ui| {
                ui.label(egui::RichText::new(text.as_str()).monospace().size(18.0));
                ui.separator();
                egui::Grid::new("keypad_grid").spacing([6.0, 6.0]).show(ui, |ui| {
                    for row in 0..3u8 {
                        for col in 0..3u8 {
                            let digit = row * 3 + col + 1;
                            if ui.add_sized(key_size, egui::Button::new(digit.to_string())).clicked() {
                                pressed = Some(KeypadKey::Digit(digit));
                            }
                        }
                        ui.end_row();
                    }
                    if ui.add_sized(key_size, egui::Button::new("Clear")).clicked() {
                        pressed = Some(KeypadKey::Clear);
                    }
                    if ui.add_sized(key_size, egui::Button::new("0")).clicked() {
                        pressed = Some(KeypadKey::Digit(0));
                    }
                    if ui.add_sized(key_size, egui::Button::new("Backspace")).clicked() {
                        pressed = Some(KeypadKey::Backspace);
                    }
                    ui.end_row();
                });
                ui.add_space(4.0);
                let ok_width = key_size.x * 3.0 + 12.0;
                if ui.add_sized([ok_width, key_size.y], egui::Button::new("OK")).clicked() {
                    pressed = Some(KeypadKey::Ok);
                }
            });

        if let Some(key) = pressed {
            apply_key(text, key);
        }
        pressed
    }
}
