/// Checkpoint store
///
/// A checkpoint is one saved arm position: five raw text values in the
/// fixed axis order X, Y, Z, A, G. Values are kept exactly as typed; they
/// are only parsed as numbers when a CSV file is imported.

use std::fmt;

/// Number of axes on the arm
pub const AXIS_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
    A,
    G,
}

impl Axis {
    pub const ALL: [Axis; AXIS_COUNT] = [Axis::X, Axis::Y, Axis::Z, Axis::A, Axis::G];

    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
            Axis::A => "A",
            Axis::G => "G",
        }
    }

    /// Position of this axis within a checkpoint
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Text form of a parsed value as the arm firmware expects it: shortest
/// round-trip digits, `.0` on whole numbers, and exponent notation once the
/// decimal exponent leaves -4..16 (`1e+20`, `1e-07`).
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sci = format!("{:e}", value);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    if (-4..16).contains(&exp) {
        let mut plain = value.to_string();
        if !plain.contains('.') {
            plain.push_str(".0");
        }
        plain
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.abs())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Checkpoint {
    values: [String; AXIS_COUNT],
}

impl Checkpoint {
    pub fn new(values: [String; AXIS_COUNT]) -> Self {
        Self { values }
    }

    pub fn from_numbers(values: [f64; AXIS_COUNT]) -> Self {
        Self::new(values.map(format_number))
    }

    pub fn values(&self) -> &[String; AXIS_COUNT] {
        &self.values
    }

    pub fn value(&self, axis: Axis) -> &str {
        &self.values[axis.index()]
    }

    /// Parse every field as f64, reporting the first axis that is not numeric
    pub fn numeric(&self) -> Result<[f64; AXIS_COUNT], Axis> {
        let mut out = [0.0; AXIS_COUNT];
        for axis in Axis::ALL {
            out[axis.index()] = self.value(axis).trim().parse::<f64>().map_err(|_| axis)?;
        }
        Ok(out)
    }
}

/// Ordered list of checkpoints: append at the end, remove from the end,
/// or replace everything at once
#[derive(Debug, Clone, Default)]
pub struct CheckpointStore {
    checkpoints: Vec<Checkpoint>,
}

impl CheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&mut self, values: [String; AXIS_COUNT]) {
        self.checkpoints.push(Checkpoint::new(values));
    }

    pub fn clear_last(&mut self) -> Option<Checkpoint> {
        self.checkpoints.pop()
    }

    pub fn count(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn replace_all(&mut self, checkpoints: Vec<Checkpoint>) {
        self.checkpoints = checkpoints;
    }

    pub fn as_slice(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Checkpoint> {
        self.checkpoints.iter()
    }

    /// Owned copy for handing to the playback worker
    pub fn snapshot(&self) -> Vec<Checkpoint> {
        self.checkpoints.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(v: [&str; AXIS_COUNT]) -> [String; AXIS_COUNT] {
        v.map(String::from)
    }

    #[test]
    fn test_count_tracks_saves() {
        let mut store = CheckpointStore::new();
        for n in 0..7 {
            assert_eq!(store.count(), n);
            store.save(values(["1", "2", "3", "4", "5"]));
        }
        assert_eq!(store.count(), 7);
    }

    #[test]
    fn test_clear_last_on_empty_is_noop() {
        let mut store = CheckpointStore::new();
        assert!(store.clear_last().is_none());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_clear_last_removes_newest() {
        let mut store = CheckpointStore::new();
        store.save(values(["1", "2", "3", "4", "5"]));
        store.save(values(["10", "20", "30", "40", "50"]));
        let removed = store.clear_last().unwrap();
        assert_eq!(removed.value(Axis::X), "10");
        assert_eq!(store.count(), 1);
        assert_eq!(store.as_slice()[0].value(Axis::G), "5");
    }

    #[test]
    fn test_save_accepts_empty_and_raw_text() {
        let mut store = CheckpointStore::new();
        store.save(values(["", "abc", " 3", "4.", "-"]));
        let cp = &store.as_slice()[0];
        assert_eq!(cp.value(Axis::X), "");
        assert_eq!(cp.value(Axis::Y), "abc");
        assert_eq!(cp.numeric(), Err(Axis::X));
    }

    #[test]
    fn test_replace_all_discards_previous() {
        let mut store = CheckpointStore::new();
        store.save(values(["1", "1", "1", "1", "1"]));
        store.replace_all(vec![
            Checkpoint::from_numbers([2.0; 5]),
            Checkpoint::from_numbers([3.5; 5]),
        ]);
        assert_eq!(store.count(), 2);
        assert_eq!(store.as_slice()[0].value(Axis::A), "2.0");
        assert_eq!(store.as_slice()[1].numeric().unwrap(), [3.5; 5]);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1.0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-0.0), "-0.0");
        assert_eq!(format_number(0.0001), "0.0001");
        assert_eq!(format_number(1e-7), "1e-07");
        assert_eq!(format_number(1e15), "1000000000000000.0");
        assert_eq!(format_number(1e16), "1e+16");
        assert_eq!(format_number(-1.5e20), "-1.5e+20");
        assert_eq!(format_number(1e300), "1e+300");
        assert_eq!(format_number(f64::INFINITY), "inf");
    }

    #[test]
    fn test_axis_order() {
        let labels: Vec<&str> = Axis::ALL.iter().map(|a| a.label()).collect();
        assert_eq!(labels, ["X", "Y", "Z", "A", "G"]);
        assert_eq!(Axis::G.index(), 4);
    }
}
