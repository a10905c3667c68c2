//! pad slot assignment

use crate::PAD_COUNT;

use std::collections::HashMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Play,
    Record,
    Edit,
}

/// sample key per pad, plus the inverse lookup
///
/// Both directions are updated together, so a sample sits on at most one
/// pad and a pad holds at most one sample.
#[derive(Clone, Debug, Default)]
pub struct PadMap {
    slots: [Option<String>; PAD_COUNT],
    by_sample: HashMap<String, usize>,
}

impl PadMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// put `sample` on `pad`, evicting whatever either of them held before;
    /// out-of-range pads are ignored
    pub fn assign(&mut self, sample: &str, pad: usize) {
        if pad >= PAD_COUNT {
            return;
        }
        if let Some(prev) = self.by_sample.remove(sample) {
            self.slots[prev] = None;
        }
        if let Some(evicted) = self.slots[pad].take() {
            self.by_sample.remove(&evicted);
        }
        self.slots[pad] = Some(sample.to_string());
        self.by_sample.insert(sample.to_string(), pad);
    }

    /// empty `pad`, returning the sample it held
    pub fn clear(&mut self, pad: usize) -> Option<String> {
        let sample = self.slots.get_mut(pad)?.take()?;
        self.by_sample.remove(&sample);
        Some(sample)
    }

    pub fn pad_of(&self, sample: &str) -> Option<usize> {
        self.by_sample.get(sample).copied()
    }

    pub fn sample_at(&self, pad: usize) -> Option<&str> {
        self.slots.get(pad)?.as_deref()
    }

    pub fn slots(&self) -> &[Option<String>; PAD_COUNT] {
        &self.slots
    }

    pub fn is_empty(&self) -> bool {
        self.by_sample.is_empty()
    }

    /// row label for a sample: `PAD n` or `NONE`
    pub fn label(&self, sample: &str) -> String {
        match self.pad_of(sample) {
            Some(pad) => format!("PAD {}", pad),
            None => "NONE".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_inverse(map: &PadMap) {
        for (pad, slot) in map.slots().iter().enumerate() {
            if let Some(sample) = slot {
                assert_eq!(map.pad_of(sample), Some(pad));
            }
        }
        for (sample, pad) in map.by_sample.iter() {
            assert_eq!(map.sample_at(*pad), Some(sample.as_str()));
        }
    }

    #[test]
    fn assign_and_lookup() {
        let mut map = PadMap::new();
        assert!(map.is_empty());
        map.assign("kick", 0);
        map.assign("snare", 5);
        assert_eq!(map.sample_at(0), Some("kick"));
        assert_eq!(map.pad_of("snare"), Some(5));
        assert_eq!(map.label("snare"), "PAD 5");
        assert_eq!(map.label("hat"), "NONE");
        assert_inverse(&map);
    }

    #[test]
    fn reassigning_sample_moves_it() {
        let mut map = PadMap::new();
        map.assign("kick", 0);
        map.assign("kick", 3);
        assert_eq!(map.sample_at(0), None);
        assert_eq!(map.pad_of("kick"), Some(3));
        assert_inverse(&map);
    }

    #[test]
    fn assigning_taken_pad_evicts() {
        let mut map = PadMap::new();
        map.assign("kick", 2);
        map.assign("snare", 2);
        assert_eq!(map.pad_of("kick"), None);
        assert_eq!(map.sample_at(2), Some("snare"));
        assert_inverse(&map);
    }

    #[test]
    fn clear_and_bounds() {
        let mut map = PadMap::new();
        map.assign("kick", PAD_COUNT);
        assert!(map.is_empty());
        map.assign("kick", PAD_COUNT - 1);
        assert_eq!(map.clear(PAD_COUNT - 1), Some("kick".to_string()));
        assert_eq!(map.clear(PAD_COUNT - 1), None);
        assert_eq!(map.clear(PAD_COUNT + 4), None);
        assert!(map.is_empty());
    }
}
