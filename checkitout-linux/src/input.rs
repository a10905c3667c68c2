//! pad input from the keyboard and from midi controllers

use crate::tui;

use checkitout_core::PAD_COUNT;
use color_eyre::Result;
use midir::{MidiInput, MidiInputConnection};
use midly::{live::LiveEvent, MidiMessage};
use std::sync::mpsc::Sender;

const CLIENT_NAME: &str = "checkitout";

mod keys {
    /// row-major 4x4 grid, pad 0 top left
    pub const PADS: [char; super::PAD_COUNT] = [
        '1', '2', '3', '4', //
        'q', 'w', 'e', 'r', //
        'a', 's', 'd', 'f', //
        'z', 'x', 'c', 'v', //
    ];
}

/// pad bound to a keyboard character, either case
pub fn key_pad(key: char) -> Option<usize> {
    let key = key.to_ascii_lowercase();
    keys::PADS.iter().position(|v| *v == key)
}

pub fn pad_key(pad: usize) -> Option<char> {
    keys::PADS.get(pad).copied()
}

/// pad for a note-on at or above `base_note`; note-ons with zero velocity are note-offs
pub fn midi_pad(message: &[u8], base_note: u8) -> Option<usize> {
    match LiveEvent::parse(message).ok()? {
        LiveEvent::Midi {
            message: MidiMessage::NoteOn { key, vel },
            ..
        } if vel.as_int() > 0 => key
            .as_int()
            .checked_sub(base_note)
            .map(usize::from)
            .filter(|v| *v < PAD_COUNT),
        _ => None,
    }
}

/// listen on every midi input port; connections close when dropped
pub fn connect(base_note: u8, tui_tx: Sender<tui::Cmd>) -> Result<Vec<MidiInputConnection<()>>> {
    let probe = MidiInput::new(CLIENT_NAME)?;
    let mut connections = Vec::new();
    for port in probe.ports() {
        let name = probe
            .port_name(&port)
            .unwrap_or_else(|_| "unknown".to_string());
        let tx = tui_tx.clone();
        let midi_in = MidiInput::new(CLIENT_NAME)?;
        match midi_in.connect(
            &port,
            "pads",
            move |_, message, _| {
                if let Some(pad) = midi_pad(message, base_note) {
                    let _ = tx.send(tui::Cmd::Pad(pad));
                }
            },
            (),
        ) {
            Ok(connection) => {
                log::info!("listening on midi port {name}");
                connections.push(connection);
            }
            Err(e) => {
                log::warn!("midi port {name}: {e}");
                let _ = tui_tx.send(tui::Cmd::Log(format!("midi port {name} unavailable")));
            }
        }
    }
    Ok(connections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_grid() {
        assert_eq!(key_pad('1'), Some(0));
        assert_eq!(key_pad('R'), Some(7));
        assert_eq!(key_pad('v'), Some(15));
        assert_eq!(key_pad('p'), None);
        for pad in 0..PAD_COUNT {
            assert_eq!(pad_key(pad).and_then(key_pad), Some(pad));
        }
        assert_eq!(pad_key(PAD_COUNT), None);
    }

    #[test]
    fn note_on_maps_to_pad() {
        // channel 10 note-on, the usual drum pad channel
        assert_eq!(midi_pad(&[0x99, 36, 100], 36), Some(0));
        assert_eq!(midi_pad(&[0x90, 51, 1], 36), Some(15));
        assert_eq!(midi_pad(&[0x90, 52, 1], 36), None);
        assert_eq!(midi_pad(&[0x90, 35, 1], 36), None);
    }

    #[test]
    fn other_messages_ignored() {
        assert_eq!(midi_pad(&[0x90, 40, 0], 36), None);
        assert_eq!(midi_pad(&[0x80, 40, 64], 36), None);
        assert_eq!(midi_pad(&[0xb0, 7, 127], 36), None);
        assert_eq!(midi_pad(&[0xf8], 36), None);
        assert_eq!(midi_pad(&[], 36), None);
    }
}
