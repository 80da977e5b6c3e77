//! Reads timed note events and tempo from a Standard MIDI File.

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};

use crate::foundation::error::{MidirollError, MidirollResult};

/// Tempo used when the file carries no Set Tempo event.
pub const DEFAULT_BPM: f64 = 120.0;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A single note in the tick domain, as read from the source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteEvent {
    pub start: u64,
    pub end: u64,
    pub pitch: u8,
    pub name: String,
}

impl NoteEvent {
    pub fn new(start: u64, end: u64, pitch: u8) -> Self {
        Self {
            start,
            end,
            pitch,
            name: note_name(pitch),
        }
    }
}

/// Everything the renderer needs from a MIDI container.
#[derive(Clone, Debug)]
pub struct ParsedMidi {
    /// Notes sorted by `(start, pitch)`.
    pub notes: Vec<NoteEvent>,
    /// Tempo of the first Set Tempo event, or [`DEFAULT_BPM`].
    pub bpm: f64,
    pub ticks_per_quarter: u16,
    /// Note-ons that never saw a matching note-off.
    pub unmatched: usize,
}

/// Scientific pitch notation, `60 -> "C4"`.
pub fn note_name(pitch: u8) -> String {
    let octave = i32::from(pitch) / 12 - 1;
    format!("{}{}", NOTE_NAMES[usize::from(pitch % 12)], octave)
}

pub fn parse_midi_file(path: &Path) -> MidirollResult<ParsedMidi> {
    let data = std::fs::read(path).map_err(|e| {
        MidirollError::midi(format!("failed to read MIDI file '{}': {e}", path.display()))
    })?;
    parse_midi_bytes(&data)
}

#[tracing::instrument(skip(data), fields(len = data.len()))]
pub fn parse_midi_bytes(data: &[u8]) -> MidirollResult<ParsedMidi> {
    let smf = Smf::parse(data)
        .map_err(|e| MidirollError::midi(format!("failed to parse MIDI: {e}")))?;

    let ticks_per_quarter = match smf.header.timing {
        Timing::Metrical(tpq) => tpq.as_int(),
        Timing::Timecode(_, _) => {
            return Err(MidirollError::midi(
                "SMPTE timecode timing is not supported (need ticks per quarter note)",
            ));
        }
    };
    if ticks_per_quarter == 0 {
        return Err(MidirollError::midi("ticks per quarter note must be non-zero"));
    }

    let mut tempo_us_per_beat: Option<u32> = None;
    let mut notes = Vec::new();
    let mut unmatched = 0usize;

    for (track_idx, track) in smf.tracks.iter().enumerate() {
        let mut abs_ticks = 0u64;
        // Open note-ons per (channel, key), oldest first.
        let mut open: HashMap<(u8, u8), VecDeque<u64>> = HashMap::new();

        for event in track {
            abs_ticks += u64::from(event.delta.as_int());
            match event.kind {
                TrackEventKind::Meta(MetaMessage::Tempo(t)) => {
                    if tempo_us_per_beat.is_none() {
                        tempo_us_per_beat = Some(t.as_int());
                    }
                }
                TrackEventKind::Midi { channel, message } => {
                    let ch = channel.as_int();
                    match message {
                        MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                            open.entry((ch, key.as_int()))
                                .or_default()
                                .push_back(abs_ticks);
                        }
                        MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                            let pitch = key.as_int();
                            if let Some(start) =
                                open.get_mut(&(ch, pitch)).and_then(VecDeque::pop_front)
                            {
                                if abs_ticks > start {
                                    notes.push(NoteEvent::new(start, abs_ticks, pitch));
                                } else {
                                    tracing::debug!(
                                        pitch,
                                        tick = start,
                                        "dropping zero-length note"
                                    );
                                }
                            }
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        for ((ch, pitch), starts) in open {
            for start in starts {
                unmatched += 1;
                tracing::warn!(
                    track = track_idx,
                    channel = ch,
                    pitch,
                    start,
                    "note-on without matching note-off; dropping note"
                );
            }
        }
    }

    notes.sort_by(|a, b| a.start.cmp(&b.start).then(a.pitch.cmp(&b.pitch)));

    let bpm = tempo_us_per_beat
        .filter(|&us| us > 0)
        .map(|us| (60_000_000.0 / f64::from(us) * 1000.0).round() / 1000.0)
        .unwrap_or(DEFAULT_BPM);

    tracing::debug!(
        notes = notes.len(),
        bpm,
        ticks_per_quarter,
        unmatched,
        "parsed MIDI"
    );

    Ok(ParsedMidi {
        notes,
        bpm,
        ticks_per_quarter,
        unmatched,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/midi/source.rs"]
mod tests;
