use std::fs;
use std::path::Path;

use midly::{Format, Fps, MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::metadata::Metadata;
use crate::timeline::Timeline;

// microseconds per second
const MICROS_PER_SEC: f64 = 1_000_000.0;
const DEFAULT_BPM: f64 = 120.0;

/// Everything pulled out of one MIDI file.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Extraction {
    pub timeline: Timeline,
    pub metadata: Metadata,
    pub track_title: Option<String>,
}

/// Reads a MIDI file from disk and extracts its control changes and annotations.
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<Extraction> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    extract_bytes(&data)
}

pub fn extract_bytes(data: &[u8]) -> Result<Extraction> {
    let smf = Smf::parse(data)?;
    Ok(Extractor::new(&smf)?.run())
}

#[derive(Debug, Clone, Copy)]
enum Division {
    Metrical { pulses_per_qn: u16 },
    // frames per second * ticks per frame
    Timecode { ticks_per_sec: f64 },
}

/// Single forward pass over a parsed file, events visited in the order
/// they sound.
pub struct Extractor<'a> {
    events: Vec<(u64, TrackEventKind<'a>)>,
    division: Division,
    ticks: u64,
    elapsed_sec: f64,
    current_tempo_micros_per_qn: u32,
    timeline: Timeline,
    metadata: Metadata,
    track_title: Option<String>,
}

impl<'a> Extractor<'a> {
    pub fn new(smf: &Smf<'a>) -> Result<Self> {
        let division = match smf.header.timing {
            Timing::Metrical(ppq) => {
                debug!("Quarter Note Division: {}", ppq.as_int());
                if ppq.as_int() == 0 {
                    return Err(Error::FileFormat("division of 0 ticks per quarter note".into()));
                }
                Division::Metrical {
                    pulses_per_qn: ppq.as_int(),
                }
            }
            Timing::Timecode(fps, ticks_per_frame) => {
                debug!("SMPTE Division: {:?} x {}", fps, ticks_per_frame);
                if ticks_per_frame == 0 {
                    return Err(Error::FileFormat("division of 0 ticks per frame".into()));
                }
                Division::Timecode {
                    ticks_per_sec: frame_rate(fps) * ticks_per_frame as f64,
                }
            }
        };

        let events = match smf.header.format {
            Format::SingleTrack | Format::Parallel => merge_tracks(smf),
            Format::Sequential => {
                debug!("Sequential file, playing {} tracks back to back", smf.tracks.len());
                smf.tracks
                    .iter()
                    .flat_map(|t| t.iter().map(|e| (e.delta.as_int() as u64, e.kind)))
                    .collect()
            }
        };

        Ok(Self {
            events,
            division,
            ticks: 0,
            elapsed_sec: 0.0,
            current_tempo_micros_per_qn: (MICROS_PER_SEC / (DEFAULT_BPM / 60.0)) as u32,
            timeline: Timeline::default(),
            metadata: Metadata::default(),
            track_title: None,
        })
    }

    pub fn run(mut self) -> Extraction {
        let events = std::mem::take(&mut self.events);
        for (delta, kind) in events {
            self.process_event(delta, kind);
        }

        debug!(
            "Processed {} ticks, {:.3}s, {} CC series",
            self.ticks,
            self.elapsed_sec,
            self.timeline.pairs().count()
        );

        Extraction {
            timeline: self.timeline,
            metadata: self.metadata,
            track_title: self.track_title,
        }
    }

    fn process_event(&mut self, dt: u64, event: TrackEventKind<'a>) {
        self.ticks += dt;
        self.elapsed_sec += self.ticks_to_seconds(dt);

        match event {
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::Controller { controller, value },
            } => self.timeline.push(
                channel.as_int(),
                controller.as_int(),
                self.elapsed_sec,
                value.as_int(),
            ),

            TrackEventKind::Meta(MetaMessage::Tempo(new_tempo)) => {
                self.handle_tempo_change(new_tempo.as_int())
            }

            TrackEventKind::Meta(MetaMessage::TrackName(name)) => {
                let name = decode_text(name);
                debug!("-- Track name: {:?}", name);
                self.track_title = Some(name);
            }

            TrackEventKind::Meta(MetaMessage::Text(text)) => {
                self.metadata.apply_text(&decode_text(text))
            }

            _ => trace!("-- EVENT: {:?} {:?}", dt, event),
        }
    }

    fn handle_tempo_change(&mut self, new_tempo_micros_per_qn: u32) {
        let bpm = MICROS_PER_SEC / new_tempo_micros_per_qn as f64 * 60.0;
        debug!("-- Tempo change at {:.3}s: {}", self.elapsed_sec, bpm);
        self.current_tempo_micros_per_qn = new_tempo_micros_per_qn;
    }

    fn ticks_to_seconds(&self, ticks: u64) -> f64 {
        match self.division {
            Division::Metrical { pulses_per_qn } => {
                ticks_to_seconds(ticks, pulses_per_qn, self.current_tempo_micros_per_qn)
            }
            Division::Timecode { ticks_per_sec } => ticks as f64 / ticks_per_sec,
        }
    }
}

/// Interleaves all tracks by absolute tick. Events on the same tick keep
/// track order, then file order.
fn merge_tracks<'a>(smf: &Smf<'a>) -> Vec<(u64, TrackEventKind<'a>)> {
    let mut timed = Vec::new();
    for track in &smf.tracks {
        let mut tick = 0u64;
        for event in track {
            tick += event.delta.as_int() as u64;
            timed.push((tick, event.kind));
        }
    }
    timed.sort_by_key(|(tick, _)| *tick);

    let mut last = 0;
    timed
        .into_iter()
        .map(|(tick, kind)| {
            let dt = tick - last;
            last = tick;
            (dt, kind)
        })
        .collect()
}

fn ticks_to_seconds(ticks: u64, pulses_per_qn: u16, tempo: u32) -> f64 {
    // MIDI tempo is in microseconds per quarter note
    let tempo_in_secs = tempo as f64 / MICROS_PER_SEC;
    let beats = ticks as f64 / pulses_per_qn as f64;
    beats * tempo_in_secs
}

fn frame_rate(fps: Fps) -> f64 {
    match fps {
        Fps::Fps24 => 24.0,
        Fps::Fps25 => 25.0,
        Fps::Fps29 => 29.97,
        Fps::Fps30 => 30.0,
    }
}

// Text meta events have no declared encoding; most tools write UTF-8, older
// ones Latin-1.
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
