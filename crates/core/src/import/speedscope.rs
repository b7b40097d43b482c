use serde::Deserialize;
use thiserror::Error;

use emberview_protocol::ProfilingUnit;

use crate::import::ProfileGroup;
use crate::model::{EventKind, Frame, FrameEvent, FrameId, Profile, Sample};

#[derive(Debug, Error)]
pub enum SpeedscopeImportError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no profiles present")]
    Empty,
}

/// Speedscope file format — supports evented and sampled profile types.
/// Schema: https://www.speedscope.app/file-format-spec.json
#[derive(Debug, Deserialize)]
struct SpeedscopeFile {
    #[serde(rename = "$schema")]
    #[allow(dead_code)]
    schema: Option<String>,
    #[serde(default)]
    shared: Option<SharedData>,
    profiles: Vec<SpeedscopeProfile>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SharedData {
    frames: Vec<SpeedscopeFrame>,
}

#[derive(Debug, Deserialize)]
struct SpeedscopeFrame {
    name: String,
    #[serde(default)]
    file: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum SpeedscopeProfile {
    #[serde(rename = "evented")]
    Evented {
        name: Option<String>,
        unit: String,
        #[serde(rename = "startValue")]
        start_value: f64,
        #[serde(rename = "endValue")]
        end_value: f64,
        events: Vec<SpeedscopeEvent>,
    },
    #[serde(rename = "sampled")]
    Sampled {
        name: Option<String>,
        unit: String,
        #[serde(rename = "startValue")]
        #[allow(dead_code)]
        start_value: f64,
        #[serde(rename = "endValue")]
        #[allow(dead_code)]
        end_value: f64,
        samples: Vec<Vec<usize>>,
        weights: Vec<f64>,
    },
}

#[derive(Debug, Deserialize)]
struct SpeedscopeEvent {
    #[serde(rename = "type")]
    event_type: String, // "O" (open) or "C" (close)
    frame: usize,
    at: f64,
}

/// Map a speedscope unit string to a profiling unit plus the factor that
/// converts raw values into it. Seconds scale into milliseconds; unknown
/// units become plain counts.
fn parse_unit(unit: &str) -> (ProfilingUnit, f64) {
    match unit {
        "nanoseconds" => (ProfilingUnit::Nanoseconds, 1.0),
        "microseconds" => (ProfilingUnit::Microseconds, 1.0),
        "milliseconds" => (ProfilingUnit::Milliseconds, 1.0),
        "seconds" => (ProfilingUnit::Milliseconds, 1e3),
        _ => (ProfilingUnit::Count, 1.0),
    }
}

/// Build the frame table, padding with placeholders when the profile
/// references indices beyond the shared table.
fn frame_table(shared: &[SpeedscopeFrame], max_index: Option<usize>) -> Vec<Frame> {
    let mut frames: Vec<Frame> = shared
        .iter()
        .map(|entry| {
            let mut frame = Frame::new(entry.name.clone());
            frame.file = entry.file.clone();
            frame
        })
        .collect();
    if let Some(max) = max_index {
        while frames.len() <= max {
            frames.push(Frame::new(format!("frame-{}", frames.len())));
        }
    }
    frames
}

/// Parse a speedscope JSON file into a profile group, one profile per
/// speedscope profile entry (typically one per thread).
pub fn parse_speedscope(data: &[u8]) -> Result<ProfileGroup, SpeedscopeImportError> {
    let file: SpeedscopeFile = serde_json::from_slice(data)?;
    if file.profiles.is_empty() {
        return Err(SpeedscopeImportError::Empty);
    }
    let shared = file.shared.as_ref().map(|s| &s.frames[..]).unwrap_or(&[]);

    let mut profiles = Vec::with_capacity(file.profiles.len());
    for entry in &file.profiles {
        match entry {
            SpeedscopeProfile::Evented {
                name,
                unit,
                start_value,
                end_value,
                events,
            } => {
                let (unit, scale) = parse_unit(unit);
                let max_index = events.iter().map(|event| event.frame).max();
                let frames = frame_table(shared, max_index);
                let frame_events: Vec<FrameEvent> = events
                    .iter()
                    .filter_map(|event| {
                        let kind = match event.event_type.as_str() {
                            "O" => EventKind::Open,
                            "C" => EventKind::Close,
                            _ => return None,
                        };
                        Some(FrameEvent {
                            kind,
                            frame: FrameId(event.frame),
                            at: event.at * scale,
                        })
                    })
                    .collect();
                profiles.push(Profile::from_events(
                    name.clone(),
                    unit,
                    frames,
                    &frame_events,
                    start_value * scale,
                    end_value * scale,
                ));
            }
            SpeedscopeProfile::Sampled {
                name,
                unit,
                samples,
                weights,
                ..
            } => {
                let (unit, scale) = parse_unit(unit);
                let max_index = samples.iter().flatten().copied().max();
                let frames = frame_table(shared, max_index);
                let samples: Vec<Sample> = samples
                    .iter()
                    .enumerate()
                    .map(|(index, stack)| Sample {
                        stack: stack.iter().map(|&frame| FrameId(frame)).collect(),
                        weight: weights.get(index).copied().unwrap_or(1.0) * scale,
                        profile_ids: Vec::new(),
                    })
                    .collect();
                profiles.push(Profile::from_samples(name.clone(), unit, frames, &samples));
            }
        }
    }

    Ok(ProfileGroup {
        name: file.name,
        profiles,
    })
}
