use std::collections::BTreeMap;

/// Highest value a 7-bit controller can carry.
pub const CC_MAX: u8 = 127;

/// One recorded control change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CcPoint {
    pub time: f64, // in seconds
    pub value: u8,
}

/// Control change values per channel and controller, in the order they occur.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Timeline {
    channels: BTreeMap<u8, BTreeMap<u8, Vec<CcPoint>>>,
}

impl Timeline {
    pub(crate) fn push(&mut self, channel: u8, controller: u8, time: f64, value: u8) {
        self.channels
            .entry(channel)
            .or_default()
            .entry(controller)
            .or_default()
            .push(CcPoint { time, value });
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn channels(&self) -> impl Iterator<Item = u8> + '_ {
        self.channels.keys().copied()
    }

    pub fn controllers(&self, channel: u8) -> impl Iterator<Item = u8> + '_ {
        self.channels
            .get(&channel)
            .into_iter()
            .flat_map(|controls| controls.keys().copied())
    }

    /// Every (channel, controller) pair that has at least one value.
    pub fn pairs(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.channels.iter().flat_map(|(&channel, controls)| {
            controls.keys().map(move |&controller| (channel, controller))
        })
    }

    pub fn series(&self, channel: u8, controller: u8) -> Option<&[CcPoint]> {
        self.channels
            .get(&channel)
            .and_then(|controls| controls.get(&controller))
            .map(Vec::as_slice)
    }

    /// Time of the last recorded point across all series.
    pub fn duration(&self) -> f64 {
        self.channels
            .values()
            .flat_map(|controls| controls.values())
            .filter_map(|points| points.last())
            .map(|p| p.time)
            .fold(0.0, f64::max)
    }

    /// Most recent value at or before `time`.
    pub fn value_at(&self, channel: u8, controller: u8, time: f64) -> Option<u8> {
        self.series(channel, controller)
            .and_then(|points| point_at(points, time))
            .map(|p| p.value)
    }

    /// Like [`Timeline::value_at`] but looks at every channel and returns the
    /// value from whichever channel changed most recently.
    pub fn latest_at(&self, controller: u8, time: f64) -> Option<u8> {
        self.channels
            .values()
            .filter_map(|controls| controls.get(&controller))
            .filter_map(|points| point_at(points, time))
            .fold(None, |best: Option<CcPoint>, p| match best {
                Some(b) if b.time > p.time => Some(b),
                _ => Some(*p),
            })
            .map(|p| p.value)
    }

    /// Pins the timeline to a video frame so values can be looked up per frame.
    pub fn hold(&self, frame: u32, fps: f64) -> Snapshot<'_> {
        let time = if fps > 0.0 { frame as f64 / fps } else { 0.0 };
        Snapshot {
            timeline: self,
            time,
        }
    }
}

pub(crate) fn point_at(points: &[CcPoint], time: f64) -> Option<&CcPoint> {
    // times are non-decreasing, so everything at or before `time` is a prefix
    let idx = points.partition_point(|p| p.time <= time);
    idx.checked_sub(1).map(|i| &points[i])
}

/// The timeline frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    timeline: &'a Timeline,
    time: f64,
}

impl Snapshot<'_> {
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn value(&self, channel: u8, controller: u8) -> Option<u8> {
        self.timeline.value_at(channel, controller, self.time)
    }

    /// Controller input normalized to `[0, 1]`; `0.0` until the controller
    /// has been seen on any channel.
    pub fn ci(&self, controller: u8) -> f64 {
        self.timeline
            .latest_at(controller, self.time)
            .map(|v| v as f64 / CC_MAX as f64)
            .unwrap_or(0.0)
    }
}
