use crate::formatter::PanelFormatter;
use crate::layout::Panel;
use crate::timeline::{point_at, CcPoint};

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub struct TextPanelFormatter {
    width: usize,
}

impl TextPanelFormatter {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
        }
    }
}

impl PanelFormatter for TextPanelFormatter {
    fn format(&self, panel: &Panel, points: &[CcPoint]) -> String {
        // [C3] Ch 0 CC 3: Volume
        //      00:00.000 - 00:01.000  min 10  max 80  (2 points)
        //      ▁▁▁▁▁▁▁▁████
        let header = format!("[C{}] {}", panel.color, panel.title);
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return format!("{header}\n     (no data)");
        };

        let min = points.iter().map(|p| p.value).min().unwrap_or(0);
        let max = points.iter().map(|p| p.value).max().unwrap_or(0);

        format!(
            "{header}\n     {start} - {end}  min {min}  max {max}  ({count} points)\n     {spark}",
            start = format_clock(first.time),
            end = format_clock(last.time),
            count = points.len(),
            spark = self.sparkline(points, first.time, last.time, panel.y_range),
        )
    }
}

impl TextPanelFormatter {
    fn sparkline(&self, points: &[CcPoint], start: f64, end: f64, y_range: (f64, f64)) -> String {
        let (lo, hi) = y_range;
        let span = end - start;
        (0..self.width)
            .map(|i| {
                let t = if i + 1 < self.width {
                    start + span * i as f64 / (self.width - 1) as f64
                } else {
                    end
                };
                let value = point_at(points, t).map_or(lo, |p| p.value as f64);
                let level = ((value - lo) / (hi - lo) * (BARS.len() - 1) as f64).round();
                BARS[level.clamp(0.0, (BARS.len() - 1) as f64) as usize]
            })
            .collect()
    }
}

// mm:ss.mmm, truncated to the millisecond
fn format_clock(seconds: f64) -> String {
    let millis = (seconds.max(0.0) * 1000.0) as u64;
    format!(
        "{:02}:{:02}.{:03}",
        millis / 60_000,
        millis / 1000 % 60,
        millis % 1000
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Y_RANGE;

    fn panel() -> Panel {
        Panel {
            channel: 0,
            controller: 3,
            row: 0,
            col: 0,
            title: "Ch 0 CC 3".into(),
            color: 0,
            y_range: Y_RANGE,
        }
    }

    fn points() -> Vec<CcPoint> {
        vec![
            CcPoint {
                time: 0.0,
                value: 0,
            },
            CcPoint {
                time: 1.0,
                value: 127,
            },
        ]
    }

    #[test]
    fn last_bar_shows_last_point() {
        let formatter = TextPanelFormatter::new(7);
        for start in [0.1, 0.3, 1.7, 12.345, 1e6 + 0.1] {
            let end = start * 3.0 + 0.7;
            let points = [
                CcPoint {
                    time: start,
                    value: 0,
                },
                CcPoint {
                    time: end,
                    value: 127,
                },
            ];
            let spark = formatter.sparkline(&points, start, end, Y_RANGE);
            assert_eq!(spark.chars().last(), Some('█'), "span {start}..{end}");
            assert_eq!(spark.chars().next(), Some('▁'));
        }
    }

    #[test]
    fn clock() {
        assert_eq!(format_clock(0.0), "00:00.000");
        assert_eq!(format_clock(46.7), "00:46.700");
        assert_eq!(format_clock(125.25), "02:05.250");
    }

    #[test]
    fn sparkline_steps_at_each_point() {
        let formatter = TextPanelFormatter::new(5);
        assert_eq!(formatter.sparkline(&points(), 0.0, 1.0, Y_RANGE), "▁▁▁▁█");
    }

    #[test]
    fn summary_lines() {
        let text = TextPanelFormatter::new(4).format(&panel(), &points());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "[C0] Ch 0 CC 3");
        assert_eq!(lines[1], "     00:00.000 - 00:01.000  min 0  max 127  (2 points)");
        assert_eq!(lines[2], "     ▁▁▁█");
    }

    #[test]
    fn empty_series() {
        let text = TextPanelFormatter::new(4).format(&panel(), &[]);
        assert!(text.ends_with("(no data)"));
    }
}
