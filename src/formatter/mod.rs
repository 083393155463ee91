use crate::layout::Panel;
use crate::timeline::CcPoint;

mod text_formatter;

pub use text_formatter::TextPanelFormatter;

pub trait PanelFormatter {
    fn format(&self, panel: &Panel, points: &[CcPoint]) -> String;
}
