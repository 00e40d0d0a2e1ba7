use tui::layout::{Constraint, Layout, Rect, Size};
pub const TAB_BAR_HEIGHT: u16 = 3;
/// Share of the screen height given to the log pane when it is open.
pub const LOG_PANE_PERCENT: u16 = 30;

/// Pre-computed layout areas for the main draw loop.
#[derive(Debug, PartialEq)]
pub struct LayoutAreas {
    pub tab_bar: [Rect; 2],
    pub main: Rect,
    pub logs: Option<Rect>,
}

impl LayoutAreas {
    pub fn new(size: Size) -> Self {
        let rect = Rect::new(0, 0, size.width, size.height);
        Self::from_rect(rect, false, false)
    }

    pub fn update(&mut self, area: Rect, full_screen: bool, show_logs: bool) {
        *self = Self::from_rect(area, full_screen, show_logs);
    }

    fn from_rect(area: Rect, full_screen: bool, show_logs: bool) -> Self {
        let (tab_bar, body) = if full_screen {
            ([Rect::ZERO, Rect::ZERO], area)
        } else {
            let [tab, body] =
                Layout::vertical([Constraint::Length(TAB_BAR_HEIGHT), Constraint::Fill(1)]).areas(area);
            (Self::split_tab_bar(tab), body)
        };

        if !show_logs {
            return LayoutAreas { tab_bar, main: body, logs: None };
        }

        let [main, logs] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Percentage(LOG_PANE_PERCENT),
        ])
        .areas(body);
        LayoutAreas { tab_bar, main, logs: Some(logs) }
    }

    fn split_tab_bar(area: Rect) -> [Rect; 2] {
        Layout::horizontal([Constraint::Percentage(85), Constraint::Percentage(15)]).areas(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_screen_hides_the_tab_bar() {
        let mut layout = LayoutAreas::new(Size::new(100, 40));
        layout.update(Rect::new(0, 0, 100, 40), true, false);
        assert_eq!(layout.tab_bar, [Rect::ZERO, Rect::ZERO]);
        assert_eq!(layout.main, Rect::new(0, 0, 100, 40));
        assert!(layout.logs.is_none());
    }

    #[test]
    fn log_pane_takes_the_bottom_of_the_body() {
        let mut layout = LayoutAreas::new(Size::new(100, 43));
        layout.update(Rect::new(0, 0, 100, 43), false, true);
        let logs = layout.logs.expect("log pane");
        assert_eq!(layout.main.y, TAB_BAR_HEIGHT);
        assert_eq!(layout.main.bottom(), logs.y);
        assert_eq!(logs.bottom(), 43);
    }
}
