use crate::markdown::render_markdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollapseState {
    #[default]
    Collapsed,
    Expanded,
}

impl CollapseState {
    pub fn toggled(self) -> Self {
        match self {
            Self::Collapsed => Self::Expanded,
            Self::Expanded => Self::Collapsed,
        }
    }
}

/// A system message shown either as its first line or in full.
/// Starts collapsed and changes state only through [`toggle`](Self::toggle).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsibleMessage {
    summary_html: String,
    full_html: String,
    state: CollapseState,
}

impl CollapsibleMessage {
    pub fn new(text: &str) -> Self {
        let first_line = text.lines().next().unwrap_or_default();
        Self {
            summary_html: render_markdown(first_line),
            full_html: render_markdown(text),
            state: CollapseState::Collapsed,
        }
    }

    pub fn toggle(&mut self) -> CollapseState {
        self.state = self.state.toggled();
        self.state
    }

    pub fn state(&self) -> CollapseState {
        self.state
    }

    /// Label for the control that would perform the next toggle.
    pub fn button_label(&self) -> &'static str {
        match self.state {
            CollapseState::Collapsed => "Expand",
            CollapseState::Expanded => "Collapse",
        }
    }

    pub fn summary_html(&self) -> &str {
        &self.summary_html
    }

    pub fn full_html(&self) -> &str {
        &self.full_html
    }

    pub fn summary_visible(&self) -> bool {
        self.state == CollapseState::Collapsed
    }

    pub fn full_visible(&self) -> bool {
        self.state == CollapseState::Expanded
    }

    /// Whichever rendering is currently shown.
    pub fn visible_html(&self) -> &str {
        match self.state {
            CollapseState::Collapsed => &self.summary_html,
            CollapseState::Expanded => &self.full_html,
        }
    }

    /// Both renderings with the hidden one styled `display: none`.
    pub fn to_html(&self) -> String {
        let hidden = |visible: bool| if visible { "" } else { " style=\"display: none\"" };
        format!(
            "<div class=\"message-text system-message\">\
             <div class=\"summary-markdown\"{}>{}</div>\
             <div class=\"original-markdown\"{}>{}</div>\
             <button class=\"expand-button\">{}</button>\
             </div>",
            hidden(self.summary_visible()),
            self.summary_html,
            hidden(self.full_visible()),
            self.full_html,
            self.button_label(),
        )
    }
}
