use html_escape::encode_double_quoted_attribute;

use parley_types::models::{ChatMessage, Role};

use crate::collapse::CollapsibleMessage;
use crate::highlight::highlight;
use crate::markdown::render_markdown;
use crate::segment::{Segment, split_segments};

/// Display form of one segment. Rebuilt on every render, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedBlock {
    Code {
        role: Role,
        language: String,
        highlighted_html: String,
    },
    Prose {
        html: String,
    },
}

impl RenderedBlock {
    /// Header label above a code block, `"{role} - {language}"`.
    pub fn header(&self) -> Option<String> {
        match self {
            Self::Code { role, language, .. } => Some(format!("{} - {}", role, label(language))),
            Self::Prose { .. } => None,
        }
    }

    pub fn to_html(&self) -> String {
        match self {
            Self::Code {
                language,
                highlighted_html,
                ..
            } => format!(
                "<div class=\"code-block\">\
                 <div class=\"code-block-header\">{}</div>\
                 <pre class=\"language-{} dark line-numbers\" data-line><code>{}</code></pre>\
                 </div>",
                self.header().unwrap_or_default(),
                encode_double_quoted_attribute(label(language)),
                highlighted_html,
            ),
            Self::Prose { html } => html.clone(),
        }
    }
}

fn label(language: &str) -> &str {
    if language.is_empty() { "text" } else { language }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedBody {
    Blocks(Vec<RenderedBlock>),
    System(CollapsibleMessage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub role: Role,
    pub avatar_url: Option<String>,
    pub body: RenderedBody,
    raw_text: String,
}

impl RenderedMessage {
    /// Text placed on the clipboard by the copy button.
    pub fn copy_text(&self) -> &str {
        &self.raw_text
    }

    pub fn to_html(&self) -> String {
        let avatar_style = match self.avatar_url.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => format!("background-image: url({})", encode_double_quoted_attribute(url)),
            None => "background-color: green".to_string(),
        };

        let body = match &self.body {
            RenderedBody::Blocks(blocks) => {
                let inner: String = blocks.iter().map(RenderedBlock::to_html).collect();
                format!("<div class=\"message-text\">{inner}</div>")
            }
            RenderedBody::System(collapsible) => collapsible.to_html(),
        };

        format!(
            "<div class=\"message-container\">\
             <p class=\"role\">{}</p>\
             <span class=\"avatar\" style=\"{}\"></span>\
             {}\
             <button class=\"copy-button\">Copy</button>\
             </div>",
            self.role, avatar_style, body,
        )
    }
}

/// Render every segment of `text` in order.
pub fn render_blocks(text: &str, role: Role) -> Vec<RenderedBlock> {
    split_segments(text, role)
        .into_iter()
        .map(|segment| match segment {
            Segment::Code {
                language, content, ..
            } => RenderedBlock::Code {
                role,
                language: language.to_string(),
                highlighted_html: highlight(content, language),
            },
            Segment::Prose(text) => RenderedBlock::Prose {
                html: render_markdown(text),
            },
        })
        .collect()
}

/// System messages become collapsible; everything else is rendered as blocks.
pub fn render_message(message: &ChatMessage) -> RenderedMessage {
    let body = match message.role {
        Role::System => RenderedBody::System(CollapsibleMessage::new(&message.text)),
        role => RenderedBody::Blocks(render_blocks(&message.text, role)),
    };

    RenderedMessage {
        role: message.role,
        avatar_url: message.avatar_url.clone(),
        body,
        raw_text: message.text.clone(),
    }
}
