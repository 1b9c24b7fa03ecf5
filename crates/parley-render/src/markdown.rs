use pulldown_cmark::{Event, Options, Parser, html};

/// Escape markup-significant characters, then render as Markdown with
/// single newlines turned into `<br />`.
pub fn render_markdown(text: &str) -> String {
    let escaped = html_escape::encode_text(text);

    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let events = Parser::new_ext(&escaped, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut out = String::with_capacity(escaped.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}
