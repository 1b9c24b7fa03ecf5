use std::sync::LazyLock;

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use tracing::debug;

/// Bundled syntax definitions, loaded once.
static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Pick a syntax for `code`: the fence tag first, then first-line detection
/// (shebangs, modelines, `<?php` and the like), then plain text.
fn resolve_syntax<'s>(set: &'s SyntaxSet, code: &str, language: &str) -> &'s SyntaxReference {
    let by_tag = (!language.is_empty())
        .then(|| set.find_syntax_by_token(language))
        .flatten();

    by_tag
        .or_else(|| set.find_syntax_by_first_line(code))
        .unwrap_or_else(|| set.find_syntax_plain_text())
}

/// Name of the syntax that `highlight` would use for this code and tag.
pub fn detected_language(code: &str, language: &str) -> &'static str {
    resolve_syntax(&SYNTAX_SET, code, language).name.as_str()
}

/// Highlight `code` into HTML spans with space-separated scope classes
/// (`<span class="source rust">`). The output is already escaped.
pub fn highlight(code: &str, language: &str) -> String {
    let set = &*SYNTAX_SET;
    let syntax = resolve_syntax(set, code, language);

    let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, set, ClassStyle::Spaced);
    for line in LinesWithEndings::from(code) {
        if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
            debug!("Highlighting as {} failed: {}", syntax.name, e);
            return html_escape::encode_text(code).into_owned();
        }
    }
    generator.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tag_selects_syntax() {
        assert_eq!(detected_language("fn main() {}", "rust"), "Rust");
        assert_eq!(detected_language("console.log(1)", "js"), "JavaScript");
    }

    #[test]
    fn unknown_tag_falls_back_to_first_line() {
        assert_eq!(
            detected_language("#!/usr/bin/env python\nprint(1)\n", "nonsense"),
            "Python"
        );
    }

    #[test]
    fn undetectable_code_is_plain_text() {
        assert_eq!(detected_language("just words", ""), "Plain Text");
    }

    #[test]
    fn output_is_classed_spans() {
        let html = highlight("fn main() {}\n", "rust");
        assert!(html.contains("<span class=\"source rust\">"), "{html}");
        assert!(html.contains("main"));
    }

    #[test]
    fn markup_in_code_is_escaped() {
        let html = highlight("<script>alert(1)</script>", "");
        assert!(!html.contains("<script>"), "{html}");
        assert!(html.contains("&lt;script&gt;"), "{html}");
    }
}
