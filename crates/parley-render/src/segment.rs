use std::sync::LazyLock;

use regex::Regex;

use parley_types::models::Role;

/// Shortest run from an opening fence to the next closing fence.
static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("valid fence regex"));

/// Language tag directly after the opening fence, and the one separator that
/// ends it: the rest of the line, a single space or tab, or nothing.
static LANGUAGE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\w+#.-]+)(?:[ \t]*\r?\n|[ \t]|$)").expect("valid tag regex")
});

const FENCE: &str = "```";

/// A contiguous slice of message text. Every segment borrows from the input,
/// so concatenating `raw()` over a split reproduces the input exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Prose(&'a str),
    Code {
        /// Full fenced text including both fences.
        raw: &'a str,
        /// Empty when the opening fence carries no tag.
        language: &'a str,
        /// Body between the fences, minus the tag line and the newline
        /// before the closing fence.
        content: &'a str,
    },
}

impl<'a> Segment<'a> {
    pub fn raw(&self) -> &'a str {
        match self {
            Self::Prose(text) => text,
            Self::Code { raw, .. } => raw,
        }
    }

    pub fn is_code(&self) -> bool {
        matches!(self, Self::Code { .. })
    }
}

/// Split `text` into prose and code segments in original order.
///
/// System text is never split: it comes back as a single prose segment even
/// if it contains fences. An opening fence without a closing fence stays in
/// the surrounding prose.
pub fn split_segments(text: &str, role: Role) -> Vec<Segment<'_>> {
    if role == Role::System {
        return vec![Segment::Prose(text)];
    }

    let mut segments = Vec::new();
    let mut cursor = 0;

    for block in FENCED_BLOCK.find_iter(text) {
        if block.start() > cursor {
            segments.push(Segment::Prose(&text[cursor..block.start()]));
        }
        segments.push(parse_code_block(block.as_str()));
        cursor = block.end();
    }

    if cursor < text.len() {
        segments.push(Segment::Prose(&text[cursor..]));
    }

    segments
}

fn parse_code_block(raw: &str) -> Segment<'_> {
    let inner = &raw[FENCE.len()..raw.len() - FENCE.len()];

    let (language, body) = match LANGUAGE_TAG.captures(inner) {
        Some(caps) => {
            let tag = caps.get(1).map_or("", |m| m.as_str());
            let end = caps.get(0).map_or(0, |m| m.end());
            (tag, &inner[end..])
        }
        None => (
            "",
            inner
                .strip_prefix("\r\n")
                .or_else(|| inner.strip_prefix('\n'))
                .unwrap_or(inner),
        ),
    };

    let content = body
        .strip_suffix("\r\n")
        .or_else(|| body.strip_suffix('\n'))
        .unwrap_or(body);

    Segment::Code {
        raw,
        language,
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejoin(segments: &[Segment<'_>]) -> String {
        segments.iter().map(Segment::raw).collect()
    }

    #[test]
    fn prose_code_prose() {
        let text = "hello ```js\nconsole.log(1)\n``` bye";
        let segments = split_segments(text, Role::User);

        assert_eq!(
            segments,
            vec![
                Segment::Prose("hello "),
                Segment::Code {
                    raw: "```js\nconsole.log(1)\n```",
                    language: "js",
                    content: "console.log(1)",
                },
                Segment::Prose(" bye"),
            ]
        );
    }

    #[test]
    fn system_role_ignores_fences() {
        let text = "hello ```js\nconsole.log(1)\n``` bye";
        assert_eq!(split_segments(text, Role::System), vec![Segment::Prose(text)]);
    }

    #[test]
    fn unterminated_fence_stays_prose() {
        let text = "partial ```rust\nfn main() {";
        assert_eq!(split_segments(text, Role::Assistant), vec![Segment::Prose(text)]);
    }

    #[test]
    fn trailing_unterminated_fence_after_complete_block() {
        let text = "```a\nx\n``` and ```b\ny";
        let segments = split_segments(text, Role::Assistant);
        assert_eq!(segments.len(), 2);
        assert!(segments[0].is_code());
        assert_eq!(segments[1], Segment::Prose(" and ```b\ny"));
    }

    #[test]
    fn untagged_block_has_empty_language() {
        let segments = split_segments("```\nplain code\n```", Role::User);
        assert_eq!(
            segments,
            vec![Segment::Code {
                raw: "```\nplain code\n```",
                language: "",
                content: "plain code",
            }]
        );
    }

    #[test]
    fn single_line_block_keeps_its_tag() {
        let segments = split_segments("```js console.log(1)```", Role::User);
        assert_eq!(
            segments,
            vec![Segment::Code {
                raw: "```js console.log(1)```",
                language: "js",
                content: "console.log(1)",
            }]
        );
    }

    #[test]
    fn only_one_separator_after_tag_is_stripped() {
        let segments = split_segments("```py\tx = 1```", Role::User);
        let Segment::Code { language, content, .. } = segments[0] else {
            panic!("expected code segment");
        };
        assert_eq!(language, "py");
        assert_eq!(content, "x = 1");

        let segments = split_segments("```rust  \n    indented\n```", Role::User);
        let Segment::Code { language, content, .. } = segments[0] else {
            panic!("expected code segment");
        };
        assert_eq!(language, "rust");
        assert_eq!(content, "    indented");
    }

    #[test]
    fn fence_starting_with_symbol_is_untagged() {
        let segments = split_segments("``` (1 + 2)```", Role::User);
        let Segment::Code { language, content, .. } = segments[0] else {
            panic!("expected code segment");
        };
        assert_eq!(language, "");
        assert_eq!(content, " (1 + 2)");
    }

    #[test]
    fn adjacent_blocks_have_no_empty_prose_between() {
        let segments = split_segments("```a\n1\n``````b\n2\n```", Role::User);
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(Segment::is_code));
    }

    #[test]
    fn empty_text_has_no_segments() {
        assert!(split_segments("", Role::User).is_empty());
    }

    #[test]
    fn crlf_line_endings() {
        let segments = split_segments("```py\r\nprint(1)\r\n```", Role::User);
        let Segment::Code { language, content, .. } = segments[0] else {
            panic!("expected code segment");
        };
        assert_eq!(language, "py");
        assert_eq!(content, "print(1)");
    }

    #[test]
    fn rejoined_segments_reproduce_input() {
        let inputs = [
            "",
            "no fences at all\nsecond line",
            "hello ```js\nconsole.log(1)\n``` bye",
            "```\n```",
            "a ```x``` b ```y\nz\n``` c ```unterminated",
            "multi\n\n```rust\nfn main() {}\n```\n\ntrailing\n",
            "unicode ✓ ```é\nñ\n``` ✓",
        ];
        for input in inputs {
            for role in [Role::User, Role::Assistant, Role::System] {
                assert_eq!(rejoin(&split_segments(input, role)), input, "{input:?} as {role}");
            }
        }
    }

    #[test]
    fn splitting_is_deterministic() {
        let text = "a ```x\n1\n``` b ```y\n2\n``` c";
        assert_eq!(split_segments(text, Role::User), split_segments(text, Role::User));
    }
}
