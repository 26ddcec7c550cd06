//! Sanitization of raw post bodies
//!
//! Post bodies come out of the content store exactly as authored, and the
//! downstream markup compiler throws on unterminated code fences, stray
//! tag-like text, and brace expressions that are not valid code. Before a
//! body reaches the renderer it goes through a fixed set of rewrite passes
//! that make it safe to compile. The passes are ordered; later ones rely on
//! the normalization done by earlier ones.
//!
//! Each pass is an index-based scan over the text rather than a regex
//! substitution, so there is no backtracking and a second run over already
//! sanitized fences changes nothing.

use lazy_static::lazy_static;
use regex::Regex;

/// Fenced code block marker
const FENCE: &str = "```";

lazy_static! {
    /// Keyword/symbol sniff deciding whether brace content is evaluable code.
    /// A substring match, not a parser; `{returning soon}` counts as code.
    static ref EXPRESSION_SNIFF: Regex =
        Regex::new(r"=>|function|return|\$").expect("expression sniff pattern");
}

/// Rewrite a raw post body into a form a strict markup compiler will accept.
///
/// Total over any input: never panics, never fails, returns an empty string
/// for empty input. The output is not guaranteed to preserve the author's
/// intent for malformed constructs, only to be compilable.
///
/// The passes, in order:
/// 1. a language tag on a fence opener is placed on its own line
/// 2. every opened fence gets a closing marker if it lacks one
/// 3. `<` and `>` inside single-backtick spans become entities
/// 4. brace segments that do not look like code become string literals
/// 5. remaining `<...>` segments outside code spans become entities
pub fn sanitize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let pass = normalize_fence_tags(raw);
    let pass = close_open_fences(&pass);
    let pass = escape_inline_code(&pass);
    let pass = literalize_braces(&pass);
    escape_stray_tags(&pass)
}

/// True when brace content should be left for the compiler to evaluate.
pub fn looks_like_expression(inner: &str) -> bool {
    EXPRESSION_SNIFF.is_match(inner.trim())
}

/// Length of the leading run of word characters (the shape of a language tag).
fn word_len(s: &str) -> usize {
    s.bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count()
}

/// Length of the leading run of spaces and tabs.
fn horizontal_ws_len(s: &str) -> usize {
    s.bytes().take_while(|b| *b == b' ' || *b == b'\t').count()
}

/// End offset of the code region whose opening backtick sits at `pos`.
///
/// Fence markers pair with the next fence marker, single backticks with the
/// next single backtick. An unterminated single backtick is treated as
/// literal text so the tail is still inspected; an unterminated fence
/// swallows the tail.
fn code_region_end(s: &str, pos: usize) -> usize {
    if s[pos..].starts_with(FENCE) {
        let after = pos + FENCE.len();
        match s[after..].find(FENCE) {
            Some(rel) => after + rel + FENCE.len(),
            None => s.len(),
        }
    } else {
        let after = pos + 1;
        match s[after..].find('`') {
            Some(rel) => after + rel + 1,
            None => after,
        }
    }
}

/// Pass 1: a fence opener whose language tag is followed by spaces or tabs
/// has that whitespace replaced with a newline, so the compiler sees the
/// syntax highlight hint alone on its line.
fn normalize_fence_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 8);
    let mut rest = input;

    while let Some(pos) = rest.find(FENCE) {
        let tag_start = pos + FENCE.len();
        let tag_end = tag_start + word_len(&rest[tag_start..]);
        out.push_str(&rest[..tag_end]);
        let had_tag = tag_end > tag_start;
        rest = &rest[tag_end..];

        if had_tag {
            let ws = horizontal_ws_len(rest);
            if ws > 0 {
                rest = &rest[ws..];
                if !rest.starts_with('\n') {
                    out.push('\n');
                }
            }
        }
    }

    out.push_str(rest);
    out
}

/// Pass 2: every fence opener (marker, tag, newline) must be paired with a
/// bare closing marker. A body that reaches end of input or the next tagged
/// opener without one gets a closer inserted right after it. Bodies already
/// terminated by a bare marker are left untouched, which keeps the pass
/// idempotent.
fn close_open_fences(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 8);
    let mut rest = input;

    loop {
        let Some(pos) = rest.find(FENCE) else {
            out.push_str(rest);
            break;
        };

        let tag_start = pos + FENCE.len();
        let head_end = tag_start + word_len(&rest[tag_start..]);
        if head_end == tag_start || !rest[head_end..].starts_with('\n') {
            // Bare marker or tag with no newline: not an opener here.
            out.push_str(&rest[..head_end]);
            rest = &rest[head_end..];
            continue;
        }

        let body_start = head_end + 1;
        out.push_str(&rest[..body_start]);
        rest = &rest[body_start..];

        match rest.find(FENCE) {
            None => {
                // Body runs to end of input.
                out.push_str(rest);
                if !rest.is_empty() && !rest.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str(FENCE);
                rest = "";
            }
            Some(close) => {
                let next_tag = word_len(&rest[close + FENCE.len()..]);
                if next_tag > 0 {
                    // The next marker opens another block, so this one was
                    // never closed. Close it and reprocess the next opener.
                    let body = &rest[..close];
                    out.push_str(body);
                    if !body.is_empty() && !body.ends_with('\n') {
                        out.push('\n');
                    }
                    out.push_str(FENCE);
                    out.push('\n');
                    rest = &rest[close..];
                } else {
                    out.push_str(&rest[..close + FENCE.len()]);
                    rest = &rest[close + FENCE.len()..];
                }
            }
        }
    }

    out
}

/// Pass 3: escape `<` and `>` inside single-backtick spans so code examples
/// with comparison operators or tag-like tokens are not parsed as markup.
/// Fenced blocks are skipped whole; spans never cross a fence boundary.
fn escape_inline_code(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('`') {
        if rest[pos..].starts_with(FENCE) {
            let end = code_region_end(rest, pos);
            out.push_str(&rest[..end]);
            rest = &rest[end..];
            continue;
        }

        let span_start = pos + 1;
        match rest[span_start..].find('`') {
            Some(len) if len > 0 => {
                out.push_str(&rest[..span_start]);
                for ch in rest[span_start..span_start + len].chars() {
                    match ch {
                        '<' => out.push_str("&lt;"),
                        '>' => out.push_str("&gt;"),
                        _ => out.push(ch),
                    }
                }
                out.push('`');
                rest = &rest[span_start + len + 1..];
            }
            _ => {
                // Empty span or unterminated backtick: literal text.
                out.push_str(&rest[..span_start]);
                rest = &rest[span_start..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Pass 4: a brace segment that does not look like code is rewritten into a
/// string literal, `{'inner'}`, with embedded single quotes escaped, so the
/// compiler treats it as text instead of failing to evaluate it.
///
/// Matching is non-greedy to the first `}`. Nested object-literal content
/// therefore splits at the wrong brace; that limit is intentional and
/// pinned down in the tests rather than fixed with a depth counter.
fn literalize_braces(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    loop {
        let Some(pos) = rest.find(['`', '{']) else {
            out.push_str(rest);
            break;
        };

        if rest.as_bytes()[pos] == b'`' {
            let end = code_region_end(rest, pos);
            out.push_str(&rest[..end]);
            rest = &rest[end..];
            continue;
        }

        let inner_start = pos + 1;
        match rest[inner_start..].find('}') {
            Some(rel) => {
                let inner = &rest[inner_start..inner_start + rel];
                out.push_str(&rest[..pos]);
                if looks_like_expression(inner) {
                    out.push('{');
                    out.push_str(inner);
                    out.push('}');
                } else {
                    out.push_str("{'");
                    for ch in inner.chars() {
                        if ch == '\'' {
                            out.push_str("\\'");
                        } else {
                            out.push(ch);
                        }
                    }
                    out.push_str("'}");
                }
                rest = &rest[inner_start + rel + 1..];
            }
            None => {
                // Unmatched brace: literal text.
                out.push_str(&rest[..inner_start]);
                rest = &rest[inner_start..];
            }
        }
    }

    out
}

/// Pass 5: a `<...>` segment outside any code span is escaped to
/// `&lt;...&gt;`. A segment directly bordered by a backtick on either side
/// is left alone; the spans preserved by pass 3 stay byte-identical.
fn escape_stray_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    loop {
        let Some(pos) = rest.find(['`', '<']) else {
            out.push_str(rest);
            break;
        };

        if rest.as_bytes()[pos] == b'`' {
            let end = code_region_end(rest, pos);
            out.push_str(&rest[..end]);
            rest = &rest[end..];
            continue;
        }

        let inner_start = pos + 1;
        match rest[inner_start..].find('>') {
            Some(rel) if rel > 0 => {
                let end = inner_start + rel + 1;
                let tick_before = if pos > 0 {
                    rest.as_bytes()[pos - 1] == b'`'
                } else {
                    out.ends_with('`')
                };
                let tick_after = rest[end..].starts_with('`');

                out.push_str(&rest[..pos]);
                if tick_before || tick_after {
                    out.push_str(&rest[pos..end]);
                } else {
                    out.push_str("&lt;");
                    out.push_str(&rest[inner_start..inner_start + rel]);
                    out.push_str("&gt;");
                }
                rest = &rest[end..];
            }
            _ => {
                // `<>` or no closing bracket: literal text.
                out.push_str(&rest[..inner_start]);
                rest = &rest[inner_start..];
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_fence_tag_gets_own_line() {
        let out = sanitize("```js console.log(1) ```");
        assert!(out.starts_with("```js\n"));
        assert!(out.contains("console.log(1)"));
    }

    #[test]
    fn test_unclosed_fence_is_closed() {
        let out = sanitize("```rust\nfn main() {}");
        assert_eq!(out, "```rust\nfn main() {}\n```");
    }

    #[test]
    fn test_closed_fence_untouched() {
        let input = "```rust\nfn main() {}\n```\n";
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn test_fence_closure_is_idempotent() {
        let inputs = [
            "```js\nlet a = 1",
            "```js\nlet a = 1\n```",
            "before\n```py\nprint(1)\nafter",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_two_unclosed_fences_close_independently() {
        let out = sanitize("```js\nfirst\n```py\nsecond");
        assert_eq!(out, "```js\nfirst\n```\n```py\nsecond\n```");
    }

    #[test]
    fn test_empty_fence_body_closed() {
        assert_eq!(sanitize("```sh\n"), "```sh\n```");
    }

    #[test]
    fn test_inline_code_angle_brackets_escaped() {
        assert_eq!(sanitize("`a<b>c`"), "`a&lt;b&gt;c`");
    }

    #[test]
    fn test_fence_body_not_escaped() {
        let input = "```html\n<div>hi</div>\n```\n";
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn test_template_literal_in_fence_survives() {
        let input = "```js\nconst s = `hi`;\n```\n";
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn test_plain_brace_becomes_string_literal() {
        assert_eq!(sanitize("{hello world}"), "{'hello world'}");
    }

    #[test]
    fn test_empty_brace_becomes_empty_literal() {
        assert_eq!(sanitize("{}"), "{''}");
    }

    #[test]
    fn test_arrow_function_brace_passes_through() {
        let input = "{() => foo()}";
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn test_expression_keywords_pass_through() {
        assert_eq!(sanitize("{function f() {}"), "{function f() {}");
        assert_eq!(sanitize("{return x}"), "{return x}");
        assert_eq!(sanitize("{$price}"), "{$price}");
    }

    #[test]
    fn test_single_quotes_escaped_in_brace_literal() {
        assert_eq!(sanitize("{it's fine}"), r"{'it\'s fine'}");
    }

    #[test]
    fn test_nested_braces_split_at_first_closer() {
        // First-closing-brace matching: nested content splits wrong on
        // purpose, matching the deployed behavior.
        assert_eq!(sanitize("{a {b} c}"), "{'a {b'} c}");
    }

    #[test]
    fn test_brace_inside_inline_code_untouched() {
        assert_eq!(sanitize("`{a}`"), "`{a}`");
    }

    #[test]
    fn test_brace_inside_fence_untouched() {
        let input = "```json\n{\"a\": 1}\n```\n";
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn test_unmatched_brace_left_alone() {
        assert_eq!(sanitize("{oops"), "{oops");
    }

    #[test]
    fn test_stray_tag_escaped() {
        assert_eq!(sanitize("a <Widget> here"), "a &lt;Widget&gt; here");
    }

    #[test]
    fn test_comparison_operators_escaped() {
        assert_eq!(sanitize("a < b and c > d"), "a &lt; b and c &gt; d");
    }

    #[test]
    fn test_tag_adjacent_to_backtick_untouched() {
        let out = sanitize("`ls`<pipe> and <tick>`cat`");
        assert!(out.contains("`ls`<pipe>"));
        assert!(out.contains("<tick>`cat`"));
    }

    #[test]
    fn test_empty_angle_pair_left_alone() {
        assert_eq!(sanitize("a <> b"), "a <> b");
    }

    #[test]
    fn test_inline_escapes_not_doubled() {
        let once = sanitize("`a<b>c`");
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn test_looks_like_expression_set() {
        assert!(looks_like_expression("() => x"));
        assert!(looks_like_expression("function f()"));
        assert!(looks_like_expression("return 1"));
        assert!(looks_like_expression("$var"));
        assert!(!looks_like_expression("hello world"));
    }

    #[test]
    fn test_totality_on_hostile_input() {
        // Unbalanced everything; the only requirement is some output.
        for input in [
            "``` ` `` {{{ <<< >>> }",
            "```js",
            "`",
            "{",
            "<",
            "```js\n`{<",
            "\u{300}`é<日>`",
        ] {
            let _ = sanitize(input);
        }
    }

    #[test]
    fn test_mixed_document() {
        let input = "Intro with `a<b>` span.\n\n```ts tsc --noEmit\n\n{see notes}\nEnd: x < y > z";
        let out = sanitize(input);
        assert!(out.contains("`a&lt;b&gt;`"));
        assert!(out.contains("```ts\n"));
        assert!(out.ends_with("```"));
    }
}
