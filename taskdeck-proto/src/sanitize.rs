//! Markup stripping for free-text user input.
//!
//! [`sanitize`] parses its input as HTML-ish markup and returns only the
//! text content: tags, attributes, comments, and the raw text of
//! `<script>`/`<style>` elements are all discarded. Entities are left
//! encoded — decoding `&lt;` back to `<` would let a second pass see
//! markup the first pass did not, and `sanitize(sanitize(x)) ==
//! sanitize(x)` must hold.

/// Raw-text elements whose entire content is dropped, not just the tags.
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// Strips all markup from `input`, returning its text content.
///
/// A `<` only opens markup when followed by an ASCII letter, `/`, `!`,
/// or `?`; anything else is ordinary text. Markup left unterminated at
/// the end of the input is dropped along with everything after it, so
/// input that is nothing but a broken tag degrades to the empty string.
///
/// Stripping repeats until the output is stable: removing a tag can
/// bring a literal `<` next to following text (`<<b>a` becomes `<a`),
/// which a single pass would leave looking like fresh markup.
#[must_use]
pub fn sanitize(input: &str) -> String {
    let mut current = strip_once(input);
    loop {
        let next = strip_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_once(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c != '<' {
            out.push(c);
            i += 1;
            continue;
        }
        match chars.get(i + 1) {
            Some(&n) if n.is_ascii_alphabetic() || n == '/' || n == '!' || n == '?' => {
                if n == '!' && chars.get(i + 2) == Some(&'-') && chars.get(i + 3) == Some(&'-') {
                    i = skip_comment(&chars, i + 4);
                    continue;
                }
                let name = tag_name(&chars, i + 1);
                i = skip_tag(&chars, i + 1);
                if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                    i = skip_raw_text(&chars, i, &name);
                }
            }
            // Not a tag start: '<' is ordinary text.
            _ => {
                out.push('<');
                i += 1;
            }
        }
    }
    out
}

/// Advances past a `<!-- -->` comment, or to end of input if unterminated.
fn skip_comment(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() {
        if chars[i] == '-' && chars.get(i + 1) == Some(&'-') && chars.get(i + 2) == Some(&'>') {
            return i + 3;
        }
        i += 1;
    }
    i
}

/// Reads the lowercased element name starting at `i` (just past the `<`).
fn tag_name(chars: &[char], mut i: usize) -> String {
    let mut name = String::new();
    while let Some(&c) = chars.get(i) {
        if c.is_ascii_alphanumeric() {
            name.push(c.to_ascii_lowercase());
            i += 1;
        } else {
            break;
        }
    }
    name
}

/// Advances past the closing `>` of a tag, honoring quoted attribute
/// values that may contain `>`. Returns end of input if unterminated.
fn skip_tag(chars: &[char], mut i: usize) -> usize {
    let mut quote: Option<char> = None;
    while let Some(&c) = chars.get(i) {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return i + 1,
            None => {}
        }
        i += 1;
    }
    i
}

/// Advances past the content and closing tag of a raw-text element.
///
/// Everything up to (and including) the matching `</name ...>` is
/// discarded; if no closing tag exists the rest of the input is dropped.
fn skip_raw_text(chars: &[char], mut i: usize, name: &str) -> usize {
    let closer: Vec<char> = format!("</{name}").chars().collect();
    while i < chars.len() {
        if chars[i] == '<' && matches_ci(chars, i, &closer) {
            return skip_tag(chars, i + 1);
        }
        i += 1;
    }
    i
}

/// Case-insensitive match of `needle` against `chars` starting at `at`.
fn matches_ci(chars: &[char], at: usize, needle: &[char]) -> bool {
    if at + needle.len() > chars.len() {
        return false;
    }
    needle
        .iter()
        .zip(&chars[at..])
        .all(|(n, c)| n.eq_ignore_ascii_case(c))
}
