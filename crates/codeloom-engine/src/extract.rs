//! Code extraction and language classification.
//!
//! Post-processes the final accumulated response into a (language, clean
//! code) pair via an ordered cascade of pattern rules; the first matching
//! rule wins. Explicit fence tags are trusted before any content sniffing,
//! and sniffing is only attempted once extraction has isolated a code
//! region. If nothing matches, the raw response is classified as-is.

use once_cell::sync::Lazy;
use regex::Regex;

use codeloom_core::{CodeLanguage, GeneratedArtifact};

static HTML_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?si)```(?:html|htm)[ \t]*\r?\n(.*?)```").expect("valid html fence pattern")
});

static PYTHON_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?si)```(?:python|py)[ \t]*\r?\n(.*?)```").expect("valid python fence pattern")
});

static JAVASCRIPT_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?si)```(?:javascript|js)[ \t]*\r?\n(.*?)```")
        .expect("valid javascript fence pattern")
});

/// Any fenced block, tagged or not; used once the tagged rules have failed,
/// which also catches malformed tags.
static ANY_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[^\n]*\n(.*?)```").expect("valid untagged fence pattern"));

/// Inline `<code>...</code>` region, for responses without any fence.
static CODE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?si)<code>(.*?)</code>").expect("valid code tag pattern"));

/// Classifies an already-extracted code region by signature substrings, in
/// fixed priority order.
fn sniff_signatures(text: &str) -> CodeLanguage {
    let lower = text.to_lowercase();
    if lower.contains("<!doctype") || lower.contains("<html") {
        CodeLanguage::Html
    } else if text.contains("def ") || text.contains("import ") {
        CodeLanguage::Python
    } else if text.contains("function ") || text.contains("const ") {
        CodeLanguage::Javascript
    } else {
        CodeLanguage::Unknown
    }
}

/// Classifies the raw, unextracted response: signature scan first, then an
/// explicit keyword check for language names mentioned anywhere in prose.
fn classify_raw(text: &str) -> CodeLanguage {
    let sniffed = sniff_signatures(text);
    if sniffed != CodeLanguage::Unknown {
        return sniffed;
    }
    let lower = text.to_lowercase();
    if lower.contains("python") {
        CodeLanguage::Python
    } else if lower.contains("javascript") {
        CodeLanguage::Javascript
    } else {
        CodeLanguage::Unknown
    }
}

fn fence_content(pattern: &Regex, response: &str) -> Option<String> {
    pattern
        .captures(response)
        .and_then(|caps| caps.get(1))
        .map(|content| content.as_str().trim().to_string())
}

/// Runs the extraction cascade over the full accumulated response.
///
/// Applied exactly once per cycle, after the stream completes normally.
/// Not idempotent on its own output by design: a clean, fenceless code
/// string re-classifies as `Unknown` unless it carries signature keywords.
pub fn extract(response: &str) -> GeneratedArtifact {
    if let Some(content) = fence_content(&HTML_FENCE, response) {
        return GeneratedArtifact::new(content, CodeLanguage::Html);
    }
    if let Some(content) = fence_content(&PYTHON_FENCE, response) {
        return GeneratedArtifact::new(content, CodeLanguage::Python);
    }
    if let Some(content) = fence_content(&JAVASCRIPT_FENCE, response) {
        return GeneratedArtifact::new(content, CodeLanguage::Javascript);
    }
    if let Some(content) = fence_content(&ANY_FENCE, response) {
        let language = sniff_signatures(&content);
        return GeneratedArtifact::new(content, language);
    }
    if let Some(content) = fence_content(&CODE_TAG, response) {
        // Inline code tags show up almost exclusively in HTML answers.
        return GeneratedArtifact::new(content, CodeLanguage::Html);
    }

    GeneratedArtifact::new(response.to_string(), classify_raw(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_html_fence() {
        let artifact = extract("```html\n<p>x</p>\n```");
        assert_eq!(artifact.language, CodeLanguage::Html);
        assert_eq!(artifact.code, "<p>x</p>");
    }

    #[test]
    fn test_tagged_py_fence() {
        let artifact = extract("```py\nprint(1)\n```");
        assert_eq!(artifact.language, CodeLanguage::Python);
        assert_eq!(artifact.code, "print(1)");
    }

    #[test]
    fn test_tagged_js_fence() {
        let artifact = extract("Here you go:\n```javascript\nconst a = 1;\n```\nEnjoy!");
        assert_eq!(artifact.language, CodeLanguage::Javascript);
        assert_eq!(artifact.code, "const a = 1;");
    }

    #[test]
    fn test_untagged_fence_sniffs_javascript() {
        let artifact = extract("```\nfunction f(){}\n```");
        assert_eq!(artifact.language, CodeLanguage::Javascript);
        assert_eq!(artifact.code, "function f(){}");
    }

    #[test]
    fn test_untagged_fence_sniffs_python() {
        let artifact = extract("```\nimport os\nprint(os.getcwd())\n```");
        assert_eq!(artifact.language, CodeLanguage::Python);
    }

    #[test]
    fn test_unknown_tag_falls_through_to_sniffing() {
        let artifact = extract("```xhtml\n<!DOCTYPE html><html></html>\n```");
        assert_eq!(artifact.language, CodeLanguage::Html);
    }

    #[test]
    fn test_tag_precedence_over_sniffing() {
        // Tagged python even though the body looks like javascript.
        let artifact = extract("```python\nconst a = 1;\n```");
        assert_eq!(artifact.language, CodeLanguage::Python);
    }

    #[test]
    fn test_first_fence_wins_over_later_fences() {
        let artifact = extract("```html\n<p>a</p>\n```\n```py\nprint(1)\n```");
        assert_eq!(artifact.language, CodeLanguage::Html);
        assert_eq!(artifact.code, "<p>a</p>");
    }

    #[test]
    fn test_inline_code_tag_is_html() {
        let artifact = extract("Try this: <code>&lt;b&gt;hi&lt;/b&gt;</code>");
        assert_eq!(artifact.language, CodeLanguage::Html);
        assert_eq!(artifact.code, "&lt;b&gt;hi&lt;/b&gt;");
    }

    #[test]
    fn test_fenceless_html_signature_keeps_raw_text() {
        let raw = "sure, here it is <html><body>hi</body></html>";
        let artifact = extract(raw);
        assert_eq!(artifact.language, CodeLanguage::Html);
        assert_eq!(artifact.code, raw);
    }

    #[test]
    fn test_keyword_fallback_on_prose() {
        let artifact = extract("I would write this in Python using a loop.");
        assert_eq!(artifact.language, CodeLanguage::Python);
    }

    #[test]
    fn test_nothing_matches_is_unknown_with_raw_text() {
        let raw = "no code here at all";
        let artifact = extract(raw);
        assert_eq!(artifact.language, CodeLanguage::Unknown);
        assert_eq!(artifact.code, raw);
    }

    #[test]
    fn test_not_idempotent_on_clean_output() {
        // Extracted clean code without signature keywords re-classifies as
        // Unknown; extraction is a one-shot step, not a fixpoint.
        let first = extract("```js\nlet x = 1;\n```");
        assert_eq!(first.language, CodeLanguage::Javascript);
        let second = extract(&first.code);
        assert_eq!(second.language, CodeLanguage::Unknown);
        assert_eq!(second.code, first.code);
    }
}
