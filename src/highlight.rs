//! Regex-table syntax highlighting for fenced code blocks.
//!
//! Each supported language is an ordered list of [`TokenRule`]s. The code is
//! HTML-escaped first, then every rule in turn wraps its matches in a
//! `<span class="...">`. Rules only ever look at text, never at markup an
//! earlier rule inserted, but a later rule may still match inside the text of
//! an earlier span, producing nested spans. No attempt is made to resolve
//! such overlaps.

use std::sync::LazyLock;

use regex::Regex;

use crate::html::escape_text;

/// Rule set used when a block has no language tag or an unknown one.
pub const FALLBACK_LANGUAGE: &str = "javascript";

const KEYWORD: &str = "text-purple-600 font-semibold";
const LITERAL: &str = "text-blue-600";
const STRING: &str = "text-green-600";
const COMMENT: &str = "text-gray-500 italic";
const NUMBER: &str = "text-orange-600";
const TAG: &str = "text-blue-600";
const ATTRIBUTE: &str = "text-purple-600";
const SELECTOR: &str = "text-blue-600";
const PROPERTY: &str = "text-purple-600";

const DOUBLE_QUOTED: &str = r#""(?:[^"\\]|\\.)*""#;
const SINGLE_QUOTED: &str = r"'(?:[^'\\]|\\.)*'";
const BLOCK_COMMENT: &str = r"(?s)/\*.*?\*/";
const INTEGER: &str = r"\b\d+\b";

/// A pattern and the style class its matches are wrapped in.
///
/// When the pattern has a capture group named `tok`, only that group is
/// wrapped and the rest of the match is trailing context left as text.
pub struct TokenRule {
    pattern: Regex,
    style_class: &'static str,
}

impl TokenRule {
    fn new(pattern: &str, style_class: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("token patterns are valid regexes"),
            style_class,
        }
    }

    pub fn style_class(&self) -> &'static str {
        self.style_class
    }

    /// Wrap every match in the text runs of `marked`, copying existing
    /// `<span>` tags through untouched.
    fn apply(&self, marked: &str) -> String {
        let mut out = String::with_capacity(marked.len());
        let mut rest = marked;
        while !rest.is_empty() {
            match rest.find('<') {
                Some(0) => {
                    let end = rest.find('>').map_or(rest.len(), |i| i + 1);
                    out.push_str(&rest[..end]);
                    rest = &rest[end..];
                }
                Some(i) => {
                    self.wrap_into(&rest[..i], &mut out);
                    rest = &rest[i..];
                }
                None => {
                    self.wrap_into(rest, &mut out);
                    break;
                }
            }
        }
        out
    }

    fn wrap_into(&self, text: &str, out: &mut String) {
        let mut last = 0;
        for caps in self.pattern.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let token = caps.name("tok").unwrap_or(whole);
            if token.as_str().is_empty() {
                continue;
            }
            out.push_str(&text[last..token.start()]);
            out.push_str("<span class=\"");
            out.push_str(self.style_class);
            out.push_str("\">");
            out.push_str(token.as_str());
            out.push_str("</span>");
            last = token.end();
        }
        out.push_str(&text[last..]);
    }
}

/// The ordered rule list for one language.
pub struct LanguageRules {
    pub name: &'static str,
    pub rules: Vec<TokenRule>,
}

static LANGUAGES: LazyLock<Vec<LanguageRules>> = LazyLock::new(|| {
    vec![
        LanguageRules {
            name: "javascript",
            rules: vec![
                TokenRule::new(
                    r"\b(?:const|let|var|function|return|if|else|for|while|class|import|export|from|async|await)\b",
                    KEYWORD,
                ),
                TokenRule::new(r"\b(?:true|false|null|undefined)\b", LITERAL),
                TokenRule::new(DOUBLE_QUOTED, STRING),
                TokenRule::new(SINGLE_QUOTED, STRING),
                TokenRule::new(r"(?m)//.*$", COMMENT),
                TokenRule::new(BLOCK_COMMENT, COMMENT),
                TokenRule::new(INTEGER, NUMBER),
            ],
        },
        LanguageRules {
            name: "python",
            rules: vec![
                TokenRule::new(
                    r"\b(?:def|class|import|from|return|if|elif|else|for|while|try|except|with|as|pass|break|continue)\b",
                    KEYWORD,
                ),
                TokenRule::new(r"\b(?:True|False|None)\b", LITERAL),
                TokenRule::new(DOUBLE_QUOTED, STRING),
                TokenRule::new(SINGLE_QUOTED, STRING),
                TokenRule::new(r"(?m)#.*$", COMMENT),
                TokenRule::new(INTEGER, NUMBER),
            ],
        },
        LanguageRules {
            name: "html",
            rules: vec![
                // Runs on escaped text, so tags appear as &lt;...&gt;
                TokenRule::new(r"&lt;/?\w+[^&gt;]*&gt;", TAG),
                TokenRule::new(r"\w+=", ATTRIBUTE),
                TokenRule::new(DOUBLE_QUOTED, STRING),
                TokenRule::new(r"(?s)&lt;!--.*?--&gt;", COMMENT),
            ],
        },
        LanguageRules {
            name: "css",
            rules: vec![
                TokenRule::new(r"(?P<tok>[.#]?[\w-]+)\s*\{", SELECTOR),
                TokenRule::new(r"(?P<tok>[\w-]+)\s*:", PROPERTY),
                TokenRule::new(DOUBLE_QUOTED, STRING),
                TokenRule::new(SINGLE_QUOTED, STRING),
                TokenRule::new(BLOCK_COMMENT, COMMENT),
            ],
        },
    ]
});

/// Look up the rules for `language`, falling back to javascript.
/// Matching is exact: `Python` is not `python`.
pub fn rules_for(language: Option<&str>) -> &'static LanguageRules {
    let languages = &*LANGUAGES;
    let wanted = language.unwrap_or(FALLBACK_LANGUAGE);
    languages
        .iter()
        .find(|l| l.name == wanted)
        .or_else(|| languages.iter().find(|l| l.name == FALLBACK_LANGUAGE))
        .unwrap_or(&languages[0])
}

/// Escape `code` and wrap its tokens in styled spans.
pub fn highlight(code: &str, language: Option<&str>) -> String {
    let rules = rules_for(language);
    let mut marked = escape_text(code);
    for rule in &rules.rules {
        marked = rule.apply(&marked);
    }
    marked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(class: &str, text: &str) -> String {
        format!("<span class=\"{class}\">{text}</span>")
    }

    #[test]
    fn escapes_before_tokenizing() {
        let out = highlight("<script>alert(1)</script>", Some("javascript"));
        assert!(!out.contains("<script>"));
        assert_eq!(
            out,
            format!("&lt;script&gt;alert({})&lt;/script&gt;", span(NUMBER, "1"))
        );
    }

    #[test]
    fn ampersand_is_escaped_first() {
        assert_eq!(highlight("a && b", Some("python")), "a &amp;&amp; b");
    }

    #[test]
    fn python_keywords() {
        assert_eq!(
            highlight("def f(): pass", Some("python")),
            format!("{} f(): {}", span(KEYWORD, "def"), span(KEYWORD, "pass"))
        );
    }

    #[test]
    fn python_does_not_use_javascript_keywords() {
        assert_eq!(
            highlight("function = 1", Some("python")),
            format!("function = {}", span(NUMBER, "1"))
        );
    }

    #[test]
    fn javascript_statement() {
        assert_eq!(
            highlight("const x = \"a\";", Some("javascript")),
            format!("{} x = {};", span(KEYWORD, "const"), span(STRING, "\"a\""))
        );
    }

    #[test]
    fn later_rules_nest_inside_earlier_spans() {
        assert_eq!(
            highlight("// note 42", None),
            format!(
                "<span class=\"{COMMENT}\">// note {}</span>",
                span(NUMBER, "42")
            )
        );
    }

    #[test]
    fn inserted_markup_is_not_rematched() {
        // The string rule must not match the quoted class attribute of the keyword span
        let out = highlight("return 7", None);
        assert_eq!(out, format!("{} {}", span(KEYWORD, "return"), span(NUMBER, "7")));
    }

    #[test]
    fn missing_or_unknown_language_uses_javascript() {
        let code = "let a = true; // 3";
        let expected = highlight(code, Some("javascript"));
        assert_eq!(highlight(code, None), expected);
        assert_eq!(highlight(code, Some("brainfuck")), expected);
        assert_eq!(highlight(code, Some("Python")), expected);
        assert_eq!(highlight(code, None), highlight(code, None));
    }

    #[test]
    fn html_tag_with_attribute() {
        assert_eq!(
            highlight("<a href=\"x\">", Some("html")),
            format!(
                "<span class=\"{TAG}\">&lt;a {}{}&gt;</span>",
                span(ATTRIBUTE, "href="),
                span(STRING, "\"x\"")
            )
        );
    }

    #[test]
    fn css_selector_and_property() {
        assert_eq!(
            highlight(".btn { color: red; }", Some("css")),
            format!(
                "{} {{ {}: red; }}",
                span(SELECTOR, ".btn"),
                span(PROPERTY, "color")
            )
        );
    }

    #[test]
    fn rule_tables_are_ordered() {
        let js = rules_for(Some("javascript"));
        assert_eq!(js.rules.first().map(TokenRule::style_class), Some(KEYWORD));
        assert_eq!(js.rules.last().map(TokenRule::style_class), Some(NUMBER));
        assert_eq!(rules_for(Some("css")).name, "css");
    }
}
