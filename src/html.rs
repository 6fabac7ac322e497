use crate::block::{Block, List, Span, Table};
use crate::copy::CopyState;
use crate::highlight;
use pulldown_cmark::Alignment;

const H1: &str = "text-2xl font-bold text-gray-900 mb-4 mt-6 first:mt-0 pb-2 border-b border-gray-200";
const H2: &str = "text-xl font-bold text-gray-900 mb-3 mt-6 first:mt-0";
const H3: &str = "text-lg font-semibold text-gray-900 mb-3 mt-5 first:mt-0";
const H4: &str = "text-base font-semibold text-gray-900 mb-2 mt-4 first:mt-0";
const PARAGRAPH: &str = "text-gray-700 leading-relaxed mb-4 last:mb-0";
const UNORDERED: &str = "list-disc list-inside mb-4 space-y-2 text-gray-700";
const ORDERED: &str = "list-decimal list-inside mb-4 space-y-2 text-gray-700";
const ITEM: &str = "text-gray-700 leading-relaxed";
const LINK: &str = "text-blue-600 hover:text-blue-800 underline decoration-blue-600/30 hover:decoration-blue-800/50 transition-colors";
const STRONG: &str = "font-semibold text-gray-900";
const EMPHASIS: &str = "italic text-gray-700";
const BLOCKQUOTE: &str = "border-l-4 border-blue-200 pl-4 py-2 my-4 bg-blue-50 text-gray-700 italic";
const TABLE_WRAPPER: &str = "overflow-x-auto my-4";
const TABLE: &str = "min-w-full border border-gray-200 rounded-lg";
const THEAD: &str = "bg-gray-50";
const TBODY: &str = "divide-y divide-gray-200";
const ROW: &str = "hover:bg-gray-50";
const TH: &str = "px-4 py-3 text-left text-sm font-semibold text-gray-900 border-b border-gray-200";
const TD: &str = "px-4 py-3 text-sm text-gray-700";
const RULE: &str = "my-6 border-t border-gray-200";
const INLINE_CODE: &str = "bg-gray-100 text-red-600 px-2 py-1 rounded text-sm font-mono";
const CODE_CONTAINER: &str = "relative group my-4";
const CODE_HEADER: &str = "flex items-center justify-between bg-gray-100 px-4 rounded-t-lg border-b border-gray-200";
const CODE_LANGUAGE: &str = "text-sm font-medium text-gray-600 capitalize";
const COPY_BUTTON: &str = "opacity-0 group-hover:opacity-100 transition-opacity h-8 w-8 p-0";
const CODE_PRE: &str = "bg-gray-50 p-4 rounded-b-lg overflow-x-auto border border-gray-200 border-t-0";
const CODE_BODY: &str = "text-sm leading-relaxed font-mono";
const CARD: &str = "bg-white border border-gray-200 shadow-sm rounded-lg";

/// Label shown in the header of a code block without a language tag.
pub const UNTAGGED_LANGUAGE: &str = "text";

/// Escape the three characters that are significant in HTML text, `&` first.
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape text for use inside a double-quoted attribute value.
pub fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}

/// Keep relative URLs and a short list of safe protocols; anything else
/// (`javascript:`, `data:`, ...) becomes an empty URL.
pub fn safe_url(url: &str) -> &str {
    let Some(colon) = url.find(':') else {
        return url;
    };
    // A colon after a path, query or fragment separator is not a protocol
    let precedes_colon = |c: char| url.find(c).is_some_and(|i| i < colon);
    if precedes_colon('/') || precedes_colon('?') || precedes_colon('#') {
        return url;
    }
    match url[..colon].to_ascii_lowercase().as_str() {
        "http" | "https" | "irc" | "ircs" | "mailto" | "xmpp" => url,
        _ => "",
    }
}

/// The text a fenced block shows and copies: its content minus one
/// trailing newline.
pub fn code_text(content: &str) -> &str {
    content.strip_suffix('\n').unwrap_or(content)
}

/// Convert blocks to HTML. `state` decides which code blocks show the
/// "copied" indicator.
pub fn blocks_to_html(blocks: &[Block], state: &CopyState) -> String {
    let mut out = String::new();
    emit_blocks(blocks, state, &mut out);
    out
}

/// Wrap rendered markdown in the answer card.
pub fn answer_card(body: &str) -> String {
    format!(
        "<div class=\"{CARD}\"><div class=\"p-6\"><div class=\"prose prose-gray max-w-none\">\n{body}</div></div></div>\n"
    )
}

/// The card shown before there is any answer text.
pub fn placeholder_card(text: &str) -> String {
    format!(
        "<div class=\"{CARD}\"><div class=\"p-4\"><p class=\"text-gray-500\">{}</p></div></div>\n",
        escape_text(text)
    )
}

/// A complete HTML page around `body`.
pub fn standalone_page(title: &str, stylesheet: Option<&str>, body: &str) -> String {
    let mut out = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_text(title)));
    if let Some(src) = stylesheet.filter(|s| !s.is_empty()) {
        out.push_str(&format!("<script src=\"{}\"></script>\n", escape_attr(src)));
    }
    out.push_str("</head>\n<body class=\"bg-gray-50\">\n<main class=\"max-w-3xl mx-auto p-6\">\n");
    out.push_str(body);
    out.push_str("</main>\n</body>\n</html>\n");
    out
}

fn emit_blocks(blocks: &[Block], state: &CopyState, out: &mut String) {
    for block in blocks {
        emit_block(block, state, out);
    }
}

fn emit_block(block: &Block, state: &CopyState, out: &mut String) {
    match block {
        Block::Heading { level, content } => {
            let class = match level {
                1 => Some(H1),
                2 => Some(H2),
                3 => Some(H3),
                4 => Some(H4),
                _ => None,
            };
            out.push_str(&format!("<h{level}"));
            push_class(class, out);
            out.push('>');
            spans_to_html(content, out);
            out.push_str(&format!("</h{level}>\n"));
        }
        Block::Paragraph { content } => {
            out.push_str(&format!("<p class=\"{PARAGRAPH}\">"));
            spans_to_html(content, out);
            out.push_str("</p>\n");
        }
        Block::Plain { content } => {
            spans_to_html(content, out);
        }
        Block::CodeBlock { language, content } => {
            code_block_to_html(language.as_deref(), content, state, out);
        }
        Block::List(list) => {
            list_to_html(list, state, out);
        }
        Block::BlockQuote(children) => {
            out.push_str(&format!("<blockquote class=\"{BLOCKQUOTE}\">\n"));
            emit_blocks(children, state, out);
            out.push_str("</blockquote>\n");
        }
        Block::Table(table) => {
            table_to_html(table, out);
        }
        Block::Html(raw) => {
            out.push_str("<p>");
            out.push_str(&escape_text(raw.trim_end()));
            out.push_str("</p>\n");
        }
        Block::Rule => {
            out.push_str(&format!("<hr class=\"{RULE}\">\n"));
        }
    }
}

fn push_class(class: Option<&str>, out: &mut String) {
    if let Some(class) = class {
        out.push_str(" class=\"");
        out.push_str(class);
        out.push('"');
    }
}

fn code_block_to_html(language: Option<&str>, content: &str, state: &CopyState, out: &mut String) {
    let code = code_text(content);

    // Nothing to highlight or copy
    if code.is_empty() {
        out.push_str(&format!("<code class=\"{INLINE_CODE}\"></code>\n"));
        return;
    }

    let label = language.unwrap_or(UNTAGGED_LANGUAGE);
    let (status, icon) = if state.is_copied(code) {
        ("copied", "<span class=\"text-green-500\" data-icon=\"check\">Copied</span>")
    } else {
        ("idle", "<span class=\"text-gray-500\" data-icon=\"copy\">Copy</span>")
    };

    out.push_str(&format!("<div class=\"{CODE_CONTAINER}\">\n"));
    out.push_str(&format!("<div class=\"{CODE_HEADER}\">\n"));
    out.push_str(&format!(
        "<span class=\"{CODE_LANGUAGE}\">{}</span>\n",
        escape_text(label)
    ));
    out.push_str(&format!(
        "<button type=\"button\" class=\"{COPY_BUTTON}\" aria-label=\"Copy code\" data-state=\"{status}\" data-copy=\"{}\">{icon}</button>\n",
        escape_attr(code)
    ));
    out.push_str("</div>\n");
    out.push_str(&format!(
        "<pre class=\"{CODE_PRE}\"><code class=\"{CODE_BODY}\">{}</code></pre>\n",
        highlight::highlight(code, language)
    ));
    out.push_str("</div>\n");
}

fn list_to_html(list: &List, state: &CopyState, out: &mut String) {
    match list.start {
        Some(1) => out.push_str(&format!("<ol class=\"{ORDERED}\">\n")),
        Some(start) => out.push_str(&format!("<ol class=\"{ORDERED}\" start=\"{start}\">\n")),
        None => out.push_str(&format!("<ul class=\"{UNORDERED}\">\n")),
    }

    for item in &list.items {
        out.push_str(&format!("<li class=\"{ITEM}\">"));
        emit_blocks(&item.children, state, out);
        out.push_str("</li>\n");
    }

    out.push_str(if list.ordered() { "</ol>\n" } else { "</ul>\n" });
}

fn table_to_html(table: &Table, out: &mut String) {
    out.push_str(&format!(
        "<div class=\"{TABLE_WRAPPER}\"><table class=\"{TABLE}\">\n"
    ));

    out.push_str(&format!("<thead class=\"{THEAD}\"><tr class=\"{ROW}\">"));
    for (i, cell) in table.head.iter().enumerate() {
        cell_to_html("th", TH, table.alignments.get(i), cell, out);
    }
    out.push_str("</tr></thead>\n");

    // An empty tbody is not valid HTML
    if !table.rows.is_empty() {
        out.push_str(&format!("<tbody class=\"{TBODY}\">\n"));
        for row in &table.rows {
            out.push_str(&format!("<tr class=\"{ROW}\">"));
            for (i, cell) in row.iter().enumerate() {
                cell_to_html("td", TD, table.alignments.get(i), cell, out);
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</tbody>\n");
    }

    out.push_str("</table></div>\n");
}

fn cell_to_html(tag: &str, class: &str, alignment: Option<&Alignment>, cell: &[Span], out: &mut String) {
    out.push_str(&format!("<{tag} class=\"{class}\""));
    let align = match alignment {
        Some(Alignment::Left) => Some("left"),
        Some(Alignment::Center) => Some("center"),
        Some(Alignment::Right) => Some("right"),
        Some(Alignment::None) | None => None,
    };
    if let Some(align) = align {
        out.push_str(&format!(" style=\"text-align: {align}\""));
    }
    out.push('>');
    spans_to_html(cell, out);
    out.push_str(&format!("</{tag}>"));
}

fn spans_to_html(spans: &[Span], out: &mut String) {
    for span in spans {
        span_to_html(span, out);
    }
}

fn span_to_html(span: &Span, out: &mut String) {
    match span {
        Span::Text(text) | Span::Html(text) => {
            out.push_str(&escape_text(text));
        }
        Span::Strong(inner) => {
            out.push_str(&format!("<strong class=\"{STRONG}\">"));
            spans_to_html(inner, out);
            out.push_str("</strong>");
        }
        Span::Emphasis(inner) => {
            out.push_str(&format!("<em class=\"{EMPHASIS}\">"));
            spans_to_html(inner, out);
            out.push_str("</em>");
        }
        Span::Strikethrough(inner) => {
            out.push_str("<del>");
            spans_to_html(inner, out);
            out.push_str("</del>");
        }
        Span::Code(text) => {
            out.push_str(&format!(
                "<code class=\"{INLINE_CODE}\">{}</code>",
                escape_text(text)
            ));
        }
        Span::Link {
            url,
            title,
            content,
        } => {
            out.push_str(&format!("<a href=\"{}\"", escape_attr(safe_url(url))));
            if !title.is_empty() {
                out.push_str(&format!(" title=\"{}\"", escape_attr(title)));
            }
            out.push_str(&format!(
                " class=\"{LINK}\" target=\"_blank\" rel=\"noopener noreferrer\">"
            ));
            spans_to_html(content, out);
            out.push_str("</a>");
        }
        Span::Image { url, title, alt } => {
            out.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\"",
                escape_attr(safe_url(url)),
                escape_attr(alt)
            ));
            if !title.is_empty() {
                out.push_str(&format!(" title=\"{}\"", escape_attr(title)));
            }
            out.push('>');
        }
        Span::TaskMarker(checked) => {
            out.push_str("<input type=\"checkbox\" disabled");
            if *checked {
                out.push_str(" checked");
            }
            out.push_str("> ");
        }
        Span::SoftBreak => {
            out.push('\n');
        }
        Span::LineBreak => {
            out.push_str("<br>\n");
        }
    }
}
