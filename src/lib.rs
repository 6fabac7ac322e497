mod block;
mod clipboard;
mod config;
mod copy;
mod error;
mod highlight;
mod html;
pub mod logging;
mod message;
mod parser;

pub use block::{Block, List, ListItem, Span, Table};
pub use clipboard::{Clipboard, SystemClipboard};
pub use config::{AnswerConfig, Config, CopyConfig, DocumentConfig};
pub use copy::{CopyController, CopyState, RESET_AFTER};
pub use error::{ClipboardError, Error};
pub use highlight::{FALLBACK_LANGUAGE, LanguageRules, TokenRule, highlight, rules_for};
pub use message::{Message, Role};

use tracing::debug;

/// A fenced code block as the copy control sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSnippet {
    pub language: Option<String>,
    pub code: String,
}

/// Parse markdown text into a tree of blocks.
pub fn parse(markdown: &str) -> Vec<Block> {
    parser::parse(markdown)
}

/// Convert markdown to HTML with nothing copied.
pub fn markdown_to_html(markdown: &str) -> String {
    markdown_to_html_with_state(markdown, &CopyState::default())
}

/// Convert markdown to HTML; code blocks whose text matches `state` show
/// the "copied" indicator.
pub fn markdown_to_html_with_state(markdown: &str, state: &CopyState) -> String {
    let blocks = parse(markdown);
    html::blocks_to_html(&blocks, state)
}

/// Render one answer as a card. An empty answer shows the placeholder.
pub fn render_answer(answer: &str, config: &Config, state: &CopyState) -> String {
    if answer.is_empty() {
        return html::placeholder_card(&config.answer.placeholder);
    }
    let body = markdown_to_html_with_state(answer, state);
    debug!(
        input_bytes = answer.len(),
        output_bytes = body.len(),
        "rendered answer"
    );
    html::answer_card(&body)
}

/// Render an answer card, wrapped in a full page when the config asks for one.
pub fn render_page(answer: &str, config: &Config, state: &CopyState) -> String {
    let card = render_answer(answer, config, state);
    if !config.document.standalone {
        return card;
    }
    html::standalone_page(
        &config.document.title,
        config.document.stylesheet.as_deref(),
        &card,
    )
}

/// Every fenced block that renders with a copy control, in document order.
pub fn code_blocks(markdown: &str) -> Vec<CodeSnippet> {
    let mut snippets = Vec::new();
    collect_snippets(&parse(markdown), &mut snippets);
    snippets
}

fn collect_snippets(blocks: &[Block], out: &mut Vec<CodeSnippet>) {
    for block in blocks {
        match block {
            Block::CodeBlock { language, content } => {
                let code = html::code_text(content);
                if !code.is_empty() {
                    out.push(CodeSnippet {
                        language: language.clone(),
                        code: code.to_string(),
                    });
                }
            }
            Block::BlockQuote(children) => collect_snippets(children, out),
            Block::List(list) => {
                for item in &list.items {
                    collect_snippets(&item.children, out);
                }
            }
            _ => {}
        }
    }
}
