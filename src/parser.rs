use pulldown_cmark::{Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::block::{Block, List, ListItem, Span, Table};

/// Parse markdown text into a tree of blocks
pub fn parse(markdown: &str) -> Vec<Block> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    let parser = Parser::new_ext(markdown, options);
    let mut state = ParseState::default();

    for event in parser {
        process_event(event, &mut state);
    }

    state.flush_plain();
    state.blocks
}

/// The language tag of a fence info string: its leading run of word
/// characters (`rust title="main.rs"` gives `rust`).
pub fn language_tag(info: &str) -> Option<String> {
    let tag: String = info
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if tag.is_empty() { None } else { Some(tag) }
}

#[derive(Default)]
struct ParseState {
    // Current inline content being built
    spans: Vec<Span>,
    // Parent span buffers for open inline containers (strong, link, ...)
    span_stack: Vec<Vec<Span>>,
    // (url, title) of open links and images
    link_stack: Vec<(String, String)>,

    // Current heading level (if in a heading)
    heading_level: Option<u8>,

    // Code block state
    code: Option<CodeBuilder>,

    // Raw HTML block being collected
    html_block: Option<String>,

    // Open block containers, innermost last
    containers: Vec<Container>,

    // Table state
    table: Option<TableBuilder>,

    // Top-level blocks
    blocks: Vec<Block>,
}

enum Container {
    Quote(Vec<Block>),
    List {
        start: Option<u64>,
        items: Vec<ListItem>,
    },
    Item(Vec<Block>),
}

struct CodeBuilder {
    language: Option<String>,
    content: String,
}

#[derive(Default)]
struct TableBuilder {
    alignments: Vec<Alignment>,
    head: Vec<Vec<Span>>,
    rows: Vec<Vec<Vec<Span>>>,
    current_row: Vec<Vec<Span>>,
}

impl ParseState {
    /// Append a finished block to the innermost container that holds blocks.
    fn push_block(&mut self, block: Block) {
        match self.containers.last_mut() {
            Some(Container::Quote(children)) | Some(Container::Item(children)) => {
                children.push(block)
            }
            _ => self.blocks.push(block),
        }
    }

    /// Tight list items carry inline content without a paragraph; turn any
    /// pending spans into a plain block before another block starts.
    fn flush_plain(&mut self) {
        let content = std::mem::take(&mut self.spans);
        if !content.is_empty() {
            self.push_block(Block::Plain { content });
        }
    }

    fn open_inline(&mut self) {
        self.span_stack.push(std::mem::take(&mut self.spans));
    }

    fn close_inline(&mut self, wrap: impl FnOnce(Vec<Span>) -> Span) {
        let inner = std::mem::take(&mut self.spans);
        if let Some(mut parent) = self.span_stack.pop() {
            parent.push(wrap(inner));
            self.spans = parent;
        }
    }
}

fn process_event(event: Event, state: &mut ParseState) {
    match event {
        // Headings
        Event::Start(Tag::Heading { level, .. }) => {
            state.flush_plain();
            state.heading_level = Some(heading_level_to_u8(level));
        }
        Event::End(TagEnd::Heading(_)) => {
            if let Some(level) = state.heading_level.take() {
                let content = std::mem::take(&mut state.spans);
                state.push_block(Block::Heading { level, content });
            }
        }

        // Paragraphs
        Event::Start(Tag::Paragraph) => {
            state.flush_plain();
        }
        Event::End(TagEnd::Paragraph) => {
            let content = std::mem::take(&mut state.spans);
            if !content.is_empty() {
                state.push_block(Block::Paragraph { content });
            }
        }

        // Text content
        Event::Text(text) => {
            if let Some(code) = state.code.as_mut() {
                code.content.push_str(&text);
            } else {
                state.spans.push(Span::Text(text.into_string()));
            }
        }

        // Inline code
        Event::Code(code) => {
            state.spans.push(Span::Code(code.into_string()));
        }

        // Raw HTML
        Event::Start(Tag::HtmlBlock) => {
            state.flush_plain();
            state.html_block = Some(String::new());
        }
        Event::End(TagEnd::HtmlBlock) => {
            if let Some(html) = state.html_block.take() {
                state.push_block(Block::Html(html));
            }
        }
        Event::Html(html) => match state.html_block.as_mut() {
            Some(block) => block.push_str(&html),
            None => state.spans.push(Span::Html(html.into_string())),
        },
        Event::InlineHtml(html) => {
            state.spans.push(Span::Html(html.into_string()));
        }

        // Inline formatting
        Event::Start(Tag::Strong) | Event::Start(Tag::Emphasis) | Event::Start(Tag::Strikethrough) => {
            state.open_inline();
        }
        Event::End(TagEnd::Strong) => state.close_inline(Span::Strong),
        Event::End(TagEnd::Emphasis) => state.close_inline(Span::Emphasis),
        Event::End(TagEnd::Strikethrough) => state.close_inline(Span::Strikethrough),

        // Links
        Event::Start(Tag::Link {
            dest_url, title, ..
        }) => {
            state
                .link_stack
                .push((dest_url.into_string(), title.into_string()));
            state.open_inline();
        }
        Event::End(TagEnd::Link) => {
            if let Some((url, title)) = state.link_stack.pop() {
                state.close_inline(|content| Span::Link {
                    url,
                    title,
                    content,
                });
            }
        }

        // Images; the alt text arrives as child events
        Event::Start(Tag::Image {
            dest_url, title, ..
        }) => {
            state
                .link_stack
                .push((dest_url.into_string(), title.into_string()));
            state.open_inline();
        }
        Event::End(TagEnd::Image) => {
            if let Some((url, title)) = state.link_stack.pop() {
                state.close_inline(|content| Span::Image {
                    url,
                    title,
                    alt: plain_text(&content),
                });
            }
        }

        // Code blocks
        Event::Start(Tag::CodeBlock(kind)) => {
            state.flush_plain();
            let language = match kind {
                CodeBlockKind::Fenced(info) => language_tag(&info),
                CodeBlockKind::Indented => None,
            };
            state.code = Some(CodeBuilder {
                language,
                content: String::new(),
            });
        }
        Event::End(TagEnd::CodeBlock) => {
            if let Some(code) = state.code.take() {
                state.push_block(Block::CodeBlock {
                    language: code.language,
                    content: code.content,
                });
            }
        }

        // Block quotes
        Event::Start(Tag::BlockQuote(_)) => {
            state.flush_plain();
            state.containers.push(Container::Quote(Vec::new()));
        }
        Event::End(TagEnd::BlockQuote(_)) => {
            state.flush_plain();
            if let Some(Container::Quote(children)) = state.containers.pop() {
                state.push_block(Block::BlockQuote(children));
            }
        }

        // Lists
        Event::Start(Tag::List(start)) => {
            state.flush_plain();
            state.containers.push(Container::List {
                start,
                items: Vec::new(),
            });
        }
        Event::End(TagEnd::List(_)) => {
            if let Some(Container::List { start, items }) = state.containers.pop() {
                state.push_block(Block::List(List { start, items }));
            }
        }

        Event::Start(Tag::Item) => {
            state.containers.push(Container::Item(Vec::new()));
        }
        Event::End(TagEnd::Item) => {
            state.flush_plain();
            if let Some(Container::Item(children)) = state.containers.pop() {
                if let Some(Container::List { items, .. }) = state.containers.last_mut() {
                    items.push(ListItem { children });
                }
            }
        }

        // Task list checkboxes
        Event::TaskListMarker(checked) => {
            state.spans.push(Span::TaskMarker(checked));
        }

        // Tables
        Event::Start(Tag::Table(alignments)) => {
            state.flush_plain();
            state.table = Some(TableBuilder {
                alignments,
                ..TableBuilder::default()
            });
        }
        Event::End(TagEnd::Table) => {
            if let Some(table) = state.table.take() {
                state.push_block(Block::Table(Table {
                    alignments: table.alignments,
                    head: table.head,
                    rows: table.rows,
                }));
            }
        }

        Event::Start(Tag::TableHead) | Event::Start(Tag::TableRow) => {
            if let Some(table) = state.table.as_mut() {
                table.current_row.clear();
            }
        }
        Event::End(TagEnd::TableHead) => {
            if let Some(table) = state.table.as_mut() {
                table.head = std::mem::take(&mut table.current_row);
            }
        }
        Event::End(TagEnd::TableRow) => {
            if let Some(table) = state.table.as_mut() {
                let row = std::mem::take(&mut table.current_row);
                table.rows.push(row);
            }
        }

        Event::Start(Tag::TableCell) => {
            state.spans.clear();
        }
        Event::End(TagEnd::TableCell) => {
            let cell = std::mem::take(&mut state.spans);
            if let Some(table) = state.table.as_mut() {
                table.current_row.push(cell);
            }
        }

        // Horizontal rule
        Event::Rule => {
            state.flush_plain();
            state.push_block(Block::Rule);
        }

        // Soft/hard breaks
        Event::SoftBreak => {
            state.spans.push(Span::SoftBreak);
        }
        Event::HardBreak => {
            state.spans.push(Span::LineBreak);
        }

        // Footnotes, math and metadata are not enabled
        _ => {}
    }
}

/// Flatten spans to their visible text (used for image alt text).
fn plain_text(spans: &[Span]) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            Span::Text(text) | Span::Code(text) | Span::Html(text) => out.push_str(text),
            Span::Strong(inner) | Span::Emphasis(inner) | Span::Strikethrough(inner) => {
                out.push_str(&plain_text(inner))
            }
            Span::Link { content, .. } => out.push_str(&plain_text(content)),
            Span::Image { alt, .. } => out.push_str(alt),
            Span::SoftBreak | Span::LineBreak => out.push(' '),
            Span::TaskMarker(_) => {}
        }
    }
    out
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Span {
        Span::Text(s.to_string())
    }

    #[test]
    fn heading_and_paragraph() {
        assert_eq!(
            parse("## Title\n\nBody"),
            vec![
                Block::Heading {
                    level: 2,
                    content: vec![text("Title")]
                },
                Block::Paragraph {
                    content: vec![text("Body")]
                },
            ]
        );
    }

    #[test]
    fn leading_rules_keep_surrounding_text() {
        assert_eq!(
            parse("---\n\nIntro paragraph\n\n---\n\nBody"),
            vec![
                Block::Rule,
                Block::Paragraph {
                    content: vec![text("Intro paragraph")]
                },
                Block::Rule,
                Block::Paragraph {
                    content: vec![text("Body")]
                },
            ]
        );
    }

    #[test]
    fn tight_list_items_are_plain() {
        let blocks = parse("- one\n- two");
        let Block::List(list) = &blocks[0] else {
            panic!("expected list, got {blocks:?}");
        };
        assert!(!list.ordered());
        assert_eq!(
            list.items[1].children,
            vec![Block::Plain {
                content: vec![text("two")]
            }]
        );
    }

    #[test]
    fn loose_list_items_keep_paragraphs() {
        let blocks = parse("1. one\n\n2. two");
        let Block::List(list) = &blocks[0] else {
            panic!("expected list, got {blocks:?}");
        };
        assert_eq!(list.start, Some(1));
        assert_eq!(
            list.items[0].children,
            vec![Block::Paragraph {
                content: vec![text("one")]
            }]
        );
    }

    #[test]
    fn nested_list_follows_item_text() {
        let blocks = parse("- outer\n  - inner");
        let Block::List(list) = &blocks[0] else {
            panic!("expected list, got {blocks:?}");
        };
        let children = &list.items[0].children;
        assert_eq!(children.len(), 2);
        assert_eq!(
            children[0],
            Block::Plain {
                content: vec![text("outer")]
            }
        );
        assert!(matches!(children[1], Block::List(_)));
    }

    #[test]
    fn blockquote_keeps_children() {
        assert_eq!(
            parse("> quoted\n>\n> ---"),
            vec![Block::BlockQuote(vec![
                Block::Paragraph {
                    content: vec![text("quoted")]
                },
                Block::Rule,
            ])]
        );
    }

    #[test]
    fn code_block_language_and_content() {
        assert_eq!(
            parse("```python title=\"x.py\"\nprint(1)\n```"),
            vec![Block::CodeBlock {
                language: Some("python".to_string()),
                content: "print(1)\n".to_string(),
            }]
        );
    }

    #[test]
    fn nested_inline_formatting() {
        assert_eq!(
            parse("**bold *both***"),
            vec![Block::Paragraph {
                content: vec![Span::Strong(vec![
                    text("bold "),
                    Span::Emphasis(vec![text("both")]),
                ])]
            }]
        );
    }

    #[test]
    fn link_and_image() {
        let blocks = parse("[site](https://example.com \"Home\") ![a *b*](img.png)");
        let Block::Paragraph { content } = &blocks[0] else {
            panic!("expected paragraph, got {blocks:?}");
        };
        assert_eq!(
            content[0],
            Span::Link {
                url: "https://example.com".to_string(),
                title: "Home".to_string(),
                content: vec![text("site")],
            }
        );
        assert_eq!(
            content[2],
            Span::Image {
                url: "img.png".to_string(),
                title: String::new(),
                alt: "a b".to_string(),
            }
        );
    }

    #[test]
    fn table_without_body_rows() {
        assert_eq!(
            parse("| A | B |\n|:--|---|"),
            vec![Block::Table(Table {
                alignments: vec![Alignment::Left, Alignment::None],
                head: vec![vec![text("A")], vec![text("B")]],
                rows: vec![],
            })]
        );
    }

    #[test]
    fn html_block_is_kept_as_text() {
        let blocks = parse("<div>hi</div>");
        assert!(
            matches!(&blocks[..], [Block::Html(html)] if html.trim_end() == "<div>hi</div>"),
            "got {blocks:?}"
        );
    }

    #[test]
    fn task_list_marker() {
        let blocks = parse("- [x] done");
        let Block::List(list) = &blocks[0] else {
            panic!("expected list, got {blocks:?}");
        };
        assert_eq!(
            list.items[0].children,
            vec![Block::Plain {
                content: vec![Span::TaskMarker(true), text("done")]
            }]
        );
    }

    #[test]
    fn language_tag_takes_leading_word() {
        assert_eq!(language_tag("rust"), Some("rust".to_string()));
        assert_eq!(language_tag("c++"), Some("c".to_string()));
        assert_eq!(language_tag("{.python}"), None);
        assert_eq!(language_tag("pythonñ"), Some("python".to_string()));
        assert_eq!(language_tag("ñ"), None);
        assert_eq!(language_tag(""), None);
    }

    #[test]
    fn whitespace_only_input_has_no_blocks() {
        assert!(parse("  \n\n ").is_empty());
    }
}
