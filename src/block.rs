use pulldown_cmark::Alignment;

/// Inline text spans with formatting
#[derive(Debug, Clone, PartialEq)]
pub enum Span {
    Text(String),
    Strong(Vec<Span>),
    Emphasis(Vec<Span>),
    Strikethrough(Vec<Span>),
    Code(String),
    Link {
        url: String,
        title: String,
        content: Vec<Span>,
    },
    Image {
        url: String,
        title: String,
        alt: String,
    },
    /// Raw inline HTML, kept as text
    Html(String),
    TaskMarker(bool),
    SoftBreak,
    LineBreak,
}

/// A single list item. Its children are whole blocks so that loose items,
/// nested lists and code inside items keep their structure.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub children: Vec<Block>,
}

/// A list (ordered when `start` is set)
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub start: Option<u64>,
    pub items: Vec<ListItem>,
}

impl List {
    pub fn ordered(&self) -> bool {
        self.start.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub alignments: Vec<Alignment>,
    pub head: Vec<Vec<Span>>,
    pub rows: Vec<Vec<Vec<Span>>>,
}

/// Block-level elements parsed from Markdown
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading {
        level: u8,
        content: Vec<Span>,
    },
    Paragraph {
        content: Vec<Span>,
    },
    /// Inline content of a tight list item, not wrapped in a paragraph
    Plain {
        content: Vec<Span>,
    },
    CodeBlock {
        language: Option<String>,
        content: String,
    },
    List(List),
    BlockQuote(Vec<Block>),
    Table(Table),
    /// Raw block HTML, kept as text
    Html(String),
    Rule,
}
