//! Structured (JSON) form of a document, in the node shape used by
//! ProseMirror-style editors: `{"type": "doc", "content": [...]}`.

use serde::{Deserialize, Serialize};

use super::block::{Block, BlockKind, Marks, Span};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Doc {
        #[serde(default)]
        content: Vec<Node>,
    },
    Paragraph {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        content: Vec<Node>,
    },
    Heading {
        #[serde(default)]
        attrs: HeadingAttrs,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        content: Vec<Node>,
    },
    BulletList {
        #[serde(default)]
        content: Vec<Node>,
    },
    ListItem {
        #[serde(default)]
        content: Vec<Node>,
    },
    Blockquote {
        #[serde(default)]
        content: Vec<Node>,
    },
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        marks: Vec<Mark>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingAttrs {
    pub level: u8,
}

impl Default for HeadingAttrs {
    fn default() -> Self {
        Self { level: 1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mark {
    Bold,
    Italic,
    Code,
    #[serde(other)]
    Unknown,
}

impl Node {
    pub fn doc(content: Vec<Node>) -> Self {
        Node::Doc { content }
    }

    pub fn paragraph(content: Vec<Node>) -> Self {
        Node::Paragraph { content }
    }

    pub fn heading(level: u8, content: Vec<Node>) -> Self {
        Node::Heading {
            attrs: HeadingAttrs { level },
            content,
        }
    }

    pub fn bullet_list(items: Vec<Vec<Node>>) -> Self {
        Node::BulletList {
            content: items
                .into_iter()
                .map(|inline| Node::ListItem {
                    content: vec![Node::paragraph(inline)],
                })
                .collect(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::Text {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    pub fn marked(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        Node::Text {
            text: text.into(),
            marks,
        }
    }
}

fn span_to_node(span: &Span) -> Node {
    let mut marks = Vec::new();
    if span.marks.bold {
        marks.push(Mark::Bold);
    }
    if span.marks.italic {
        marks.push(Mark::Italic);
    }
    if span.marks.code {
        marks.push(Mark::Code);
    }
    Node::marked(span.text.clone(), marks)
}

fn inline_nodes(block: &Block) -> Vec<Node> {
    block
        .spans
        .iter()
        .filter(|s| !s.text.is_empty())
        .map(span_to_node)
        .collect()
}

/// Build the structured form from a sequence of blocks
pub fn blocks_to_doc(blocks: &[Block]) -> Node {
    let mut content = Vec::new();
    let mut i = 0;
    while i < blocks.len() {
        match blocks[i].kind {
            BlockKind::Paragraph => {
                content.push(Node::paragraph(inline_nodes(&blocks[i])));
                i += 1;
            }
            BlockKind::Heading(level) => {
                content.push(Node::heading(level, inline_nodes(&blocks[i])));
                i += 1;
            }
            kind @ (BlockKind::Bullet | BlockKind::Quote) => {
                // Consecutive items of the same kind share one container
                let mut group = Vec::new();
                while i < blocks.len() && blocks[i].kind == kind {
                    group.push(inline_nodes(&blocks[i]));
                    i += 1;
                }
                if kind == BlockKind::Bullet {
                    content.push(Node::bullet_list(group));
                } else {
                    content.push(Node::Blockquote {
                        content: group.into_iter().map(Node::paragraph).collect(),
                    });
                }
            }
        }
    }
    if content.is_empty() {
        content.push(Node::paragraph(Vec::new()));
    }
    Node::doc(content)
}

fn inline_spans(nodes: &[Node]) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    for node in nodes {
        if let Node::Text { text, marks } = node {
            let mut m = Marks::default();
            for mark in marks {
                match mark {
                    Mark::Bold => m.bold = true,
                    Mark::Italic => m.italic = true,
                    Mark::Code => m.code = true,
                    Mark::Unknown => {}
                }
            }
            match spans.last_mut() {
                Some(last) if last.marks == m => last.text.push_str(text),
                _ => spans.push(Span {
                    text: text.clone(),
                    marks: m,
                }),
            }
        }
    }
    spans
}

fn collect_paragraphs(nodes: &[Node], kind: BlockKind, out: &mut Vec<Block>) {
    for node in nodes {
        match node {
            Node::Paragraph { content } | Node::Heading { content, .. } => out.push(Block {
                kind,
                spans: inline_spans(content),
            }),
            Node::ListItem { content }
            | Node::BulletList { content }
            | Node::Blockquote { content } => collect_paragraphs(content, kind, out),
            _ => {}
        }
    }
}

/// Flatten the structured form into blocks. Unknown node types are dropped.
pub fn doc_to_blocks(doc: &Node) -> Vec<Block> {
    let top = match doc {
        Node::Doc { content } => content.as_slice(),
        other => std::slice::from_ref(other),
    };
    let mut blocks = Vec::new();
    for node in top {
        match node {
            Node::Paragraph { content } => blocks.push(Block {
                kind: BlockKind::Paragraph,
                spans: inline_spans(content),
            }),
            Node::Heading { attrs, content } => blocks.push(Block {
                kind: BlockKind::Heading(attrs.level.clamp(1, 3)),
                spans: inline_spans(content),
            }),
            Node::BulletList { content } => {
                collect_paragraphs(content, BlockKind::Bullet, &mut blocks)
            }
            Node::Blockquote { content } => {
                collect_paragraphs(content, BlockKind::Quote, &mut blocks)
            }
            Node::Text { .. } => blocks.push(Block {
                kind: BlockKind::Paragraph,
                spans: inline_spans(std::slice::from_ref(node)),
            }),
            _ => {}
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_in_prosemirror_shape() {
        let blocks = vec![Block::parse("# Hi"), Block::parse("**bold** text")];
        let value = serde_json::to_value(blocks_to_doc(&blocks)).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "doc",
                "content": [
                    {"type": "heading", "attrs": {"level": 1}, "content": [{"type": "text", "text": "Hi"}]},
                    {"type": "paragraph", "content": [
                        {"type": "text", "text": "bold", "marks": [{"type": "bold"}]},
                        {"type": "text", "text": " text"}
                    ]}
                ]
            })
        );
    }

    #[test]
    fn empty_paragraph_has_no_content() {
        let value = serde_json::to_value(blocks_to_doc(&[Block::parse("")])).unwrap();
        assert_eq!(value, json!({"type": "doc", "content": [{"type": "paragraph"}]}));
    }

    #[test]
    fn bullets_group_into_one_list() {
        let blocks = vec![Block::parse("- a"), Block::parse("- b"), Block::parse("c")];
        match blocks_to_doc(&blocks) {
            Node::Doc { content } => {
                assert_eq!(content.len(), 2);
                match &content[0] {
                    Node::BulletList { content } => assert_eq!(content.len(), 2),
                    other => panic!("expected bullet list, got {other:?}"),
                }
            }
            other => panic!("expected doc, got {other:?}"),
        }
    }

    #[test]
    fn value_round_trips_through_blocks() {
        let value = json!({
            "type": "doc",
            "content": [
                {"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "Notes"}]},
                {"type": "bulletList", "content": [
                    {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "one"}]}]},
                    {"type": "listItem", "content": [{"type": "paragraph", "content": [
                        {"type": "text", "text": "two", "marks": [{"type": "italic"}]}
                    ]}]}
                ]},
                {"type": "blockquote", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "quoted"}]}]},
                {"type": "paragraph"}
            ]
        });
        let doc: Node = serde_json::from_value(value.clone()).unwrap();
        let back = blocks_to_doc(&doc_to_blocks(&doc));
        assert_eq!(serde_json::to_value(back).unwrap(), value);
    }

    #[test]
    fn unknown_nodes_are_dropped() {
        let value = json!({
            "type": "doc",
            "content": [
                {"type": "image", "attrs": {"src": "x.png"}},
                {"type": "paragraph", "content": [{"type": "text", "text": "kept", "marks": [{"type": "link"}]}]}
            ]
        });
        let doc: Node = serde_json::from_value(value).unwrap();
        let blocks = doc_to_blocks(&doc);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].plain_text(), "kept");
    }

    #[test]
    fn heading_level_is_clamped() {
        let doc = Node::doc(vec![Node::heading(6, vec![Node::text("deep")])]);
        assert_eq!(doc_to_blocks(&doc)[0].kind, BlockKind::Heading(3));
    }
}
