use super::schema::{Mark, Node};

fn escape(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

fn mark_tag(mark: &Mark) -> Option<&'static str> {
    match mark {
        Mark::Bold => Some("strong"),
        Mark::Italic => Some("em"),
        Mark::Code => Some("code"),
        Mark::Unknown => None,
    }
}

fn wrap(tag: &str, children: &[Node], out: &mut String) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    for child in children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Doc { content } => {
            for child in content {
                write_node(child, out);
            }
        }
        Node::Paragraph { content } => wrap("p", content, out),
        Node::Heading { attrs, content } => {
            let tag = format!("h{}", attrs.level.clamp(1, 6));
            wrap(&tag, content, out);
        }
        Node::BulletList { content } => wrap("ul", content, out),
        Node::ListItem { content } => wrap("li", content, out),
        Node::Blockquote { content } => wrap("blockquote", content, out),
        Node::Text { text, marks } => {
            let tags: Vec<&str> = marks.iter().filter_map(mark_tag).collect();
            for tag in &tags {
                out.push('<');
                out.push_str(tag);
                out.push('>');
            }
            escape(text, out);
            for tag in tags.iter().rev() {
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
        Node::Unknown => {}
    }
}

/// Flatten a document to an HTML string
pub fn to_html(doc: &Node) -> String {
    let mut out = String::new();
    write_node(doc, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_blocks_and_marks() {
        let doc = Node::doc(vec![
            Node::heading(1, vec![Node::text("Title")]),
            Node::paragraph(vec![
                Node::text("a "),
                Node::marked("b", vec![Mark::Bold, Mark::Italic]),
            ]),
        ]);
        assert_eq!(
            to_html(&doc),
            "<h1>Title</h1><p>a <strong><em>b</em></strong></p>"
        );
    }

    #[test]
    fn renders_lists_and_quotes() {
        let doc = Node::doc(vec![
            Node::bullet_list(vec![vec![Node::text("one")]]),
            Node::Blockquote {
                content: vec![Node::paragraph(vec![Node::text("q")])],
            },
        ]);
        assert_eq!(
            to_html(&doc),
            "<ul><li><p>one</p></li></ul><blockquote><p>q</p></blockquote>"
        );
    }

    #[test]
    fn escapes_text() {
        let doc = Node::doc(vec![Node::paragraph(vec![Node::text("<a & \"b\">")])]);
        assert_eq!(to_html(&doc), "<p>&lt;a &amp; &quot;b&quot;&gt;</p>");
    }

    #[test]
    fn empty_paragraph() {
        let doc = Node::doc(vec![Node::paragraph(vec![])]);
        assert_eq!(to_html(&doc), "<p></p>");
    }
}
