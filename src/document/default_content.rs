use super::schema::{Mark, Node};

/// Starter document shown when nothing has been saved yet
pub fn starter_document() -> Node {
    Node::doc(vec![
        Node::heading(1, vec![Node::text("Welcome to Quill")]),
        Node::paragraph(vec![
            Node::text("Quill is a terminal writing pad with "),
            Node::marked("AI-powered", vec![Mark::Bold]),
            Node::text(" autocompletion."),
        ]),
        Node::heading(2, vec![Node::text("Features")]),
        Node::bullet_list(vec![
            vec![
                Node::text("Type "),
                Node::marked("++", vec![Mark::Code]),
                Node::text(" to let the AI continue your text."),
            ],
            vec![
                Node::text("Press "),
                Node::marked("Esc", vec![Mark::Code]),
                Node::text(" to cancel a completion, "),
                Node::marked("Ctrl-Z", vec![Mark::Code]),
                Node::text(" to stop it and keep what was written."),
            ],
            vec![Node::text("Your writing is saved locally as you type.")],
            vec![
                Node::text("Tab to "),
                Node::marked("Send", vec![Mark::Italic]),
                Node::text(" to copy the document as HTML."),
            ],
        ]),
        Node::Blockquote {
            content: vec![Node::paragraph(vec![Node::text(
                "Markdown shortcuts work too: # headings, - bullets, > quotes.",
            )])],
        },
        Node::paragraph(vec![]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::schema::{blocks_to_doc, doc_to_blocks};

    #[test]
    fn starter_document_round_trips() {
        let doc = starter_document();
        assert_eq!(blocks_to_doc(&doc_to_blocks(&doc)), doc);
    }
}
