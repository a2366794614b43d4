//! XML output in the course format: `*T.xml` token listings and `*.xml`
//! parse trees.
//!
//! Output is built with direct `push_str` calls into a pre-sized buffer.

use crate::token::{SpannedToken, Token};
use crate::tree::{Node, NonTerminal};

/// Estimated bytes per token in XML output (for buffer pre-allocation).
const BYTES_PER_TOKEN: usize = 40;

/// Estimated bytes per indent level.
const BYTES_PER_INDENT: usize = 2;

/// Generate token XML output (*T.xml format).
pub fn tokens_to_xml(tokens: &[SpannedToken]) -> String {
    // <tokens>\n + tokens + </tokens>\n
    let mut output = String::with_capacity(10 + tokens.len() * BYTES_PER_TOKEN + 11);

    output.push_str("<tokens>\n");
    for token in tokens {
        write_token(&token.token, &mut output);
    }
    output.push_str("</tokens>\n");
    output
}

/// Generate parse tree XML output (*.xml format).
pub fn tree_to_xml(class: &NonTerminal) -> String {
    let mut writer = XmlWriter::with_capacity(class.terminals().len());
    writer.write_non_terminal(class);
    writer.output
}

#[inline]
fn write_token(token: &Token, output: &mut String) {
    let tag = token.xml_tag();
    output.push('<');
    output.push_str(tag);
    output.push_str("> ");
    token.write_xml_value(output);
    output.push_str(" </");
    output.push_str(tag);
    output.push_str(">\n");
}

/// Indenting writer over the tree.
struct XmlWriter {
    output: String,
    indent: usize,
}

impl XmlWriter {
    fn with_capacity(token_count: usize) -> Self {
        let capacity = token_count * BYTES_PER_TOKEN + token_count * BYTES_PER_INDENT * 4;
        Self {
            output: String::with_capacity(capacity),
            indent: 0,
        }
    }

    #[inline]
    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
    }

    fn write_node(&mut self, node: &Node) {
        match node {
            Node::Terminal(t) => {
                self.write_indent();
                write_token(&t.token, &mut self.output);
            }
            Node::NonTerminal(n) => self.write_non_terminal(n),
        }
    }

    fn write_non_terminal(&mut self, node: &NonTerminal) {
        if node.kind.is_synthetic() {
            for child in &node.children {
                self.write_node(child);
            }
            return;
        }

        let tag = node.kind.tag();
        self.write_indent();
        self.output.push('<');
        self.output.push_str(tag);
        self.output.push_str(">\n");

        self.indent += 1;
        for child in &node.children {
            self.write_node(child);
        }
        self.indent -= 1;

        self.write_indent();
        self.output.push_str("</");
        self.output.push_str(tag);
        self.output.push_str(">\n");
    }
}
