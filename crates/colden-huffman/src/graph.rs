//! Graphviz description of a tree.
//!
//! Produces DOT text only; rendering is left to an external `dot` process.

use std::io::{self, Write};

use crate::tree::{HuffmanTree, Node};

/// Write `tree` as a `digraph` in DOT syntax.
///
/// Nodes are named by their preorder index. Leaves are labelled with the
/// symbol in hex and, when known, the weight; internal nodes with the weight
/// alone. Edges carry the bit they encode.
pub fn write_dot<W: Write>(tree: &HuffmanTree, mut writer: W) -> io::Result<()> {
    writeln!(writer, "digraph HT {{")?;
    let mut next_id = 0;
    write_node(&mut writer, tree.root(), &mut next_id)?;
    writeln!(writer, "}}")?;
    writer.flush()
}

fn write_node<W: Write>(writer: &mut W, node: &Node, next_id: &mut usize) -> io::Result<()> {
    let id = *next_id;
    *next_id += 1;

    let weight = node.weight();
    match node {
        Node::Leaf { symbol, .. } => {
            let label = match weight {
                Some(w) => format!("0x{:x}: {}", symbol, w),
                None => format!("0x{:x}", symbol),
            };
            writeln!(writer, "  \"n{}\" [ label = \"{}\" ];", id, label)?;
        }
        Node::Internal { left, right, .. } => {
            let label = weight.map(|w| w.to_string()).unwrap_or_default();
            writeln!(writer, "  \"n{}\" [ label = \"{}\" ];", id, label)?;
            for (bit, child) in [(0, left), (1, right)] {
                writeln!(
                    writer,
                    "  \"n{}\" -> \"n{}\" [ label = {} ];",
                    id, *next_id, bit
                )?;
                write_node(writer, child, next_id)?;
            }
        }
    }
    Ok(())
}
