//! Edge-list topology files.
//!
//! One `source target` pair per line, whitespace separated. Blank lines and
//! anything after `#` are ignored. Nodes appear only through edges, so an
//! isolated node has to be written as a self-loop.

use crate::SimError;
use petgraph::graphmap::DiGraphMap;
use std::path::Path;

/// Parses an edge list from text.
pub fn parse_edge_list(text: &str) -> Result<DiGraphMap<usize, ()>, SimError> {
    let mut graph = DiGraphMap::new();
    
    for (index, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        
        let fields: Vec<&str> = line.split_whitespace().collect();
        let (source, target) = match fields.as_slice() {
            [source, target] => (*source, *target),
            _ => {
                return Err(SimError::EdgeList {
                    line: index + 1,
                    reason: format!("expected 2 fields, found {}", fields.len()),
                })
            }
        };
        
        let parse = |field: &str| {
            field.parse::<usize>().map_err(|e| SimError::EdgeList {
                line: index + 1,
                reason: format!("bad node label {:?}: {}", field, e),
            })
        };
        graph.add_edge(parse(source)?, parse(target)?, ());
    }
    
    Ok(graph)
}

/// Reads an edge list file.
pub fn load_edge_list(path: impl AsRef<Path>) -> Result<DiGraphMap<usize, ()>, SimError> {
    let text = std::fs::read_to_string(path)?;
    parse_edge_list(&text)
}
