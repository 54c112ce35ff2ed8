//! Evaluation of a parsed template against variable values

use std::collections::BTreeMap;

use crate::parser::{Condition, Node, Segment, TemplateAst};
use crate::renderer::config::RenderOptions;

/// Render a parsed template against a name to value mapping.
///
/// Every text line produces exactly one output line; directive and comment
/// lines produce none. With default options, lines that render exactly
/// empty are removed and the rest are joined with `\n`, without a trailing
/// newline. Placeholders whose name is absent from the mapping render
/// empty.
pub fn render(
    ast: &TemplateAst,
    values: &BTreeMap<String, String>,
    options: &RenderOptions,
) -> String {
    let mut lines = Vec::new();
    render_nodes(&ast.nodes, values, &mut lines);

    if options.strip_blank_lines {
        lines.retain(|line| !line.is_empty());
    }

    lines.join("\n")
}

fn render_nodes(nodes: &[Node], values: &BTreeMap<String, String>, lines: &mut Vec<String>) {
    for node in nodes {
        match node {
            Node::Text(segments) => lines.push(render_segments(segments, values)),
            Node::Conditional(conditional) => {
                let taken = conditional
                    .branches
                    .iter()
                    .find(|branch| evaluate(&branch.condition, values));
                match taken {
                    Some(branch) => render_nodes(&branch.body, values, lines),
                    None => {
                        if let Some(fallback) = &conditional.fallback {
                            render_nodes(fallback, values, lines);
                        }
                    }
                }
            }
        }
    }
}

fn render_segments(segments: &[Segment], values: &BTreeMap<String, String>) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Literal(text) => text.as_str(),
            Segment::Placeholder(name) => values.get(name).map(String::as_str).unwrap_or(""),
        })
        .collect()
}

/// An empty value is false, anything else is true. Names that were never
/// set count as empty.
fn evaluate(condition: &Condition, values: &BTreeMap<String, String>) -> bool {
    let set = values
        .get(&condition.variable)
        .is_some_and(|value| !value.is_empty());
    if condition.negated {
        !set
    } else {
        set
    }
}
