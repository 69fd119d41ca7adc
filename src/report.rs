//! Plain-text rendering of decoded schemas.

use unicode_width::UnicodeWidthStr;

use crate::ast::Schema;
use crate::graph::{RelationEdge, RelationGraph};

/// One line per model: name, attribute count, relation count.
pub fn render_summary(schema: &Schema) -> String {
    let rows: Vec<[String; 3]> = schema
        .models
        .iter()
        .map(|(name, model)| {
            [
                name.clone(),
                format!("{} attributes", model.attributes.len()),
                format!("{} relations", model.relation_count()),
            ]
        })
        .collect();

    let mut output = render_table(&rows);
    output.push_str(&format!("{} models\n", schema.models.len()));
    output
}

/// Aligned table of relation edges.
pub fn render_relations(graph: &RelationGraph) -> String {
    let rows: Vec<[String; 3]> = graph
        .edges
        .iter()
        .map(|e| {
            [
                format!("{}.{}", e.model, e.attribute),
                format!("-> {}/{}", e.targets.join("|"), e.field.name),
                flags(e),
            ]
        })
        .collect();
    render_table(&rows)
}

fn flags(edge: &RelationEdge) -> String {
    let mut flags = Vec::new();
    if edge.list {
        flags.push("list".to_string());
    }
    if edge.generic {
        flags.push("generic".to_string());
    }
    if edge.via_template {
        flags.push("template".to_string());
    }
    if !edge.field.is_normal() {
        flags.push(format!("field:{}", edge.field.kind));
    }
    flags.join(",")
}

fn render_table<const N: usize>(rows: &[[String; N]]) -> String {
    let mut widths = [0usize; N];
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(text_width(cell));
        }
    }

    let mut output = String::new();
    for row in rows {
        let mut line = String::new();
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                line.push_str("  ");
            }
            line.push_str(cell);
            if i + 1 < N {
                line.push_str(&" ".repeat(widths[i] - text_width(cell)));
            }
        }
        output.push_str(line.trim_end());
        output.push('\n');
    }
    output
}

/// Display width in terminal columns; wide characters count as two.
fn text_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode_str;

    #[test]
    fn test_table_pads_cells_to_display_width() {
        let rows = [
            ["グループ".to_string(), "a".to_string()],
            ["group".to_string(), "b".to_string()],
        ];
        // The wide column is 8 terminal columns; `group` gets 3 spaces of padding.
        assert_eq!(render_table(&rows), "グループ  a\ngroup     b\n");
    }

    #[test]
    fn test_table_trims_empty_last_column() {
        let rows = [["user.id".to_string(), String::new()]];
        assert_eq!(render_table(&rows), "user.id\n");
    }

    #[test]
    fn test_render_summary() {
        let input = r#"
            user:
              id: number
              group_id: {type: relation, to: group/user_ids}
            group:
              user_ids: {type: relation-list, to: user/group_id}
        "#;
        let schema = decode_str(input).unwrap();
        let out = render_summary(&schema);
        assert_eq!(
            out,
            "group  1 attributes  1 relations\n\
             user   2 attributes  1 relations\n\
             2 models\n"
        );
    }

    #[test]
    fn test_render_relations_aligns_wide_names() {
        let input = r#"
            ユーザー:
              g: {type: relation-list, to: group/user_ids}
            group:
              user_ids:
                type: generic-relation
                to: {collection: [ユーザー, meeting], field: {name: g, type: generic}}
        "#;
        let schema = decode_str(input).unwrap();
        let graph = RelationGraph::from_schema(&schema, None);
        let out = render_relations(&graph);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "group.user_ids  -> ユーザー|meeting/g  generic,field:generic");
        assert_eq!(lines[1], "ユーザー.g      -> group/user_ids      list");
    }
}
