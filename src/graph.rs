use std::collections::BTreeSet;

use serde::Serialize;

use crate::ast::{FieldRef, Schema};

/// Flattened view of every relation in a schema.
#[derive(Debug, Clone, Serialize)]
pub struct RelationGraph {
    pub edges: Vec<RelationEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationEdge {
    pub model: String,
    pub attribute: String,
    pub targets: Vec<String>,
    pub field: FieldRef,
    pub list: bool,
    pub generic: bool,
    /// The relation sits inside a template attribute.
    pub via_template: bool,
}

impl RelationGraph {
    /// Collect relation edges, optionally only from the named models.
    pub fn from_schema(schema: &Schema, only: Option<&[&str]>) -> Self {
        let edges = schema
            .models
            .iter()
            .filter(|(name, _)| only.is_none_or(|names| names.contains(&name.as_str())))
            .flat_map(|(model, m)| {
                m.attributes.iter().filter_map(move |(attribute, attr)| {
                    let rel = attr.relation()?;
                    Some(RelationEdge {
                        model: model.clone(),
                        attribute: attribute.clone(),
                        targets: rel.target_collections().to_vec(),
                        field: rel.target_field().clone(),
                        list: rel.is_list(),
                        generic: rel.is_generic(),
                        via_template: attr.template().is_some(),
                    })
                })
            })
            .collect();

        RelationGraph { edges }
    }

    /// Every collection referenced by some edge, sorted and de-duplicated.
    pub fn target_collections(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self
            .edges
            .iter()
            .flat_map(|e| e.targets.iter().map(String::as_str))
            .collect();
        set.into_iter().collect()
    }

    /// Edges pointing at a collection or field that `schema` does not declare.
    pub fn dangling<'g>(&'g self, schema: &Schema) -> Vec<&'g RelationEdge> {
        self.edges
            .iter()
            .filter(|e| {
                e.targets
                    .iter()
                    .any(|target| schema.attribute(target, &e.field.name).is_none())
            })
            .collect()
    }
}
