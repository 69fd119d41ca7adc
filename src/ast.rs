use std::collections::BTreeMap;

use serde::Serialize;

/// Field kind used when a field reference is written as a bare name.
pub const DEFAULT_FIELD_KIND: &str = "normal";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub models: BTreeMap<String, Model>,
}

impl Schema {
    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    /// Look up `model.attribute`.
    pub fn attribute(&self, model: &str, attribute: &str) -> Option<&Attribute> {
        self.models.get(model)?.attributes.get(attribute)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Model {
    pub attributes: BTreeMap<String, Attribute>,
}

impl Model {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn relation_count(&self) -> usize {
        self.attributes
            .values()
            .filter(|a| a.relation().is_some())
            .count()
    }
}

/// A single field definition of a model.
///
/// `typ` is the raw type descriptor as written in the document. The payload
/// holds at most one of a relation or a template; a plain attribute holds
/// neither.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub typ: String,
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Plain,
    Relation(DirectRelation),
    GenericRelation(GenericRelation),
    Template(Box<Template>),
}

impl Attribute {
    pub fn plain(typ: impl Into<String>) -> Self {
        Self {
            typ: typ.into(),
            payload: Payload::Plain,
        }
    }

    pub fn is_plain(&self) -> bool {
        matches!(self.payload, Payload::Plain)
    }

    pub fn template(&self) -> Option<&Template> {
        match &self.payload {
            Payload::Template(t) => Some(t),
            _ => None,
        }
    }

    /// Relation of this attribute, or of the attribute wrapped by its template.
    ///
    /// Forwarding through a template is a single hop: a template whose
    /// `fields` is itself a template yields no relation.
    pub fn relation(&self) -> Option<&dyn Relation> {
        match &self.payload {
            Payload::Template(t) => t.fields.own_relation(),
            _ => self.own_relation(),
        }
    }

    fn own_relation(&self) -> Option<&dyn Relation> {
        match &self.payload {
            Payload::Relation(r) => Some(r),
            Payload::GenericRelation(r) => Some(r),
            Payload::Plain | Payload::Template(_) => None,
        }
    }
}

/// Anything that points at fields of other collections.
pub trait Relation {
    /// Candidate target collections. Never empty; exactly one for direct relations.
    fn target_collections(&self) -> &[String];
    fn target_field(&self) -> &FieldRef;
    fn is_list(&self) -> bool;

    fn is_generic(&self) -> bool {
        false
    }
}

/// `relation` / `relation-list`
#[derive(Debug, Clone, PartialEq)]
pub struct DirectRelation {
    pub to: TargetRef,
    pub list: bool,
}

impl Relation for DirectRelation {
    fn target_collections(&self) -> &[String] {
        std::slice::from_ref(&self.to.collection)
    }

    fn target_field(&self) -> &FieldRef {
        &self.to.field
    }

    fn is_list(&self) -> bool {
        self.list
    }
}

/// `generic-relation` / `generic-relation-list`
#[derive(Debug, Clone, PartialEq)]
pub struct GenericRelation {
    pub to: GenericTargetRef,
    pub list: bool,
}

impl Relation for GenericRelation {
    fn target_collections(&self) -> &[String] {
        &self.to.collections
    }

    fn target_field(&self) -> &FieldRef {
        &self.to.field
    }

    fn is_list(&self) -> bool {
        self.list
    }

    fn is_generic(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    /// Placeholder token substituted by consumers; opaque here.
    pub replacement: String,
    pub fields: Attribute,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetRef {
    pub collection: String,
    pub field: FieldRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenericTargetRef {
    pub collections: Vec<String>,
    pub field: FieldRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldRef {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldRef {
    pub fn normal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DEFAULT_FIELD_KIND.to_string(),
        }
    }

    pub fn is_normal(&self) -> bool {
        self.kind == DEFAULT_FIELD_KIND
    }
}
