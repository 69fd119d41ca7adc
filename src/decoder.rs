//! Decoding of models.yml documents into a [`Schema`].
//!
//! The document is parsed by `serde_yaml` into a node tree first; this module
//! only interprets that tree. Each attribute node is sniffed for its shape:
//! a bare scalar is a plain type name, a mapping must carry a `type`
//! discriminator that selects the payload decoder.

use std::collections::BTreeMap;
use std::io::Read;

use log::{debug, trace};
use serde_yaml::{Mapping, Value};

use crate::ast::*;
use crate::locate::{locate, NodeKind, Position};

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Syntax error: {0}")]
    Syntax(#[from] serde_yaml::Error),
    #[error("Read error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Expected {expected}, found {found} at {position}")]
    Structural {
        expected: &'static str,
        found: NodeKind,
        position: Position,
    },
    #[error("Missing key `{key}` at {position}")]
    MissingKey {
        key: &'static str,
        position: Position,
    },
    #[error("Field object without type at {position} (found {found})")]
    MissingType { found: NodeKind, position: Position },
    #[error("Invalid object of type {typ} at {position}: {source}")]
    InvalidRelation {
        typ: String,
        position: Position,
        #[source]
        source: Box<DecodeError>,
    },
    #[error("Invalid object of type {typ} at {position}: {source}")]
    InvalidGenericRelation {
        typ: String,
        position: Position,
        #[source]
        source: Box<DecodeError>,
    },
    #[error("Invalid object of type template at {position}: {source}")]
    InvalidTemplate {
        position: Position,
        #[source]
        source: Box<DecodeError>,
    },
    #[error("Invalid value of `to` at {position}, expected one `/`: {raw}")]
    MalformedTo { raw: String, position: Position },
    #[error("Invalid field reference at {position}: {source}")]
    InvalidFieldRef {
        position: Position,
        #[source]
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    /// The most specific error underneath any wrapping variants.
    pub fn innermost(&self) -> &DecodeError {
        match self {
            Self::InvalidRelation { source, .. }
            | Self::InvalidGenericRelation { source, .. }
            | Self::InvalidTemplate { source, .. }
            | Self::InvalidFieldRef { source, .. } => source.innermost(),
            _ => self,
        }
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            Self::Syntax(_) | Self::Io(_) => None,
            Self::Structural { position, .. }
            | Self::MissingKey { position, .. }
            | Self::MissingType { position, .. }
            | Self::InvalidRelation { position, .. }
            | Self::InvalidGenericRelation { position, .. }
            | Self::InvalidTemplate { position, .. }
            | Self::MalformedTo { position, .. }
            | Self::InvalidFieldRef { position, .. } => Some(position),
        }
    }
}

/// Decode a models document from a reader.
pub fn decode<R: Read>(mut reader: R) -> Result<Schema, DecodeError> {
    let mut source = String::new();
    reader.read_to_string(&mut source)?;
    decode_str(&source)
}

/// Decode a models document held in memory.
pub fn decode_str(source: &str) -> Result<Schema, DecodeError> {
    let mut root: Value = serde_yaml::from_str(source)?;
    root.apply_merge()?;
    let schema = Decoder::new(source).decode_schema(&root)?;
    debug!(
        "decoded {} models, {} relations",
        schema.models.len(),
        schema.models.values().map(Model::relation_count).sum::<usize>()
    );
    Ok(schema)
}

/// Interprets a parsed node tree. Holds the source text only to resolve
/// line numbers for errors.
pub struct Decoder<'a> {
    source: &'a str,
}

impl<'a> Decoder<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    pub fn decode_schema(&self, root: &Value) -> Result<Schema, DecodeError> {
        let map = match root {
            Value::Mapping(map) => map,
            other => return Err(self.structural("mapping of model names", other, &[])),
        };

        let mut models = BTreeMap::new();
        for (key, value) in map {
            let name = self.key_text(key, &[])?;
            let model = self.decode_model(value, &[name.clone()])?;
            models.insert(name, model);
        }

        Ok(Schema { models })
    }

    fn decode_model(&self, node: &Value, path: &[String]) -> Result<Model, DecodeError> {
        let map = match node {
            Value::Null => return Ok(Model::default()),
            Value::Mapping(map) => map,
            other => return Err(self.structural("mapping of attribute names", other, path)),
        };

        let mut attributes = BTreeMap::new();
        for (key, value) in map {
            let name = self.key_text(key, path)?;
            let attr_path = child(path, &name);
            let attribute = self.decode_attribute(value, &attr_path)?;
            trace!("{}: {}", attr_path.join("."), attribute.typ);
            attributes.insert(name, attribute);
        }

        Ok(Model { attributes })
    }

    /// Decode one attribute node, either a bare type name or a mapping with
    /// a `type` discriminator.
    pub fn decode_attribute(
        &self,
        node: &Value,
        path: &[String],
    ) -> Result<Attribute, DecodeError> {
        if let Some(typ) = scalar_text(node) {
            return Ok(Attribute::plain(typ));
        }

        let map = match node {
            Value::Mapping(map) => map,
            other => {
                return Err(DecodeError::MissingType {
                    found: NodeKind::of(other),
                    position: self.position(path),
                });
            }
        };

        let typ = match map.get("type") {
            Some(Value::String(s)) => s.clone(),
            _ => {
                return Err(DecodeError::MissingType {
                    found: NodeKind::Mapping,
                    position: self.position(path),
                });
            }
        };

        let payload = match typ.as_str() {
            "relation" | "relation-list" => {
                let to = self
                    .require(map, "to", path)
                    .and_then(|to| self.decode_target(to, &child(path, "to")))
                    .map_err(|e| DecodeError::InvalidRelation {
                        typ: typ.clone(),
                        position: self.position(path),
                        source: Box::new(e),
                    })?;
                Payload::Relation(DirectRelation {
                    to,
                    list: typ == "relation-list",
                })
            }
            "generic-relation" | "generic-relation-list" => {
                let to = self
                    .require(map, "to", path)
                    .and_then(|to| self.decode_generic_target(to, &child(path, "to")))
                    .map_err(|e| DecodeError::InvalidGenericRelation {
                        typ: typ.clone(),
                        position: self.position(path),
                        source: Box::new(e),
                    })?;
                Payload::GenericRelation(GenericRelation {
                    to,
                    list: typ == "generic-relation-list",
                })
            }
            "template" => {
                let template = self.decode_template(map, path).map_err(|e| {
                    DecodeError::InvalidTemplate {
                        position: self.position(path),
                        source: Box::new(e),
                    }
                })?;
                Payload::Template(Box::new(template))
            }
            // No whitelist: anything else is an opaque scalar type.
            _ => Payload::Plain,
        };

        Ok(Attribute { typ, payload })
    }

    fn decode_template(&self, map: &Mapping, path: &[String]) -> Result<Template, DecodeError> {
        let replacement = match map.get("replacement") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(self.structural("string", other, &child(path, "replacement")));
            }
        };

        let fields = self.require(map, "fields", path)?;
        let fields = self.decode_attribute(fields, &child(path, "fields"))?;

        Ok(Template {
            replacement,
            fields,
        })
    }

    pub(crate) fn position(&self, path: &[String]) -> Position {
        Position::new(path.to_vec(), locate(self.source, path))
    }

    pub(crate) fn structural(
        &self,
        expected: &'static str,
        found: &Value,
        path: &[String],
    ) -> DecodeError {
        DecodeError::Structural {
            expected,
            found: NodeKind::of(found),
            position: self.position(path),
        }
    }

    pub(crate) fn require<'v>(
        &self,
        map: &'v Mapping,
        key: &'static str,
        path: &[String],
    ) -> Result<&'v Value, DecodeError> {
        map.get(key).ok_or_else(|| DecodeError::MissingKey {
            key,
            position: self.position(path),
        })
    }

    pub(crate) fn require_string(
        &self,
        map: &Mapping,
        key: &'static str,
        path: &[String],
    ) -> Result<String, DecodeError> {
        match self.require(map, key, path)? {
            Value::String(s) => Ok(s.clone()),
            other => Err(self.structural("string", other, &child(path, key))),
        }
    }

    fn key_text(&self, key: &Value, path: &[String]) -> Result<String, DecodeError> {
        scalar_text(key).ok_or_else(|| self.structural("scalar key", key, path))
    }
}

/// Text of a plain scalar. Numbers and booleans are taken as written.
fn scalar_text(node: &Value) -> Option<String> {
    match node {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn child(path: &[String], key: &str) -> Vec<String> {
    let mut next = Vec::with_capacity(path.len() + 1);
    next.extend_from_slice(path);
    next.push(key.to_string());
    next
}
