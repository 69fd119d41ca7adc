//! Decoding of the `to` part of relations and of field references.

use serde_yaml::Value;

use crate::ast::{FieldRef, GenericTargetRef, TargetRef};
use crate::decoder::{child, DecodeError, Decoder};

impl Decoder<'_> {
    /// `to` of a direct relation: `"collection/field"` or
    /// `{collection, field}`.
    pub fn decode_target(
        &self,
        node: &Value,
        path: &[String],
    ) -> Result<TargetRef, DecodeError> {
        let map = match node {
            Value::String(raw) => return self.split_target(raw, path),
            Value::Mapping(map) => map,
            other => {
                return Err(self.structural("string `collection/field` or mapping", other, path));
            }
        };

        let collection = self.require_string(map, "collection", path)?;
        let field = self.require(map, "field", path)?;
        let field = self.decode_field_ref(field, &child(path, "field"))?;

        Ok(TargetRef { collection, field })
    }

    /// `to` of a generic relation. Only the structured form exists here; the
    /// collection is a non-empty list of candidates.
    pub fn decode_generic_target(
        &self,
        node: &Value,
        path: &[String],
    ) -> Result<GenericTargetRef, DecodeError> {
        let map = match node {
            Value::Mapping(map) => map,
            other => return Err(self.structural("mapping with collection list", other, path)),
        };

        let collection_path = child(path, "collection");
        let collections = match self.require(map, "collection", path)? {
            Value::Sequence(items) if !items.is_empty() => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(self.structural("collection name", other, &collection_path)),
                })
                .collect::<Result<Vec<_>, _>>()?,
            other => {
                return Err(self.structural(
                    "non-empty sequence of collection names",
                    other,
                    &collection_path,
                ));
            }
        };

        let field = self.require(map, "field", path)?;
        let field = self.decode_field_ref(field, &child(path, "field"))?;

        Ok(GenericTargetRef { collections, field })
    }

    /// A bare field name (kind `normal`) or `{name, type}`.
    pub fn decode_field_ref(
        &self,
        node: &Value,
        path: &[String],
    ) -> Result<FieldRef, DecodeError> {
        let wrap = |source: DecodeError| DecodeError::InvalidFieldRef {
            position: self.position(path),
            source: Box::new(source),
        };

        let map = match node {
            Value::String(name) => return Ok(FieldRef::normal(name.as_str())),
            Value::Mapping(map) => map,
            other => return Err(wrap(self.structural("string or mapping", other, path))),
        };

        let name = self.require_string(map, "name", path).map_err(wrap)?;
        let kind = self.require_string(map, "type", path).map_err(wrap)?;

        Ok(FieldRef { name, kind })
    }

    fn split_target(&self, raw: &str, path: &[String]) -> Result<TargetRef, DecodeError> {
        match raw.split_once('/') {
            Some((collection, field)) if !field.contains('/') => Ok(TargetRef {
                collection: collection.to_string(),
                field: FieldRef::normal(field),
            }),
            _ => Err(DecodeError::MalformedTo {
                raw: raw.to_string(),
                position: self.position(path),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::NodeKind;

    fn node(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn path() -> Vec<String> {
        vec!["m".to_string(), "f".to_string(), "to".to_string()]
    }

    #[test]
    fn test_shorthand_target() {
        let decoder = Decoder::new("");
        let target = decoder.decode_target(&node("a/b"), &path()).unwrap();
        assert_eq!(target.collection, "a");
        assert_eq!(target.field.name, "b");
        assert_eq!(target.field.kind, "normal");
    }

    #[test]
    fn test_shorthand_target_separator_count() {
        let decoder = Decoder::new("");
        for raw in ["a", "a/b/c", "//"] {
            let err = decoder.decode_target(&Value::String(raw.into()), &path()).unwrap_err();
            match err {
                DecodeError::MalformedTo { raw: got, position } => {
                    assert_eq!(got, raw);
                    assert_eq!(position.path, path());
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_shorthand_target_keeps_empty_halves() {
        let decoder = Decoder::new("");
        let target = decoder.decode_target(&node("\"a/\""), &path()).unwrap();
        assert_eq!(target.collection, "a");
        assert_eq!(target.field.name, "");
    }

    #[test]
    fn test_structured_target() {
        let decoder = Decoder::new("");
        let to = node("{collection: motion, field: {name: tag_ids, type: template}}");
        let target = decoder.decode_target(&to, &path()).unwrap();
        assert_eq!(target.collection, "motion");
        assert_eq!(target.field.name, "tag_ids");
        assert_eq!(target.field.kind, "template");

        let target = decoder
            .decode_target(&node("{collection: motion, field: tag_ids}"), &path())
            .unwrap();
        assert_eq!(target.field, FieldRef::normal("tag_ids"));
    }

    #[test]
    fn test_structured_target_missing_collection() {
        let decoder = Decoder::new("");
        let err = decoder.decode_target(&node("{field: x}"), &path()).unwrap_err();
        assert!(matches!(err, DecodeError::MissingKey { key: "collection", .. }));
    }

    #[test]
    fn test_target_wrong_kind() {
        let decoder = Decoder::new("");
        let err = decoder.decode_target(&node("[a, b]"), &path()).unwrap_err();
        assert!(matches!(err, DecodeError::Structural { found: NodeKind::Sequence, .. }));
    }

    #[test]
    fn test_generic_target() {
        let decoder = Decoder::new("");
        let to = node("{collection: [motion, assignment], field: tag_ids}");
        let target = decoder.decode_generic_target(&to, &path()).unwrap();
        assert_eq!(target.collections, vec!["motion", "assignment"]);
        assert_eq!(target.field, FieldRef::normal("tag_ids"));
    }

    #[test]
    fn test_generic_target_rejects_empty_and_scalar_collection() {
        let decoder = Decoder::new("");
        for yaml in ["{collection: [], field: x}", "{collection: motion, field: x}"] {
            let err = decoder.decode_generic_target(&node(yaml), &path()).unwrap_err();
            match err {
                DecodeError::Structural { position, .. } => {
                    assert_eq!(position.path.last().map(String::as_str), Some("collection"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_field_ref_invalid() {
        let decoder = Decoder::new("");
        let err = decoder.decode_field_ref(&node("[x]"), &path()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidFieldRef { .. }));

        let err = decoder.decode_field_ref(&node("{name: x}"), &path()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidFieldRef { .. }));
        assert!(matches!(err.innermost(), DecodeError::MissingKey { key: "type", .. }));
    }
}
