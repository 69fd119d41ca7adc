//! Serializer for writing a Schema back out as a models document.
//!
//! Every attribute is written in its canonical form, so decoding the output
//! gives back an equal Schema.

use serde_yaml::{Mapping, Value};

use crate::ast::{Attribute, FieldRef, Model, Payload, Schema, TargetRef};

/// Serialize a Schema to a YAML string.
pub fn to_yaml(schema: &Schema) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&to_value(schema))
}

/// Serialize a Schema to a YAML node tree.
pub fn to_value(schema: &Schema) -> Value {
    let mut root = Mapping::new();
    for (name, model) in &schema.models {
        root.insert(name.as_str().into(), model_value(model));
    }
    Value::Mapping(root)
}

fn model_value(model: &Model) -> Value {
    let mut map = Mapping::new();
    for (name, attribute) in &model.attributes {
        map.insert(name.as_str().into(), attribute_value(attribute));
    }
    Value::Mapping(map)
}

fn attribute_value(attribute: &Attribute) -> Value {
    let mut map = Mapping::new();
    map.insert("type".into(), attribute.typ.as_str().into());

    match &attribute.payload {
        // Shorthand: the bare type name
        Payload::Plain => return attribute.typ.as_str().into(),
        Payload::Relation(rel) => {
            map.insert("to".into(), target_value(&rel.to));
        }
        Payload::GenericRelation(rel) => {
            let mut to = Mapping::new();
            let collections = rel
                .to
                .collections
                .iter()
                .map(|c| Value::from(c.as_str()))
                .collect();
            to.insert("collection".into(), Value::Sequence(collections));
            to.insert("field".into(), field_value(&rel.to.field));
            map.insert("to".into(), Value::Mapping(to));
        }
        Payload::Template(template) => {
            map.insert("replacement".into(), template.replacement.as_str().into());
            map.insert("fields".into(), attribute_value(&template.fields));
        }
    }

    Value::Mapping(map)
}

fn target_value(to: &TargetRef) -> Value {
    // The shorthand splits on the single `/`, so names holding one need the mapping.
    if to.field.is_normal() && !to.collection.contains('/') && !to.field.name.contains('/') {
        return format!("{}/{}", to.collection, to.field.name).into();
    }

    let mut map = Mapping::new();
    map.insert("collection".into(), to.collection.as_str().into());
    map.insert("field".into(), field_value(&to.field));
    Value::Mapping(map)
}

fn field_value(field: &FieldRef) -> Value {
    if field.is_normal() {
        return field.name.as_str().into();
    }

    let mut map = Mapping::new();
    map.insert("name".into(), field.name.as_str().into());
    map.insert("type".into(), field.kind.as_str().into());
    Value::Mapping(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{DirectRelation, Template};
    use crate::decoder::decode_str;

    #[test]
    fn test_serialize_shorthand_relation() {
        let mut model = Model::default();
        model.attributes.insert(
            "owner_id".to_string(),
            Attribute {
                typ: "relation".to_string(),
                payload: Payload::Relation(DirectRelation {
                    to: TargetRef {
                        collection: "user".to_string(),
                        field: FieldRef::normal("owned_ids"),
                    },
                    list: false,
                }),
            },
        );
        model
            .attributes
            .insert("title".to_string(), Attribute::plain("string"));

        let mut schema = Schema::default();
        schema.models.insert("motion".to_string(), model);

        let yaml = to_yaml(&schema).unwrap();
        assert!(yaml.contains("to: user/owned_ids"));
        assert!(yaml.contains("title: string"));
    }

    #[test]
    fn test_serialize_structured_forms() {
        let schema = Schema {
            models: [(
                "agenda_item".to_string(),
                Model {
                    attributes: [(
                        "content_object_id".to_string(),
                        Attribute {
                            typ: "relation".to_string(),
                            payload: Payload::Relation(DirectRelation {
                                to: TargetRef {
                                    collection: "motion".to_string(),
                                    field: FieldRef {
                                        name: "agenda_item_id".to_string(),
                                        kind: "generic".to_string(),
                                    },
                                },
                                list: false,
                            }),
                        },
                    )]
                    .into(),
                },
            )]
            .into(),
        };

        let value = to_value(&schema);
        let to = &value["agenda_item"]["content_object_id"]["to"];
        assert_eq!(to["collection"].as_str(), Some("motion"));
        assert_eq!(to["field"]["type"].as_str(), Some("generic"));
    }

    #[test]
    fn test_serialize_template() {
        let attr = Attribute {
            typ: "template".to_string(),
            payload: Payload::Template(Box::new(Template {
                replacement: "meeting".to_string(),
                fields: Attribute::plain("number"),
            })),
        };
        let value = attribute_value(&attr);
        assert_eq!(value["replacement"].as_str(), Some("meeting"));
        assert_eq!(value["fields"].as_str(), Some("number"));
    }

    #[test]
    fn test_serialize_decodes_back_to_same_schema() {
        let input = r#"
            user:
              id: number
              group_$_ids:
                type: template
                replacement: meeting
                fields:
                  type: relation-list
                  to: group/user_ids
            tag:
              tagged_ids:
                type: generic-relation-list
                to:
                  collection: [user, group]
                  field: {name: tag_ids, type: structured-relation}
              misc: {type: json}
        "#;
        let schema = decode_str(input).unwrap();
        let yaml = to_yaml(&schema).unwrap();
        assert_eq!(decode_str(&yaml).unwrap(), schema);
    }

    #[test]
    fn test_serialize_slash_in_names_uses_structured_to() {
        let input = r#"
            m:
              a: {type: relation, to: {collection: "x/y", field: z}}
              b: {type: relation-list, to: {collection: x, field: "y/z"}}
        "#;
        let schema = decode_str(input).unwrap();
        let value = to_value(&schema);
        assert_eq!(value["m"]["a"]["to"]["collection"].as_str(), Some("x/y"));
        assert_eq!(value["m"]["b"]["to"]["field"].as_str(), Some("y/z"));

        let yaml = to_yaml(&schema).unwrap();
        assert_eq!(decode_str(&yaml).unwrap(), schema);
    }
}
