pub mod ast;
pub mod decoder;
pub mod graph;
pub mod locate;
pub mod report;
pub mod serializer;
pub mod target;

use wasm_bindgen::prelude::*;

pub use ast::{Attribute, FieldRef, Model, Relation, Schema};
pub use decoder::{decode, decode_str, DecodeError};
use graph::RelationGraph;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Decode a models document and write it back in canonical form
#[wasm_bindgen(js_name = "modelsToYaml")]
pub fn models_to_yaml(source: &str) -> Result<String, String> {
    let schema = decode_str(source).map_err(|e| e.to_string())?;
    serializer::to_yaml(&schema).map_err(|e| e.to_string())
}

/// Decode a models document and list its relations as JSON
#[wasm_bindgen(js_name = "modelsRelations")]
pub fn models_relations(source: &str) -> Result<String, String> {
    let schema = decode_str(source).map_err(|e| e.to_string())?;
    let graph = RelationGraph::from_schema(&schema, None);
    serde_json::to_string(&graph).map_err(|e| e.to_string())
}
