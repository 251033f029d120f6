extern crate wasm_bindgen;

use serde_json::json;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod grammar;
pub mod parse_tree;
pub use error::{Error, Result};
pub use grammar::{Grammar, Ll1Parser};
pub use parse_tree::{NodeId, ParseTree};

fn error_to_json(e: Error) -> String {
    json!({ "error": e.to_string() }).to_string()
}

#[wasm_bindgen]
pub fn ll1_table_to_json(grammar: &str) -> String {
    match Grammar::parse(grammar).and_then(Grammar::compile) {
        Ok(p) => json!(p.dump_transition_table()).to_string(),
        Err(e) => error_to_json(e),
    }
}

#[wasm_bindgen]
pub fn parse_to_json(grammar: &str, input: &str) -> String {
    match Grammar::parse(grammar)
        .and_then(Grammar::compile)
        .and_then(|p| p.parse(input))
    {
        Ok(tree) => tree.to_json(),
        Err(e) => error_to_json(e),
    }
}
