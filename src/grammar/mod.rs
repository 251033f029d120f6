pub mod compiled;
pub mod grammar;
pub mod ll1_parser;
pub mod ll1_table;
pub mod nullable_first_follow;
pub mod parse;
pub mod pretty_print;
pub use compiled::CompiledGrammar;
pub use grammar::Grammar;
pub use ll1_parser::Ll1Parser;

pub const EPSILON: char = 'ε';
pub const END_MARK: char = '$';
