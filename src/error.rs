use thiserror::Error;

/// Everything that can go wrong while reading a grammar, compiling it into an
/// LL(1) table, or parsing an input with that table.
///
/// Compile-time failures ([`Error::AmbiguousGrammar`], [`Error::EmptyGrammar`])
/// consume the grammar, so no parser is ever built from a rejected grammar.
/// Parse-time failures are fatal to that single `parse` call only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Two productions claim the same table cell.
    #[error("ambiguous rule '{production}' for '{non_terminal} => {terminal}'")]
    AmbiguousGrammar {
        non_terminal: String,
        terminal: String,
        /// The production whose registration hit the occupied cell.
        production: String,
    },

    /// The terminal on top of the stack does not match the input.
    #[error("unexpected token '{found}', expects '{expected}'")]
    UnexpectedToken { found: char, expected: char },

    /// No table entry for the nonterminal on top of the stack and the lookahead.
    #[error("failed to find grammar for transition '{non_terminal} => {lookahead}'")]
    MissingTransition { non_terminal: String, lookahead: char },

    /// The stack reached the end marker with input left over.
    #[error("unexpected end of input: {position} of {length} symbols consumed")]
    UnexpectedEndOfInput { position: usize, length: usize },

    #[error("grammar has no rules")]
    EmptyGrammar,

    #[error("Line {line}: {message}")]
    Syntax { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
