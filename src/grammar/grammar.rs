use indexmap::IndexMap;
use log::debug;

use super::{CompiledGrammar, Ll1Parser, END_MARK, EPSILON};
use crate::error::{Error, Result};

/// A grammar under construction.
///
/// Rules are added with [`Grammar::add_rule`] until the grammar is complete,
/// then [`Grammar::compile`] consumes it and hands back an [`Ll1Parser`].
/// There is no way to add rules to a compiled grammar.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    rules: IndexMap<char, Vec<Vec<char>>>,
    start_symbol: Option<char>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `production` to the productions of `non_terminal`.
    ///
    /// Every character of `production` is one symbol; `ε` is dropped, so `"ε"`
    /// and `""` both register the empty production. The first nonterminal
    /// ever registered becomes the start symbol. Symbols are not checked
    /// here: anything that never shows up as a left side ends up a terminal.
    ///
    /// # Panics
    ///
    /// If `non_terminal` is the end marker `$` or `ε`.
    pub fn add_rule(&mut self, non_terminal: char, production: &str) {
        assert!(
            non_terminal != END_MARK && non_terminal != EPSILON,
            "'{}' is reserved and cannot be a nonterminal",
            non_terminal
        );

        if self.start_symbol.is_none() {
            self.start_symbol = Some(non_terminal);
        }

        let refined: Vec<char> = production.chars().filter(|&c| c != EPSILON).collect();
        self.rules.entry(non_terminal).or_default().push(refined);
    }

    pub fn start_symbol(&self) -> Option<char> {
        self.start_symbol
    }

    pub fn is_non_terminal(&self, symbol: char) -> bool {
        self.rules.contains_key(&symbol)
    }

    /// Nonterminals with their productions, in registration order.
    pub fn rules(&self) -> impl Iterator<Item = (char, &[Vec<char>])> {
        self.rules.iter().map(|(&nt, productions)| (nt, productions.as_slice()))
    }

    /// Runs the analyses and builds the LL(1) table.
    pub fn compile(self) -> Result<Ll1Parser> {
        let mut g = CompiledGrammar::from_grammar(&self).ok_or(Error::EmptyGrammar)?;
        g.calculate_nullable_first_follow();
        let table = g.build_ll1_table()?;
        debug!("compiled LL(1) table with {} cells", table.len());
        Ok(Ll1Parser::new(g, table))
    }
}
