use std::collections::{HashMap, HashSet};

use super::{Grammar, END_MARK, EPSILON};

#[derive(Debug, Clone)]
pub struct NonTerminal {
    pub index: usize,
    pub name: String,
    pub first: HashSet<usize>,
    pub follow: HashSet<usize>,
    pub nullable: bool,
    pub productions: Vec<Vec<usize>>,
}

impl NonTerminal {
    pub fn new(index: usize, name: String) -> Self {
        Self {
            index,
            name,
            first: HashSet::new(),
            follow: HashSet::new(),
            nullable: false,
            productions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Symbol {
    NonTerminal(NonTerminal),
    Terminal(String),
}

impl Symbol {
    pub fn non_terminal(&self) -> Option<&NonTerminal> {
        match self {
            Symbol::NonTerminal(e) => Some(e),
            Symbol::Terminal(_) => None,
        }
    }

    pub fn mut_non_terminal(&mut self) -> Option<&mut NonTerminal> {
        match self {
            Symbol::NonTerminal(e) => Some(e),
            Symbol::Terminal(_) => None,
        }
    }
}

/// A grammar with every symbol resolved to an index.
///
/// Nonterminals come first, in registration order, followed by the augmented
/// start and then the terminals in order of first appearance, `$` last.
#[derive(Debug, Clone)]
pub struct CompiledGrammar {
    pub symbols: Vec<Symbol>,
    pub symbol_table: HashMap<String, usize>,
    pub start_symbol: usize,
    pub augmented_start: usize,
    pub end_mark: usize,
}

impl CompiledGrammar {
    /// Classifies the symbols of `grammar` and adds the augmented start
    /// production `S' -> S $`. `None` when the grammar has no rules.
    pub fn from_grammar(grammar: &Grammar) -> Option<Self> {
        let start = grammar.start_symbol()?;
        let mut g = Self {
            symbols: Vec::new(),
            symbol_table: HashMap::new(),
            start_symbol: 0,
            augmented_start: 0,
            end_mark: 0,
        };

        for (nt, _) in grammar.rules() {
            g.add_non_terminal(&nt.to_string());
        }
        g.start_symbol = g.symbol_table[&start.to_string()];

        let augmented_name = g.get_symbol_prime_name(start.to_string());
        g.augmented_start = g.add_non_terminal(&augmented_name);

        g.populate_terms(grammar);

        for (nt, productions) in grammar.rules() {
            let left = g.symbol_table[&nt.to_string()];
            for production in productions {
                let right = production
                    .iter()
                    .map(|s| g.symbol_table[&s.to_string()])
                    .collect();
                g.add_production(left, right);
            }
        }
        g.add_production(g.augmented_start, vec![g.start_symbol, g.end_mark]);

        Some(g)
    }

    fn populate_terms(&mut self, grammar: &Grammar) {
        for (_, productions) in grammar.rules() {
            for &s in productions.iter().flatten() {
                if s != END_MARK && !grammar.is_non_terminal(s) {
                    let name = s.to_string();
                    if !self.symbol_table.contains_key(&name) {
                        self.add_terminal(name);
                    }
                }
            }
        }
        self.end_mark = self.add_terminal(END_MARK.to_string());
    }

    pub fn terminal_iter(&self) -> impl Iterator<Item = (usize, &String)> {
        self.symbols.iter().enumerate().filter_map(|(i, s)| {
            if let Symbol::Terminal(name) = s {
                Some((i, name))
            } else {
                None
            }
        })
    }

    pub fn non_terminal_iter(&self) -> impl Iterator<Item = &NonTerminal> {
        self.symbols.iter().filter_map(|s| s.non_terminal())
    }

    pub fn non_terminal(&self, index: usize) -> Option<&NonTerminal> {
        self.symbols[index].non_terminal()
    }

    pub fn is_terminal(&self, index: usize) -> bool {
        matches!(self.symbols[index], Symbol::Terminal(_))
    }

    pub fn get_symbol_index(&self, name: &str) -> Option<usize> {
        self.symbol_table.get(name).cloned()
    }

    /// Looks up a one-character symbol without allocating.
    pub fn get_char_index(&self, c: char) -> Option<usize> {
        let mut buf = [0; 4];
        self.get_symbol_index(c.encode_utf8(&mut buf))
    }

    fn add_non_terminal(&mut self, name: &str) -> usize {
        let idx = self.symbols.len();
        self.symbols
            .push(Symbol::NonTerminal(NonTerminal::new(idx, name.to_string())));
        self.symbol_table.insert(name.to_string(), idx);
        idx
    }

    fn add_terminal(&mut self, name: String) -> usize {
        let idx = self.symbols.len();
        self.symbols.push(Symbol::Terminal(name.clone()));
        self.symbol_table.insert(name, idx);
        idx
    }

    fn add_production(&mut self, left: usize, right: Vec<usize>) {
        if let Some(nt) = self.symbols[left].mut_non_terminal() {
            nt.productions.push(right);
        }
    }

    pub fn get_symbol_name(&self, index: usize) -> &str {
        match &self.symbols[index] {
            Symbol::NonTerminal(e) => e.name.as_str(),
            Symbol::Terminal(e) => e.as_str(),
        }
    }

    pub fn get_symbol_prime_name(&self, mut name: String) -> String {
        while self.symbol_table.contains_key(&name) {
            name.push('\'');
        }
        name
    }

    /// Production symbols concatenated, `ε` for the empty production.
    pub fn production_to_string(&self, production: &[usize]) -> String {
        if production.is_empty() {
            EPSILON.to_string()
        } else {
            production.iter().map(|&s| self.get_symbol_name(s)).collect()
        }
    }
}
