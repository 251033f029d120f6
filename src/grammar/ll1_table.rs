use crowbook_text_processing::escape::tex as escape_tex;
use std::collections::{BTreeMap, HashMap};

use super::{CompiledGrammar, EPSILON};
use crate::error::{Error, Result};

/// Nonterminal → terminal → production, as handed out by
/// [`Ll1Parser::dump_transition_table`](super::Ll1Parser::dump_transition_table).
pub type TransitionTable = BTreeMap<String, BTreeMap<String, String>>;

/// The LL(1) table: `(nonterminal, terminal)` → index of the production in
/// the nonterminal's production list.
#[derive(Debug, Clone, Default)]
pub struct Ll1Table {
    cells: HashMap<(usize, usize), usize>,
}

impl Ll1Table {
    pub fn get(&self, non_terminal: usize, terminal: usize) -> Option<usize> {
        self.cells.get(&(non_terminal, terminal)).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    /// Any second write to a cell is a conflict, even for the same production.
    fn register(
        &mut self,
        g: &CompiledGrammar,
        non_terminal: usize,
        terminal: usize,
        production: usize,
    ) -> Result<()> {
        if self.cells.contains_key(&(non_terminal, terminal)) {
            let nt = g.non_terminal(non_terminal);
            return Err(Error::AmbiguousGrammar {
                non_terminal: g.get_symbol_name(non_terminal).to_string(),
                terminal: g.get_symbol_name(terminal).to_string(),
                production: nt
                    .map(|nt| g.production_to_string(&nt.productions[production]))
                    .unwrap_or_default(),
            });
        }
        self.cells.insert((non_terminal, terminal), production);
        Ok(())
    }
}

impl CompiledGrammar {
    /// Builds the table from the nullable, FIRST and FOLLOW sets, which must
    /// already be calculated.
    pub fn build_ll1_table(&self) -> Result<Ll1Table> {
        let mut table = Ll1Table::default();

        for nt in self.non_terminal_iter() {
            for (i, production) in nt.productions.iter().enumerate() {
                let mut first: Vec<usize> = self
                    .calculate_first_for_production(production)
                    .into_iter()
                    .collect();
                first.sort_unstable();
                for t in first {
                    table.register(self, nt.index, t, i)?;
                }

                if self.is_production_nullable(production) {
                    let mut follow: Vec<usize> = nt.follow.iter().cloned().collect();
                    follow.sort_unstable();
                    for t in follow {
                        table.register(self, nt.index, t, i)?;
                    }
                }
            }
        }

        Ok(table)
    }

    pub fn dump_ll1_table(&self, table: &Ll1Table) -> TransitionTable {
        let mut dump = TransitionTable::new();
        for nt in self.non_terminal_iter() {
            let row = dump.entry(nt.name.clone()).or_default();
            for (t, name) in self.terminal_iter() {
                if let Some(i) = table.get(nt.index, t) {
                    row.insert(name.clone(), self.production_to_string(&nt.productions[i]));
                }
            }
        }
        dump
    }

    pub fn to_ll1_parsing_table(&self, table: &Ll1Table) -> Ll1ParsingTable {
        let terminals: Vec<(usize, &str)> = self
            .terminal_iter()
            .map(|(i, t)| (i, t.as_str()))
            .collect();

        let rows = self
            .non_terminal_iter()
            .map(|nt| {
                let row = terminals
                    .iter()
                    .map(|&(t, _)| {
                        table
                            .get(nt.index, t)
                            .map(|i| self.production_to_string(&nt.productions[i]))
                    })
                    .collect();
                (nt.name.as_str(), row)
            })
            .collect();

        Ll1ParsingTable {
            terminals: terminals.into_iter().map(|(_, t)| t).collect(),
            rows,
        }
    }
}

/// The table laid out for display: one column per terminal, one row per
/// nonterminal.
pub struct Ll1ParsingTable<'a> {
    terminals: Vec<&'a str>,
    rows: Vec<(&'a str, Vec<Option<String>>)>,
}

impl Ll1ParsingTable<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().map(|&t| t.to_string()));
        let mut output: Vec<Vec<String>> = vec![header];
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![left.to_string()];
            line.extend(row.iter().map(|production| match production {
                Some(right) => format!("{} -> {}", left, right),
                None => String::new(),
            }));
            output.push(line);
        }

        let width: Vec<usize> = (0..output[0].len())
            .map(|j| {
                output
                    .iter()
                    .map(|line| line[j].chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        output
            .iter()
            .map(|line| {
                line.iter()
                    .enumerate()
                    .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len()),
        )];
        header.extend(
            self.terminals
                .iter()
                .map(|&t| format!("\\text{{{}}}", escape_tex(t))),
        );
        let header = header.join(" & ");

        let mut output: Vec<String> = Vec::new();
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![format!("{}", escape_tex(*left))];
            line.extend(row.iter().map(|production| match production {
                Some(right) => format!(
                    "{} \\rightarrow {}",
                    escape_tex(*left),
                    escape_tex(right.as_str())
                )
                .replace(EPSILON, "\\epsilon"),
                None => String::new(),
            }));
            output.push(line.join(" & "));
        }

        let output = output.join("\\\\\n");

        header + "\\\\\\hline\n" + &output + "\n\\end{array}\\]"
    }
}
