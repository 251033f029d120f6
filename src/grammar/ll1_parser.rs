use log::trace;

use super::{
    ll1_table::{Ll1ParsingTable, Ll1Table, TransitionTable},
    CompiledGrammar, END_MARK, EPSILON,
};
use crate::{
    error::{Error, Result},
    parse_tree::{NodeId, ParseTree},
};

/// A compiled grammar together with its LL(1) table.
///
/// Built by [`Grammar::compile`](super::Grammar::compile) and never mutated
/// afterwards, so one parser can serve any number of threads.
#[derive(Debug, Clone)]
pub struct Ll1Parser {
    grammar: CompiledGrammar,
    table: Ll1Table,
}

impl Ll1Parser {
    pub(super) fn new(grammar: CompiledGrammar, table: Ll1Table) -> Self {
        Self { grammar, table }
    }

    pub fn grammar(&self) -> &CompiledGrammar {
        &self.grammar
    }

    pub fn start_symbol(&self) -> &str {
        self.grammar.get_symbol_name(self.grammar.start_symbol)
    }

    /// Parses `input`, one symbol per character, into a parse tree rooted at
    /// the start symbol. Empty productions show up as a single `ε` leaf.
    pub fn parse(&self, input: &str) -> Result<ParseTree> {
        let g = &self.grammar;
        let input: Vec<char> = input.chars().chain(std::iter::once(END_MARK)).collect();
        let lookahead_at = |cursor: usize| input.get(cursor).copied().unwrap_or(END_MARK);

        let mut tree = ParseTree::new(symbol_label(g.get_symbol_name(g.start_symbol)));
        // Each pending symbol travels with the tree node it expands into.
        let mut stack: Vec<(usize, NodeId)> =
            vec![(g.end_mark, tree.root()), (g.start_symbol, tree.root())];
        let mut cursor = 0;

        while let Some(&(top, node)) = stack.last() {
            if top == g.end_mark {
                break;
            }
            stack.pop();
            let lookahead = lookahead_at(cursor);

            let nt = match g.non_terminal(top) {
                Some(nt) => nt,
                None => {
                    let expected = symbol_label(g.get_symbol_name(top));
                    if g.get_char_index(lookahead) != Some(top) {
                        return Err(Error::UnexpectedToken {
                            found: lookahead,
                            expected,
                        });
                    }
                    trace!("match '{}' at {}", expected, cursor);
                    cursor += 1;
                    continue;
                }
            };

            let production = g
                .get_char_index(lookahead)
                .and_then(|t| self.table.get(top, t))
                .map(|i| &nt.productions[i])
                .ok_or_else(|| Error::MissingTransition {
                    non_terminal: nt.name.clone(),
                    lookahead,
                })?;
            trace!(
                "expand {} -> {} on '{}'",
                nt.name,
                g.production_to_string(production),
                lookahead
            );

            if production.is_empty() {
                tree.add_node(EPSILON, Some(node));
            } else {
                let children: Vec<(usize, NodeId)> = production
                    .iter()
                    .map(|&s| (s, tree.add_node(symbol_label(g.get_symbol_name(s)), Some(node))))
                    .collect();
                stack.extend(children.into_iter().rev());
            }
        }

        let length = input.len() - 1;
        if cursor != length {
            return Err(Error::UnexpectedEndOfInput {
                position: cursor,
                length,
            });
        }

        Ok(tree)
    }

    /// Every populated table cell, rendered as nonterminal → terminal →
    /// production (`ε` for the empty one).
    pub fn dump_transition_table(&self) -> TransitionTable {
        self.grammar.dump_ll1_table(&self.table)
    }

    pub fn to_ll1_parsing_table(&self) -> Ll1ParsingTable {
        self.grammar.to_ll1_parsing_table(&self.table)
    }
}

/// Only the augmented start has a name longer than one character, and it
/// never becomes a tree node.
fn symbol_label(name: &str) -> char {
    name.chars().next().unwrap_or(EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;
    use pretty_assertions::assert_eq;

    fn compile(rules: &[(char, &str)]) -> Ll1Parser {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut g = Grammar::new();
        for &(nt, production) in rules {
            g.add_rule(nt, production);
        }
        g.compile().unwrap()
    }

    fn expression() -> Ll1Parser {
        compile(&[
            ('E', "TY"),
            ('Y', "+TY"),
            ('Y', "ε"),
            ('T', "FH"),
            ('H', "*FH"),
            ('H', "ε"),
            ('F', "(E)"),
            ('F', "i"),
        ])
    }

    #[test]
    fn one_simple_rule() {
        let p = compile(&[('A', "1")]);

        assert_eq!(p.parse("1").unwrap().to_string(), "A(1)");
        assert_eq!(
            p.parse("2").unwrap_err(),
            Error::MissingTransition {
                non_terminal: "A".to_string(),
                lookahead: '2'
            }
        );
    }

    #[test]
    fn one_simple_rule_tree_shape() {
        let p = compile(&[('A', "1")]);
        let tree = p.parse("1").unwrap();

        let mut expected = ParseTree::new('A');
        let root = expected.root();
        expected.add_node('1', Some(root));
        assert_eq!(tree, expected);
    }

    #[test]
    fn basic_combining() {
        let p = compile(&[('C', "AB"), ('A', "0"), ('B', "1")]);

        assert_eq!(p.parse("01").unwrap().to_string(), "C(A(0), B(1))");
        assert_eq!(
            p.parse("010").unwrap_err(),
            Error::UnexpectedEndOfInput {
                position: 2,
                length: 3
            }
        );
        assert_eq!(
            p.parse("0").unwrap_err(),
            Error::MissingTransition {
                non_terminal: "B".to_string(),
                lookahead: '$'
            }
        );
        assert!(matches!(
            p.parse("11"),
            Err(Error::MissingTransition { .. })
        ));
        assert!(matches!(
            p.parse("00"),
            Err(Error::MissingTransition { .. })
        ));
    }

    #[test]
    fn empty_rule() {
        let p = compile(&[('A', "ε")]);

        assert_eq!(p.parse("").unwrap().to_string(), "A(ε)");
        assert_eq!(
            p.parse("a").unwrap_err(),
            Error::MissingTransition {
                non_terminal: "A".to_string(),
                lookahead: 'a'
            }
        );
    }

    #[test]
    fn basic_chaining() {
        let p = compile(&[('A', "B"), ('B', "C"), ('C', "0")]);

        assert_eq!(p.parse("0").unwrap().to_string(), "A(B(C(0)))");
        assert!(matches!(
            p.parse("1"),
            Err(Error::MissingTransition { .. })
        ));
    }

    #[test]
    fn unexpected_token() {
        let p = compile(&[('E', "(E+I)"), ('E', "I"), ('E', "ε"), ('I', "0"), ('I', "1")]);

        assert_eq!(
            p.parse("(0+1)").unwrap().to_string(),
            "E((, E(I(0)), +, I(1), ))"
        );
        assert_eq!(
            p.parse("(0-1)").unwrap_err(),
            Error::UnexpectedToken {
                found: '-',
                expected: '+'
            }
        );
        assert_eq!(
            p.parse("(0+1").unwrap_err(),
            Error::UnexpectedToken {
                found: '$',
                expected: ')'
            }
        );
    }

    #[test]
    fn complex_sample_1() {
        let p = compile(&[
            ('E', "(D+E)"),
            ('E', "N"),
            ('D', "0"),
            ('D', "1"),
            ('D', "2"),
            ('N', "n"),
            ('N', "DN"),
        ]);

        assert_eq!(
            p.parse("(1+0n)").unwrap().to_string(),
            "E((, D(1), +, E(N(D(0), N(n))), ))"
        );
    }

    #[test]
    fn complex_sample_2() {
        let p = expression();
        let tree = p.parse("i+i").unwrap();

        assert_eq!(
            tree.to_string(),
            "E(T(F(i), H(ε)), Y(+, T(F(i), H(ε)), Y(ε)))"
        );
        let root = tree.root();
        let t = tree.children(root)[0];
        assert_eq!(tree.parent(t), Some(root));
        assert_eq!(tree.label(t), 'T');
    }

    #[test]
    fn frontier_round_trip() {
        let p = expression();
        for input in ["i", "i+i", "i*i", "(i+i)*i", "((i))*i+i*(i)"] {
            assert_eq!(p.parse(input).unwrap().frontier(), input);
        }
    }

    #[test]
    fn deep_right_recursion() {
        let p = compile(&[('N', "dN"), ('N', "n")]);
        let depth = 100_000;
        let input = format!("{}n", "d".repeat(depth));
        let tree = p.parse(&input).unwrap();

        assert_eq!(tree.node_count(), 2 * depth + 2);
        assert_eq!(tree.frontier(), input);

        let mut node = tree.root();
        for _ in 0..depth {
            let children = tree.children(node);
            assert_eq!(children.len(), 2);
            assert_eq!(tree.label(children[0]), 'd');
            assert_eq!(tree.parent(children[1]), Some(node));
            node = children[1];
        }
        assert_eq!(tree.label(tree.children(node)[0]), 'n');
        assert!(tree.to_string().ends_with(&")".repeat(depth + 1)));
    }

    #[test]
    fn unknown_symbol_fails_lookup() {
        let p = expression();
        assert_eq!(
            p.parse("x").unwrap_err(),
            Error::MissingTransition {
                non_terminal: "E".to_string(),
                lookahead: 'x'
            }
        );
    }

    #[test]
    fn dump_is_idempotent() {
        let p = expression();
        assert_eq!(p.dump_transition_table(), p.dump_transition_table());
        assert_eq!(p.dump_transition_table()["Y"]["$"], "ε");
        assert_eq!(p.dump_transition_table()["Y"]["+"], "+TY");
    }

    #[test]
    fn parses_from_many_threads() {
        let p = &expression();
        std::thread::scope(|s| {
            let handles: Vec<_> = ["i", "i+i", "(i)*i"]
                .into_iter()
                .map(|input| s.spawn(move || p.parse(input).map(|t| t.frontier())))
                .collect();
            for (handle, input) in handles.into_iter().zip(["i", "i+i", "(i)*i"]) {
                assert_eq!(handle.join().unwrap().unwrap(), input);
            }
        });
    }
}
