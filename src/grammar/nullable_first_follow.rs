use std::collections::HashSet;

use log::debug;

use super::{compiled::Symbol, CompiledGrammar};

impl CompiledGrammar {
    pub fn calculate_nullable_first_follow(&mut self) {
        self.calculate_nullable();
        self.calculate_first();
        self.calculate_follow();
    }

    /// Every `(left, production index)` pair of the grammar.
    fn production_pairs(&self) -> Vec<(usize, usize)> {
        self.non_terminal_iter()
            .flat_map(|nt| (0..nt.productions.len()).map(move |i| (nt.index, i)))
            .collect()
    }

    /// Applies `rule` to every production until a full pass changes nothing.
    /// `rule` returns whether it grew any set.
    fn run_to_fixed_point<F>(&mut self, analysis: &str, mut rule: F)
    where
        F: FnMut(&mut Self, usize, usize) -> bool,
    {
        let pairs = self.production_pairs();
        let mut passes = 0;
        let mut changed = true;
        while changed {
            changed = false;
            passes += 1;
            for &(left, i) in &pairs {
                changed |= rule(self, left, i);
            }
        }
        debug!("{} reached a fixed point after {} passes", analysis, passes);
    }

    fn production(&self, left: usize, i: usize) -> &[usize] {
        match &self.symbols[left] {
            Symbol::NonTerminal(nt) => &nt.productions[i],
            Symbol::Terminal(_) => &[],
        }
    }

    pub fn is_nullable(&self, index: usize) -> bool {
        match &self.symbols[index] {
            Symbol::Terminal(_) => false,
            Symbol::NonTerminal(nt) => nt.nullable,
        }
    }

    pub fn is_production_nullable(&self, production: &[usize]) -> bool {
        production.iter().all(|&s| self.is_nullable(s))
    }

    fn extend_with_first(&self, set: &mut HashSet<usize>, index: usize) {
        match &self.symbols[index] {
            Symbol::Terminal(_) => {
                set.insert(index);
            }
            Symbol::NonTerminal(nt) => set.extend(nt.first.iter().cloned()),
        }
    }

    fn calculate_nullable(&mut self) {
        self.run_to_fixed_point("nullable", |g, left, i| {
            if g.is_nullable(left) || !g.is_production_nullable(g.production(left, i)) {
                return false;
            }
            if let Some(nt) = g.symbols[left].mut_non_terminal() {
                nt.nullable = true;
            }
            true
        });
    }

    /// FIRST of a symbol sequence: FIRST of each symbol up to and including
    /// the first one that is not nullable.
    pub fn calculate_first_for_production(&self, production: &[usize]) -> HashSet<usize> {
        let mut first: HashSet<usize> = HashSet::new();
        for &idx in production {
            self.extend_with_first(&mut first, idx);
            if !self.is_nullable(idx) {
                break;
            }
        }
        first
    }

    fn calculate_first(&mut self) {
        self.run_to_fixed_point("first", |g, left, i| {
            let first = g.calculate_first_for_production(g.production(left, i));
            match g.symbols[left].mut_non_terminal() {
                Some(nt) => {
                    let before = nt.first.len();
                    nt.first.extend(first);
                    nt.first.len() != before
                }
                None => false,
            }
        });
    }

    /// Walks `production` right to left, returning what each nonterminal in
    /// it must add to its FOLLOW set.
    fn calculate_follow_for_production(
        &self,
        left: usize,
        production: &[usize],
    ) -> Vec<(usize, HashSet<usize>)> {
        let mut trailing: HashSet<usize> = match &self.symbols[left] {
            Symbol::NonTerminal(nt) => nt.follow.clone(),
            Symbol::Terminal(_) => HashSet::new(),
        };

        let mut updates = Vec::new();
        for &idx in production.iter().rev() {
            if !self.is_terminal(idx) {
                updates.push((idx, trailing.clone()));
            }
            if !self.is_nullable(idx) {
                trailing.clear();
            }
            self.extend_with_first(&mut trailing, idx);
        }
        updates
    }

    fn calculate_follow(&mut self) {
        self.run_to_fixed_point("follow", |g, left, i| {
            let updates = g.calculate_follow_for_production(left, g.production(left, i));
            let mut changed = false;
            for (idx, follow) in updates {
                if let Some(nt) = g.symbols[idx].mut_non_terminal() {
                    let before = nt.follow.len();
                    nt.follow.extend(follow);
                    changed |= nt.follow.len() != before;
                }
            }
            changed
        });
    }
}
