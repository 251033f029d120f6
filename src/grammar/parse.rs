use super::{Grammar, END_MARK, EPSILON};
use crate::error::{Error, Result};

fn syntax_error(line: usize, message: &str) -> Error {
    Error::Syntax {
        line,
        message: message.to_string(),
    }
}

impl Grammar {
    /// Reads rules written as `E -> (E+I) | I | ε`, one left side per line.
    /// A line starting with `|` adds alternatives to the previous left side.
    /// Whitespace inside alternatives is ignored, and an empty alternative is
    /// the empty production.
    pub fn parse(grammar: &str) -> Result<Self> {
        let mut g = Self::new();

        let mut previous_left: Option<char> = None;
        for (i, line) in grammar.lines().enumerate() {
            if line.chars().all(|c| c.is_whitespace()) {
                continue;
            }
            let parts: Vec<&str> = line.split("->").collect();
            if parts.len() > 2 {
                return Err(syntax_error(i + 1, "too many \"->\""));
            }
            let (left, rights): (char, &str) = if parts.len() == 2 {
                let left_str = parts[0].trim();
                let mut chars = left_str.chars();
                match (chars.next(), chars.next()) {
                    (None, _) => return Err(syntax_error(i + 1, "empty left side")),
                    (Some(_), Some(_)) => {
                        return Err(syntax_error(i + 1, "left side must be a single symbol"))
                    }
                    (Some(c), None) if c == END_MARK || c == EPSILON => {
                        return Err(syntax_error(i + 1, "reserved symbol on left side"))
                    }
                    (Some(c), None) => (c, parts[1]),
                }
            } else {
                match (previous_left, parts[0].trim().strip_prefix('|')) {
                    (Some(left), Some(rights)) => (left, rights),
                    _ => return Err(syntax_error(i + 1, "cannot find left side")),
                }
            };

            previous_left = Some(left);

            for right in rights.split('|') {
                let symbols: String = right.chars().filter(|c| !c.is_whitespace()).collect();
                g.add_rule(left, &symbols);
            }
        }

        Ok(g)
    }
}
