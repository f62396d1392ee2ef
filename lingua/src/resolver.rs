//! `#{tag}` substitution.
//!
//! A pass scans the text once from left to right and replaces every
//! reference it can resolve. Replacement text is copied as-is, so a
//! reference inside a replacement is only expanded by the next pass.
//! Passes repeat until one of them replaces nothing.
//!
//! A reference nobody can resolve is escaped to `##{tag}`. The scanner
//! treats `#` plus any following character as literal, so escaped
//! references survive later passes untouched.

use std::borrow::Cow;
use tracing::warn;

/// Upper bound on passes per [`TagResolver::resolve`] call.
pub const DEFAULT_MAX_PASSES: usize = 64;

/// Resolution also stops once the text outgrows
/// `input.len() * OUTPUT_GROWTH_LIMIT + OUTPUT_CEILING` bytes, so a
/// branching cycle such as `a -> #{a}#{a}` cannot double the text 64 times.
pub const OUTPUT_GROWTH_LIMIT: usize = 16;
pub const OUTPUT_CEILING: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagResolver {
    max_passes: usize,
}

impl Default for TagResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PASSES)
    }
}

impl TagResolver {
    /// `max_passes == 0` removes the pass bound. Cyclic definitions that do
    /// not grow the text, such as `a -> #{a}`, then never terminate.
    pub fn new(max_passes: usize) -> Self {
        Self { max_passes }
    }

    pub fn max_passes(&self) -> usize {
        self.max_passes
    }

    /// Runs passes until a fixed point, the pass bound or the output budget.
    pub fn resolve<'a, F>(&self, input: &str, mut lookup: F) -> String
    where
        F: FnMut(&str) -> Option<Cow<'a, str>>,
    {
        let budget = output_budget(input);
        let mut line = input.to_string();
        let mut passes = 0;
        loop {
            let (next, replaced) = resolve_pass(&line, &mut lookup);
            line = next;
            if !replaced {
                return line;
            }

            passes += 1;
            if line.len() > budget {
                warn!(
                    "tag resolution stopped after {} passes, output grew to {} bytes for '{}'",
                    passes,
                    line.len(),
                    input
                );
                return line;
            }
            if self.max_passes != 0 && passes >= self.max_passes {
                warn!(
                    "tag resolution stopped after {} passes, possible cyclic tag in '{}'",
                    passes, input
                );
                return line;
            }
        }
    }
}

fn output_budget(input: &str) -> usize {
    input
        .len()
        .saturating_mul(OUTPUT_GROWTH_LIMIT)
        .saturating_add(OUTPUT_CEILING)
}

/// One left-to-right pass. Returns the rewritten text and whether any
/// reference was replaced.
///
/// An unterminated `#{` or a trailing `#` ends the pass and the rest of the
/// text is kept verbatim.
pub fn resolve_pass<'a, F>(input: &str, lookup: &mut F) -> (String, bool)
where
    F: FnMut(&str) -> Option<Cow<'a, str>>,
{
    // '#', '{' and '}' are ASCII, so every index we slice at is a char boundary.
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut replaced = false;
    let mut copied = 0;
    let mut cursor = 0;

    while cursor < bytes.len() {
        if bytes[cursor] != b'#' {
            cursor += 1;
            continue;
        }

        match bytes.get(cursor + 1) {
            None => break,
            Some(b'{') => {}
            Some(_) => {
                cursor += 2;
                continue;
            }
        }

        let name_start = cursor + 2;
        let Some(len) = input[name_start..].find('}') else {
            break;
        };
        let close = name_start + len;

        out.push_str(&input[copied..cursor]);
        match lookup(&input[name_start..close]) {
            Some(replacement) => {
                out.push_str(&replacement);
                replaced = true;
            }
            None => {
                out.push('#');
                out.push_str(&input[cursor..=close]);
            }
        }
        cursor = close + 1;
        copied = cursor;
    }

    out.push_str(&input[copied..]);
    (out, replaced)
}
