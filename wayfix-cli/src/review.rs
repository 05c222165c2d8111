//! Interactive terminal reviewer.
//!
//! Prints the numbered proposal and reads one answer line:
//! - `a`: apply everything
//! - `s 2 4`: apply everything except corrections 2 and 4
//! - `k`: reverse without corrections
//! - `c` (or end of input): cancel

use anyhow::Context;
use std::io::{BufRead, Write};
use wayfix_domain::{CorrectionReviewer, ReviewDecision};
use wayfix_render::{EntryRef, proposal_entries, render_proposal_text};
use wayfix_types::correction::{CorrectionProposal, Selection};

const PROMPT: &str = "Apply [a]ll, [s]kip <n>..., [k]eep tags unchanged, [c]ancel: ";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Answer {
    ApplyAll,
    Skip(Vec<usize>),
    Keep,
    Cancel,
}

pub struct TerminalReviewer<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalReviewer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_answer(&mut self, count: usize) -> anyhow::Result<Answer> {
        loop {
            write!(self.output, "{}", PROMPT).context("write prompt")?;
            self.output.flush().context("flush prompt")?;

            let mut line = String::new();
            let read = self.input.read_line(&mut line).context("read answer")?;
            if read == 0 {
                return Ok(Answer::Cancel);
            }

            match parse_answer(&line, count) {
                Ok(answer) => return Ok(answer),
                Err(msg) => writeln!(self.output, "{}", msg).context("write prompt")?,
            }
        }
    }
}

impl<R: BufRead, W: Write> CorrectionReviewer for TerminalReviewer<R, W> {
    fn review(&mut self, proposal: &CorrectionProposal) -> anyhow::Result<ReviewDecision> {
        write!(self.output, "{}", render_proposal_text(proposal)).context("write proposal")?;

        let entries = proposal_entries(proposal);
        let decision = match self.read_answer(entries.len())? {
            Answer::ApplyAll => ReviewDecision::Apply(Selection::all(proposal)),
            Answer::Skip(numbers) => {
                let mut selection = Selection::all(proposal);
                for n in numbers {
                    match entries[n - 1].0 {
                        EntryRef::Tag(id, i) => selection.deselect_tag(id, i),
                        EntryRef::Role(id, i) => selection.deselect_role(id, i),
                    }
                }
                ReviewDecision::Apply(selection)
            }
            Answer::Keep => ReviewDecision::KeepUnchanged,
            Answer::Cancel => ReviewDecision::Cancel,
        };
        Ok(decision)
    }
}

/// Numbers in a skip answer are 1-based and must be within `1..=count`.
fn parse_answer(line: &str, count: usize) -> Result<Answer, String> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Err("type a, s <n>..., k or c".to_string());
    };

    match first.to_ascii_lowercase().as_str() {
        "a" | "all" => Ok(Answer::ApplyAll),
        "k" | "keep" => Ok(Answer::Keep),
        "c" | "cancel" => Ok(Answer::Cancel),
        "s" | "skip" => {
            let mut numbers = Vec::new();
            for w in words {
                let n: usize = w.parse().map_err(|_| format!("not a number: {}", w))?;
                if n == 0 || n > count {
                    return Err(format!("no correction numbered {}", n));
                }
                numbers.push(n);
            }
            if numbers.is_empty() {
                return Err("name the corrections to skip, e.g. `s 1 3`".to_string());
            }
            Ok(Answer::Skip(numbers))
        }
        other => Err(format!("unknown answer: {}", other)),
    }
}
