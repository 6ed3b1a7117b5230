//! Token row reader. Turns raw execution trace lines into ordered token
//! sequences and walks them with an explicit cursor.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Number of fixed tokens leading every row: trace ID, program, instruction.
pub const PREFIX_TOKENS: usize = 3;
/// Number of fixed tokens trailing every row: signing wallet, submit flag.
pub const TRAILING_TOKENS: usize = 2;

/// Split a composite trace string on `;` or `,`, trimming each piece.
///
/// Blank input yields no tokens at all.
pub fn split_tokens(line: &str) -> Vec<String> {
    if line.trim().is_empty() {
        return Vec::new();
    }
    line.split([';', ','])
        .map(|token| token.trim().to_string())
        .collect()
}

/// The first cell of a CSV line. A cell opening with `"` runs to the closing
/// quote, with `""` standing for a literal quote.
pub fn first_cell(line: &str) -> String {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(quoted) = line.strip_prefix('"') else {
        return line.split(',').next().unwrap_or_default().to_string();
    };

    let mut cell = String::new();
    let mut chars = quoted.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '"' {
            cell.push(c);
        } else if chars.peek() == Some(&'"') {
            chars.next();
            cell.push('"');
        } else {
            break;
        }
    }
    cell
}

/// One scenario: the tokens of a single execution trace row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScenarioRow {
    /// 1-based line number of the row in its trace file.
    pub index: usize,
    pub tokens: Vec<String>,
}

impl ScenarioRow {
    pub fn new(index: usize, tokens: Vec<String>) -> Self {
        Self { index, tokens }
    }

    /// Parse a composite trace string into a row.
    pub fn parse(index: usize, line: &str) -> Self {
        Self::new(index, split_tokens(line))
    }

    pub fn token(&self, position: usize) -> Option<&str> {
        self.tokens.get(position).map(String::as_str)
    }

    pub fn trace_id(&self) -> &str {
        self.token(0).unwrap_or_default()
    }

    pub fn program_name(&self) -> Option<&str> {
        self.token(1)
    }

    pub fn instruction_name(&self) -> Option<&str> {
        self.token(2)
    }

    /// A cursor positioned on the first token after the fixed prefix.
    pub fn slots(&self) -> TokenCursor<'_> {
        TokenCursor::at(&self.tokens, PREFIX_TOKENS)
    }
}

/// A forward-only cursor over a row's tokens, shared by the account binder
/// and the argument binder so each slot group starts where the last ended.
#[derive(Clone, Debug)]
pub struct TokenCursor<'a> {
    tokens: &'a [String],
    start: usize,
    position: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [String]) -> Self {
        Self::at(tokens, 0)
    }

    pub fn at(tokens: &'a [String], start: usize) -> Self {
        let start = start.min(tokens.len());
        Self {
            tokens,
            start,
            position: start,
        }
    }

    /// Consume the next token.
    pub fn next_token(&mut self) -> Option<&'a str> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token.as_str())
    }

    /// Tokens consumed since the cursor was created.
    pub fn consumed(&self) -> usize {
        self.position - self.start
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Tokens not yet consumed.
    pub fn remaining(&self) -> &'a [String] {
        &self.tokens[self.position..]
    }
}

/// An execution trace file: one scenario per non-blank line, read from the
/// first CSV cell of each line. There is no header row.
#[derive(Clone, Debug)]
pub struct TraceFile {
    pub path: PathBuf,
    pub rows: Vec<ScenarioRow>,
}

impl TraceFile {
    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            rows: Self::parse_rows(&contents),
        })
    }

    pub fn parse_rows(contents: &str) -> Vec<ScenarioRow> {
        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| ScenarioRow::parse(i + 1, &first_cell(line)))
            .collect()
    }
}
