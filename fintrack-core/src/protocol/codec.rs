//! Line framing for commands and responses
//!
//! A message is one line of text. Fields are joined with `|`; the first
//! field is the verb. There is no escaping: callers must not put `|` or
//! line breaks inside a field value. The codec does not check this.

use crate::domain::result::{Error, Result};

use super::verbs;

pub const DELIMITER: char = '|';

/// Join command parts with the field delimiter
pub fn format_command<S: AsRef<str>>(parts: &[S]) -> String {
    let mut line = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            line.push(DELIMITER);
        }
        line.push_str(part.as_ref());
    }
    line
}

/// Copy of a command line safe to log: the token field is masked
pub fn redact_command(line: &str) -> String {
    let mut parts: Vec<&str> = line.split(DELIMITER).collect();
    let masks_second = matches!(
        parts.first().copied(),
        Some(verbs::LOGIN) | Some(verbs::REGISTER)
    );
    if masks_second {
        // LOGIN|user|password
        if parts.len() > 2 {
            parts[2] = "***";
        }
    } else if parts.len() > 1 {
        parts[1] = "***";
    }
    parts.join("|")
}

/// A decoded response line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    parts: Vec<String>,
}

impl Response {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        let parts = if line.is_empty() {
            Vec::new()
        } else {
            line.split(DELIMITER).map(str::to_string).collect()
        };
        Self { parts }
    }

    pub fn verb(&self) -> &str {
        self.parts.first().map(String::as_str).unwrap_or("")
    }

    pub fn is_error(&self) -> bool {
        self.verb() == verbs::ERROR
    }

    /// Cursor over the fields after the verb
    pub fn fields(&self) -> Fields<'_> {
        let rest = if self.parts.is_empty() {
            &self.parts[..]
        } else {
            &self.parts[1..]
        };
        Fields::new(rest)
    }

    /// Field at `index` after the verb
    pub fn field(&self, index: usize) -> Option<&str> {
        self.parts.get(index + 1).map(String::as_str)
    }

    /// Classified error for an `ERROR|code[|description]` envelope
    pub fn error(&self) -> Option<Error> {
        if !self.is_error() {
            return None;
        }
        let code = self.field(0).filter(|c| !c.is_empty()).unwrap_or("UNKNOWN");
        Some(Error::from_server(code, self.field(1)))
    }

    /// Fail unless the response starts with `verb`; error envelopes are classified
    pub fn expect_verb(&self, verb: &str) -> Result<&Self> {
        if let Some(err) = self.error() {
            return Err(err);
        }
        if self.verb() != verb {
            return Err(Error::protocol(format!(
                "expected {} response, got '{}'",
                verb,
                self.verb()
            )));
        }
        Ok(self)
    }
}

/// Positional reader over response fields
#[derive(Debug)]
pub struct Fields<'a> {
    parts: &'a [String],
    pos: usize,
}

impl<'a> Fields<'a> {
    pub fn new(parts: &'a [String]) -> Self {
        Self { parts, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.parts.len() - self.pos
    }

    pub fn next_str(&mut self, name: &str) -> Result<&'a str> {
        let value = self
            .parts
            .get(self.pos)
            .ok_or_else(|| Error::protocol(format!("truncated response: missing {}", name)))?;
        self.pos += 1;
        Ok(value.as_str())
    }

    pub fn next_string(&mut self, name: &str) -> Result<String> {
        self.next_str(name).map(str::to_string)
    }

    pub fn next_i64(&mut self, name: &str) -> Result<i64> {
        let raw = self.next_str(name)?;
        raw.trim()
            .parse()
            .map_err(|_| Error::protocol(format!("invalid {} '{}'", name, raw)))
    }

    /// Count prefix of a repeating section
    pub fn next_count(&mut self) -> Result<usize> {
        let raw = self.next_str("count")?;
        raw.trim()
            .parse()
            .map_err(|_| Error::protocol(format!("invalid count '{}'", raw)))
    }
}
