use std::collections::HashMap;

use crate::error::{AnalysisError, AnalysisResult};
use crate::schema::Schema;

const FIELD_DELIMITER: char = ' ';
const COMMENT_PREFIX: char = '#';

/// One log line mapped onto the schema's field names. Borrows from both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<'a> {
    fields: HashMap<&'a str, &'a str>,
}

impl<'a> Record<'a> {
    pub fn get(&self, field: &str) -> Option<&'a str> {
        self.fields.get(field).copied()
    }

    pub fn require(&self, field: &str) -> AnalysisResult<&'a str> {
        self.get(field)
            .ok_or_else(|| AnalysisError::missing_field(field))
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ParsedLine<'a> {
    Skip,
    Record(Record<'a>),
}

/// Splits a raw line on single spaces and maps tokens to fields positionally.
///
/// Lines starting with `#` are skipped. Consecutive spaces yield empty tokens,
/// which still count toward the field total.
pub fn parse_line<'a>(schema: &'a Schema, line: &'a str) -> AnalysisResult<ParsedLine<'a>> {
    if line.starts_with(COMMENT_PREFIX) {
        return Ok(ParsedLine::Skip);
    }

    let tokens: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    if tokens.len() != schema.len() {
        return Err(AnalysisError::MalformedRecord {
            path: Default::default(),
            line_number: 0,
            expected: schema.len(),
            found: tokens.len(),
            line: line.to_string(),
        });
    }

    let fields = schema
        .fields()
        .iter()
        .map(String::as_str)
        .zip(tokens)
        .collect();
    Ok(ParsedLine::Record(Record { fields }))
}
