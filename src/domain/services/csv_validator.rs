// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::mem::take;

use thiserror::Error;

use crate::domain::models::menu::{MenuCsvDocument, MenuRow, Weekday, MENU_CSV_HEADER, TAG_SEPARATOR};
use crate::utils::errors::{ValidationError, ValidationIssue};

/// CSV分词错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CsvParseError {
    #[error("unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },
    #[error("unexpected character {found:?} after closing quote on line {line}")]
    UnexpectedCharacter { line: usize, found: char },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    LineStart,
    FieldStart,
    Unquoted,
    Quoted,
    QuoteEnd,
}

/// 将CSV文本切分为记录
///
/// 逗号分隔，双引号包裹字段，`""` 表示字段内的引号，兼容CRLF与LF。
/// 记录之间的空行产生一条空记录，文末换行不产生记录。
pub fn parse_records(text: &str) -> Result<Vec<Vec<String>>, CsvParseError> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut state = State::LineStart;
    let mut line = 1;
    let mut quote_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        let newline = ch == '\n' || ch == '\r';
        if newline && state != State::Quoted {
            if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                chars.next();
            }
            if state != State::LineStart {
                record.push(take(&mut field));
            }
            records.push(take(&mut record));
            state = State::LineStart;
            line += 1;
            continue;
        }

        match (state, ch) {
            (State::LineStart | State::FieldStart, '"') => {
                state = State::Quoted;
                quote_line = line;
            }
            (State::LineStart | State::FieldStart | State::Unquoted | State::QuoteEnd, ',') => {
                record.push(take(&mut field));
                state = State::FieldStart;
            }
            (State::LineStart | State::FieldStart | State::Unquoted, c) => {
                field.push(c);
                state = State::Unquoted;
            }
            (State::Quoted, '"') => state = State::QuoteEnd,
            (State::Quoted, c) => {
                if c == '\n' || (c == '\r' && !matches!(chars.peek(), Some('\n'))) {
                    line += 1;
                }
                field.push(c);
            }
            (State::QuoteEnd, '"') => {
                field.push('"');
                state = State::Quoted;
            }
            (State::QuoteEnd, found) => {
                return Err(CsvParseError::UnexpectedCharacter { line, found });
            }
        }
    }

    match state {
        State::LineStart => {}
        State::Quoted => return Err(CsvParseError::UnterminatedQuote { line: quote_line }),
        State::FieldStart | State::Unquoted | State::QuoteEnd => {
            record.push(field);
            records.push(record);
        }
    }

    Ok(records)
}

/// 校验模型输出的菜单CSV
///
/// 收集所有行的全部问题，只有问题列表为空时才返回解析后的文档。
/// 行号从表头之后的第一行开始计为2。
pub fn validate(csv_text: &str) -> Result<MenuCsvDocument, ValidationError> {
    let mut reasons = Vec::new();

    let records = match parse_records(csv_text) {
        Ok(records) => records,
        // Unparseable input has no rows, so it is also empty
        Err(e) => {
            return Err(ValidationError {
                reasons: vec![
                    ValidationIssue::with_detail("csv_parse_error", e.to_string()),
                    ValidationIssue::new("csv_empty"),
                ],
            })
        }
    };

    let Some((header, data)) = records.split_first() else {
        return Err(ValidationError {
            reasons: vec![ValidationIssue::new("csv_empty")],
        });
    };

    if header.iter().map(String::as_str).ne(MENU_CSV_HEADER) {
        reasons.push(ValidationIssue::with_detail(
            "csv_header_invalid",
            format!("{:?}", header),
        ));
    }

    let mut rows = Vec::with_capacity(data.len());
    for (offset, record) in data.iter().enumerate() {
        let index = offset + 2;
        let before = reasons.len();

        let [day, lunch, price, tags] = record.as_slice() else {
            reasons.push(ValidationIssue::with_detail(
                format!("row_{}_field_count", index),
                record.len().to_string(),
            ));
            continue;
        };

        let parsed_day = day.parse::<Weekday>().ok();
        if parsed_day.is_none() {
            reasons.push(ValidationIssue::with_detail(
                format!("row_{}_day_invalid", index),
                day.as_str(),
            ));
        }

        if lunch.trim().is_empty() {
            reasons.push(ValidationIssue::new(format!("row_{}_lunch_empty", index)));
        }

        let parsed_price = if price.trim().is_empty() {
            None
        } else {
            match parse_price(price) {
                Some(value) => Some(value),
                None => {
                    reasons.push(ValidationIssue::with_detail(
                        format!("row_{}_price_invalid", index),
                        price.as_str(),
                    ));
                    None
                }
            }
        };

        let mut parsed_tags = Vec::new();
        if !tags.trim().is_empty() {
            for tag in tags.split(TAG_SEPARATOR) {
                if tag.is_empty() || tag.to_lowercase() != tag {
                    reasons.push(ValidationIssue::with_detail(
                        format!("row_{}_tag_invalid", index),
                        tag,
                    ));
                } else {
                    parsed_tags.push(tag.to_string());
                }
            }
        }

        match parsed_day {
            Some(day) if reasons.len() == before => rows.push(MenuRow {
                day,
                lunch: lunch.clone(),
                price: parsed_price,
                tags: parsed_tags,
            }),
            _ => {}
        }
    }

    if reasons.is_empty() {
        Ok(MenuCsvDocument { rows })
    } else {
        Err(ValidationError { reasons })
    }
}

/// 价格必须是有限的非负数
fn parse_price(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

#[cfg(test)]
#[path = "csv_validator_test.rs"]
mod tests;
