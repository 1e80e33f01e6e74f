use std::collections::BTreeMap;

use super::domain::BiomarkerReading;
use super::patterns::BiomarkerPatterns;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Text and biomarker readings recovered from an uploaded document.
#[derive(Debug)]
pub struct ExtractedReport {
    pub text: String,
    pub biomarkers: BTreeMap<String, BiomarkerReading>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("uploaded file is not a PDF document")]
    NotPdf,
    #[error("document has no extractable text layer")]
    NoTextLayer,
    #[error("biomarker pattern failed to compile")]
    Pattern(#[from] regex::Error),
}

/// Recovers report text from raw document bytes.
pub trait LabReportExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedReport, ExtractionError>;
}

/// Extractor that walks a PDF's string literals to rebuild the text
/// layer, then scans it for known biomarkers. Scanned-image documents
/// carry no literals and are rejected.
pub struct TextLayerExtractor {
    patterns: BiomarkerPatterns,
}

impl TextLayerExtractor {
    pub fn new() -> Result<Self, ExtractionError> {
        Ok(Self {
            patterns: BiomarkerPatterns::standard()?,
        })
    }
}

impl LabReportExtractor for TextLayerExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedReport, ExtractionError> {
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(ExtractionError::NotPdf);
        }
        let text = text_layer(bytes);
        if text.trim().is_empty() {
            return Err(ExtractionError::NoTextLayer);
        }
        let biomarkers = self.patterns.scan(&text);
        Ok(ExtractedReport { text, biomarkers })
    }
}

/// Joins the document's string literals, inserting a line break wherever
/// the content stream moved to a new text line between them.
fn text_layer(bytes: &[u8]) -> String {
    let mut text = String::new();
    let mut gap_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'(' {
            let break_before = line_break(&bytes[gap_start..i]);
            let (literal, next) = parse_literal(bytes, i + 1);
            if !literal.is_empty() {
                if !text.is_empty() {
                    text.push(if break_before { '\n' } else { ' ' });
                }
                text.push_str(&literal);
            }
            i = next;
            gap_start = next;
        } else {
            i += 1;
        }
    }
    text
}

/// True when the bytes between two literals contain a text-positioning
/// operator that starts a new line (T*, Td, TD, or the ' shorthand).
fn line_break(gap: &[u8]) -> bool {
    gap.contains(&b'\'')
        || gap
            .windows(2)
            .any(|pair| pair == b"T*" || pair == b"Td" || pair == b"TD")
}

/// Decodes one literal starting just past its opening parenthesis and
/// returns it with the index of the byte after the closing parenthesis.
fn parse_literal(bytes: &[u8], start: usize) -> (String, usize) {
    let mut literal = String::new();
    let mut depth = 1usize;
    let mut i = start;
    while i < bytes.len() && depth > 0 {
        match bytes[i] {
            b'\\' => {
                i += 1;
                let Some(&escaped) = bytes.get(i) else { break };
                match escaped {
                    b'n' => literal.push('\n'),
                    b'r' => literal.push('\r'),
                    b't' => literal.push('\t'),
                    b'0'..=b'7' => {
                        let mut code = u32::from(escaped - b'0');
                        let mut taken = 1;
                        while taken < 3 {
                            match bytes.get(i + 1) {
                                Some(&digit) if (b'0'..=b'7').contains(&digit) => {
                                    code = code * 8 + u32::from(digit - b'0');
                                    i += 1;
                                    taken += 1;
                                }
                                _ => break,
                            }
                        }
                        if let Some(decoded) = char::from_u32(code) {
                            push_printable(&mut literal, decoded);
                        }
                    }
                    other => push_printable(&mut literal, char::from(other)),
                }
            }
            b'(' => {
                depth += 1;
                literal.push('(');
            }
            b')' => {
                depth -= 1;
                if depth > 0 {
                    literal.push(')');
                }
            }
            other => push_printable(&mut literal, char::from(other)),
        }
        i += 1;
    }
    (literal, i)
}

/// Keeps printable ASCII and Latin-1 text bytes, dropping control bytes
/// that stray into a literal.
fn push_printable(literal: &mut String, ch: char) {
    if (' '..='~').contains(&ch) || ch as u32 >= 0xA0 {
        literal.push(ch);
    }
}
