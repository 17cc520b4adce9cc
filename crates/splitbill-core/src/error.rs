//! Error types for the splitbill-core library.

use thiserror::Error;

/// Main error type for the splitbill library.
#[derive(Error, Debug)]
pub enum SplitbillError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Bill parsing error.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to reading the PDF text layer.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to read text from a page content stream.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),

    /// The input is not a PDF file.
    #[error("please upload a PDF file (got {0})")]
    NotPdf(String),

    /// The input exceeds the configured size limit.
    #[error("file size {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
}

/// Whole-parse failures surfaced to the caller.
///
/// Row-level and pattern-level misses never show up here; they are skipped
/// during extraction. Callers are expected to present these as a
/// "could not read this bill" message.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The fragment sequence was empty or held only degenerate fragments.
    #[error("could not extract text from the bill; the file may be empty or scanned")]
    EmptyInput,

    /// Neither the row pass nor the fallback pattern produced a line item.
    #[error("no line items found in the bill")]
    NoLineItems,

    /// No document total in range and the line sum is not positive.
    #[error("could not determine a plausible total amount for the bill")]
    NoPlausibleTotal,
}

/// Result type for the splitbill library.
pub type Result<T> = std::result::Result<T, SplitbillError>;
