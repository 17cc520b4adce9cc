//! PDF text-layer reading.

mod extractor;

pub use extractor::{decode_text_simple, PdfExtractor};

use std::path::Path;

use tracing::debug;

use crate::bill::{BillParser, ParseOutcome, RawFragment};
use crate::error::PdfError;
use crate::models::config::{PdfConfig, SplitbillConfig};

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF text-layer readers.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract positioned text items from a page (1-indexed).
    fn extract_page_fragments(&self, page: u32) -> Result<Vec<RawFragment>>;

    /// Extract positioned text items for every page, in page order.
    fn extract_fragments(&self) -> Result<Vec<Vec<RawFragment>>>;
}

/// Reject inputs that are not PDFs or exceed the size limit.
pub fn check_upload(path: &Path, size: u64, config: &PdfConfig) -> Result<()> {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return Err(PdfError::NotPdf(path.display().to_string()));
    }

    if size > config.max_file_size {
        return Err(PdfError::TooLarge {
            size,
            limit: config.max_file_size,
        });
    }

    Ok(())
}

/// Read a PDF from memory and parse the bill it contains.
pub fn parse_pdf(data: &[u8], config: &SplitbillConfig) -> crate::Result<ParseOutcome> {
    let mut extractor = PdfExtractor::new().with_max_pages(config.pdf.max_pages);
    extractor.load(data)?;

    let pages = extractor.extract_fragments()?;
    debug!("Read text layer from {} pages", pages.len());

    let outcome = BillParser::from_config(config).parse_pages(pages)?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_upload_accepts_pdf() {
        let config = PdfConfig::default();
        assert!(check_upload(Path::new("bill.PDF"), 1024, &config).is_ok());
    }

    #[test]
    fn test_check_upload_rejects_other_types() {
        let config = PdfConfig::default();
        let err = check_upload(Path::new("bill.png"), 1024, &config).unwrap_err();
        assert!(matches!(err, PdfError::NotPdf(_)));

        let err = check_upload(Path::new("bill"), 1024, &config).unwrap_err();
        assert!(matches!(err, PdfError::NotPdf(_)));
    }

    #[test]
    fn test_check_upload_rejects_large_files() {
        let config = PdfConfig {
            max_file_size: 100,
            ..Default::default()
        };
        let err = check_upload(Path::new("bill.pdf"), 101, &config).unwrap_err();
        assert!(matches!(err, PdfError::TooLarge { size: 101, limit: 100 }));
        assert!(check_upload(Path::new("bill.pdf"), 100, &config).is_ok());
    }

    #[test]
    fn test_parse_pdf_rejects_garbage() {
        let err = parse_pdf(b"not a pdf", &SplitbillConfig::default()).unwrap_err();
        assert!(matches!(err, crate::SplitbillError::Pdf(_)));
    }
}
