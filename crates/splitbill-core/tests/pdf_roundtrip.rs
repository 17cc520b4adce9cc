#![cfg(feature = "pdf")]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

use splitbill_core::pdf::{parse_pdf, PdfExtractor, PdfProcessor};
use splitbill_core::{BillParser, ParseError, SplitbillConfig, SplitbillError, TotalSource};

/// One line of page text: (x, y, text).
type Placed<'a> = (i64, i64, &'a str);

fn show(ops: &mut Vec<Operation>, x: i64, y: i64, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec!["F1".into(), 9.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(text.as_bytes().to_vec(), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

fn build_pdf(pages: &[&[Placed]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::new();
    for page in pages {
        let mut operations = Vec::new();
        for (x, y, text) in page.iter() {
            show(&mut operations, *x, *y, text);
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}

fn sample_bill() -> Vec<u8> {
    build_pdf(&[
        &[
            (36, 740, "Account summary"),
            (36, 720, "Bill period Dec 15, 2025 - Jan 14, 2026"),
            (36, 680, "Monthly charges"),
            (36, 660, "214.957.3190"),
            (120, 660, "John Smith"),
            (320, 660, "$40.00"),
            (400, 660, "$12.50"),
            (480, 660, "$65.43"),
            (36, 640, "302.310.7589"),
            (120, 640, "Jane Doe"),
            (320, 640, "$38.00"),
            (480, 640, "$58.21"),
        ],
        &[
            (36, 740, "555.101.2001"),
            (120, 740, "Alex Johnson"),
            (320, 740, "$5.00"),
            (400, 740, "-"),
            (480, 740, "$15.00"),
            (36, 720, "Subtotal for Group 1"),
            (480, 720, "$108.64"),
            (36, 680, "Total due $108.64"),
        ],
    ])
}

#[test]
fn test_bill_pdf_end_to_end() {
    let outcome = parse_pdf(&sample_bill(), &SplitbillConfig::default()).unwrap();
    let bill = &outcome.bill;

    let totals: Vec<(&str, Decimal)> = bill
        .lines
        .iter()
        .map(|l| (l.line_number.as_str(), l.total))
        .collect();
    assert_eq!(
        totals,
        vec![
            ("214.957.3190", Decimal::new(6543, 2)),
            ("302.310.7589", Decimal::new(5821, 2)),
            ("555.101.2001", Decimal::new(-1500, 2)),
        ]
    );
    assert_eq!(bill.lines[2].line_name.as_deref(), Some("Alex Johnson"));
    assert_eq!(bill.total_amount, Decimal::new(10864, 2));
    assert_eq!(
        bill.billing_period.as_deref(),
        Some("Dec 15, 2025 - Jan 14, 2026")
    );
    assert_eq!(
        outcome.stats.total_source,
        TotalSource::Document {
            label: "Total due".to_string()
        }
    );
    assert_eq!(outcome.stats.section_rows, 3);
}

#[test]
fn test_pages_read_in_order() {
    let mut extractor = PdfExtractor::new();
    extractor.load(&sample_bill()).unwrap();
    assert_eq!(extractor.page_count(), 2);

    let pages = extractor.extract_fragments().unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0][0].text, "Account summary");
    assert_eq!(pages[1][0].text, "555.101.2001");
}

#[test]
fn test_max_pages_limits_reading() {
    let mut config = SplitbillConfig::default();
    config.pdf.max_pages = 1;

    // The second page carries the stop marker and the document total
    let outcome = parse_pdf(&sample_bill(), &config).unwrap();
    assert_eq!(outcome.bill.lines.len(), 2);
    assert_eq!(outcome.bill.total_amount, Decimal::new(12364, 2));
    assert_eq!(outcome.stats.total_source, TotalSource::LineSum);
}

#[test]
fn test_blank_pdf_is_empty_input() {
    let data = build_pdf(&[&[]]);
    let err = parse_pdf(&data, &SplitbillConfig::default()).unwrap_err();
    assert!(matches!(err, SplitbillError::Parse(ParseError::EmptyInput)));
}

#[test]
fn test_pdf_without_lines() {
    let data = build_pdf(&[&[(36, 700, "Thank you for your payment")]]);

    let mut extractor = PdfExtractor::new();
    extractor.load(&data).unwrap();
    let pages = extractor.extract_fragments().unwrap();

    let err = BillParser::new().parse_pages(pages).unwrap_err();
    assert_eq!(err, ParseError::NoLineItems);
}
