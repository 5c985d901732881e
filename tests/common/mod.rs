//! PDF fixtures built with lopdf.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

const FONT_SIZE: i64 = 10;
const LEADING: i64 = 14;
const TOP: i64 = 760;
const LEFT: i64 = 72;

/// One positioned string on a page.
pub struct Cell<'a> {
    pub x: i64,
    pub y: i64,
    pub text: &'a str,
}

/// A PDF whose pages hold the given lines, one text object per line.
pub fn text_pdf(pages: &[&[&str]]) -> Vec<u8> {
    let pages: Vec<Vec<Cell<'_>>> = pages
        .iter()
        .map(|lines| {
            lines
                .iter()
                .enumerate()
                .map(|(i, text)| Cell {
                    x: LEFT,
                    y: TOP - LEADING * i as i64,
                    text,
                })
                .collect()
        })
        .collect();
    build(&pages)
}

/// A single-page PDF with `rows` laid out in aligned columns.
pub fn table_pdf(rows: &[&[&str]]) -> Vec<u8> {
    let column_x = [LEFT, 220, 360, 480];
    let cells: Vec<Cell<'_>> = rows
        .iter()
        .enumerate()
        .flat_map(|(r, row)| {
            row.iter().enumerate().map(move |(c, text)| Cell {
                x: column_x[c.min(column_x.len() - 1)],
                y: TOP - LEADING * r as i64,
                text,
            })
        })
        .collect();
    build(&[cells])
}

/// A one-page PDF whose trailer carries a standard security handler that
/// no password opens.
pub fn encrypted_pdf() -> Vec<u8> {
    let mut doc = document(&[vec![Cell {
        x: LEFT,
        y: TOP,
        text: "218915949830 F 21",
    }]]);
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1i64,
        "R" => 2i64,
        "Length" => 40i64,
        "P" => -44i64,
        "O" => Object::string_literal(vec![0x4Fu8; 32]),
        "U" => Object::string_literal(vec![0x55u8; 32]),
    });
    doc.trailer.set("Encrypt", encrypt_id);
    doc.trailer.set(
        "ID",
        vec![
            Object::string_literal(vec![0x01u8; 16]),
            Object::string_literal(vec![0x01u8; 16]),
        ],
    );
    save(doc)
}

/// Build a PDF with one text object per cell.
pub fn build(pages: &[Vec<Cell<'_>>]) -> Vec<u8> {
    save(document(pages))
}

fn save(mut doc: Document) -> Vec<u8> {
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn document(pages: &[Vec<Cell<'_>>]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let kids: Vec<Object> = pages
        .iter()
        .map(|cells| page(&mut doc, pages_id, resources_id, cells).into())
        .collect();
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
    doc
}

fn page(doc: &mut Document, parent: ObjectId, resources: ObjectId, cells: &[Cell<'_>]) -> ObjectId {
    let mut operations = Vec::new();
    for cell in cells {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]));
        operations.push(Operation::new("Td", vec![cell.x.into(), cell.y.into()]));
        operations.push(Operation::new("Tj", vec![Object::string_literal(cell.text)]));
        operations.push(Operation::new("ET", vec![]));
    }
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "Contents" => content_id,
        "Resources" => resources,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    })
}
