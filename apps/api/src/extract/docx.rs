//! DOCX text extraction.
//!
//! A .docx file is a zip container; the visible text lives in
//! `word/document.xml`. We stream that part with quick-xml and rebuild
//! plain text: paragraph ends become newlines, table cells are joined with
//! a separator so their content stays searchable. Table and drawing
//! elements are recorded as layout features for the formatting score.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::errors::AppError;

/// Layout features only observable in the DOCX XML, not in the plain text.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxFeatures {
    pub uses_tables: bool,
    pub uses_images: bool,
}

pub fn extract_docx(bytes: &[u8]) -> Result<(String, DocxFeatures), AppError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| AppError::CorruptDocument(format!("not a DOCX container: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| AppError::CorruptDocument(format!("missing document body: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| AppError::CorruptDocument(format!("unreadable document body: {e}")))?;

    parse_document_xml(&xml)
}

fn parse_document_xml(xml: &str) -> Result<(String, DocxFeatures), AppError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut features = DocxFeatures::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"tbl" => features.uses_tables = true,
                b"drawing" | b"pic" => features.uses_images = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => out.push(' '),
                b"br" => out.push('\n'),
                b"drawing" | b"pic" => features.uses_images = true,
                _ => {}
            },
            Ok(Event::Text(t)) => {
                let piece = t
                    .unescape()
                    .map_err(|e| AppError::CorruptDocument(format!("bad text run: {e}")))?;
                out.push_str(&piece);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"p" => out.push('\n'),
                b"tc" => out.push_str(" | "),
                b"tr" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(AppError::CorruptDocument(format!(
                    "malformed document XML: {e}"
                )))
            }
            _ => {}
        }
    }

    Ok((out, features))
}
