// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! XUnit document merging.
//!
//! Each browser harness produces one `<testsuite>` document. They are merged
//! into a single `<testsuite name="castle">` whose counters are the sums of
//! the inputs and whose children are the inputs' non-skipped test cases, in
//! input order and copied verbatim.

use std::fmt::Display;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{Error, Result};

/// One per-harness XUnit document.
#[derive(Debug, Clone)]
pub struct XunitDocument {
    /// Producer of the document, for error messages.
    pub origin: String,
    pub xml: String,
}

/// Summed `<testsuite>` counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XunitSummary {
    pub tests: u64,
    pub failures: u64,
    pub errors: u64,
    pub skipped: u64,
    pub time: f64,
    pub timestamp: Option<String>,
}

/// A merged XUnit document.
#[derive(Debug, Clone)]
pub struct XunitReport {
    pub xml: String,
    pub summary: XunitSummary,
}

impl XunitSummary {
    fn absorb(&mut self, suite: &BytesStart<'_>, origin: &str) -> Result<()> {
        for attr in suite.attributes() {
            let attr = attr.map_err(|e| xml_error(origin, e))?;
            let value = attr.unescape_value().map_err(|e| xml_error(origin, e))?;
            let value = value.trim();
            match attr.key.as_ref() {
                b"tests" => self.tests += parse_count(value),
                b"failures" => self.failures += parse_count(value),
                b"errors" => self.errors += parse_count(value),
                b"skipped" => self.skipped += parse_count(value),
                b"time" => self.time += value.parse::<f64>().unwrap_or(0.0),
                b"timestamp" if self.timestamp.is_none() && !value.is_empty() => {
                    self.timestamp = Some(value.to_string());
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Merge `documents` into one XUnit document.
pub fn merge_xunit(documents: &[XunitDocument]) -> Result<XunitReport> {
    let mut summary = XunitSummary::default();
    let mut cases = Vec::new();
    for doc in documents {
        read_document(doc, &mut summary, &mut cases)?;
    }

    let mut writer = Writer::new(Vec::new());
    let mut root = BytesStart::new("testsuite");
    root.push_attribute(("name", "castle"));
    root.push_attribute(("tests", summary.tests.to_string().as_str()));
    root.push_attribute(("failures", summary.failures.to_string().as_str()));
    root.push_attribute(("errors", summary.errors.to_string().as_str()));
    root.push_attribute(("skipped", summary.skipped.to_string().as_str()));
    if let Some(timestamp) = &summary.timestamp {
        root.push_attribute(("timestamp", timestamp.as_str()));
    }
    root.push_attribute(("time", format_time(summary.time).as_str()));

    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;
    emit(&mut writer, newline())?;
    emit(&mut writer, Event::Start(root))?;
    for event in cases {
        if is_element(&event, b"testcase") {
            emit(&mut writer, newline())?;
        }
        emit(&mut writer, event)?;
    }
    emit(&mut writer, newline())?;
    emit(&mut writer, Event::End(BytesEnd::new("testsuite")))?;
    emit(&mut writer, newline())?;

    let xml = String::from_utf8(writer.into_inner())
        .map_err(|e| Error::Xml(format!("merged document is not UTF-8: {e}")))?;
    tracing::debug!(
        "merged {} xunit document(s): {} tests, {} failures",
        documents.len(),
        summary.tests,
        summary.failures
    );
    Ok(XunitReport { xml, summary })
}

/// A test case being copied.
struct OpenCase {
    events: Vec<Event<'static>>,
    skipped: bool,
    depth: usize,
}

fn read_document(
    doc: &XunitDocument,
    summary: &mut XunitSummary,
    cases: &mut Vec<Event<'static>>,
) -> Result<()> {
    // Drivers may print console noise before the document.
    let xml = doc.xml.find('<').map_or("", |i| &doc.xml[i..]);
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut suites = 0;
    let mut open: Option<OpenCase> = None;
    loop {
        let event = reader
            .read_event()
            .map_err(|e| xml_error(&doc.origin, e))?;

        if let Some(case) = open.as_mut() {
            let closes = match &event {
                Event::Start(e) => {
                    case.skipped |= e.local_name().as_ref() == b"skipped";
                    case.depth += 1;
                    false
                }
                Event::Empty(e) => {
                    case.skipped |= e.local_name().as_ref() == b"skipped";
                    false
                }
                Event::End(_) if case.depth == 0 => true,
                Event::End(_) => {
                    case.depth -= 1;
                    false
                }
                Event::Eof => return Err(xml_error(&doc.origin, "unterminated <testcase>")),
                _ => false,
            };
            case.events.push(event.into_owned());
            if closes && let Some(case) = open.take() {
                if !case.skipped {
                    cases.extend(case.events);
                }
            }
            continue;
        }

        match event {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"testsuite" => {
                summary.absorb(e, &doc.origin)?;
                suites += 1;
            }
            Event::Start(ref e) if e.local_name().as_ref() == b"testcase" => {
                open = Some(OpenCase {
                    events: vec![event.clone().into_owned()],
                    skipped: false,
                    depth: 0,
                });
            }
            Event::Empty(ref e) if e.local_name().as_ref() == b"testcase" => {
                cases.push(event.clone().into_owned());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if suites == 0 {
        return Err(xml_error(&doc.origin, "no <testsuite> element"));
    }
    Ok(())
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Xml(format!("write: {e}")))
}

fn is_element(event: &Event<'_>, name: &[u8]) -> bool {
    match event {
        Event::Start(e) | Event::Empty(e) => e.local_name().as_ref() == name,
        _ => false,
    }
}

fn newline() -> Event<'static> {
    Event::Text(BytesText::new("\n"))
}

fn parse_count(value: &str) -> u64 {
    value.parse().unwrap_or(0)
}

/// Seconds with at most three decimals, trailing zeros dropped.
fn format_time(seconds: f64) -> String {
    let fixed = format!("{seconds:.3}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn xml_error(origin: &str, err: impl Display) -> Error {
    Error::Xml(format!("{origin}: {err}"))
}

#[cfg(test)]
#[path = "xunit_tests.rs"]
mod tests;
