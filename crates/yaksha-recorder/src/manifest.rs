//! XML test-case manifest consumed by the grading system.
//!
//! Cases accumulate in memory during a run and are serialized once, when the
//! run ends. Each `<cases>` element carries the Java DTO type the grader
//! deserializes into.

use crate::error::{RecorderError, RecorderResult};
use crate::title::Category;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::path::Path;

const ROOT_ELEMENT: &str = "test-cases";
const CASE_ELEMENT: &str = "cases";
const CASE_ATTRIBUTES: [(&str, &str); 3] = [
    ("xmlns:java", "http://java.sun.com"),
    ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
    ("xsi:type", "java:com.assessment.data.TestCase"),
];
const CASE_WEIGHT: u32 = 2;
const CASE_DESCRIPTION: &str = "na";

/// A single `<cases>` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestCase {
    pub category: Category,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    cases: Vec<ManifestCase>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, category: Category, name: impl Into<String>) {
        self.cases.push(ManifestCase {
            category,
            name: name.into(),
        });
    }

    pub fn cases(&self) -> &[ManifestCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn clear(&mut self) {
        self.cases.clear();
    }

    /// Pretty-printed document with a two-space indent
    pub fn to_xml_string(&self) -> RecorderResult<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", None, None)))
            .map_err(RecorderError::xml)?;

        if self.cases.is_empty() {
            writer
                .write_event(Event::Empty(BytesStart::new(ROOT_ELEMENT)))
                .map_err(RecorderError::xml)?;
        } else {
            writer
                .write_event(Event::Start(BytesStart::new(ROOT_ELEMENT)))
                .map_err(RecorderError::xml)?;
            for case in &self.cases {
                write_case(&mut writer, case)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))
                .map_err(RecorderError::xml)?;
        }

        let mut xml = String::from_utf8(writer.into_inner()).map_err(RecorderError::xml)?;
        xml.push('\n');
        Ok(xml)
    }

    /// Serialize and overwrite `path`
    pub fn write_to(&self, path: &Path) -> RecorderResult<()> {
        let xml = self.to_xml_string()?;
        std::fs::write(path, xml).map_err(|e| RecorderError::io(path, e))
    }
}

fn write_case(writer: &mut Writer<Vec<u8>>, case: &ManifestCase) -> RecorderResult<()> {
    let start = BytesStart::new(CASE_ELEMENT).with_attributes(CASE_ATTRIBUTES);
    writer
        .write_event(Event::Start(start))
        .map_err(RecorderError::xml)?;

    write_text_element(writer, "test-case-type", case.category.display_name())?;
    write_text_element(writer, "expected-output", "true")?;
    write_text_element(writer, "name", &case.name)?;
    write_text_element(writer, "weight", &CASE_WEIGHT.to_string())?;
    write_text_element(writer, "mandatory", "true")?;
    write_text_element(writer, "desc", CASE_DESCRIPTION)?;

    writer
        .write_event(Event::End(BytesEnd::new(CASE_ELEMENT)))
        .map_err(RecorderError::xml)?;
    Ok(())
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> RecorderResult<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(RecorderError::xml)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(RecorderError::xml)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(RecorderError::xml)?;
    Ok(())
}
