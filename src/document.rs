//! Generic element tree for `I18N` localization documents.
//!
//! The reader keeps only what the loader needs: element names, attributes,
//! concatenated text and the source line of every element. XML entities are
//! resolved, CDATA sections are kept verbatim and comments, declarations and
//! processing instructions are dropped.

use std::io::{BufRead, Read, Write};

use quick_xml::{
    Reader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::{error::Error, traits::Parser};

/// A parsed localization document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

/// One XML element with its attributes, text and children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Text content directly inside this element, concatenated across
    /// child elements.
    pub text: String,
    pub children: Vec<Element>,
    /// 1-based source line of the opening tag, `0` for elements built in code.
    pub line: usize,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Document { root }
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Looks up an attribute by exact name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl Parser for Document {
    fn from_reader<R: BufRead>(mut reader: R) -> Result<Self, Error> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        parse_document(&source)
    }

    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        let mut xml_writer = Writer::new_with_indent(&mut writer, b' ', 2);

        xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        write_element(&mut xml_writer, &self.root)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Maps byte offsets to 1-based line numbers.
struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        LineIndex { line_starts }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= offset)
    }
}

fn parse_document(source: &str) -> Result<Document, Error> {
    let mut xml_reader = Reader::from_str(source);
    let lines = LineIndex::new(source);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = xml_reader.read_event()?;
        let end = (xml_reader.buffer_position() as usize).min(source.len());
        // Attribute values cannot contain a raw `<`, so the last one before the
        // end of a tag is where the tag starts.
        let tag_line = || lines.line_of(source[..end].rfind('<').unwrap_or(0));

        match event {
            Event::Start(ref e) => {
                stack.push(start_element(e, tag_line())?);
            }
            Event::Empty(ref e) => {
                let element = start_element(e, tag_line())?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| {
                    Error::parse_error(tag_line(), "closing tag without matching opening tag")
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(e) => {
                let text = e.unescape()?;
                match stack.last_mut() {
                    Some(top) => top.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(Error::parse_error(
                            lines.line_of(end),
                            "text outside of the root element",
                        ));
                    }
                }
            }
            Event::CData(e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::parse_error(
            open.line,
            format!("element <{}> is never closed", open.name),
        ));
    }

    root.map(Document::new)
        .ok_or_else(|| Error::parse_error(1, "document has no root element"))
}

fn start_element(e: &BytesStart, line: usize) -> Result<Element, Error> {
    let mut element = Element::new(String::from_utf8_lossy(e.name().as_ref()));
    element.line = line;

    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::parse_error(line, err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), Error> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_some() {
        return Err(Error::parse_error(
            element.line,
            "document has more than one root element",
        ));
    } else {
        *root = Some(element);
    }
    Ok(())
}

fn write_element<W: Write>(xml_writer: &mut Writer<W>, element: &Element) -> Result<(), Error> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    let has_text = if element.children.is_empty() {
        !element.text.is_empty()
    } else {
        !element.text.trim().is_empty()
    };

    if !has_text && element.children.is_empty() {
        xml_writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    xml_writer.write_event(Event::Start(start))?;
    if has_text {
        xml_writer.write_event(Event::Text(BytesText::new(&element.text)))?;
    }
    for child in &element.children {
        write_element(xml_writer, child)?;
    }
    xml_writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}
