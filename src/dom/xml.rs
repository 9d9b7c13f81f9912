//! Reading and writing [`Document`]s with `quick-xml`.

use crate::{
    dom::tree::{Document, NodeId, NodeKind},
    error::CleanupError,
};
use quick_xml::{
    escape::partial_escape,
    events::{BytesEnd, BytesPI, BytesStart, BytesText, Event},
    Reader, Writer,
};
use std::{borrow::Cow, fmt::Display, fs, path::Path};

fn write_err<E: Display>(src: E) -> CleanupError {
    CleanupError::Serialization(format!("XML write failed: {src}"))
}

fn append(slot: &mut Option<String>, text: &str) {
    match slot {
        Some(existing) => existing.push_str(text),
        None => *slot = Some(text.to_string()),
    }
}

impl Document {
    /// Parse a complete XML document.
    ///
    /// Text before the root start tag and after the root end tag is kept verbatim so that a
    /// round trip preserves the XML declaration and DOCTYPE byte for byte. A leading byte-order
    /// mark stays at the front of the prolog.
    pub fn parse(input: &str) -> Result<Document, CleanupError> {
        let (bom, input) = match input.strip_prefix('\u{feff}') {
            Some(rest) => ("\u{feff}", rest),
            None => ("", input),
        };
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text(false);

        let mut doc: Option<Document> = None;
        let mut stack: Vec<NodeId> = Vec::new();
        let mut epilog_start: Option<usize> = None;

        loop {
            let position = reader.buffer_position() as usize;
            let event = reader.read_event().map_err(|e| {
                CleanupError::Malformed(format!("{e} (near byte {position})"))
            })?;
            match event {
                Event::Start(start) => {
                    let id = open_element(&mut doc, &stack, &start, input, position)?;
                    stack.push(id);
                }
                Event::Empty(start) => {
                    open_element(&mut doc, &stack, &start, input, position)?;
                    if stack.is_empty() {
                        epilog_start = Some(reader.buffer_position() as usize);
                    }
                }
                Event::End(_) => {
                    stack.pop();
                    if stack.is_empty() {
                        epilog_start = Some(reader.buffer_position() as usize);
                    }
                }
                Event::Text(text) => {
                    if let (Some(doc), Some(parent)) = (doc.as_mut(), stack.last()) {
                        let text = text.unescape().map_err(CleanupError::malformed)?;
                        doc.push_text(*parent, &text);
                    }
                }
                Event::CData(cdata) => {
                    if let (Some(doc), Some(parent)) = (doc.as_mut(), stack.last()) {
                        doc.push_text(*parent, &String::from_utf8_lossy(&cdata));
                    }
                }
                Event::Comment(comment) => {
                    if let (Some(doc), Some(parent)) = (doc.as_mut(), stack.last()) {
                        let id = doc.create_node(NodeKind::Comment, "");
                        doc.set_text(id, Some(String::from_utf8_lossy(&comment).into_owned()));
                        doc.append_child(*parent, id);
                    }
                }
                Event::PI(pi) => {
                    if let (Some(doc), Some(parent)) = (doc.as_mut(), stack.last()) {
                        let id = doc.create_node(NodeKind::ProcessingInstruction, "");
                        doc.set_text(id, Some(String::from_utf8_lossy(&pi).into_owned()));
                        doc.append_child(*parent, id);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            let tag = doc.as_ref().map(|d| d.tag(*open).to_string()).unwrap_or_default();
            return Err(CleanupError::Malformed(format!("unclosed element <{tag}>")));
        }
        let mut doc = doc.ok_or_else(|| CleanupError::Malformed("no root element".to_string()))?;
        doc.prolog.insert_str(0, bom);
        if let Some(start) = epilog_start {
            doc.epilog = input[start..].to_string();
        }
        Ok(doc)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Document, CleanupError> {
        tracing::debug!("Reading {:?}", path.as_ref());
        let content = fs::read_to_string(path)?;
        Document::parse(&content)
    }

    pub fn to_xml_string(&self) -> Result<String, CleanupError> {
        let mut writer = Writer::new(Vec::new());
        self.write_node(&mut writer, self.root())?;
        let body = String::from_utf8(writer.into_inner())?;
        Ok(format!("{}{}{}", self.prolog, body, self.epilog))
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), CleanupError> {
        tracing::debug!("Writing {:?}", path.as_ref());
        fs::write(path, self.to_xml_string()?)?;
        Ok(())
    }

    fn push_text(&mut self, parent: NodeId, text: &str) {
        match self.children(parent).last().copied() {
            Some(last) => append(&mut self.node_mut(last).tail, text),
            None => append(&mut self.node_mut(parent).text, text),
        }
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, id: NodeId) -> Result<(), CleanupError> {
        let node = self.node(id);
        let text = node.text.as_deref().unwrap_or("");
        match node.kind {
            NodeKind::Comment => {
                writer
                    .write_event(Event::Comment(BytesText::from_escaped(text)))
                    .map_err(write_err)?;
            }
            NodeKind::ProcessingInstruction => {
                writer
                    .write_event(Event::PI(BytesPI::new(text)))
                    .map_err(write_err)?;
            }
            NodeKind::Element => {
                let mut start = BytesStart::new(node.tag.as_str());
                for (key, value) in node.attributes.iter() {
                    start.push_attribute((key, value));
                }
                let children = self.children(id);
                if children.is_empty() && text.is_empty() {
                    writer.write_event(Event::Empty(start)).map_err(write_err)?;
                } else {
                    writer.write_event(Event::Start(start)).map_err(write_err)?;
                    write_text(writer, text)?;
                    for child in children {
                        self.write_node(writer, *child)?;
                    }
                    writer
                        .write_event(Event::End(BytesEnd::new(node.tag.as_str())))
                        .map_err(write_err)?;
                }
            }
        }
        write_text(writer, node.tail.as_deref().unwrap_or(""))
    }
}

fn write_text(writer: &mut Writer<Vec<u8>>, text: &str) -> Result<(), CleanupError> {
    if text.is_empty() {
        return Ok(());
    }
    let escaped: Cow<str> = partial_escape(text);
    writer
        .write_event(Event::Text(BytesText::from_escaped(escaped)))
        .map_err(write_err)
}

fn open_element(
    doc: &mut Option<Document>,
    stack: &[NodeId],
    start: &BytesStart<'_>,
    input: &str,
    position: usize,
) -> Result<NodeId, CleanupError> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let id = if let Some(existing) = doc.as_mut() {
        let Some(parent) = stack.last() else {
            return Err(CleanupError::Malformed(format!(
                "second root element <{tag}> (near byte {position})"
            )));
        };
        let id = existing.create_element(&tag);
        existing.append_child(*parent, id);
        id
    } else {
        let mut new_doc = Document::new(&tag);
        new_doc.prolog = input[..position].to_string();
        let root = new_doc.root();
        *doc = Some(new_doc);
        root
    };
    let Some(doc) = doc.as_mut() else {
        return Err(CleanupError::Malformed("no root element".to_string()));
    };
    for attr in start.attributes() {
        let attr = attr.map_err(CleanupError::malformed)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(CleanupError::malformed)?;
        doc.set_attr(id, &key, value.into_owned());
    }
    Ok(id)
}
