/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod error;
mod location;

pub(crate) use error::description;
pub use error::SaxError;
pub use location::Location;

use crate::entities;

/// An XML construct reported by the parser.
#[derive(Debug, Eq, PartialEq)]
pub enum SaxElement<'a> {
    /// A start tag or empty element tag.
    ///
    /// The argument is the full name of the tag. This element is sent to the handler as soon as
    /// the name is parsed.
    StartTag(&'a str),

    /// A tag attribute for the last StartTag.
    ///
    /// First argument is the attribute name and the second argument is the attribute value.
    /// All references in the attribute value are replaced with the actual characters.
    Attribute(&'a str, &'a str),

    /// The last StartTag is closed with `>` and its content follows.
    ///
    /// This arrives as soon as the start tag ends, which is what makes a
    /// never-ending stream root usable.
    StartTagContent,

    /// The last StartTag was an empty element tag and will have no content.
    StartTagEmpty,

    /// An end tag element.
    ///
    /// The argument is the full name of the end tag.
    EndTag(&'a str),

    /// A character data element.
    ///
    /// A continuous block of text might arrive in several parts, split at
    /// references and CDATA section boundaries. Text is never split inside a
    /// UTF-8 sequence, even if the input chunks are.
    CData(&'a str),
}

pub trait SaxHandler {
    fn handle_element(&mut self, element: &SaxElement) -> Result<(), SaxError>;
}

/// SAX (Simple API for XML) based push parser.
///
/// Bytes can be given in chunks of any size. Every construct which is
/// complete is reported to the handler immediately, partial constructs at
/// the end of a chunk are kept in internal buffers until more bytes arrive.
///
/// ```
/// use iks_component::{SaxElement, SaxError, SaxHandler, SaxParser};
///
/// struct Counter(usize);
/// impl SaxHandler for Counter {
///     fn handle_element(&mut self, element: &SaxElement) -> Result<(), SaxError> {
///         if let SaxElement::StartTag(_) = element {
///             self.0 += 1;
///         }
///         Ok(())
///     }
/// }
///
/// let mut counter = Counter(0);
/// let mut parser = SaxParser::new();
/// parser.parse_bytes(&mut counter, b"<doc><a/><b>te").unwrap();
/// parser.parse_bytes(&mut counter, b"xt</b></doc>").unwrap();
/// parser.parse_finish().unwrap();
/// assert_eq!(counter.0, 3);
/// ```
pub struct SaxParser {
    state: State,
    uni_len: u32,
    uni_left: u32,
    uni_char: u32,
    depth: usize,
    is_end_tag: bool,
    quote: u8,
    seen_content: bool,
    value_pos: usize,
    literal_pos: usize,
    buffer: Vec<u8>,
    text: Vec<u8>,
    ref_buffer: Vec<u8>,
    char_ref_value: u32,
    is_value_ref: bool,
    failed: bool,
    location: Location,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Prolog,
    TagStart,
    Pi,
    PiEnd,
    Markup,
    CDataSectionStart,
    CDataSectionBody,
    CDataSectionBracket,
    CDataSectionBrackets,
    CommentStart,
    CommentBody,
    CommentDash,
    CommentEnd,
    TagName,
    EndTagWhitespace,
    EmptyTagEnd,
    AttributeWhitespace,
    AttributeName,
    AttributeEq,
    AttributeValueStart,
    AttributeValue,
    CData,
    Reference,
    Entity,
    CharReference,
    CharReferenceBody,
    HexCharReference,
    Epilog,
}

const INITIAL_BUFFER_CAPACITY: usize = 128;

const REF_BUFFER_SIZE: usize = 8;

const CDATA_SECTION_START: &[u8] = b"CDATA[";

macro_rules! whitespace {
    () => {
        b' ' | b'\t' | b'\r' | b'\n'
    };
}

macro_rules! xml_error {
    ($a:ident) => {
        return Err(SaxError::BadXml(description::$a))
    };
}

fn is_valid_xml_char(c: u32) -> bool {
    matches!(
        c,
        0x09 | 0x0a | 0x0d | 0x20..=0xd7ff | 0xe000..=0xfffd | 0x10000..=0x10ffff
    )
}

fn as_str(bytes: &[u8]) -> Result<&str, SaxError> {
    std::str::from_utf8(bytes).map_err(|_| SaxError::BadXml(description::UTF8_INVALID_SEQUENCE))
}

fn reserve(buffer: &mut Vec<u8>, bytes: &[u8]) -> Result<(), SaxError> {
    buffer
        .try_reserve(bytes.len())
        .map_err(|_| SaxError::NoMemory)?;
    buffer.extend_from_slice(bytes);
    Ok(())
}

impl SaxParser {
    /// Creates a new SAX parser instance.
    ///
    /// The instance can be reused for multiple documents with the [reset()](SaxParser::reset) method.
    pub fn new() -> SaxParser {
        SaxParser {
            state: State::Prolog,
            uni_len: 0,
            uni_left: 0,
            uni_char: 0,
            depth: 0,
            is_end_tag: false,
            quote: b'"',
            seen_content: false,
            value_pos: 0,
            literal_pos: 0,
            buffer: Vec::with_capacity(INITIAL_BUFFER_CAPACITY),
            text: Vec::new(),
            ref_buffer: Vec::with_capacity(REF_BUFFER_SIZE),
            char_ref_value: 0,
            is_value_ref: false,
            failed: false,
            location: Location::new(),
        }
    }

    /// Resets the parser into a clean state.
    pub fn reset(&mut self) {
        self.state = State::Prolog;
        self.uni_len = 0;
        self.uni_left = 0;
        self.uni_char = 0;
        self.depth = 0;
        self.is_end_tag = false;
        self.quote = b'"';
        self.seen_content = false;
        self.value_pos = 0;
        self.literal_pos = 0;
        self.buffer.clear();
        self.text.clear();
        self.ref_buffer.clear();
        self.char_ref_value = 0;
        self.is_value_ref = false;
        self.failed = false;
        self.location = Location::new();
    }

    /// Position of the last parsed byte.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Number of currently open tags.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Checks if the document is complete.
    ///
    /// A completed document should have a root tag and should not have any
    /// unfinished XML constructs, such as open comments and markup. Streams
    /// never call this, their root stays open for the whole session.
    pub fn parse_finish(&mut self) -> Result<(), SaxError> {
        if !self.seen_content {
            xml_error!(DOC_NO_CONTENT);
        }
        if self.depth > 0 {
            xml_error!(DOC_OPEN_TAGS);
        }
        if self.state != State::Epilog {
            xml_error!(DOC_OPEN_MARKUP);
        }
        Ok(())
    }

    /// Parses given XML bytes and checks if the document is complete.
    pub fn parse_bytes_finish(
        &mut self,
        handler: &mut impl SaxHandler,
        bytes: &[u8],
    ) -> Result<(), SaxError> {
        self.parse_bytes(handler, bytes)?;
        self.parse_finish()
    }

    /// Parses given XML bytes.
    ///
    /// After an error the parser refuses further input until it is reset.
    pub fn parse_bytes(
        &mut self,
        handler: &mut impl SaxHandler,
        bytes: &[u8],
    ) -> Result<(), SaxError> {
        if self.failed {
            xml_error!(PARSER_REUSE_WITHOUT_RESET);
        }
        let result = self.parse_chunk(handler, bytes);
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    fn check_byte(&mut self, c: u8) -> Result<(), SaxError> {
        if self.uni_left > 0 {
            if c & 0xc0 != 0x80 {
                xml_error!(UTF8_INVALID_CONT_BYTE);
            }
            self.uni_char = (self.uni_char << 6) | (c as u32 & 0x3f);
            self.uni_left -= 1;
            if self.uni_left == 0 {
                // Sequences longer than the actual character codepoint
                // size are security hazards.
                let overlong = match self.uni_len {
                    2 => self.uni_char <= 0x7f,
                    3 => self.uni_char <= 0x7ff,
                    _ => self.uni_char <= 0xffff,
                };
                if overlong {
                    xml_error!(UTF8_OVERLONG_SEQUENCE);
                }
                if !is_valid_xml_char(self.uni_char) {
                    xml_error!(CHAR_INVALID);
                }
            }
        } else if c & 0x80 == 0x80 {
            let (len, bits) = match c {
                0xc0..=0xdf => (2, c & 0x1f),
                0xe0..=0xef => (3, c & 0x0f),
                0xf0..=0xf7 => (4, c & 0x07),
                _ => xml_error!(UTF8_INVALID_PREFIX_BYTE),
            };
            self.uni_len = len;
            self.uni_left = len - 1;
            self.uni_char = bits as u32;
        } else if c < 0x20 && !matches!(c, 0x09 | 0x0a | 0x0d) {
            xml_error!(CHAR_INVALID);
        }
        Ok(())
    }

    fn flush_text(&mut self, handler: &mut impl SaxHandler, bytes: &[u8]) -> Result<(), SaxError> {
        if self.text.is_empty() {
            if !bytes.is_empty() {
                handler.handle_element(&SaxElement::CData(as_str(bytes)?))?;
            }
            return Ok(());
        }
        reserve(&mut self.text, bytes)?;
        let result =
            as_str(&self.text).and_then(|s| handler.handle_element(&SaxElement::CData(s)));
        self.text.clear();
        result
    }

    fn send_char_ref(&mut self, handler: &mut impl SaxHandler) -> Result<(), SaxError> {
        let c = match char::from_u32(self.char_ref_value) {
            Some(c) if is_valid_xml_char(self.char_ref_value) => c,
            _ => xml_error!(CHAR_INVALID),
        };
        let mut buf = [0u8; 4];
        let s = c.encode_utf8(&mut buf);
        if self.is_value_ref {
            reserve(&mut self.buffer, s.as_bytes())
        } else {
            handler.handle_element(&SaxElement::CData(s))
        }
    }

    fn close_tag(&mut self) -> Result<(), SaxError> {
        if self.depth == 0 {
            xml_error!(TAG_CLOSE_WITHOUT_OPEN);
        }
        self.depth -= 1;
        self.state = if self.depth == 0 {
            State::Epilog
        } else {
            State::CData
        };
        Ok(())
    }

    fn state_after_markup(&self) -> State {
        if self.depth > 0 {
            State::CData
        } else if self.seen_content {
            State::Epilog
        } else {
            State::Prolog
        }
    }

    fn state_after_reference(&self) -> State {
        if self.is_value_ref {
            State::AttributeValue
        } else {
            State::CData
        }
    }

    fn parse_chunk(&mut self, handler: &mut impl SaxHandler, bytes: &[u8]) -> Result<(), SaxError> {
        let mut pos: usize = 0;
        let mut back: usize = 0;
        let mut redo = false;

        while pos < bytes.len() {
            let c = bytes[pos];
            if !redo {
                self.check_byte(c)?;
            }
            redo = false;

            match self.state {
                State::Prolog | State::Epilog => match c {
                    b'<' => self.state = State::TagStart,
                    whitespace!() => (),
                    _ => xml_error!(DOC_CDATA_WITHOUT_PARENT),
                },

                State::TagStart => match c {
                    b'!' => self.state = State::Markup,
                    b'?' => self.state = State::Pi,
                    b'/' => {
                        if self.depth == 0 {
                            xml_error!(TAG_CLOSE_WITHOUT_OPEN);
                        }
                        back = pos + 1;
                        self.is_end_tag = true;
                        self.state = State::TagName;
                    }
                    whitespace!() => xml_error!(TAG_WHITESPACE_START),
                    b'>' => xml_error!(TAG_EMPTY_NAME),
                    b'<' | b'&' | b'"' | b'\'' | b'=' => xml_error!(TAG_BAD_NAME),
                    _ => {
                        if self.depth == 0 && self.seen_content {
                            xml_error!(TAG_OUTSIDE_ROOT);
                        }
                        self.depth += 1;
                        back = pos;
                        self.is_end_tag = false;
                        self.seen_content = true;
                        self.state = State::TagName;
                    }
                },

                State::Markup => match c {
                    b'-' => self.state = State::CommentStart,
                    b'[' => {
                        if self.depth == 0 {
                            xml_error!(MARKUP_CDATA_SECTION_OUTSIDE_ROOT);
                        }
                        self.literal_pos = 0;
                        self.state = State::CDataSectionStart;
                    }
                    b'D' => return Err(SaxError::NotSupported(description::DOCTYPE_NOT_SUPPORTED)),
                    _ => xml_error!(MARKUP_UNRECOGNIZED),
                },

                State::CDataSectionStart => {
                    if c != CDATA_SECTION_START[self.literal_pos] {
                        xml_error!(MARKUP_CDATA_SECTION_BAD_START);
                    }
                    self.literal_pos += 1;
                    if self.literal_pos == CDATA_SECTION_START.len() {
                        back = pos + 1;
                        self.state = State::CDataSectionBody;
                    }
                }

                State::CDataSectionBody => {
                    if c == b']' {
                        self.flush_text(handler, &bytes[back..pos])?;
                        self.state = State::CDataSectionBracket;
                    }
                }

                State::CDataSectionBracket => match c {
                    b']' => self.state = State::CDataSectionBrackets,
                    _ => {
                        handler.handle_element(&SaxElement::CData("]"))?;
                        back = pos;
                        self.state = State::CDataSectionBody;
                    }
                },

                State::CDataSectionBrackets => match c {
                    b'>' => {
                        back = pos + 1;
                        self.state = State::CData;
                    }
                    b']' => handler.handle_element(&SaxElement::CData("]"))?,
                    _ => {
                        handler.handle_element(&SaxElement::CData("]]"))?;
                        back = pos;
                        self.state = State::CDataSectionBody;
                    }
                },

                State::CommentStart => {
                    if c != b'-' {
                        xml_error!(COMMENT_MISSING_DASH);
                    }
                    self.state = State::CommentBody;
                }

                State::CommentBody => {
                    if c == b'-' {
                        self.state = State::CommentDash;
                    }
                }

                State::CommentDash => {
                    self.state = if c == b'-' {
                        State::CommentEnd
                    } else {
                        State::CommentBody
                    };
                }

                State::CommentEnd => {
                    if c != b'>' {
                        xml_error!(COMMENT_MISSING_END);
                    }
                    back = pos + 1;
                    self.state = self.state_after_markup();
                }

                State::Pi => {
                    if c == b'?' {
                        self.state = State::PiEnd;
                    }
                }

                State::PiEnd => match c {
                    b'>' => {
                        back = pos + 1;
                        self.state = self.state_after_markup();
                    }
                    b'?' => (),
                    _ => self.state = State::Pi,
                },

                State::TagName => match c {
                    b'/' | b'>' | whitespace!() => {
                        reserve(&mut self.buffer, &bytes[back..pos])?;
                        if self.buffer.is_empty() {
                            xml_error!(TAG_EMPTY_NAME);
                        }
                        let name = as_str(&self.buffer)?;
                        if self.is_end_tag {
                            if c == b'/' {
                                xml_error!(TAG_DOUBLE_END);
                            }
                            handler.handle_element(&SaxElement::EndTag(name))?;
                        } else {
                            handler.handle_element(&SaxElement::StartTag(name))?;
                        }
                        self.buffer.clear();
                        match c {
                            b'/' => self.state = State::EmptyTagEnd,
                            b'>' => {
                                if self.is_end_tag {
                                    self.close_tag()?;
                                } else {
                                    handler.handle_element(&SaxElement::StartTagContent)?;
                                    self.state = State::CData;
                                }
                                back = pos + 1;
                            }
                            _ => {
                                self.state = if self.is_end_tag {
                                    State::EndTagWhitespace
                                } else {
                                    State::AttributeWhitespace
                                };
                            }
                        }
                    }
                    b'<' | b'&' | b'"' | b'\'' | b'=' => xml_error!(TAG_BAD_NAME),
                    _ => (),
                },

                State::EmptyTagEnd => match c {
                    b'>' => {
                        handler.handle_element(&SaxElement::StartTagEmpty)?;
                        self.close_tag()?;
                        back = pos + 1;
                    }
                    _ => xml_error!(TAG_EMPTY_TAG_MISSING_END),
                },

                State::EndTagWhitespace => match c {
                    b'>' => {
                        self.close_tag()?;
                        back = pos + 1;
                    }
                    whitespace!() => (),
                    _ => xml_error!(TAG_END_TAG_ATTRIBUTES),
                },

                State::AttributeWhitespace => match c {
                    whitespace!() => (),
                    b'/' => self.state = State::EmptyTagEnd,
                    b'>' => {
                        handler.handle_element(&SaxElement::StartTagContent)?;
                        back = pos + 1;
                        self.state = State::CData;
                    }
                    _ => {
                        back = pos;
                        self.state = State::AttributeName;
                        redo = true;
                    }
                },

                State::AttributeName => match c {
                    b'=' | whitespace!() => {
                        reserve(&mut self.buffer, &bytes[back..pos])?;
                        if self.buffer.is_empty() {
                            xml_error!(TAG_ATTRIBUTE_BAD_NAME);
                        }
                        self.state = if c == b'=' {
                            State::AttributeValueStart
                        } else {
                            State::AttributeEq
                        };
                    }
                    b'/' | b'>' | b'<' => xml_error!(TAG_ATTRIBUTE_BAD_NAME),
                    _ => (),
                },

                State::AttributeEq => match c {
                    b'=' => self.state = State::AttributeValueStart,
                    whitespace!() => (),
                    _ => xml_error!(TAG_ATTRIBUTE_WITHOUT_EQUAL),
                },

                State::AttributeValueStart => match c {
                    b'"' | b'\'' => {
                        self.quote = c;
                        self.value_pos = self.buffer.len();
                        back = pos + 1;
                        self.state = State::AttributeValue;
                    }
                    whitespace!() => (),
                    _ => xml_error!(TAG_ATTRIBUTE_WITHOUT_QUOTE),
                },

                State::AttributeValue => {
                    if c == self.quote {
                        reserve(&mut self.buffer, &bytes[back..pos])?;
                        let name = as_str(&self.buffer[..self.value_pos])?;
                        let value = as_str(&self.buffer[self.value_pos..])?;
                        handler.handle_element(&SaxElement::Attribute(name, value))?;
                        self.buffer.clear();
                        self.state = State::AttributeWhitespace;
                    } else if c == b'&' {
                        reserve(&mut self.buffer, &bytes[back..pos])?;
                        self.ref_buffer.clear();
                        self.is_value_ref = true;
                        self.state = State::Reference;
                    } else if c == b'<' {
                        xml_error!(TAG_ATTRIBUTE_BAD_VALUE);
                    }
                }

                State::CData => match c {
                    b'<' => {
                        self.flush_text(handler, &bytes[back..pos])?;
                        self.state = State::TagStart;
                    }
                    b'&' => {
                        self.flush_text(handler, &bytes[back..pos])?;
                        self.ref_buffer.clear();
                        self.is_value_ref = false;
                        self.state = State::Reference;
                    }
                    _ => (),
                },

                State::Reference => match c {
                    b'#' => {
                        self.char_ref_value = 0;
                        self.state = State::CharReference;
                    }
                    b';' => return Err(SaxError::NotSupported(description::REFERENCE_CUSTOM_ENTITY)),
                    _ => {
                        self.ref_buffer.push(c);
                        self.state = State::Entity;
                    }
                },

                State::Entity => match c {
                    b';' => {
                        let Some(ent) = entities::lookup(&self.ref_buffer) else {
                            return Err(SaxError::NotSupported(
                                description::REFERENCE_CUSTOM_ENTITY,
                            ));
                        };
                        let mut buf = [0u8; 4];
                        let ent = ent.encode_utf8(&mut buf);
                        if self.is_value_ref {
                            reserve(&mut self.buffer, ent.as_bytes())?;
                        } else {
                            handler.handle_element(&SaxElement::CData(ent))?;
                        }
                        back = pos + 1;
                        self.state = self.state_after_reference();
                    }
                    _ => {
                        if self.ref_buffer.len() >= REF_BUFFER_SIZE {
                            return Err(SaxError::NotSupported(
                                description::REFERENCE_CUSTOM_ENTITY,
                            ));
                        }
                        self.ref_buffer.push(c);
                    }
                },

                State::CharReference => match c {
                    b'x' => self.state = State::HexCharReference,
                    b'0'..=b'9' => {
                        self.char_ref_value = (c - b'0') as u32;
                        self.state = State::CharReferenceBody;
                    }
                    _ => xml_error!(REFERENCE_INVALID_DECIMAL),
                },

                State::CharReferenceBody | State::HexCharReference => {
                    let radix = if self.state == State::HexCharReference {
                        16
                    } else {
                        10
                    };
                    if c == b';' {
                        self.send_char_ref(handler)?;
                        back = pos + 1;
                        self.state = self.state_after_reference();
                    } else {
                        let Some(digit) = (c as char).to_digit(radix) else {
                            if radix == 16 {
                                xml_error!(REFERENCE_INVALID_HEX);
                            }
                            xml_error!(REFERENCE_INVALID_DECIMAL);
                        };
                        self.char_ref_value = self.char_ref_value * radix + digit;
                        if self.char_ref_value > 0x10ffff {
                            xml_error!(CHAR_INVALID);
                        }
                    }
                }
            }

            if !redo {
                pos += 1;
                self.location.advance(c);
            }
        }

        if back < pos {
            match self.state {
                State::TagName | State::AttributeName | State::AttributeValue => {
                    reserve(&mut self.buffer, &bytes[back..pos])?;
                }
                State::CData | State::CDataSectionBody => {
                    // Kept until the next markup so that a UTF-8 sequence
                    // split between chunks is reported in one piece.
                    reserve(&mut self.text, &bytes[back..pos])?;
                }
                _ => (),
            }
        }

        Ok(())
    }
}

impl Default for SaxParser {
    fn default() -> Self {
        Self::new()
    }
}
