/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use thiserror::Error;

/// Type of the error which happened during the XML SAX parsing.
///
/// These categories are designed to be as few as possible and correspond to the distinct
/// actions the caller might take based on the problem. The static description tells the
/// details, and the position is available via [location()](super::SaxParser::location).
#[derive(Debug, Eq, PartialEq, Copy, Clone, Error)]
pub enum SaxError {
    /// Parser could not allocate the memory needed for parsing buffers.
    #[error("not enough memory")]
    NoMemory,

    /// A syntax error is encountered in the XML input.
    #[error("invalid xml syntax: {0}")]
    BadXml(&'static str),

    /// A certain XML feature is not supported by the parser.
    ///
    /// Custom entities and document type declarations are refused, since
    /// XMPP streams never carry them and resolving them is a liability.
    #[error("xml construct not supported: {0}")]
    NotSupported(&'static str),

    /// Element handler function returned this error.
    ///
    /// This is intended for caller's handler to be able to abort the processing while
    /// signalling to the caller that the interruption is not caused by the parser itself.
    #[error("error from sax handler")]
    HandlerAbort,
}

pub(crate) mod description {
    pub(crate) const PARSER_REUSE_WITHOUT_RESET: &str =
        "cannot continue after an error without a reset";
    pub(crate) const UTF8_INVALID_CONT_BYTE: &str = "invalid UTF8 continuation byte";
    pub(crate) const UTF8_OVERLONG_SEQUENCE: &str = "overlong UTF8 sequence";
    pub(crate) const UTF8_INVALID_PREFIX_BYTE: &str = "invalid UTF8 prefix byte";
    pub(crate) const UTF8_INVALID_SEQUENCE: &str = "invalid UTF8 sequence";
    pub(crate) const CHAR_INVALID: &str = "invalid XML character";
    pub(crate) const DOC_NO_CONTENT: &str = "document has no root tag";
    pub(crate) const DOC_OPEN_TAGS: &str = "document has unclosed tags";
    pub(crate) const DOC_OPEN_MARKUP: &str = "document epilog has unclosed PI or comment tag";
    pub(crate) const DOC_CDATA_WITHOUT_PARENT: &str =
        "character data not allowed outside of the root tag";
    pub(crate) const TAG_CLOSE_WITHOUT_OPEN: &str = "close tag without open";
    pub(crate) const TAG_WHITESPACE_START: &str = "tag cannot start with whitespace";
    pub(crate) const TAG_OUTSIDE_ROOT: &str = "tags cannot be outside of the root tag";
    pub(crate) const TAG_EMPTY_NAME: &str = "tag has no name";
    pub(crate) const TAG_BAD_NAME: &str = "tag name contains an invalid character";
    pub(crate) const TAG_DOUBLE_END: &str = "end tag has standalone ending too";
    pub(crate) const TAG_END_TAG_ATTRIBUTES: &str = "end tag cannot have attributes";
    pub(crate) const TAG_EMPTY_TAG_MISSING_END: &str = "empty element tags must end after the '/'";
    pub(crate) const TAG_ATTRIBUTE_WITHOUT_EQUAL: &str =
        "tag attributes must have '=' before the value";
    pub(crate) const TAG_ATTRIBUTE_WITHOUT_QUOTE: &str =
        "tag attribute value must be double or single quotes";
    pub(crate) const TAG_ATTRIBUTE_BAD_NAME: &str =
        "tag attribute names cannot be empty or have '/', '<' or '>'";
    pub(crate) const TAG_ATTRIBUTE_BAD_VALUE: &str =
        "tag value cannot have '<' character without a reference";
    pub(crate) const REFERENCE_INVALID_DECIMAL: &str = "non digit in decimal character reference";
    pub(crate) const REFERENCE_INVALID_HEX: &str = "non hex digit in hexadecimal character reference";
    pub(crate) const REFERENCE_CUSTOM_ENTITY: &str =
        "non-predefined entity references are not supported";
    pub(crate) const COMMENT_MISSING_DASH: &str = "comment tag should start with double dash";
    pub(crate) const COMMENT_MISSING_END: &str = "comment tag should end after double dash";
    pub(crate) const MARKUP_CDATA_SECTION_BAD_START: &str =
        "character data sections must start with '[CDATA['";
    pub(crate) const MARKUP_CDATA_SECTION_OUTSIDE_ROOT: &str =
        "character data sections cannot be outside of the root tag";
    pub(crate) const MARKUP_UNRECOGNIZED: &str =
        "markup is not a comment or a character data section";
    pub(crate) const DOCTYPE_NOT_SUPPORTED: &str = "document type declarations are not supported";
    pub(crate) const TAG_MISMATCH: &str = "end tag does not match the open start tag";
    pub(crate) const NAMESPACE_UNDECLARED_PREFIX: &str = "namespace prefix is not declared";
    pub(crate) const NAMESPACE_BAD_DECLARATION: &str = "namespace prefix cannot be bound to empty value";
}
