//! Minimal element tree over quick-xml events.
//!
//! Clockwork is inconsistent about element casing across endpoints (`SMS_Resp` vs
//! `sms_resp`, `ErrNo` vs `errno`), so lookups on this tree ignore ASCII case.

use std::error::Error as StdError;
use std::str::FromStr;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::Event;

use serde::Serialize;

use crate::domain::ApiError;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

const ERR_NO: &str = "ErrNo";
const ERR_DESC: &str = "ErrDesc";

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid XML response: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed XML response: {reason}")]
    Malformed { reason: &'static str },

    #[error("unexpected root element: expected {expected}, found {found}")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
    },

    #[error("response is missing element {element}")]
    MissingElement { element: &'static str },

    #[error("element {element} is not a valid number: {value:?}")]
    InvalidNumber {
        element: &'static str,
        value: String,
    },

    #[error("API error: {0}")]
    Api(ApiError),

    #[error("response entry has no WrapperID")]
    MissingWrapperId,

    #[error("response WrapperID does not match any submitted message: {value:?}")]
    UnknownWrapperId { value: String },

    #[error("response WrapperID {index} appears more than once")]
    DuplicateWrapperId { index: usize },

    #[error("response has no entry for submitted message {index}")]
    MissingResult { index: usize },
}

#[derive(Debug, thiserror::Error)]
#[error("failed to serialize request XML: {0}")]
pub struct EncodeError(#[source] Box<dyn StdError + Send + Sync>);

/// Serialize `value` as a complete document with the given root element.
pub fn to_document<T: Serialize>(root: &str, value: &T) -> Result<String, EncodeError> {
    let body = quick_xml::se::to_string_with_root(root, value)
        .map_err(|err| EncodeError(Box::new(err)))?;
    Ok(format!("{XML_DECLARATION}\n{body}"))
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    name: String,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Text content with surrounding whitespace removed.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.is_named(name))
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |child| child.is_named(name))
    }

    pub fn required_child(&self, name: &'static str) -> Result<&XmlElement, DecodeError> {
        self.child(name)
            .ok_or(DecodeError::MissingElement { element: name })
    }
}

fn element_name(raw: &[u8]) -> Result<String, DecodeError> {
    std::str::from_utf8(raw)
        .map(str::to_owned)
        .map_err(|_| DecodeError::Malformed {
            reason: "element name is not valid UTF-8",
        })
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), DecodeError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => {
            return Err(DecodeError::Malformed {
                reason: "document has more than one root element",
            });
        }
        None => *root = Some(element),
    }
    Ok(())
}

fn push_text(stack: &mut [XmlElement], text: &str) -> Result<(), DecodeError> {
    match stack.last_mut() {
        Some(current) => current.text.push_str(text),
        None if text.trim().is_empty() => {}
        None => {
            return Err(DecodeError::Malformed {
                reason: "text outside of the root element",
            });
        }
    }
    Ok(())
}

/// Parse a whole document into its root element.
pub fn parse_document(xml: &str) -> Result<XmlElement, DecodeError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack = Vec::<XmlElement>::new();
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if root.is_some() && stack.is_empty() {
                    return Err(DecodeError::Malformed {
                        reason: "document has more than one root element",
                    });
                }
                stack.push(XmlElement::new(element_name(start.local_name().as_ref())?));
            }
            Event::Empty(empty) => {
                let element = XmlElement::new(element_name(empty.local_name().as_ref())?);
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or(DecodeError::Malformed {
                    reason: "unbalanced end tag",
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => push_text(&mut stack, &text.unescape()?)?,
            Event::CData(cdata) => {
                let bytes = cdata.into_inner();
                let text = std::str::from_utf8(&bytes).map_err(|_| DecodeError::Malformed {
                    reason: "CDATA section is not valid UTF-8",
                })?;
                push_text(&mut stack, text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(DecodeError::Malformed {
            reason: "document ends inside an open element",
        });
    }

    root.ok_or(DecodeError::Malformed {
        reason: "document has no root element",
    })
}

/// Parse a response document, check its root, and surface a top-level `ErrNo`.
///
/// A top-level error always wins: nothing else in the document is looked at.
pub fn parse_response(xml: &str, expected_root: &'static str) -> Result<XmlElement, DecodeError> {
    let root = parse_document(xml)?;
    if !root.is_named(expected_root) {
        return Err(DecodeError::UnexpectedRoot {
            expected: expected_root,
            found: root.name,
        });
    }
    if let Some(err) = error_from(&root)? {
        return Err(DecodeError::Api(err));
    }
    Ok(root)
}

/// Read an `ErrNo`/`ErrDesc` pair from the direct children of `element`.
pub fn error_from(element: &XmlElement) -> Result<Option<ApiError>, DecodeError> {
    let Some(err_no) = element.child(ERR_NO) else {
        return Ok(None);
    };
    let code = parse_number::<i32>(ERR_NO, err_no.text())?;
    let description = element
        .child(ERR_DESC)
        .map(|desc| desc.text().to_owned())
        .unwrap_or_default();
    Ok(Some(ApiError { code, description }))
}

pub fn parse_number<T: FromStr>(element: &'static str, value: &str) -> Result<T, DecodeError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| DecodeError::InvalidNumber {
            element,
            value: value.to_owned(),
        })
}

/// Re-indent an XML document for logging. Returns `None` when the input is not
/// well-formed.
pub fn pretty_print(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    loop {
        match reader.read_event().ok()? {
            Event::Eof => break,
            event => writer.write_event(event).ok()?,
        }
    }

    String::from_utf8(writer.into_inner()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_and_unescapes_text() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <Root>
          <Item>a &amp; b</Item>
          <Nested><Inner><![CDATA[<raw>]]></Inner></Nested>
          <Empty/>
        </Root>"#;

        let root = parse_document(xml).unwrap();
        assert_eq!(root.name, "Root");
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.child("item").unwrap().text(), "a & b");
        assert_eq!(
            root.child("NESTED").unwrap().child("inner").unwrap().text(),
            "<raw>"
        );
        assert_eq!(root.child("Empty").unwrap().text(), "");
    }

    #[test]
    fn rejects_documents_without_a_single_root() {
        assert!(matches!(
            parse_document(""),
            Err(DecodeError::Malformed { .. })
        ));
        assert!(matches!(
            parse_document("<a/><b/>"),
            Err(DecodeError::Malformed { .. })
        ));
        assert!(matches!(
            parse_document("just text"),
            Err(DecodeError::Malformed { .. })
        ));
    }

    #[test]
    fn rejects_unbalanced_documents() {
        assert!(parse_document("<a><b></a>").is_err());
        assert!(parse_document("<a><b>").is_err());
    }

    #[test]
    fn parse_response_checks_root_case_insensitively() {
        let root = parse_response("<credit_resp><Credit>5</Credit></credit_resp>", "Credit_Resp")
            .unwrap();
        assert_eq!(root.child("credit").unwrap().text(), "5");

        let err = parse_response("<Other/>", "Credit_Resp").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnexpectedRoot {
                expected: "Credit_Resp",
                ..
            }
        ));
    }

    #[test]
    fn parse_response_surfaces_top_level_error() {
        let xml = "<Credit_Resp><errno>2</errno><errdesc>Invalid Login</errdesc><Credit>5</Credit></Credit_Resp>";
        let err = parse_response(xml, "Credit_Resp").unwrap_err();
        match err {
            DecodeError::Api(api) => {
                assert_eq!(api.code, 2);
                assert_eq!(api.description, "Invalid Login");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn error_without_description_has_empty_text() {
        let root = parse_document("<R><ErrNo>7</ErrNo></R>").unwrap();
        let err = error_from(&root).unwrap().unwrap();
        assert_eq!(err.code, 7);
        assert_eq!(err.description, "");
    }

    #[test]
    fn non_numeric_error_code_is_malformed() {
        let root = parse_document("<R><ErrNo>two</ErrNo></R>").unwrap();
        assert!(matches!(
            error_from(&root),
            Err(DecodeError::InvalidNumber {
                element: "ErrNo",
                ..
            })
        ));
    }

    #[test]
    fn pretty_print_indents_well_formed_xml() {
        let pretty = pretty_print("<a><b>1</b></a>").unwrap();
        assert!(pretty.starts_with("<a>"));
        assert!(pretty.contains("\n  <b>1</b>"));
        assert_eq!(pretty_print("<a><b></a>"), None);
    }
}
