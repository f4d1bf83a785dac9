use serde::Serialize;

use super::document::{self, DecodeError, EncodeError};
use crate::domain::{
    ApiKey, BatchResult, ClientId, Message, SendBatch, SendResult, SenderId,
};

const REQUEST_ROOT: &str = "Message";
const RESPONSE_ROOT: &str = "Message_Resp";
const SMS_RESP: &str = "SMS_Resp";
const MESSAGE_ID: &str = "MessageID";
const ERR_NO: &str = "ErrNo";
const ERR_DESC: &str = "ErrDesc";
const WRAPPER_ID: &str = "WrapperID";

#[derive(Debug, Serialize)]
struct MessageXml<'a> {
    #[serde(rename = "Key")]
    key: &'a str,
    #[serde(rename = "SMS")]
    sms: Vec<SmsXml<'a>>,
}

// Field order is the element order on the wire.
#[derive(Debug, Serialize)]
struct SmsXml<'a> {
    #[serde(rename = "To")]
    to: &'a str,
    #[serde(rename = "Content")]
    content: &'a str,
    #[serde(rename = "From", skip_serializing_if = "Option::is_none")]
    from: Option<&'a str>,
    #[serde(rename = "ClientID", skip_serializing_if = "Option::is_none")]
    client_id: Option<&'a str>,
    #[serde(rename = "Long")]
    long: u8,
    #[serde(rename = "Truncate")]
    truncate: u8,
    #[serde(
        rename = "InvalidCharAction",
        skip_serializing_if = "Option::is_none"
    )]
    invalid_char_action: Option<u8>,
    #[serde(rename = "WrapperID")]
    wrapper_id: usize,
}

impl<'a> SmsXml<'a> {
    fn new(wrapper_id: usize, message: &'a Message) -> Self {
        let options = message.options();
        Self {
            to: message.to().raw(),
            content: message.content().as_str(),
            from: options.from.as_ref().map(SenderId::as_str),
            client_id: options.client_id.as_ref().map(ClientId::as_str),
            long: u8::from(options.long),
            truncate: u8::from(options.truncate),
            invalid_char_action: options.invalid_char_action.code(),
            wrapper_id,
        }
    }
}

/// Encode a batch as the `sms` request document.
///
/// Each message gets its zero-based position in the batch as `WrapperID`.
pub fn encode_send_sms_xml(key: &ApiKey, batch: &SendBatch) -> Result<String, EncodeError> {
    let request = MessageXml {
        key: key.as_str(),
        sms: batch
            .messages()
            .iter()
            .enumerate()
            .map(|(index, message)| SmsXml::new(index, message))
            .collect(),
    };
    document::to_document(REQUEST_ROOT, &request)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SmsEntry {
    message_id: Option<String>,
    error_code: Option<i32>,
    error_message: Option<String>,
}

/// Decode the `sms` response, matching every entry back to its batch message by
/// `WrapperID`.
///
/// Every message must be answered exactly once; results come back in batch order.
pub fn decode_send_sms_xml_response(
    batch: SendBatch,
    xml: &str,
) -> Result<BatchResult, DecodeError> {
    let root = document::parse_response(xml, RESPONSE_ROOT)?;

    let mut entries = (0..batch.len()).map(|_| None).collect::<Vec<Option<SmsEntry>>>();
    for resp in root.children_named(SMS_RESP) {
        let index = wrapper_index(resp, entries.len())?;
        let slot = &mut entries[index];
        if slot.is_some() {
            return Err(DecodeError::DuplicateWrapperId { index });
        }
        *slot = Some(decode_entry(resp)?);
    }

    let results = batch
        .into_messages()
        .into_iter()
        .zip(entries)
        .enumerate()
        .map(|(index, (message, entry))| {
            let entry = entry.ok_or(DecodeError::MissingResult { index })?;
            Ok(SendResult {
                message,
                message_id: entry.message_id,
                error_code: entry.error_code,
                error_message: entry.error_message,
            })
        })
        .collect::<Result<Vec<SendResult>, DecodeError>>()?;

    Ok(BatchResult::new(results))
}

fn wrapper_index(resp: &document::XmlElement, len: usize) -> Result<usize, DecodeError> {
    let raw = resp
        .child(WRAPPER_ID)
        .ok_or(DecodeError::MissingWrapperId)?
        .text();
    raw.parse::<usize>()
        .ok()
        .filter(|index| *index < len)
        .ok_or_else(|| DecodeError::UnknownWrapperId {
            value: raw.to_owned(),
        })
}

fn decode_entry(resp: &document::XmlElement) -> Result<SmsEntry, DecodeError> {
    let non_empty = |name: &str| {
        resp.child(name)
            .map(|element| element.text())
            .filter(|text| !text.is_empty())
            .map(str::to_owned)
    };

    let error_code = resp
        .child(ERR_NO)
        .map(|element| document::parse_number::<i32>(ERR_NO, element.text()))
        .transpose()?;

    Ok(SmsEntry {
        message_id: non_empty(MESSAGE_ID),
        error_code,
        error_message: non_empty(ERR_DESC),
    })
}
