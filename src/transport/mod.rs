//! Transport layer: XML wire-format details (serialization/deserialization).

mod account;
mod document;
mod send_sms;

pub use account::{
    decode_authenticate_xml_response, decode_balance_xml_response, decode_credit_xml_response,
    encode_authenticate_xml, encode_balance_xml, encode_credit_xml,
};
pub use document::{DecodeError, pretty_print};
pub use send_sms::{decode_send_sms_xml_response, encode_send_sms_xml};
