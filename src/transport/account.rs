use serde::Serialize;

use super::document::{self, DecodeError, EncodeError};
use crate::domain::{ApiKey, Balance};

const CREDIT_ROOT: &str = "Credit";
const BALANCE_ROOT: &str = "Balance";
const AUTHENTICATE_ROOT: &str = "Authenticate";

const CREDIT_RESPONSE_ROOT: &str = "Credit_Resp";
const BALANCE_RESPONSE_ROOT: &str = "Balance_Resp";
const AUTHENTICATE_RESPONSE_ROOT: &str = "Authenticate_Resp";

const CREDIT: &str = "Credit";
const BALANCE: &str = "Balance";
const CURRENCY: &str = "Currency";
const SYMBOL: &str = "Symbol";
const CODE: &str = "Code";
const ACCOUNT_TYPE: &str = "AccountType";
const CUST_ID: &str = "CustID";

#[derive(Debug, Serialize)]
struct KeyOnlyXml<'a> {
    #[serde(rename = "Key")]
    key: &'a str,
}

fn encode_key_only_xml(root: &str, key: &ApiKey) -> Result<String, EncodeError> {
    document::to_document(root, &KeyOnlyXml { key: key.as_str() })
}

pub fn encode_credit_xml(key: &ApiKey) -> Result<String, EncodeError> {
    encode_key_only_xml(CREDIT_ROOT, key)
}

pub fn encode_balance_xml(key: &ApiKey) -> Result<String, EncodeError> {
    encode_key_only_xml(BALANCE_ROOT, key)
}

pub fn encode_authenticate_xml(key: &ApiKey) -> Result<String, EncodeError> {
    encode_key_only_xml(AUTHENTICATE_ROOT, key)
}

pub fn decode_credit_xml_response(xml: &str) -> Result<i64, DecodeError> {
    let root = document::parse_response(xml, CREDIT_RESPONSE_ROOT)?;
    let credit = root.required_child(CREDIT)?;
    document::parse_number::<i64>(CREDIT, credit.text())
}

pub fn decode_balance_xml_response(xml: &str) -> Result<Balance, DecodeError> {
    let root = document::parse_response(xml, BALANCE_RESPONSE_ROOT)?;

    let raw = root.required_child(BALANCE)?.text();
    let amount = round_to_cents(raw).ok_or_else(|| DecodeError::InvalidNumber {
        element: BALANCE,
        value: raw.to_owned(),
    })?;

    let currency = root.required_child(CURRENCY)?;
    Ok(Balance {
        symbol: currency.required_child(SYMBOL)?.text().to_owned(),
        amount,
        code: currency.required_child(CODE)?.text().to_owned(),
        account_type: root
            .child(ACCOUNT_TYPE)
            .map(|element| element.text().to_owned()),
    })
}

/// Rounds a plain decimal token (`[+-]digits[.digits]`) to two places, halves away
/// from zero. Works on the digits themselves so `2.675` becomes `2.68`, not the `2.67`
/// its nearest `f64` would give.
fn round_to_cents(raw: &str) -> Option<String> {
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    // Amount in cents: the whole digits followed by exactly two fraction digits.
    let mut digits: Vec<u8> = whole
        .bytes()
        .chain(fraction.bytes().chain(std::iter::repeat(b'0')).take(2))
        .collect();
    if fraction.as_bytes().get(2).is_some_and(|&digit| digit >= b'5') {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let (units, cents) = digits.split_at(digits.len() - 2);
    let units = std::str::from_utf8(units).ok()?.trim_start_matches('0');
    let units = if units.is_empty() { "0" } else { units };
    let cents = std::str::from_utf8(cents).ok()?;
    let sign = if negative && (units != "0" || cents != "00") {
        "-"
    } else {
        ""
    };
    Some(format!("{sign}{units}.{cents}"))
}

/// `true` when Clockwork recognised the key, i.e. the response carries a `CustID`.
pub fn decode_authenticate_xml_response(xml: &str) -> Result<bool, DecodeError> {
    let root = document::parse_response(xml, AUTHENTICATE_RESPONSE_ROOT)?;
    Ok(root.child(CUST_ID).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ApiKey {
        ApiKey::new("test_key").unwrap()
    }

    #[test]
    fn key_only_encoders_use_operation_root() {
        let declaration = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
        for (xml, root) in [
            (encode_credit_xml(&key()).unwrap(), "Credit"),
            (encode_balance_xml(&key()).unwrap(), "Balance"),
            (encode_authenticate_xml(&key()).unwrap(), "Authenticate"),
        ] {
            assert!(xml.starts_with(declaration));
            assert!(
                xml.ends_with(&format!("<{root}><Key>test_key</Key></{root}>")),
                "{xml}"
            );
        }
    }

    #[test]
    fn decode_credit_reads_integer() {
        let xml = "<Credit_Resp><Credit>1500</Credit></Credit_Resp>";
        assert_eq!(decode_credit_xml_response(xml).unwrap(), 1500);

        let lower = "<credit_resp><credit> 7 </credit></credit_resp>";
        assert_eq!(decode_credit_xml_response(lower).unwrap(), 7);
    }

    #[test]
    fn decode_credit_requires_numeric_value() {
        assert!(matches!(
            decode_credit_xml_response("<Credit_Resp/>"),
            Err(DecodeError::MissingElement { element: "Credit" })
        ));
        assert!(matches!(
            decode_credit_xml_response("<Credit_Resp><Credit>lots</Credit></Credit_Resp>"),
            Err(DecodeError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn decode_balance_formats_two_decimals() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <Balance_Resp>
          <AccountType>PAYG</AccountType>
          <Balance>12.5</Balance>
          <Currency><Symbol>£</Symbol><Code>GBP</Code></Currency>
        </Balance_Resp>"#;

        let balance = decode_balance_xml_response(xml).unwrap();
        assert_eq!(
            balance,
            Balance {
                symbol: "£".to_owned(),
                amount: "12.50".to_owned(),
                code: "GBP".to_owned(),
                account_type: Some("PAYG".to_owned()),
            }
        );
    }

    #[test]
    fn decode_balance_rounds_decimal_ties_up() {
        let decode = |amount: &str| {
            let xml = format!(
                "<Balance_Resp><Balance>{amount}</Balance>\
                 <Currency><Symbol>£</Symbol><Code>GBP</Code></Currency></Balance_Resp>"
            );
            decode_balance_xml_response(&xml).unwrap().amount
        };

        assert_eq!(decode("0.125"), "0.13");
        assert_eq!(decode("2.675"), "2.68");
        assert_eq!(decode("1.005"), "1.01");
        assert_eq!(decode("9.995"), "10.00");
        assert_eq!(decode("1.004999"), "1.00");
        assert_eq!(decode("-0.125"), "-0.13");
        assert_eq!(decode("-0.001"), "0.00");
        assert_eq!(decode("0012.3"), "12.30");
        assert_eq!(decode(".5"), "0.50");
        assert_eq!(decode("1234567.891"), "1234567.89");
    }

    #[test]
    fn round_to_cents_rejects_non_decimal_tokens() {
        for raw in ["", ".", "-", "1e3", "1.2.3", "1,5", "NaN", "inf", "- 1"] {
            assert_eq!(round_to_cents(raw), None, "{raw:?}");
        }
    }

    #[test]
    fn decode_balance_without_account_type() {
        let xml = "<Balance_Resp><Balance>3</Balance>\
            <Currency><Code>EUR</Code><Symbol>&#8364;</Symbol></Currency></Balance_Resp>";
        let balance = decode_balance_xml_response(xml).unwrap();
        assert_eq!(balance.amount, "3.00");
        assert_eq!(balance.symbol, "€");
        assert_eq!(balance.code, "EUR");
        assert_eq!(balance.account_type, None);
    }

    #[test]
    fn decode_balance_rejects_missing_or_invalid_fields() {
        assert!(matches!(
            decode_balance_xml_response(
                "<Balance_Resp><Balance>abc</Balance><Currency><Symbol>£</Symbol><Code>GBP</Code></Currency></Balance_Resp>"
            ),
            Err(DecodeError::InvalidNumber { element: "Balance", .. })
        ));
        assert!(matches!(
            decode_balance_xml_response("<Balance_Resp><Balance>1</Balance></Balance_Resp>"),
            Err(DecodeError::MissingElement { element: "Currency" })
        ));
        assert!(matches!(
            decode_balance_xml_response(
                "<Balance_Resp><Balance>1</Balance><Currency><Symbol>£</Symbol></Currency></Balance_Resp>"
            ),
            Err(DecodeError::MissingElement { element: "Code" })
        ));
    }

    #[test]
    fn decode_authenticate_checks_cust_id_presence() {
        let valid = "<Authenticate_Resp><CustID>4321</CustID><AccountName>Acme</AccountName></Authenticate_Resp>";
        assert!(decode_authenticate_xml_response(valid).unwrap());

        let invalid = "<Authenticate_Resp></Authenticate_Resp>";
        assert!(!decode_authenticate_xml_response(invalid).unwrap());
    }

    #[test]
    fn top_level_error_wins_for_every_operation() {
        let check = |result: Result<(), DecodeError>| match result {
            Err(DecodeError::Api(err)) => {
                assert_eq!(err.code, 2);
                assert_eq!(err.description, "Invalid Login");
            }
            other => panic!("unexpected result: {other:?}"),
        };

        check(
            decode_credit_xml_response(
                "<Credit_Resp><ErrNo>2</ErrNo><ErrDesc>Invalid Login</ErrDesc></Credit_Resp>",
            )
            .map(|_| ()),
        );
        check(
            decode_balance_xml_response(
                "<Balance_Resp><ErrNo>2</ErrNo><ErrDesc>Invalid Login</ErrDesc></Balance_Resp>",
            )
            .map(|_| ()),
        );
        check(
            decode_authenticate_xml_response(
                "<Authenticate_Resp><errno>2</errno><errdesc>Invalid Login</errdesc><CustID>1</CustID></Authenticate_Resp>",
            )
            .map(|_| ()),
        );
    }

    #[test]
    fn malformed_documents_are_errors() {
        assert!(decode_credit_xml_response("<Credit_Resp><Credit>1").is_err());
        assert!(decode_balance_xml_response("").is_err());
        assert!(decode_authenticate_xml_response("<<>>").is_err());
        assert!(matches!(
            decode_authenticate_xml_response("<Credit_Resp/>"),
            Err(DecodeError::UnexpectedRoot { .. })
        ));
    }
}
