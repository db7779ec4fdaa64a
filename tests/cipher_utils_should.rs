use hubproxy::server::utils::cipher_utils::{
    CipherError, decode_layered, decode_simple, encode_layered, encode_simple, rotate13,
    try_decode_layered,
};
use serde_json::json;

#[test]
fn test_rotate13_is_its_own_inverse() {
    let printable: String = (0x20u8..=0x7e).map(char::from).collect();

    assert_eq!(rotate13(&rotate13(&printable)), printable);
}

#[test]
fn test_rotate13_only_touches_letters() {
    assert_eq!(rotate13("Hello, World! 123"), "Uryyb, Jbeyq! 123");
    assert_eq!(rotate13("nopqrstuvwxyzabcdefghijklm"), "abcdefghijklmnopqrstuvwxyz");
    assert_eq!(rotate13("=+/"), "=+/");
}

#[test]
fn test_layered_round_trip_keeps_nested_values() {
    let value = json!({
        "data": "c29tZS10b2tlbg",
        "wp_http1": "https://blog.example/safe",
        "total_time": 7,
        "nested": { "list": [1, "two", { "three": null }], "flag": true }
    });

    let decoded = decode_layered(&encode_layered(&value)).expect("fixture should decode");

    assert_eq!(decoded.into_value(), value);
}

#[test]
fn test_layered_decode_rejects_garbage() {
    assert!(decode_layered("not base64 at all!!").is_none());
    assert!(decode_layered("").is_none());

    // valid at every base64 stage, but the rot13 stage is skipped so the last one is junk
    let skipped_rotation = encode_simple(&encode_simple(&encode_simple("{\"a\":1}")));
    assert!(decode_layered(&skipped_rotation).is_none());
}

#[test]
fn test_layered_decode_wants_an_object() {
    let encoded = encode_layered(&json!([1, 2, 3]));

    assert!(matches!(
        try_decode_layered(&encoded),
        Err(CipherError::NotAnObject)
    ));
}

#[test]
fn test_payload_key_access() {
    let payload = decode_layered(&encode_layered(&json!({
        "o": "aHR0cHM6Ly9leGFtcGxlLmNvbQ==",
        "total_time": "12",
        "count": 4
    })))
    .expect("fixture should decode");

    assert_eq!(payload.require_str("o").ok(), Some("aHR0cHM6Ly9leGFtcGxlLmNvbQ=="));
    assert!(matches!(
        payload.require_str("missing"),
        Err(CipherError::MissingKey(key)) if key == "missing"
    ));
    assert_eq!(payload.get_u64("total_time"), Some(12));
    assert_eq!(payload.get_u64("count"), Some(4));
    assert_eq!(payload.get_u64("o"), None);
}

#[test]
fn test_simple_encoding() {
    assert_eq!(encode_simple("abc123"), "YWJjMTIz");
    assert_eq!(decode_simple("YWJjMTIz").ok().as_deref(), Some("abc123"));
    assert!(decode_simple("%%%").is_err());
}
