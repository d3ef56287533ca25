use base64::{Engine as _, engine::general_purpose::STANDARD};

use resolvestream::resolver::Error;
use resolvestream::resolver::services::bootstrap_services::{
    decode_bootstrap, decode_bundle_fields, xor_decode,
};

// (name, value, whether the value gets its own base64 wrapping)
fn bundle_payload(fields: &[(&str, &str, bool)]) -> String {
    let inner: Vec<String> = fields
        .iter()
        .map(|(name, value, wrapped)| {
            let value = if *wrapped {
                STANDARD.encode(value)
            } else {
                value.to_string()
            };
            format!(r#""{}":"{}""#, name, value)
        })
        .collect();
    STANDARD.encode(format!("{{{}}}", inner.join(",")))
}

fn embed_page(channel_key: &str, bundle_var: &str, payload: &str) -> String {
    format!(
        r#"<html><script>
const CHANNEL_KEY = "{channel_key}";
const {bundle_var} = "{payload}";
fetchWithRetry('/server_lookup.php?channel_id=', 3);
</script></html>"#
    )
}

#[test]
fn test_newer_generation_bundle_decoding() {
    let payload = bundle_payload(&[
        ("b_host", "https://auth.example", true),
        ("b_script", "/auth.php", true),
        ("b_ts", "1700000000", true),
        ("b_rnd", "42", true),
        ("b_sig", "deadbeef", true),
    ]);
    let html = embed_page("premium99", "XJZ", &payload);

    let bundle = decode_bootstrap(&html).expect("bundle should decode");

    assert_eq!(bundle.channel_key, "premium99");
    assert_eq!(bundle.host, "https://auth.example");
    assert_eq!(bundle.script_path, "/auth.php");
    assert_eq!(bundle.fields.get("b_ts").unwrap(), "1700000000");
    assert_eq!(bundle.fields.get("b_sig").unwrap(), "deadbeef");
}

#[test]
fn test_rotated_bundle_variable_names_are_accepted() {
    let payload = bundle_payload(&[("b_host", "https://auth.example", true)]);

    for name in ["XJZ", "XKZK", "xjz", "xkzk"] {
        let html = embed_page("premium99", name, &payload);
        let bundle = decode_bootstrap(&html).expect("every known variable name should work");
        assert_eq!(bundle.host, "https://auth.example");
    }
}

#[test]
fn test_non_base64_values_are_kept_raw() {
    let payload = bundle_payload(&[
        ("b_host", "https://auth.example", true),
        ("b_rnd", "!!definitely-not-base64!!", false),
    ]);
    let html = embed_page("premium99", "XJZ", &payload);

    let bundle = decode_bootstrap(&html).expect("one bad value must not kill the bundle");

    // the broken value survives untouched, the good one is unwrapped
    assert_eq!(
        bundle.fields.get("b_rnd").unwrap(),
        "!!definitely-not-base64!!"
    );
    assert_eq!(bundle.fields.get("b_host").unwrap(), "https://auth.example");
}

#[test]
fn test_decoding_is_idempotent() {
    let payload = bundle_payload(&[
        ("b_host", "https://auth.example", true),
        ("b_ts", "1700000000", true),
    ]);

    let first = decode_bundle_fields(&payload).expect("decode should work");
    let second = decode_bundle_fields(&payload).expect("decode should work twice");

    assert_eq!(first, second);
}

#[test]
fn test_missing_bundle_variable_fails() {
    let html = r#"<script>const CHANNEL_KEY = "premium99"; const SOMETHING_ELSE = "abc";</script>"#;

    let result = decode_bootstrap(html);

    assert!(matches!(result, Err(Error::PatternNotFound(_))));
}

#[test]
fn test_missing_channel_key_fails() {
    let payload = bundle_payload(&[("b_host", "https://auth.example", true)]);
    let html = format!(r#"<script>const XJZ = "{payload}";</script>"#);

    let result = decode_bootstrap(&html);

    assert!(matches!(result, Err(Error::PatternNotFound(_))));
}

#[test]
fn test_malformed_outer_payload_fails() {
    assert!(matches!(
        decode_bundle_fields("%%%not-base64%%%"),
        Err(Error::Decode(_))
    ));

    // valid base64, but not json underneath
    let not_json = STANDARD.encode("just some text");
    assert!(matches!(
        decode_bundle_fields(&not_json),
        Err(Error::Decode(_))
    ));
}

#[test]
fn test_older_generation_host_array_and_xor_path() {
    // no b_host / b_script in the bundle, so the page-level fallbacks kick in
    let payload = bundle_payload(&[("b_ts", "1700000000", true)]);
    let html = format!(
        r#"<script>
var host = ['https://old', '.example'];
const CHANNEL_KEY = "premium99";
const XKZK = "{payload}";
</script>"#
    );

    let bundle = decode_bootstrap(&html).expect("older layout should decode");

    assert_eq!(bundle.host, "https://old.example");
    assert_eq!(bundle.script_path, "auth.php");
}

#[test]
fn test_host_array_with_double_quotes() {
    let payload = bundle_payload(&[("b_ts", "1700000000", true)]);
    let html = format!(
        r#"<script>
var host = ["https://quoted", ".example"];
const CHANNEL_KEY = "premium99";
const XJZ = "{payload}";
</script>"#
    );

    let bundle = decode_bootstrap(&html).expect("double quoted array should decode");

    assert_eq!(bundle.host, "https://quoted.example");
}

#[test]
fn test_xor_decoding() {
    assert_eq!(xor_decode(&[40, 60, 61], 73), "aut");
    // xor with key 0 is the identity
    assert_eq!(xor_decode(b"plain", 0), "plain");
}
