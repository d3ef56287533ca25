use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, error};

use crate::{
    config::{LEGACY_SCRIPT_PATH_BYTES, LEGACY_SCRIPT_PATH_KEY},
    resolver::{
        error::{AppResult, Error},
        utils::pattern_utils,
    },
};

/// everything the auth stage needs, pulled out of the final embed page.
/// `fields` keeps the whole decoded bundle since the site adds keys over time
#[derive(Debug, Clone)]
pub struct BootstrapBundle {
    pub channel_key: String,
    pub host: String,
    pub script_path: String,
    pub fields: HashMap<String, String>,
}

/// single-byte xor over a fixed sequence, the older pages hide the auth
/// script path this way
pub fn xor_decode(bytes: &[u8], key: u8) -> String {
    bytes.iter().map(|b| (b ^ key) as char).collect()
}

// the older host obfuscation splits the hostname into a quoted js array
fn join_host_array(inner: &str) -> String {
    inner
        .split(',')
        .map(|part| part.trim().trim_matches(|c| c == '"' || c == '\''))
        .collect()
}

/// the bundle is base64 over a json object whose values are each base64 again.
/// a value that won't decode stays raw instead of killing the call, the site
/// mixes plain and wrapped values in the same bundle
pub fn decode_bundle_fields(payload: &str) -> AppResult<HashMap<String, String>> {
    let raw = STANDARD.decode(payload).map_err(|e| {
        error!("bundle payload is not valid base64: {}", e);
        Error::Decode(format!("bundle payload is not valid base64: {}", e))
    })?;

    let parsed: HashMap<String, String> = serde_json::from_slice(&raw).map_err(|e| {
        error!("bundle payload is not a json object: {}", e);
        Error::Decode(format!("bundle payload is not a json object: {}", e))
    })?;

    let mut fields = HashMap::with_capacity(parsed.len());
    for (name, value) in parsed {
        let decoded = STANDARD
            .decode(value.as_bytes())
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok());
        fields.insert(name, decoded.unwrap_or(value));
    }

    Ok(fields)
}

/// pulls the channel key and the encoded bundle out of the final page and
/// resolves host + auth script path, trying the newer in-bundle scheme before
/// the older array/xor one
pub fn decode_bootstrap(html: &str) -> AppResult<BootstrapBundle> {
    let Some(channel_key) = pattern_utils::channel_key(html) else {
        error!("no channel key declaration in the embed page");
        return Err(Error::PatternNotFound("channel key declaration"));
    };

    let Some((bundle_name, payload)) = pattern_utils::bundle_payload(html) else {
        error!("no bundle variable in the embed page");
        return Err(Error::PatternNotFound("bundle variable"));
    };
    debug!("bundle found as '{}' ({} chars)", bundle_name, payload.len());

    let fields = decode_bundle_fields(payload)?;
    debug!(
        "decoded bundle keys: {:?}",
        fields.keys().collect::<Vec<_>>()
    );

    let host = match fields.get("b_host") {
        Some(host) => host.clone(),
        None => {
            let Some(inner) = pattern_utils::host_array(html) else {
                error!("bundle has no host and the page has no host array");
                return Err(Error::PatternNotFound("host array"));
            };
            join_host_array(inner)
        }
    };
    debug!("auth host: {}", host);

    let script_path = match fields.get("b_script") {
        Some(path) => path.clone(),
        None => xor_decode(LEGACY_SCRIPT_PATH_BYTES, LEGACY_SCRIPT_PATH_KEY),
    };
    debug!("auth script path: {}", script_path);

    Ok(BootstrapBundle {
        channel_key: channel_key.to_string(),
        host,
        script_path,
        fields,
    })
}
