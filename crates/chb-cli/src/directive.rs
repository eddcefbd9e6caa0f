//! Host-configuration directive adapter
//!
//! Converts occurrences of the `config` directive into a configuration
//! overlay merged into the host ahead of construction. Each value token is
//! split on the first `=` with both sides trimmed; a token without `=` is a
//! key with no value. Flag-presence semantics: malformed tokens are never a
//! parse error.

use chb_domain::constants::HOST_CONFIGURATION_DIRECTIVE;
use chb_hosting::ConfigOverlay;

use crate::parse::ParseResult;

/// Split one directive value token into a key/value pair.
pub fn parse_directive_value(token: &str) -> (String, Option<String>) {
    match token.split_once('=') {
        None => (token.trim().to_string(), None),
        Some((key, value)) => (key.trim().to_string(), Some(value.trim().to_string())),
    }
}

/// Overlay built from the host-configuration directive, if the parse result
/// carries one.
pub fn host_configuration_overlay(parse_result: &ParseResult) -> Option<ConfigOverlay> {
    let directive = parse_result.directive(HOST_CONFIGURATION_DIRECTIVE)?;
    let mut overlay = ConfigOverlay::new();
    for token in &directive.values {
        let (key, value) = parse_directive_value(token);
        overlay.push(key, value);
    }
    Some(overlay)
}
