//! Cookie header parsing.

use cookie::Cookie;

/// Look up a cookie by name in a `Cookie`-header-style string
/// (`name=value; other=value`).
///
/// Values are percent-decoded; pairs that fail to parse or decode are
/// skipped. The first matching cookie wins.
#[must_use]
pub fn get_cookie(cookies: &str, name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }

    Cookie::split_parse_encoded(cookies)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}
