//! Coarse OS detection from a `User-Agent` header, used to label new passkeys.

/// Returns `(os_name, os_version)`; both are empty when the platform is not recognised.
pub(super) fn os_from_user_agent(user_agent: Option<&str>) -> (String, String) {
    let Some(ua) = user_agent else {
        return (String::new(), String::new());
    };

    let (name, version) = if let Some(v) = after(ua, "iPhone OS ") {
        ("iOS", dotted(v))
    } else if let Some(v) = after(ua, "iPad; CPU OS ") {
        ("iOS", dotted(v))
    } else if let Some(v) = after(ua, "Android ") {
        ("Android", dotted(v))
    } else if ua.contains("CrOS") {
        ("Chrome OS", String::new())
    } else if let Some(v) = after(ua, "Windows NT ") {
        ("Windows", windows_version(&dotted(v)))
    } else if let Some(v) = after(ua, "Mac OS X ") {
        ("macOS", dotted(v))
    } else if ua.contains("Linux") {
        ("Linux", String::new())
    } else {
        ("", String::new())
    };

    (name.to_string(), version)
}

fn after<'a>(haystack: &'a str, marker: &str) -> Option<&'a str> {
    haystack.find(marker).map(|i| &haystack[i + marker.len()..])
}

/// Leading version token with `_` normalised to `.`, e.g. `17_4_1 like` -> `17.4.1`.
fn dotted(s: &str) -> String {
    s.chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '_')
        .map(|c| if c == '_' { '.' } else { c })
        .collect::<String>()
        .trim_end_matches('.')
        .to_string()
}

fn windows_version(nt: &str) -> String {
    match nt {
        "10.0" => "10",
        "6.3" => "8.1",
        "6.2" => "8",
        "6.1" => "7",
        other => other,
    }
    .to_string()
}
