use std::collections::HashMap;

/// Defense reported when the target blocks the request but names nobody
pub const UNKNOWN_DEFENSE: &str = "Unknown WAF (request blocked)";

/// Header fragment -> protective middleware name. First match wins.
const DEFENSE_SIGNATURES: &[(&str, &str)] = &[
    ("cloudflare", "Cloudflare"),
    ("cf-ray", "Cloudflare"),
    ("akamai", "Akamai"),
    ("incapsula", "Imperva Incapsula"),
    ("imperva", "Imperva Incapsula"),
    ("x-iinfo", "Imperva Incapsula"),
    ("sucuri", "Sucuri"),
    ("x-sucuri", "Sucuri"),
    ("mod_security", "ModSecurity"),
    ("modsecurity", "ModSecurity"),
    ("awselb", "AWS WAF"),
    ("x-amzn-waf", "AWS WAF"),
    ("awswaf", "AWS WAF"),
    ("bigip", "F5 BIG-IP"),
    ("big-ip", "F5 BIG-IP"),
    ("barracuda", "Barracuda"),
    ("fortiweb", "FortiWeb"),
    ("wordfence", "Wordfence"),
    ("stackpath", "StackPath"),
    ("fastly", "Fastly"),
];

/// Name the protective layer in front of the target, if any.
///
/// Header names and values are matched case-insensitively against the
/// signature catalog; a bare 403/406 with no named match is reported as an
/// unknown blocking defense.
pub fn detect_defense(headers: &HashMap<String, String>, status: u16) -> Option<String> {
    let mut haystack = String::new();
    for (k, v) in headers {
        haystack.push_str(&k.to_lowercase());
        haystack.push(':');
        haystack.push_str(&v.to_lowercase());
        haystack.push('\n');
    }

    if let Some((_, name)) = DEFENSE_SIGNATURES
        .iter()
        .find(|(fragment, _)| haystack.contains(fragment))
    {
        return Some(name.to_string());
    }

    if status == 403 || status == 406 {
        return Some(UNKNOWN_DEFENSE.to_string());
    }

    None
}
