//! String transformation utilities for code generation

/// Words rendered fully upper-case in Go type names.
const ACRONYMS: &[&str] = &[
    "acl", "api", "aws", "bgp", "cdn", "cidr", "dc", "dns", "gcp", "grpc", "http", "https", "id",
    "ike", "ip", "ipsec", "jwt", "k8s", "lb", "mtls", "nat", "oidc", "saml", "sni", "ssl", "tcp",
    "tls", "ttl", "udp", "uri", "url", "vpc", "vpn", "waf",
];

/// Compound words that F5XC writes as one token but Go names split.
const COMPOUND_WORDS: &[(&str, &str)] = &[
    ("apiendpoint", "APIEndpoint"),
    ("healthcheck", "HealthCheck"),
    ("loadbalancer", "LoadBalancer"),
    ("originpool", "OriginPool"),
    ("ratelimiter", "RateLimiter"),
    ("servicepolicy", "ServicePolicy"),
    ("virtualhost", "VirtualHost"),
    ("virtualnetwork", "VirtualNetwork"),
    ("virtualsite", "VirtualSite"),
];

/// Convert a property or resource name to snake_case.
///
/// Separators (`-`, `.`, space) become `_`, a lower-to-upper transition starts
/// a new word, and runs of `_` collapse.
pub fn to_snake_case(s: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_is_lower = false;

    for ch in s.chars() {
        if ch.is_alphanumeric() {
            if ch.is_uppercase() && prev_is_lower && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.extend(ch.to_lowercase());
            prev_is_lower = ch.is_lowercase() || ch.is_ascii_digit();
        } else {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_is_lower = false;
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words.join("_")
}

/// Convert a snake_case resource name to the Go type name used in generated code.
///
/// Known acronyms are upper-cased and F5XC compound words are split, so
/// `http_loadbalancer` becomes `HTTPLoadBalancer`.
pub fn to_title_case(s: &str) -> String {
    to_snake_case(s)
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            if ACRONYMS.contains(&word) {
                return word.to_uppercase();
            }
            if let Some((_, fixed)) = COMPOUND_WORDS.iter().find(|(w, _)| *w == word) {
                return (*fixed).to_string();
            }
            capitalize(word)
        })
        .collect()
}

/// Naive English plural used for REST collection names (`http_loadbalancer` -> `http_loadbalancers`).
pub fn pluralize(s: &str) -> String {
    if s.ends_with('s') || s.ends_with('x') || s.ends_with("ch") || s.ends_with("sh") {
        format!("{s}es")
    } else if s.ends_with('y') && !s.ends_with("ay") && !s.ends_with("ey") && !s.ends_with("oy") {
        format!("{}ies", &s[..s.len() - 1])
    } else {
        format!("{s}s")
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}
