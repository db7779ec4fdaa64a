// regex extractions over raw response text, one function per thing the site hides in a script
// tag so a markup change breaks exactly one of these
use once_cell::sync::Lazy;
use regex::Regex;

/// body marker the redirect page serves until the link is ready
pub const INVALID_REQUEST_MARKER: &str = "Invalid Request";

static WP_HTTP_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"ck\('_wp_http_\d+','([^']+)'").expect("static regex should compile")
});

static REURL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"var reurl = "([^"]+)""#).expect("static regex should compile"));

static ENCRYPTED_O_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"s\('o','([^']+)'").expect("static regex should compile"));

static HUBCLOUD_DRIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"href="(https://hubcloud\.[^/]+/drive/[^"]+)""#)
        .expect("static regex should compile")
});

static META_REFRESH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<META HTTP-EQUIV="refresh" content="0; url=([^"]+)">"#)
        .expect("static regex should compile")
});

static QUALITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(2160p|1080p|720p|480p)\b").expect("static regex should compile"));

/// the token is split across several `ck('_wp_http_N', '...')` calls, glue them back in order
pub fn collect_wp_http_token(body: &str) -> String {
    WP_HTTP_TOKEN_RE
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

pub fn extract_reurl(body: &str) -> Option<String> {
    first_capture(&REURL_RE, body)
}

pub fn extract_encrypted_o(body: &str) -> Option<String> {
    first_capture(&ENCRYPTED_O_RE, body)
}

pub fn extract_hubcloud_drive_href(body: &str) -> Option<String> {
    first_capture(&HUBCLOUD_DRIVE_RE, body)
}

pub fn extract_meta_refresh(body: &str) -> Option<String> {
    first_capture(&META_REFRESH_RE, body)
}

pub fn extract_quality(text: &str) -> Option<String> {
    first_capture(&QUALITY_RE, text)
}

pub fn is_invalid_request(body: &str) -> bool {
    body.contains(INVALID_REQUEST_MARKER)
}

/// hubdrive pages need the extra button hop before they point anywhere useful
pub fn is_drive_link(link: &str) -> bool {
    link.contains("hubdrive")
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
