use std::net::IpAddr;

use jobgraph_core::SearchMode;
use serde::Deserialize;

/// Request body accepted by `POST /`. `depth` and `mode` are validated
/// further in `validate_request` — schema-level typing only gets us this far.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub url: String,
    pub depth: i64,
    pub mode: String,
}

pub struct ValidatedSubmission {
    pub url: String,
    pub depth: u32,
    pub mode: SearchMode,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    BadUrl(String),
    BadScheme,
    BadDepth,
    BadMode(String),
    PrivateTarget,
}

impl ValidationError {
    pub fn message(&self) -> String {
        match self {
            ValidationError::BadUrl(e) => format!("invalid url: {e}"),
            ValidationError::BadScheme => "url must use http or https scheme".to_string(),
            ValidationError::BadDepth => "depth must be an integer >= 1".to_string(),
            ValidationError::BadMode(m) => format!("unsupported mode {m:?}"),
            ValidationError::PrivateTarget => {
                "urls pointing to private/loopback/internal hosts are not allowed".to_string()
            }
        }
    }
}

/// Schema + SSRF validation for an inbound submission, grounded on
/// `rootsignal-api::rest::submit::api_submit`'s validation chain: parse,
/// scheme whitelist, then block private/loopback/internal targets before
/// anything in this process makes an outbound request to them.
pub fn validate_request(req: &SubmitRequest) -> Result<ValidatedSubmission, ValidationError> {
    if req.depth < 1 {
        return Err(ValidationError::BadDepth);
    }
    let mode = SearchMode::parse(&req.mode).ok_or_else(|| ValidationError::BadMode(req.mode.clone()))?;

    let parsed = url::Url::parse(&req.url).map_err(|e| ValidationError::BadUrl(e.to_string()))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ValidationError::BadScheme);
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| ValidationError::BadUrl("missing host".into()))?;

    if let Ok(ip) = host.parse::<IpAddr>() {
        if is_private_ip(ip) {
            return Err(ValidationError::PrivateTarget);
        }
    }
    let lower = host.to_lowercase();
    if lower == "localhost" || lower.ends_with(".local") || lower.ends_with(".internal") {
        return Err(ValidationError::PrivateTarget);
    }

    Ok(ValidatedSubmission {
        url: req.url.clone(),
        depth: req.depth as u32,
        mode,
    })
}

fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_link_local()
                || v4.octets()[0] == 10
                || (v4.octets()[0] == 172 && (16..=31).contains(&v4.octets()[1]))
                || (v4.octets()[0] == 192 && v4.octets()[1] == 168)
                || (v4.octets()[0] == 169 && v4.octets()[1] == 254)
        }
        IpAddr::V6(v6) => v6.is_loopback() || (v6.segments()[0] & 0xfe00) == 0xfc00,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(url: &str, depth: i64, mode: &str) -> SubmitRequest {
        SubmitRequest {
            url: url.to_string(),
            depth,
            mode: mode.to_string(),
        }
    }

    #[test]
    fn accepts_plain_https_submission() {
        let v = validate_request(&req("https://example.com", 3, "normal")).unwrap();
        assert_eq!(v.depth, 3);
        assert_eq!(v.mode, SearchMode::Normal);
    }

    #[test]
    fn rejects_loopback_target() {
        assert_eq!(
            validate_request(&req("http://127.0.0.1", 1, "normal")),
            Err(ValidationError::PrivateTarget)
        );
    }

    #[test]
    fn rejects_private_rfc1918_target() {
        assert_eq!(
            validate_request(&req("http://10.0.0.5", 1, "normal")),
            Err(ValidationError::PrivateTarget)
        );
    }

    #[test]
    fn rejects_internal_hostname() {
        assert_eq!(
            validate_request(&req("http://service.internal", 1, "normal")),
            Err(ValidationError::PrivateTarget)
        );
    }

    #[test]
    fn rejects_zero_depth() {
        assert_eq!(
            validate_request(&req("https://example.com", 0, "normal")),
            Err(ValidationError::BadDepth)
        );
    }

    #[test]
    fn rejects_unsupported_mode() {
        assert_eq!(
            validate_request(&req("https://example.com", 1, "wide")),
            Err(ValidationError::BadMode("wide".to_string()))
        );
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert_eq!(
            validate_request(&req("ftp://example.com", 1, "normal")),
            Err(ValidationError::BadScheme)
        );
    }
}
