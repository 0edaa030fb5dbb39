use jobgraph_core::HttpScheme;

/// Uppercases the URL, strips exactly one leading scheme, then strips one
/// leading `WWW.`. Idempotent: normalizing an already-normalized name is a
/// no-op, since the prefixes being stripped are then simply absent.
///
/// The scheme defaults to HTTPS when neither prefix is present — this
/// happens only for candidates Extract never actually produces (its
/// pattern requires `https?://`), kept here so the function stays total.
pub fn normalize(raw: &str) -> (String, HttpScheme) {
    let upper = raw.to_uppercase();

    let (rest, scheme) = if let Some(rest) = upper.strip_prefix("HTTPS://") {
        (rest, HttpScheme::Https)
    } else if let Some(rest) = upper.strip_prefix("HTTP://") {
        (rest, HttpScheme::Http)
    } else {
        (upper.as_str(), HttpScheme::Https)
    };

    let name = rest.strip_prefix("WWW.").unwrap_or(rest).to_string();
    (name, scheme)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scheme_and_www() {
        let (name, scheme) = normalize("https://WWW.Example.com");
        assert_eq!(name, "EXAMPLE.COM");
        assert_eq!(scheme, HttpScheme::Https);
    }

    #[test]
    fn http_scheme_preserved() {
        let (name, scheme) = normalize("http://foo.bar");
        assert_eq!(name, "FOO.BAR");
        assert_eq!(scheme, HttpScheme::Http);
    }

    #[test]
    fn idempotent() {
        let once = normalize("https://www.example.com");
        let twice = normalize(&once.0);
        assert_eq!(once.0, twice.0);
    }

    #[test]
    fn no_www_left_untouched() {
        let (name, _) = normalize("https://foo.bar");
        assert_eq!(name, "FOO.BAR");
    }
}
