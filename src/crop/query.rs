//! Query-string editing for crop URLs.
//!
//! Image CDNs read directives such as `crop=20:30;10,20` straight from the
//! query string, so directives are encoded with a narrow escape set: `:`,
//! `,` and `*` stay literal while `;`, `&`, `#`, `+` and `|` are escaped.
//! Parameters that are not set pass through untouched, which keeps signed
//! URLs valid. Works on absolute URLs and on plain paths alike.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left unescaped in query keys.
const KEY_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b',');

/// Values additionally keep `=`.
const VALUE_ESCAPES: &AsciiSet = &KEY_ESCAPES.remove(b'=');

/// A URL split into everything before the query, the raw `&`-separated
/// query segments in order, and the fragment.
///
/// Segments are kept byte-for-byte; only the ones written through
/// [`QueryUrl::set`] are re-encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryUrl {
    base: String,
    query: Option<Vec<Segment>>,
    fragment: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Segment {
    raw: String,
    key: Option<String>,
}

impl Segment {
    fn parse(raw: &str) -> Self {
        let key = url::form_urlencoded::parse(raw.as_bytes())
            .next()
            .map(|(key, _)| key.into_owned());
        Self {
            raw: raw.to_string(),
            key,
        }
    }

    fn encoded(key: &str, value: &str) -> Self {
        Self {
            raw: format!(
                "{}={}",
                encode(key, KEY_ESCAPES),
                encode(value, VALUE_ESCAPES)
            ),
            key: Some(key.to_string()),
        }
    }

    fn is(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key)
    }
}

impl QueryUrl {
    pub fn parse(url: &str) -> Self {
        let (rest, fragment) = match url.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_string())),
            None => (url, None),
        };
        let (base, query) = match rest.split_once('?') {
            Some((base, "")) => (base, Some(Vec::new())),
            Some((base, query)) => {
                let segments = query.split('&').map(Segment::parse).collect();
                (base, Some(segments))
            }
            None => (rest, None),
        };
        Self {
            base: base.to_string(),
            query,
            fragment,
        }
    }

    /// Sets `key` to `value`. An existing parameter keeps its position and
    /// any duplicates of it are dropped; a new one is appended.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let segment = Segment::encoded(key, &value.into());
        let segments = self.query.get_or_insert_with(Vec::new);
        match segments.iter().position(|s| s.is(key)) {
            Some(first) => {
                segments[first] = segment;
                let mut index = 0;
                segments.retain(|s| {
                    let keep = index <= first || !s.is(key);
                    index += 1;
                    keep
                });
            }
            None => segments.push(segment),
        }
    }

    /// Decoded value of the first parameter named `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.query
            .iter()
            .flatten()
            .find(|s| s.is(key))
            .and_then(|s| url::form_urlencoded::parse(s.raw.as_bytes()).next())
            .map(|(_, value)| value.into_owned())
    }
}

impl fmt::Display for QueryUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)?;
        if let Some(segments) = &self.query {
            f.write_str("?")?;
            for (index, segment) in segments.iter().enumerate() {
                if index > 0 {
                    f.write_str("&")?;
                }
                f.write_str(&segment.raw)?;
            }
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

fn encode(component: &str, escapes: &'static AsciiSet) -> String {
    utf8_percent_encode(component, escapes)
        .to_string()
        .replace("%20", "+")
}
