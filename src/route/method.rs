use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP methods a route can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Head,
    Trace,
}

impl Method {
    pub const ALL: [Method; 8] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
        Method::Options,
        Method::Head,
        Method::Trace,
    ];

    /// Upper-case wire token (`GET`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Head => "HEAD",
            Method::Trace => "TRACE",
        }
    }

    /// Lower-case key used for operations in an OpenAPI path item.
    #[must_use]
    pub fn openapi_key(self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Put => "put",
            Method::Patch => "patch",
            Method::Delete => "delete",
            Method::Options => "options",
            Method::Head => "head",
            Method::Trace => "trace",
        }
    }

    #[must_use]
    pub fn matches(self, method: &http::Method) -> bool {
        method.as_str() == self.as_str()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = String;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        Method::ALL
            .into_iter()
            .find(|m| m.matches(method))
            .ok_or_else(|| format!("unsupported method {method}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_http_method() {
        for m in Method::ALL {
            let http_method = http::Method::from_bytes(m.as_str().as_bytes()).unwrap();
            assert_eq!(Method::try_from(&http_method).unwrap(), m);
        }
        assert!(Method::try_from(&http::Method::CONNECT).is_err());
    }

    #[test]
    fn test_openapi_key_is_lowercase() {
        for m in Method::ALL {
            assert_eq!(m.openapi_key(), m.as_str().to_ascii_lowercase());
        }
    }
}
