//! Status codes usable as type-level response keys.
//!
//! A [`Code`] carries its number in its type, which is how a typed reply is
//! checked against the responses a route declared.

/// Zero-sized status code marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Code<const S: u16>;

impl<const S: u16> Code<S> {
    pub const VALUE: u16 = S;

    #[must_use]
    pub const fn value(self) -> u16 {
        S
    }
}

pub const OK: Code<200> = Code;
pub const CREATED: Code<201> = Code;
pub const ACCEPTED: Code<202> = Code;
pub const NO_CONTENT: Code<204> = Code;
pub const MOVED_PERMANENTLY: Code<301> = Code;
pub const FOUND: Code<302> = Code;
pub const NOT_MODIFIED: Code<304> = Code;
pub const BAD_REQUEST: Code<400> = Code;
pub const UNAUTHORIZED: Code<401> = Code;
pub const FORBIDDEN: Code<403> = Code;
pub const NOT_FOUND: Code<404> = Code;
pub const METHOD_NOT_ALLOWED: Code<405> = Code;
pub const CONFLICT: Code<409> = Code;
pub const UNPROCESSABLE_ENTITY: Code<422> = Code;
pub const TOO_MANY_REQUESTS: Code<429> = Code;
pub const INTERNAL_SERVER_ERROR: Code<500> = Code;
pub const SERVICE_UNAVAILABLE: Code<503> = Code;

/// Reason phrase for the status line.
#[must_use]
pub fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        413 => "Payload Too Large",
        415 => "Unsupported Media Type",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "",
    }
}
