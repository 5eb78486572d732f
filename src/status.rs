//! HTTP reason phrases.
//!
//! The execution context falls back to the reason phrase when a handler
//! produces a bare status code with no body (`halt(401)` → `"Unauthorized"`).
//! The table covers every IANA-registered code; anything else returns `None`
//! and the normalizer treats that as a programming error.

/// Returns the IANA reason phrase for `code`, or `None` for an unregistered
/// status code.
pub fn reason_phrase(code: u16) -> Option<&'static str> {
    let phrase = match code {
        100 => "Continue",
        101 => "Switching Protocols",
        102 => "Processing",
        103 => "Early Hints",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        207 => "Multi-Status",
        208 => "Already Reported",
        226 => "IM Used",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Content Too Large",
        414 => "URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Range Not Satisfiable",
        417 => "Expectation Failed",
        418 => "I'm a Teapot",
        421 => "Misdirected Request",
        422 => "Unprocessable Content",
        423 => "Locked",
        424 => "Failed Dependency",
        425 => "Too Early",
        426 => "Upgrade Required",
        428 => "Precondition Required",
        429 => "Too Many Requests",
        431 => "Request Header Fields Too Large",
        451 => "Unavailable For Legal Reasons",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        506 => "Variant Also Negotiates",
        507 => "Insufficient Storage",
        508 => "Loop Detected",
        510 => "Not Extended",
        511 => "Network Authentication Required",
        _ => return None,
    };
    Some(phrase)
}

/// Like [`reason_phrase`], but a missing phrase is fatal.
///
/// Used where a default body must come from the table — a handler passing an
/// unregistered code without an explicit body is a bug in the handler, and
/// silently sending an empty body would hide it.
pub(crate) fn reason_phrase_or_panic(code: u16) -> &'static str {
    reason_phrase(code)
        .unwrap_or_else(|| panic!("no reason phrase for status {code}; provide an explicit body"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_codes_resolve() {
        assert_eq!(reason_phrase(200), Some("OK"));
        assert_eq!(reason_phrase(301), Some("Moved Permanently"));
        assert_eq!(reason_phrase(418), Some("I'm a Teapot"));
    }

    #[test]
    fn unregistered_codes_do_not() {
        assert_eq!(reason_phrase(599), None);
        assert_eq!(reason_phrase(299), None);
    }

    #[test]
    #[should_panic(expected = "no reason phrase for status 599")]
    fn missing_phrase_is_fatal() {
        reason_phrase_or_panic(599);
    }
}
