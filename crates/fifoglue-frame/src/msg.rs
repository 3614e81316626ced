//! The message type carried by one frame, and its reserved values.

use std::fmt;

use crate::error::{FrameError, Result};

/// Separates header from payload on the wire.
///
/// Headers and endpoint names may not contain it; payloads may.
pub const SEPARATOR: char = '|';

/// Header reserved for the listener shutdown sentinel.
pub const SHUTDOWN_HEADER: &str = "__SHUTDOWN__";

/// A header/payload pair.
///
/// Immutable once constructed. Application messages are built with
/// [`Msg::new`], which rejects headers the wire format cannot carry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Msg {
    header: String,
    payload: String,
}

impl Msg {
    /// Create an application message.
    ///
    /// Fails if `header` contains [`SEPARATOR`] or equals [`SHUTDOWN_HEADER`].
    pub fn new(header: impl Into<String>, payload: impl Into<String>) -> Result<Self> {
        let header = header.into();
        if header.contains(SEPARATOR) {
            return Err(FrameError::InvalidHeader {
                header,
                reason: "header contains the separator",
            });
        }
        if header == SHUTDOWN_HEADER {
            return Err(FrameError::InvalidHeader {
                header,
                reason: "header is reserved for shutdown",
            });
        }
        Ok(Self {
            header,
            payload: payload.into(),
        })
    }

    /// The listener shutdown sentinel.
    pub fn shutdown() -> Self {
        Self {
            header: SHUTDOWN_HEADER.to_string(),
            payload: String::new(),
        }
    }

    pub(crate) fn from_wire(header: String, payload: String) -> Self {
        Self { header, payload }
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Returns true for the shutdown sentinel.
    pub fn is_shutdown(&self) -> bool {
        self.header == SHUTDOWN_HEADER
    }

    /// Length in bytes of `header | payload`, before padding.
    pub fn wire_len(&self) -> usize {
        self.header.len() + SEPARATOR.len_utf8() + self.payload.len()
    }

    pub fn into_parts(self) -> (String, String) {
        (self.header, self.payload)
    }
}

impl fmt::Display for Msg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.header, SEPARATOR, self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_separator_in_header() {
        let err = Msg::new("a|b", "payload").unwrap_err();
        assert!(matches!(err, FrameError::InvalidHeader { .. }));
    }

    #[test]
    fn rejects_reserved_header() {
        let err = Msg::new(SHUTDOWN_HEADER, "").unwrap_err();
        assert!(matches!(err, FrameError::InvalidHeader { .. }));
    }

    #[test]
    fn payload_may_contain_separator() {
        let msg = Msg::new("HEADER", "a|b|c").unwrap();
        assert_eq!(msg.payload(), "a|b|c");
        assert_eq!(msg.to_string(), "HEADER|a|b|c");
        assert_eq!(msg.wire_len(), 12);
    }

    #[test]
    fn into_parts_returns_owned_fields() {
        let (header, payload) = Msg::new("Header", "body|with|bars").unwrap().into_parts();
        assert_eq!(header, "Header");
        assert_eq!(payload, "body|with|bars");
    }

    #[test]
    fn shutdown_sentinel() {
        let msg = Msg::shutdown();
        assert!(msg.is_shutdown());
        assert_eq!(msg.header(), SHUTDOWN_HEADER);
        assert!(!Msg::new("HEADER", "").unwrap().is_shutdown());
    }
}
