//! The triggering HTTP request as seen by a form.
//!
//! Forms never touch process globals: the application hands over the request
//! payload it received, already split into query, body and uploaded files.

use crate::value::{Value, ValueMap};

/// Form submission methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    /// GET method
    Get,
    /// POST method
    #[default]
    Post,
}

impl Method {
    /// Parses a method case-insensitively; anything but `get` is POST.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("get") {
            Self::Get
        } else {
            Self::Post
        }
    }

    /// Returns the lowercase attribute value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upload error code for a successful upload.
pub const UPLOAD_OK: u8 = 0;
/// Upload error code when no file was sent.
pub const UPLOAD_NO_FILE: u8 = 4;

/// A file received in a multipart POST body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Client-side file name.
    pub name: String,
    /// MIME type reported by the client.
    pub mime_type: String,
    /// Where the server stored the file.
    pub tmp_name: String,
    /// Upload error code (0 is success).
    pub error: u8,
    /// Size in bytes.
    pub size: u64,
}

impl UploadedFile {
    /// Creates a successfully uploaded file record.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            tmp_name: String::new(),
            error: UPLOAD_OK,
            size,
        }
    }

    /// Creates a record for a failed upload.
    pub fn failed(error: u8) -> Self {
        Self {
            name: String::new(),
            mime_type: String::new(),
            tmp_name: String::new(),
            error,
            size: 0,
        }
    }

    /// Sets the server-side path.
    #[must_use]
    pub fn tmp_name(mut self, path: impl Into<String>) -> Self {
        self.tmp_name = path.into();
        self
    }

    /// Converts the record into the value exposed to file elements.
    pub fn to_value(&self) -> Value {
        Value::Map(
            ValueMap::new()
                .with("name", self.name.as_str())
                .with("type", self.mime_type.as_str())
                .with("tmp_name", self.tmp_name.as_str())
                .with("error", self.error.to_string())
                .with("size", self.size.to_string()),
        )
    }
}

/// A request payload.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// Request method.
    pub method: Method,
    /// Query string parameters.
    pub query: ValueMap,
    /// Decoded body parameters.
    pub body: ValueMap,
    /// Uploaded files, keyed like body parameters.
    pub files: ValueMap,
}

impl Request {
    /// Creates an empty request.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Creates a GET request.
    pub fn get() -> Self {
        Self::new(Method::Get)
    }

    /// Creates a POST request.
    pub fn post() -> Self {
        Self::new(Method::Post)
    }

    /// Adds a query parameter; bracketed names nest.
    #[must_use]
    pub fn query_param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.query.insert_path(key, value);
        self
    }

    /// Adds a body parameter; bracketed names nest.
    #[must_use]
    pub fn body_param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.body.insert_path(key, value);
        self
    }

    /// Adds an uploaded file.
    #[must_use]
    pub fn file(mut self, key: &str, file: &UploadedFile) -> Self {
        self.files.insert_path(key, file.to_value());
        self
    }

    /// Sets the query from a raw query string.
    #[must_use]
    pub fn query_string(mut self, query: &str) -> Self {
        self.query = Self::parse_query_string(query);
        self
    }

    /// Sets the body from an `application/x-www-form-urlencoded` payload.
    #[must_use]
    pub fn urlencoded_body(mut self, body: &str) -> Self {
        self.body = Self::parse_query_string(body);
        self
    }

    /// Parameters relevant for a form using `method`.
    pub fn payload(&self, method: Method) -> &ValueMap {
        match method {
            Method::Get => &self.query,
            Method::Post => &self.body,
        }
    }

    /// Parses an urlencoded string into nested values.
    ///
    /// `a[b]=1&a[c][]=2&a[c][]=3` gives `{a: {b: 1, c: [2, 3]}}`.
    pub fn parse_query_string(query: &str) -> ValueMap {
        let mut values = ValueMap::new();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let mut parts = pair.splitn(2, '=');
            let Some(key) = parts.next() else {
                continue;
            };
            let value = parts.next().unwrap_or("");
            let key = urlencoding_decode(key);
            if key.is_empty() {
                continue;
            }
            values.insert_path(&key, urlencoding_decode(value));
        }
        values
    }
}

/// Simple URL decoding.
fn urlencoding_decode(s: &str) -> String {
    let mut bytes = Vec::with_capacity(s.len());
    let mut iter = s.bytes();

    while let Some(b) = iter.next() {
        match b {
            b'%' => {
                let hex: Vec<u8> = iter.by_ref().take(2).collect();
                let decoded = std::str::from_utf8(&hex)
                    .ok()
                    .filter(|h| h.len() == 2)
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                match decoded {
                    Some(byte) => bytes.push(byte),
                    None => {
                        bytes.push(b'%');
                        bytes.extend_from_slice(&hex);
                    }
                }
            }
            b'+' => bytes.push(b' '),
            _ => bytes.push(b),
        }
    }

    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!(Method::parse("GET"), Method::Get);
        assert_eq!(Method::parse("post"), Method::Post);
        assert_eq!(Method::parse("PUT"), Method::Post);
    }

    #[test]
    fn test_request_builder() {
        let req = Request::post()
            .body_param("name", "Ann")
            .body_param("tags[]", "a")
            .query_param("page", "1");

        assert_eq!(req.method, Method::Post);
        assert_eq!(req.payload(Method::Post).get_path("name"), Some(&Value::from("Ann")));
        assert_eq!(req.payload(Method::Post).get_path("tags[0]"), Some(&Value::from("a")));
        assert_eq!(req.payload(Method::Get).get_path("page"), Some(&Value::from("1")));
    }

    #[test]
    fn test_query_string_parsing() {
        let query = Request::parse_query_string("name=John+Doe&city=K%C3%B8ge&a[b]=1&a[c][]=2&a[c][]=3");
        assert_eq!(query.get_path("name"), Some(&Value::from("John Doe")));
        assert_eq!(query.get_path("city"), Some(&Value::from("Køge")));
        assert_eq!(query.get_path("a[b]"), Some(&Value::from("1")));
        assert_eq!(query.get_path("a[c][1]"), Some(&Value::from("3")));
    }

    #[test]
    fn test_uploaded_file_value() {
        let file = UploadedFile::new("cv.pdf", "application/pdf", 1024).tmp_name("/tmp/x");
        let value = file.to_value();
        let map = value.as_map().unwrap();
        assert_eq!(map.get("error"), Some(&Value::from("0")));
        assert_eq!(map.get("size"), Some(&Value::from("1024")));
    }
}
