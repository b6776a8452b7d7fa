//! File upload elements.

use crate::node::NodeData;
use crate::request::{UPLOAD_NO_FILE, UPLOAD_OK};
use crate::value::Value;

/// Upload record received for a file element.
#[derive(Debug, Clone, Default)]
pub struct FileState {
    pub(crate) upload: Option<Value>,
    pub(crate) messages: Vec<(u8, String)>,
}

impl FileState {
    /// The upload error code, if an upload record is present.
    pub fn error_code(&self) -> Option<u8> {
        self.upload
            .as_ref()?
            .as_map()?
            .get("error")?
            .as_str()?
            .parse()
            .ok()
    }

    /// The upload record, which may describe a failed upload.
    pub fn upload(&self) -> Option<&Value> {
        self.upload.as_ref()
    }

    pub(crate) fn raw_value(&self, node: &NodeData) -> Option<Value> {
        if node.is_disabled() || self.error_code() != Some(UPLOAD_OK) {
            return None;
        }
        self.upload.clone()
    }

    /// Error message for a failed upload, `None` for success or no file.
    pub(crate) fn intrinsic_error(&self) -> Option<String> {
        let code = self.error_code()?;
        if code == UPLOAD_OK || code == UPLOAD_NO_FILE {
            return None;
        }
        let custom = self
            .messages
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, m)| m.clone());
        Some(custom.unwrap_or_else(|| upload_error_message(code).to_string()))
    }
}

/// Default message for an upload error code.
pub fn upload_error_message(code: u8) -> &'static str {
    match code {
        1 | 2 => "The uploaded file is too large",
        3 => "The file was only partially uploaded",
        6 => "Missing a temporary folder",
        7 => "Failed to write the file to disk",
        8 => "A server extension stopped the upload",
        _ => "Error uploading the file",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::UploadedFile;

    #[test]
    fn test_error_codes() {
        let mut state = FileState {
            upload: Some(UploadedFile::failed(1).to_value()),
            ..FileState::default()
        };
        assert_eq!(state.error_code(), Some(1));
        assert_eq!(
            state.intrinsic_error().as_deref(),
            Some("The uploaded file is too large")
        );

        state.upload = Some(UploadedFile::failed(UPLOAD_NO_FILE).to_value());
        assert!(state.intrinsic_error().is_none());

        state.messages.push((3, "Try again".to_string()));
        state.upload = Some(UploadedFile::failed(3).to_value());
        assert_eq!(state.intrinsic_error().as_deref(), Some("Try again"));
    }
}
