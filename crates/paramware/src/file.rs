//! Uploaded file representation for `formData` file fields.

use bytes::Bytes;

/// A file received through a `multipart/form-data` request.
///
/// Fields declared with the file shape and the `formData` channel receive
/// the first uploaded file under their wire name. The content is held in
/// memory, bounded by the schema's aggregate memory ceiling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedFile {
    /// The form field name.
    pub name: Option<String>,
    /// The original file name from the client.
    pub file_name: Option<String>,
    /// The MIME type of the file.
    pub content_type: Option<String>,
    /// The file content as bytes.
    pub data: Bytes,
}

impl UploadedFile {
    /// Creates a new uploaded file.
    #[must_use]
    pub fn new(
        name: Option<String>,
        file_name: Option<String>,
        content_type: Option<String>,
        data: Bytes,
    ) -> Self {
        Self {
            name,
            file_name,
            content_type,
            data,
        }
    }

    /// The file size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the file has no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The file extension from the client-supplied file name.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.file_name
            .as_ref()
            .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext))
    }

    pub(crate) fn is_unset(&self) -> bool {
        self.name.is_none()
            && self.file_name.is_none()
            && self.content_type.is_none()
            && self.data.is_empty()
    }
}
