use bytes::Bytes;

/// An uploaded document: the original filename plus its raw bytes.
/// Immutable once read from the request; everything downstream borrows it.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub bytes: Bytes,
}

impl Document {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}
