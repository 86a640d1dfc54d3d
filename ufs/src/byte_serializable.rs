/// Fixed-layout on-disk records. Every implementor documents the byte offset of each field and
/// reads/writes them explicitly so the image format never depends on in-memory layout.
pub trait ByteSerializable {
    type BytesArrayType;

    fn to_bytes(&self) -> Self::BytesArrayType;

    /// Decodes a record from the start of `bytes`, `None` if the buffer is short or the contents
    /// are not a valid record.
    fn from_bytes(bytes: &[u8]) -> Option<Self>
    where
        Self: std::marker::Sized;

    fn generic_bytes_rep(bytes: &Self::BytesArrayType) -> &[u8];

    /// The encoded width of the record.
    fn size() -> usize;

    /// Encode the record into `buf` starting at `offset`. Panics if it does not fit.
    fn write_to(&self, buf: &mut [u8], offset: usize) {
        let raw = self.to_bytes();
        let bytes = Self::generic_bytes_rep(&raw);

        buf[offset..offset + bytes.len()].copy_from_slice(bytes);
    }
}
