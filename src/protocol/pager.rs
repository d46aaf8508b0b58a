//! Splits an encoded image byte-string into fixed-size pages

/// View of raw image data as a sequence of pages of a given payload size.
pub struct ImagePages<'a> {
    data: &'a [u8],
    page_size: usize,
}

impl<'a> ImagePages<'a> {
    /// Wraps `data` for paging with the given payload size per page.
    pub fn new(data: &'a [u8], page_size: usize) -> Self {
        Self { data, page_size }
    }

    /// Returns the payload of the page with the given index and an
    /// indication whether this is the last page. Indices past the end
    /// yield an empty payload marked last, terminating any send loop.
    pub fn page(&self, index: usize) -> (&'a [u8], bool) {
        let offset = index * self.page_size;
        if offset >= self.data.len() {
            return (&[], true);
        }

        let end = (offset + self.page_size).min(self.data.len());
        (&self.data[offset..end], index == self.page_count() - 1)
    }

    /// Total number of pages.
    pub fn page_count(&self) -> usize {
        self.data.len().div_ceil(self.page_size)
    }

    /// Length of the raw image data in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether there is no data to page at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
