//! Byte-addressable view of the profile document
//!
//! The document is the header, one line per profile, then the footer. Reads
//! may start and end anywhere; each byte is located by walking the segments
//! with a running offset. Profile lines are rendered on demand.
//!
//! [`Segment::len`] is the only length computation. Both
//! [`DocumentReader::compute_length`] and [`DocumentReader::read`] go through
//! it, so the advertised file size and the served bytes always agree.

use std::borrow::Cow;

use crate::storage::ProfileRecord;

use super::template::{FOOTER, HEADER, KEY_MASK, LINE_END};

/// One contiguous part of the document.
#[derive(Debug, Clone, Copy)]
enum Segment<'a> {
    Header,
    Entry(&'a ProfileRecord),
    Footer,
}

impl<'a> Segment<'a> {
    fn bytes(&self) -> Cow<'static, [u8]> {
        match self {
            Segment::Header => Cow::Borrowed(HEADER),
            Segment::Entry(record) => Cow::Owned(render_entry(record)),
            Segment::Footer => Cow::Borrowed(FOOTER),
        }
    }

    fn len(&self) -> usize {
        match self {
            Segment::Header => HEADER.len(),
            Segment::Entry(record) => render_entry(record).len(),
            Segment::Footer => FOOTER.len(),
        }
    }
}

/// Renders the document line of a profile: `name, interval, digits, ***`.
///
/// The key is always replaced by the mask.
pub fn render_entry(record: &ProfileRecord) -> Vec<u8> {
    let interval = record.interval().to_string();
    let digits = record.digits().to_string();

    let mut line = Vec::with_capacity(record.name().len() + 16);
    line.extend_from_slice(record.name().as_bytes());
    line.extend_from_slice(b", ");
    line.extend_from_slice(interval.as_bytes());
    line.extend_from_slice(b", ");
    line.extend_from_slice(digits.as_bytes());
    line.extend_from_slice(b", ");
    line.extend_from_slice(KEY_MASK);
    line.extend_from_slice(LINE_END);
    line
}

/// Read view over a profile table.
pub struct DocumentReader<'a> {
    entries: &'a [ProfileRecord],
}

impl<'a> DocumentReader<'a> {
    pub fn new(entries: &'a [ProfileRecord]) -> Self {
        Self { entries }
    }

    fn segments(&self) -> impl Iterator<Item = Segment<'a>> + 'a {
        std::iter::once(Segment::Header)
            .chain(self.entries.iter().map(Segment::Entry))
            .chain(std::iter::once(Segment::Footer))
    }

    /// Total size of the document in bytes.
    pub fn compute_length(&self) -> usize {
        self.segments().map(|segment| segment.len()).sum()
    }

    /// Copies the document bytes starting at `offset` into `buf`.
    ///
    /// Returns the number of bytes copied, which is less than `buf.len()` only
    /// when the window runs past the end of the document. The rest of `buf`
    /// is left untouched.
    pub fn read(&self, offset: usize, buf: &mut [u8]) -> usize {
        let end = offset.saturating_add(buf.len());
        let mut position = offset;
        let mut segment_start = 0usize;

        for segment in self.segments() {
            if position >= end {
                break;
            }

            let segment_len = segment.len();
            let segment_end = segment_start + segment_len;

            if position < segment_end {
                let bytes = segment.bytes();
                let from = position - segment_start;
                let count = (segment_end - position).min(end - position);

                let target = position - offset;
                buf[target..target + count].copy_from_slice(&bytes[from..from + count]);
                position += count;
            }

            segment_start = segment_end;
        }

        position - offset
    }

    /// Renders the whole document.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut document = vec![0u8; self.compute_length()];
        self.read(0, &mut document);
        document
    }
}
