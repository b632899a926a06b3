use std::io::BufRead;

use super::{AlignedBlock, AlignedRow, AlignmentError};

/// Lazy reader for the block-delimited `.loci` format.
///
/// Each row line is `>identifier<whitespace>sequence`. Any line that does not
/// start with `>` closes the block being accumulated; separators with no rows
/// in front of them produce nothing. A trailing block without a separator is
/// still emitted at end of input.
#[derive(Debug)]
pub struct LociReader<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    ordinal: usize,
    done: bool,
}

impl<R: BufRead> LociReader<R> {
    /// Wrap a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            ordinal: 0,
            done: false,
        }
    }

    fn next_block(&mut self) -> Result<Option<AlignedBlock>, AlignmentError> {
        let mut rows: Vec<AlignedRow> = Vec::new();
        let mut defect: Option<String> = None;

        loop {
            self.buf.clear();
            let n = self.reader.read_until(b'\n', &mut self.buf)?;
            if n == 0 {
                self.done = true;
                break;
            }

            if let Some(record) = self.buf.strip_prefix(b">") {
                let parsed = std::str::from_utf8(record).ok().and_then(|record| {
                    let mut fields = record.split_whitespace();
                    fields.next().zip(fields.next())
                });
                match parsed {
                    Some((name, seq)) => rows.push(AlignedRow::new(name, seq.as_bytes())),
                    None => {
                        defect.get_or_insert_with(|| {
                            format!(
                                "unreadable row line: '{}'",
                                String::from_utf8_lossy(self.buf.trim_ascii_end())
                            )
                        });
                    }
                }
            } else if rows.is_empty() && defect.is_none() {
                // separator with nothing before it
                continue;
            } else {
                break;
            }
        }

        if rows.is_empty() && defect.is_none() {
            return Ok(None);
        }

        let ordinal = self.ordinal;
        self.ordinal += 1;
        if let Some(reason) = defect {
            return Err(AlignmentError::MalformedBlock {
                block: ordinal,
                reason,
            });
        }
        AlignedBlock::new(rows, ordinal).map(Some)
    }
}

impl<R: BufRead> Iterator for LociReader<R> {
    type Item = Result<AlignedBlock, AlignmentError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_block() {
            Ok(Some(block)) => Some(Ok(block)),
            Ok(None) => None,
            Err(err) => {
                if !err.is_recoverable() {
                    self.done = true;
                }
                Some(Err(err))
            }
        }
    }
}
