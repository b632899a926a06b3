use std::io::BufRead;

use super::{AlignedBlock, AlignedRow, AlignmentError};

/// Lazy reader for Multiple Alignment Format (MAF) files.
///
/// Only `a` (block start) and `s` (sequence) lines are interpreted; `i`, `e`
/// and `q` lines as well as `#` comments are skipped. A blank line or the next
/// `a` line closes the current block.
#[derive(Debug)]
pub struct MafReader<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    ordinal: usize,
    pending_start: bool,
    done: bool,
}

impl<R: BufRead> MafReader<R> {
    /// Wrap a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            ordinal: 0,
            pending_start: false,
            done: false,
        }
    }

    fn next_block(&mut self) -> Result<Option<AlignedBlock>, AlignmentError> {
        let mut in_block = std::mem::take(&mut self.pending_start);
        let mut rows: Vec<AlignedRow> = Vec::new();
        let mut defect: Option<String> = None;

        loop {
            self.buf.clear();
            let n = self.reader.read_until(b'\n', &mut self.buf)?;
            if n == 0 {
                self.done = true;
                break;
            }

            let line = self.buf.trim_ascii_end();
            if line.is_empty() {
                if in_block {
                    break;
                }
                continue;
            }

            match line[0] {
                b'#' => continue,
                b'a' => {
                    if in_block {
                        self.pending_start = true;
                        break;
                    }
                    in_block = true;
                }
                b's' if in_block => match std::str::from_utf8(line).ok().and_then(parse_s_line) {
                    Some((src, text)) => rows.push(AlignedRow::new(src, text.as_bytes())),
                    None => {
                        defect.get_or_insert_with(|| {
                            format!(
                                "unparsable sequence line: '{}'",
                                String::from_utf8_lossy(line)
                            )
                        });
                    }
                },
                _ => continue,
            }
        }

        if !in_block {
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

/// Split `s src start size strand srcSize text` into `(src, text)`.
fn parse_s_line(line: &str) -> Option<(&str, &str)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 7 || fields[0] != "s" {
        return None;
    }
    fields[2].parse::<u64>().ok()?;
    fields[3].parse::<u64>().ok()?;
    fields[5].parse::<u64>().ok()?;
    if fields[4] != "+" && fields[4] != "-" {
        return None;
    }
    Some((fields[1], fields[6]))
}

impl<R: BufRead> Iterator for MafReader<R> {
    type Item = Result<AlignedBlock, AlignmentError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done && !self.pending_start {
            return None;
        }
        match self.next_block() {
            Ok(Some(block)) => Some(Ok(block)),
            Ok(None) => None,
            Err(err) => {
                if !err.is_recoverable() {
                    self.done = true;
                    self.pending_start = false;
                }
                Some(Err(err))
            }
        }
    }
}
