use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::record::{AcctError, AcctRecord, ACCT_RECORD_SIZE, VERSION_OFFSET};

/// Sequential reader over the fixed-size records of an accounting file.
///
/// Yields one decoded record per 64-byte chunk. The sequence is not
/// restartable and stops for good at the first error: a short trailing
/// chunk or an unknown version means the rest of the file cannot be
/// trusted to align, so no skip-and-continue is attempted.
pub struct AcctReader<R: Read> {
    source: R,
    done: bool,
}

impl AcctReader<File> {
    pub fn open(path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: Read> AcctReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            done: false,
        }
    }

    /// Read exactly one record-sized chunk, looping over short reads.
    /// `Ok(None)` is a clean end of stream at a record boundary.
    fn next_chunk(&mut self) -> Result<Option<[u8; ACCT_RECORD_SIZE]>, AcctError> {
        let mut buf = [0u8; ACCT_RECORD_SIZE];
        let mut filled = 0;
        while filled < ACCT_RECORD_SIZE {
            let n = self.source.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        match filled {
            0 => Ok(None),
            ACCT_RECORD_SIZE => Ok(Some(buf)),
            got => Err(AcctError::TruncatedRecord { got }),
        }
    }
}

impl<R: Read> Iterator for AcctReader<R> {
    type Item = Result<AcctRecord, AcctError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_chunk() {
            Ok(Some(buf)) => match AcctRecord::decode(&buf) {
                Ok(rec) => Some(Ok(rec)),
                Err(e) => {
                    self.done = true;
                    Some(Err(e))
                }
            },
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Peek at the format version byte of the first record in a file
/// without decoding it. `Ok(None)` means the file holds no records.
pub fn file_version(path: &Path) -> Result<Option<u8>, AcctError> {
    let mut reader = AcctReader::new(File::open(path)?);
    Ok(reader.next_chunk()?.map(|buf| buf[VERSION_OFFSET]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::testutil::{sample_fields, v3_buffer};
    use std::io::Write;

    #[test]
    fn empty_source_ends_cleanly() {
        let mut reader = AcctReader::new(&[] as &[u8]);
        assert!(reader.next().is_none());
        // and stays finished
        assert!(reader.next().is_none());
    }

    #[test]
    fn yields_every_complete_record() {
        let fields = sample_fields();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&v3_buffer(&fields, 10.0));
        bytes.extend_from_slice(&v3_buffer(&fields, 20.0));
        let records: Vec<_> = AcctReader::new(bytes.as_slice())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].etime, 10);
        assert_eq!(records[1].etime, 20);
    }

    #[test]
    fn short_trailing_chunk_is_truncation_not_eof() {
        let fields = sample_fields();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&v3_buffer(&fields, 10.0));
        bytes.extend_from_slice(&[0u8; 10]);
        let mut reader = AcctReader::new(bytes.as_slice());
        assert!(reader.next().unwrap().is_ok());
        match reader.next() {
            Some(Err(AcctError::TruncatedRecord { got: 10 })) => {}
            other => panic!("expected TruncatedRecord, got {:?}", other),
        }
        // Fused after the error
        assert!(reader.next().is_none());
    }

    #[test]
    fn lone_partial_record_is_truncation() {
        let mut reader = AcctReader::new(&[1u8, 2, 3][..]);
        assert!(matches!(
            reader.next(),
            Some(Err(AcctError::TruncatedRecord { got: 3 }))
        ));
    }

    #[test]
    fn unknown_version_stops_the_stream() {
        let fields = sample_fields();
        let mut bad = v3_buffer(&fields, 10.0);
        bad[1] = 4;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&bad);
        bytes.extend_from_slice(&v3_buffer(&fields, 20.0));
        let mut reader = AcctReader::new(bytes.as_slice());
        assert!(matches!(
            reader.next(),
            Some(Err(AcctError::UnsupportedVersion(4)))
        ));
        // The valid record behind it is never reached
        assert!(reader.next().is_none());
    }

    /// A reader that hands out a few bytes at a time, the way a pipe
    /// or a slow file might.
    struct Dribble<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Dribble<'_> {
        fn read(&mut self, out: &mut [u8]) -> std::io::Result<usize> {
            let n = self.step.min(self.data.len()).min(out.len());
            out[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn reassembles_records_from_short_reads() {
        let fields = sample_fields();
        let bytes = v3_buffer(&fields, 42.0);
        let mut reader = AcctReader::new(Dribble {
            data: &bytes,
            step: 7,
        });
        let rec = reader.next().unwrap().unwrap();
        assert_eq!(rec.etime, 42);
        assert!(reader.next().is_none());
    }

    #[test]
    fn reads_records_from_a_real_file() {
        let fields = sample_fields();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&v3_buffer(&fields, 360.0)).unwrap();
        file.write_all(&v3_buffer(&fields, 720.0)).unwrap();
        file.flush().unwrap();

        let records: Vec<_> = AcctReader::open(file.path())
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].comm, "sleep");

        assert_eq!(file_version(file.path()).unwrap(), Some(3));
    }

    #[test]
    fn file_version_of_empty_file_is_none() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(file_version(file.path()).unwrap(), None);
    }
}
