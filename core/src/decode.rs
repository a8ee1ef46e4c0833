//! Incremental UTF-8 decoding of response chunks.
//!
//! A multi-byte character may be split across two network chunks. The
//! decoder holds back an incomplete trailing sequence until the next chunk
//! completes it; invalid sequences become U+FFFD.

const REPLACEMENT: char = '\u{FFFD}';

#[derive(Debug, Default)]
pub(crate) struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Decode `chunk` and append the text to `out`.
    pub(crate) fn push(&mut self, chunk: &[u8], out: &mut String) {
        self.pending.extend_from_slice(chunk);

        let mut consumed = 0;
        loop {
            let rest = &self.pending[consumed..];
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    consumed = self.pending.len();
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&rest[..valid]));
                    match err.error_len() {
                        Some(invalid) => {
                            out.push(REPLACEMENT);
                            consumed += valid + invalid;
                        }
                        // Incomplete sequence at the end: wait for more bytes.
                        None => {
                            consumed += valid;
                            break;
                        }
                    }
                }
            }
        }

        self.pending.drain(..consumed);
    }

    /// Flush at end of stream.
    pub(crate) fn finish(self, out: &mut String) {
        if !self.pending.is_empty() {
            out.push(REPLACEMENT);
        }
    }
}
