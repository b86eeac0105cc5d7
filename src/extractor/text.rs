use std::collections::VecDeque;
use std::io::{self, BufRead};

use super::file::ReadExtractor;
use crate::etl::{Decision, EtlError, Extractor, Key, Pairs};

/// Splits text into lines, keyed by their position.
///
/// `\n`, `\r\n` and a lone `\r` all end a line. With `skip_empty` set (the
/// default) blank lines are dropped and do not take a position.
#[derive(Debug, Clone, Copy)]
pub struct TextExtractor {
    skip_empty: bool,
}

impl Default for TextExtractor {
    fn default() -> Self {
        TextExtractor { skip_empty: true }
    }
}

impl TextExtractor {
    pub fn new(skip_empty: bool) -> Self {
        TextExtractor { skip_empty }
    }

    pub fn lines(&self, text: &str) -> Vec<String> {
        Lines::new(text.as_bytes())
            .filter_map(Result::ok)
            .filter(|line| !self.skip_empty || !line.is_empty())
            .collect()
    }

    /// Lazily splits a byte stream into lines.
    ///
    /// Nothing is read before the first pair is pulled. Invalid UTF-8 or a
    /// failing reader yields one `Io` error and ends the sequence.
    pub fn read<R: BufRead + 'static>(&self, reader: R) -> Pairs<String> {
        let skip_empty = self.skip_empty;
        let lines = Lines::new(reader)
            .filter(move |line| !(skip_empty && matches!(line, Ok(line) if line.is_empty())));

        Pairs::from_results(
            lines
                .enumerate()
                .map(|(i, line)| -> Result<(Key, String), EtlError> { Ok((Key::Index(i), line?)) }),
        )
    }
}

// Line splitter over a reader. A chunk from `read_line` holds at most one
// `\n`, so a `\r\n` pair never straddles two chunks.
struct Lines<R> {
    reader: R,
    pending: VecDeque<String>,
    // The segment after the last terminator is still owed, even when empty.
    trailing: bool,
    done: bool,
}

impl<R: BufRead> Lines<R> {
    fn new(reader: R) -> Self {
        Lines {
            reader,
            pending: VecDeque::new(),
            trailing: true,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for Lines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                return Some(Ok(line));
            }
            if self.done {
                return None;
            }

            let mut chunk = String::new();
            match self.reader.read_line(&mut chunk) {
                Ok(0) => {
                    self.done = true;
                    if self.trailing {
                        self.pending.push_back(String::new());
                    }
                }
                Ok(_) => {
                    let body = match chunk.strip_suffix('\n') {
                        Some(body) => {
                            self.trailing = true;
                            body.strip_suffix('\r').unwrap_or(body)
                        }
                        None => {
                            self.trailing = false;
                            chunk.as_str()
                        }
                    };
                    self.pending.extend(body.split('\r').map(str::to_string));
                }
                Err(error) => {
                    self.done = true;
                    return Some(Err(error));
                }
            }
        }
    }
}

impl Extractor<String, String> for TextExtractor {
    fn extract(&mut self, input: String, _decision: &mut Decision) -> Result<Option<Pairs<String>>, EtlError> {
        Ok(Some(self.read(io::Cursor::new(input))))
    }
}

impl Extractor<&str, String> for TextExtractor {
    fn extract(&mut self, input: &str, _decision: &mut Decision) -> Result<Option<Pairs<String>>, EtlError> {
        Ok(Some(self.read(io::Cursor::new(input.to_string()))))
    }
}

impl ReadExtractor<String> for TextExtractor {
    fn extract_reader<R: BufRead + 'static>(
        &mut self,
        reader: R,
        _decision: &mut Decision,
    ) -> Result<Option<Pairs<String>>, EtlError> {
        Ok(Some(self.read(reader)))
    }
}
