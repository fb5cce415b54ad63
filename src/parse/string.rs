use super::Scanner;
use crate::error::{ParseError, ParseErrorKind};

impl Scanner<'_> {
    /// Decode a string literal; the cursor sits on its opening quote.
    pub(super) fn string(&mut self) -> Result<String, ParseError> {
        let opened_at = self.pos;
        self.pos += 1;
        let mut out = String::new();
        loop {
            // copy the longest run that needs no decoding
            let run_start = self.pos;
            while let Some(&b) = self.bytes.get(self.pos) {
                if b == b'"' || b == b'\\' || b < 0x20 {
                    break;
                }
                self.pos += 1;
            }
            out.push_str(&self.input[run_start..self.pos]);

            match self.peek() {
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => self.escape(&mut out, opened_at)?,
                // a line break inside a literal almost always means the closing quote is missing
                None | Some(b'\n' | b'\r') => {
                    return Err(self.error_at(opened_at, ParseErrorKind::UnterminatedString));
                }
                Some(_) => return Err(self.unexpected("an escaped control character")),
            }
        }
    }

    fn escape(&mut self, out: &mut String, opened_at: usize) -> Result<(), ParseError> {
        self.pos += 1;
        let Some(b) = self.peek() else {
            return Err(self.error_at(opened_at, ParseErrorKind::UnterminatedString));
        };
        match b {
            b'"' => out.push('"'),
            b'\\' => out.push('\\'),
            b'/' => out.push('/'),
            b'b' => out.push('\u{0008}'),
            b'f' => out.push('\u{000C}'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'u' => {
                self.pos += 1;
                let unit = self.hex4(opened_at)?;
                let c = self.utf16(unit, opened_at)?;
                out.push(c);
                return Ok(());
            }
            _ => return Err(self.unexpected("a valid escape sequence")),
        }
        self.pos += 1;
        Ok(())
    }

    fn hex4(&mut self, opened_at: usize) -> Result<u32, ParseError> {
        let mut unit = 0;
        for _ in 0..4 {
            let digit = match self.peek() {
                None => return Err(self.error_at(opened_at, ParseErrorKind::UnterminatedString)),
                Some(b) => match char::from(b).to_digit(16) {
                    Some(d) => d,
                    None => return Err(self.unexpected("a hex digit")),
                },
            };
            unit = unit * 16 + digit;
            self.pos += 1;
        }
        Ok(unit)
    }

    /// Turn a UTF-16 code unit (and its low surrogate, when one follows)
    /// into a char. Unpaired surrogates become U+FFFD.
    fn utf16(&mut self, unit: u32, opened_at: usize) -> Result<char, ParseError> {
        match unit {
            0xD800..=0xDBFF => {
                if self.input[self.pos..].starts_with("\\u") {
                    let resume = self.pos;
                    self.pos += 2;
                    let low = self.hex4(opened_at)?;
                    if (0xDC00..=0xDFFF).contains(&low) {
                        let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                        return Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                    }
                    // not a low surrogate: decode the second escape on its own
                    self.pos = resume;
                }
                Ok(char::REPLACEMENT_CHARACTER)
            }
            0xDC00..=0xDFFF => Ok(char::REPLACEMENT_CHARACTER),
            _ => Ok(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER)),
        }
    }
}
