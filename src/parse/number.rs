use ordered_float::OrderedFloat;

use super::Scanner;
use crate::error::ParseError;
use crate::value::Number;

impl Scanner<'_> {
    /// `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`
    pub(super) fn number(&mut self) -> Result<Number, ParseError> {
        let start = self.pos;
        self.eat(b'-');
        match self.peek() {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => self.digits(),
            _ => return Err(self.unexpected("a digit")),
        }

        let mut integral = true;
        if self.eat(b'.') {
            integral = false;
            self.required_digits()?;
        }
        if let Some(b'e' | b'E') = self.peek() {
            integral = false;
            self.pos += 1;
            if let Some(b'+' | b'-') = self.peek() {
                self.pos += 1;
            }
            self.required_digits()?;
        }

        let literal = &self.input[start..self.pos];
        if integral {
            if let Ok(i) = literal.parse::<i64>() {
                return Ok(Number::Int(i));
            }
        }
        // the grammar above is a subset of what f64's parser accepts;
        // literals beyond f64's range come back infinite
        match literal.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Number::Float(OrderedFloat(f))),
            _ => {
                self.pos = start;
                Err(self.unexpected("a number"))
            }
        }
    }

    fn digits(&mut self) {
        while let Some(b'0'..=b'9') = self.peek() {
            self.pos += 1;
        }
    }

    fn required_digits(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            Some(b'0'..=b'9') => {
                self.digits();
                Ok(())
            }
            _ => Err(self.unexpected("a digit")),
        }
    }
}
