use std::str::SplitAsciiWhitespace;

use crate::error::{ConstructError, Result};

use super::Array;

/// Number of whitespace-separated header tokens preceding the samples.
const HEADER_TOKENS: usize = 6;

/// Pull the next whitespace-separated token from `tokens` and parse it.
fn next_value<T: std::str::FromStr>(tokens: &mut SplitAsciiWhitespace<'_>, what: &str) -> Result<T, String> {
    let token = tokens.next().ok_or_else(|| format!("unexpected end of data reading {what}"))?;
    token.parse::<T>().map_err(|_| format!("cannot parse {what} from '{token}'"))
}

impl Array {
    /// Parse `originx originy / cols col_step / rows row_step` and keep the
    /// text around for [`Array::parse`].
    pub(super) fn read_header(&mut self, text: String) -> Result<()> {
        let path = self.path.clone();
        let fail = |message: String| ConstructError::format(path.as_deref(), message);

        let mut tokens = text.split_ascii_whitespace();
        self.origin_x = next_value(&mut tokens, "origin x").map_err(fail)?;
        self.origin_y = next_value(&mut tokens, "origin y").map_err(fail)?;
        self.cols = next_value(&mut tokens, "column count").map_err(fail)?;
        self.col_step = next_value(&mut tokens, "column step").map_err(fail)?;
        self.rows = next_value(&mut tokens, "row count").map_err(fail)?;
        self.row_step = next_value(&mut tokens, "row step").map_err(fail)?;

        if self.cols < 2 || self.rows < 2 {
            return Err(fail(format!("grid must be at least 2x2, got {}x{}", self.cols, self.rows)));
        }
        if !(self.col_step > 0.0 && self.row_step > 0.0 && self.col_step.is_finite() && self.row_step.is_finite()) {
            return Err(fail(format!("grid steps must be positive, got {} / {}", self.col_step, self.row_step)));
        }
        if !(self.origin_x.is_finite() && self.origin_y.is_finite()) {
            return Err(fail(format!("grid origin must be finite, got {} {}", self.origin_x, self.origin_y)));
        }
        if self.cols.checked_mul(self.rows).is_none() {
            return Err(fail(format!("grid of {}x{} samples is too large", self.cols, self.rows)));
        }

        log::debug!("    origin = {} {}", self.origin_x, self.origin_y);
        log::debug!("    cols = {} rows = {}", self.cols, self.rows);
        log::debug!("    col_step = {} row_step = {}", self.col_step, self.row_step);

        self.body = Some(text);
        Ok(())
    }

    /// Parse the full elevation grid into memory.
    pub fn parse(&mut self) -> Result<()> {
        let Some(body) = self.body.take() else {
            // already parsed, or built in memory
            return Ok(());
        };

        let fail = |message: String| ConstructError::format(self.path.as_deref(), message);

        let mut tokens = body.split_ascii_whitespace();
        tokens.by_ref().take(HEADER_TOKENS).for_each(drop);

        // the header dimensions are untrusted, so the grid grows with the body
        let mut data = Vec::new();
        for col in 0..self.cols {
            for row in 0..self.rows {
                let value = next_value::<f64>(&mut tokens, "elevation")
                    .map_err(|e| fail(format!("{e} at [{col}][{row}]")))?;
                if !value.is_finite() {
                    return Err(fail(format!("elevation {value} at [{col}][{row}] is not finite")));
                }
                data.push(value);
            }
        }
        self.data = data;

        log::debug!("    done parsing {} samples", self.data.len());
        Ok(())
    }
}
