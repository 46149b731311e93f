// Copyright 2025 Relalg Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Print sink operator.
//!
//! Formats each input tuple as comma-separated fields terminated by a
//! line feed and writes it to an externally provided byte sink:
//!
//! ```text
//! line := field ( "," field )* LF
//! ```
//!
//! INT64 fields print as decimal digits, CHAR16 fields as their raw bytes
//! with no quoting or escaping. Empty tuples produce no line.

use std::io::Write;

use crate::core::{Register, RegisterType, Result};

use super::operator::Operator;

/// Sink that writes formatted tuples line-by-line.
///
/// Each `advance()` pulls one tuple from the input and writes one line.
/// `output()` is always empty; Print sits at the root of a pipeline and
/// terminates it.
pub struct Print<W: Write> {
    input: Box<dyn Operator>,
    sink: W,
    line: Vec<u8>,
}

impl<W: Write> Print<W> {
    /// Create a print sink over `input`, writing to `sink`.
    pub fn new(input: Box<dyn Operator>, sink: W) -> Self {
        Self {
            input,
            sink,
            line: Vec::new(),
        }
    }

    /// Give back the sink, consuming the operator.
    pub fn into_sink(self) -> W {
        self.sink
    }
}

impl<W: Write> Operator for Print<W> {
    fn open(&mut self) -> Result<()> {
        self.input.open()
    }

    fn advance(&mut self) -> Result<bool> {
        if !self.input.advance()? {
            return Ok(false);
        }

        let regs = self.input.output();
        if regs.is_empty() {
            return Ok(true);
        }

        self.line.clear();
        for (i, reg) in regs.iter().enumerate() {
            if i > 0 {
                self.line.push(b',');
            }
            match reg {
                Register::Int64(v) => write!(self.line, "{}", v)?,
                Register::Char16(s) => self.line.extend_from_slice(s.as_bytes()),
            }
        }
        self.line.push(b'\n');
        self.sink.write_all(&self.line)?;
        Ok(true)
    }

    fn output(&self) -> &[Register] {
        &[]
    }

    fn close(&mut self) -> Result<()> {
        self.input.close()?;
        self.sink.flush()?;
        Ok(())
    }

    fn schema(&self) -> &[RegisterType] {
        &[]
    }

    fn name(&self) -> &str {
        "Print"
    }
}
