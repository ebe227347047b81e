//! VCD Trace Output.
//!
//! Writes a value change dump of named ports. It provides:
//! 1. **Header:** Timescale, one `$var` per port, and the identifier codes.
//! 2. **Changes:** One timestamp per sampled cycle followed by the ports whose value changed.
//!    Scalars are dumped as `0!`/`1!`, vectors as `b1010 !`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::common::bits::mask;
use crate::common::error::SimError;

/// First printable identifier character.
const ID_FIRST: u8 = b'!';

/// Number of printable identifier characters (`!` to `~`).
const ID_RADIX: usize = 94;

/// A traced port.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Port {
    name: &'static str,
    width: u32,
    id: String,
}

/// Identifier code of the `n`-th port.
fn id_code(mut n: usize) -> String {
    let mut id = String::new();
    loop {
        id.push(char::from(ID_FIRST + (n % ID_RADIX) as u8));
        n /= ID_RADIX;
        if n == 0 {
            return id;
        }
        n -= 1;
    }
}

/// Value change dump writer.
#[derive(Debug)]
pub struct VcdWriter<W: Write> {
    out: W,
    ports: Vec<Port>,
    last: Vec<Option<u64>>,
}

impl VcdWriter<BufWriter<File>> {
    /// Creates a trace file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be created or written.
    pub fn create(
        path: impl AsRef<Path>,
        scope: &str,
        ports: &[(&'static str, u32)],
    ) -> Result<Self, SimError> {
        Self::new(BufWriter::new(File::create(path)?), scope, ports)
    }
}

impl<W: Write> VcdWriter<W> {
    /// Writes the header for `ports` (name, width in bits) under module `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if writing fails.
    pub fn new(mut out: W, scope: &str, ports: &[(&'static str, u32)]) -> Result<Self, SimError> {
        let ports: Vec<Port> = ports
            .iter()
            .enumerate()
            .map(|(n, &(name, width))| Port {
                name,
                width: width.clamp(1, 64),
                id: id_code(n),
            })
            .collect();

        writeln!(out, "$timescale 1ns $end")?;
        writeln!(out, "$scope module {scope} $end")?;
        for p in &ports {
            writeln!(out, "$var wire {} {} {} $end", p.width, p.id, p.name)?;
        }
        writeln!(out, "$upscope $end")?;
        writeln!(out, "$enddefinitions $end")?;

        Ok(Self {
            out,
            last: vec![None; ports.len()],
            ports,
        })
    }

    /// Number of traced ports.
    pub fn width(&self) -> usize {
        self.ports.len()
    }

    /// Records the port values at `time`; `values` follows the header order.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if `values` does not match the port list, and
    /// [`SimError::Io`] if writing fails.
    pub fn sample(&mut self, time: u64, values: &[u64]) -> Result<(), SimError> {
        if values.len() != self.ports.len() {
            return Err(SimError::Config(format!(
                "trace sample has {} values for {} ports",
                values.len(),
                self.ports.len()
            )));
        }
        let mut stamped = false;
        for ((port, last), &raw) in self.ports.iter().zip(&mut self.last).zip(values) {
            let value = raw & mask(port.width);
            if *last == Some(value) {
                continue;
            }
            if !stamped {
                writeln!(self.out, "#{time}")?;
                stamped = true;
            }
            if port.width == 1 {
                writeln!(self.out, "{value}{}", port.id)?;
            } else {
                writeln!(self.out, "b{value:b} {}", port.id)?;
            }
            *last = Some(value);
        }
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if flushing fails.
    pub fn finish(mut self) -> Result<W, SimError> {
        self.out.flush()?;
        Ok(self.out)
    }
}
