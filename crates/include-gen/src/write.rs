use std::io::{self, Write};

use crate::mangle::{basename, mangle};

/// Hex literals emitted per line before a break is inserted.
const BYTES_PER_LINE: usize = 8;

/// The include-guard token wrapping the generated include file.
pub const GUARD_TOKEN: &str = "__INCLUDED_FILES__";

/// Which per-file size declaration the generated include file carries.
///
/// The historical generator existed in two near-identical variants; both
/// output shapes remain selectable through this option.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum HeaderStyle {
    /// Emit a `FILE_<NAME>_SIZE` macro alongside every index macro.
    #[default]
    SizeMacros,

    /// Emit an `extern unsigned char _includedFileNNN[size];` declaration
    /// instead of the size macro.
    ExternArrays,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct GenOptions {
    style: HeaderStyle,
    legacy_final_byte: bool,
}

impl GenOptions {
    pub fn new() -> Self {
        Self {
            style: HeaderStyle::SizeMacros,
            legacy_final_byte: false,
        }
    }

    /// Select the per-file declaration variant used in the include file.
    pub fn header_style(mut self, style: HeaderStyle) -> Self {
        self.style = style;
        self
    }

    /// Reproduce the final-byte quirk of one legacy generator variant.
    ///
    /// That variant read the last hex literal of every array from index 0
    /// instead of the loop cursor. The default emits the actual last byte of
    /// the file; enable this only when byte-exact legacy output is required.
    /// The two modes agree for files of one byte or less.
    pub fn legacy_final_byte(mut self, legacy: bool) -> Self {
        self.legacy_final_byte = legacy;
        self
    }
}

/// Streams the generated source and include artifacts out of a sequence of
/// named byte buffers.
///
/// Files are assigned zero-based indices in the order they are added. Index
/// `N` determines the `_includedFileNNN` array name, the position in the
/// aggregate pointer table and the value of the `FILE_<NAME>` macro, so the
/// numbering stays consistent across both outputs.
///
/// Output is written incrementally: each [`add`] flushes one array block to
/// the source sink and one pair of symbol lines to the include sink, and
/// [`finish`] appends the aggregate table and the include-file footer.
///
/// [`add`]: Generator::add
/// [`finish`]: Generator::finish
pub struct Generator<S, H> {
    options: GenOptions,
    source: S,
    header: H,
    count: usize,
}

impl<S: Write, H: Write> Generator<S, H> {
    /// Create a generator over the two output sinks and write the
    /// include-guard opener.
    pub fn new(options: GenOptions, source: S, mut header: H) -> io::Result<Self> {
        writeln!(header, "#ifndef {GUARD_TOKEN}")?;

        Ok(Self {
            options,
            source,
            header,
            count: 0,
        })
    }

    pub fn options(&self) -> GenOptions {
        self.options
    }

    /// Number of files added so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Emit one embedded file and return the index assigned to it.
    ///
    /// `name` is the display name the symbol is derived from: the basename
    /// is extracted and mangled per [`mangle`]. The byte content is emitted
    /// as comma-separated `0x%02x` literals, eight per line, with no comma
    /// after the final literal. A zero-length `data` produces an array with
    /// an empty body.
    pub fn add(&mut self, name: &str, data: &[u8]) -> io::Result<usize> {
        let index = self.count;
        self.count += 1;

        let symbol = mangle(basename(name));

        write!(
            self.source,
            "\tunsigned char _includedFile{index:03}[{}] = {{\n\t\t",
            data.len()
        )?;
        if let Some((&last, head)) = data.split_last() {
            for (j, byte) in head.iter().enumerate() {
                write!(self.source, "0x{byte:02x}, ")?;
                if (j + 1) % BYTES_PER_LINE == 0 {
                    write!(self.source, "\n\t\t")?;
                }
            }
            let byte = if self.options.legacy_final_byte {
                data[0]
            } else {
                last
            };
            write!(self.source, "0x{byte:02x}")?;
        }
        write!(self.source, "\t}};\n\n")?;

        writeln!(self.header, "\t#define FILE_{symbol}\t{index}")?;
        match self.options.style {
            HeaderStyle::SizeMacros => {
                writeln!(self.header, "\t#define FILE_{symbol}_SIZE\t{}", data.len())?;
            }
            HeaderStyle::ExternArrays => {
                writeln!(
                    self.header,
                    "\textern unsigned char _includedFile{index:03}[{}];",
                    data.len()
                )?;
            }
        }

        Ok(index)
    }

    /// Emit the aggregate pointer table, the include-file footer and close
    /// the include guard, flushing both sinks.
    pub fn finish(mut self) -> io::Result<()> {
        write!(
            self.source,
            "\tunsigned char * _includedFiles[{}] = {{\n",
            self.count
        )?;
        if self.count > 0 {
            // The comma-after-newline placement below matches the historical
            // generator output and is part of the external interface.
            for j in 0..self.count - 1 {
                write!(self.source, "\t\t&_includedFile{j:03}[0]\n,")?;
                if (j + 1) % BYTES_PER_LINE == 0 {
                    write!(self.source, "\n\t\t")?;
                }
            }
            write!(self.source, "\t\t&_includedFile{:03}[0]\n", self.count - 1)?;
        }
        write!(self.source, "\t}};\n\n")?;

        writeln!(
            self.header,
            "\textern unsigned char * _includedFiles[{}];",
            self.count
        )?;
        writeln!(
            self.header,
            "\t#define   INCLUDED_FILES_COUNT    {}",
            self.count
        )?;
        writeln!(self.header, "#endif")?;

        self.source.flush()?;
        self.header.flush()
    }
}
