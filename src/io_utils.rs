//! I/O utilities for CSV reading, writing, encoding, and delimiter resolution.
//!
//! Every file pass in csv-inspect goes through this module:
//!
//! - **Delimiter resolution**: extension-based auto-detection (`.tsv` → tab,
//!   anything else → comma) with manual override support.
//! - **Encoding**: input decoding via `encoding_rs`, defaulting to UTF-8.
//!   Outputs are re-encoded with the input's encoding.
//! - **Atomic output**: [`AtomicCsvWriter`] writes into a temporary file next to
//!   the destination and only replaces the destination on [`AtomicCsvWriter::commit`].
//!   Dropping an uncommitted writer deletes the temporary file.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use csv::{QuoteStyle, Terminator};
use encoding_rs::{Encoding, UTF_8};
use log::debug;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

/// Reader/writer settings shared by every pass over a dataset.
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_CSV_DELIMITER,
            encoding: UTF_8,
        }
    }
}

impl ScanOptions {
    /// Resolves options for `path`, honouring explicit overrides first.
    pub fn resolve(path: &Path, delimiter: Option<u8>, encoding: Option<&str>) -> Result<Self> {
        Ok(Self {
            delimiter: resolve_input_delimiter(path, delimiter),
            encoding: resolve_encoding(encoding)?,
        })
    }
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    match label {
        Some(value) => {
            Encoding::for_label(value.trim().as_bytes()).ok_or_else(|| Error::UnknownEncoding {
                label: value.to_string(),
            })
        }
        None => Ok(UTF_8),
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

/// Opens a strict reader over `path`: the header row is consumed separately and
/// every record must have as many fields as the header.
pub fn open_csv_reader(path: &Path, delimiter: u8) -> Result<csv::Reader<BufReader<File>>> {
    let file = File::open(path).map_err(|source| Error::io(path, source))?;
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(false);
    Ok(builder.from_reader(BufReader::new(file)))
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(Error::Decode {
            encoding: encoding.name(),
        })
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

/// Reads and decodes the header row. An empty file yields an empty header.
pub fn reader_headers<R>(
    reader: &mut csv::Reader<R>,
    path: &Path,
    encoding: &'static Encoding,
) -> Result<Vec<String>>
where
    R: io::Read,
{
    let headers = reader
        .byte_headers()
        .map_err(|source| Error::csv(path, source))?
        .clone();
    decode_record(&headers, encoding)
}

/// Iterates decoded data rows of `reader`, attaching `path` to every failure.
pub fn decoded_rows<'r, R>(
    reader: &'r mut csv::Reader<R>,
    path: &'r Path,
    encoding: &'static Encoding,
) -> impl Iterator<Item = Result<Vec<String>>> + 'r
where
    R: io::Read,
{
    reader.byte_records().map(move |record| {
        let record = record.map_err(|source| Error::csv(path, source))?;
        decode_record(&record, encoding)
    })
}

/// CSV writer that stages output in a temporary file beside `destination`.
pub struct AtomicCsvWriter {
    destination: PathBuf,
    writer: csv::Writer<Box<dyn Write>>,
    temp_path: PathBuf,
    temp: NamedTempFile,
}

impl AtomicCsvWriter {
    pub fn create(destination: &Path, options: &ScanOptions) -> Result<Self> {
        let directory = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let temp = NamedTempFile::new_in(directory).map_err(|source| Error::io(directory, source))?;
        let temp_path = temp.path().to_path_buf();
        let handle = temp
            .reopen()
            .map_err(|source| Error::io(&temp_path, source))?;
        let base: Box<dyn Write> = Box::new(BufWriter::new(handle));
        let sink: Box<dyn Write> = if options.encoding == UTF_8 {
            base
        } else {
            Box::new(EncodingWriter::new(base, options.encoding))
        };
        let writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote_style(QuoteStyle::Necessary)
            .double_quote(true)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(sink);
        debug!("Staging output for {destination:?} in {temp_path:?}");
        Ok(Self {
            destination: destination.to_path_buf(),
            writer,
            temp_path,
            temp,
        })
    }

    pub fn write_record<I, T>(&mut self, record: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer
            .write_record(record)
            .map_err(|source| Error::csv(&self.temp_path, source))
    }

    /// Flushes the staged output and replaces the destination with it.
    pub fn commit(self) -> Result<()> {
        let Self {
            destination,
            mut writer,
            temp_path,
            temp,
        } = self;
        writer
            .flush()
            .map_err(|source| Error::io(&temp_path, source))?;
        drop(writer);
        temp.as_file()
            .sync_all()
            .map_err(|source| Error::io(&temp_path, source))?;
        temp.persist(&destination)
            .map_err(|err| Error::io(&destination, err.error))?;
        Ok(())
    }
}

/// Re-encodes UTF-8 output into a target encoding, holding back any trailing
/// partial character until the rest of it arrives.
struct EncodingWriter<W: Write> {
    inner: W,
    encoding: &'static Encoding,
    pending: Vec<u8>,
}

impl<W: Write> EncodingWriter<W> {
    fn new(inner: W, encoding: &'static Encoding) -> Self {
        Self {
            inner,
            encoding,
            pending: Vec::new(),
        }
    }

    fn encode_ready(&mut self) -> io::Result<()> {
        let ready = match std::str::from_utf8(&self.pending) {
            Ok(text) => text.len(),
            Err(err) if err.error_len().is_none() => err.valid_up_to(),
            Err(err) => return Err(io::Error::new(io::ErrorKind::InvalidData, err)),
        };
        if ready == 0 {
            return Ok(());
        }
        let text = std::str::from_utf8(&self.pending[..ready])
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        let (encoded, _, had_errors) = self.encoding.encode(text);
        if had_errors {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Failed to encode text using {}", self.encoding.name()),
            ));
        }
        self.inner.write_all(&encoded)?;
        self.pending.drain(..ready);
        Ok(())
    }
}

impl<W: Write> Write for EncodingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.encode_ready()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.encode_ready()?;
        if !self.pending.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Incomplete UTF-8 sequence at end of output stream",
            ));
        }
        self.inner.flush()
    }
}
