//! newc cpio encoding and decoding.
//!
//! Only the "new ASCII" layout is supported: a 110 byte header of thirteen
//! eight-digit hex fields after the `070701` magic, the NUL terminated
//! name, then the data, each padded to a four byte boundary. See `man 5
//! cpio` and the kernel's early-userspace buffer format notes.

use std::io;
use std::io::Read;
use std::io::Write;

use tracing::debug;

use crate::MetatarError;
use crate::Result;
use crate::formats::traits::ArchiveSink;
use crate::formats::traits::EntryHeader;
use crate::types::EntryKind;

/// Fixed header size of a newc record.
pub const HEADER_SIZE: usize = 110;
const MAGIC_NEWC: &[u8] = b"070701";
const MAGIC_CRC: &[u8] = b"070702";
const TRAILER: &str = "TRAILER!!!";

const TYPE_MASK: u32 = 0o170_000;
const TYPE_SOCKET: u32 = 0o140_000;
const TYPE_SYMLINK: u32 = 0o120_000;
const TYPE_REGULAR: u32 = 0o100_000;
const TYPE_BLOCK: u32 = 0o060_000;
const TYPE_DIR: u32 = 0o040_000;
const TYPE_CHAR: u32 = 0o020_000;
const TYPE_FIFO: u32 = 0o010_000;

/// Header of one cpio record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpioHeader {
    /// Member name as stored, without the terminating NUL.
    pub name: String,
    /// Inode number.
    pub ino: u32,
    /// File type bits and permission bits.
    pub mode: u32,
    /// Numeric owner.
    pub uid: u32,
    /// Numeric group.
    pub gid: u32,
    /// Link count.
    pub nlink: u32,
    /// Modification time, seconds since the epoch.
    pub mtime: u32,
    /// Data length. Ignored by the writer, which uses the data it is given.
    pub size: u32,
    /// Device major number of a device node.
    pub rdev_major: u32,
    /// Device minor number of a device node.
    pub rdev_minor: u32,
}

impl CpioHeader {
    /// Returns the permission bits without the file type.
    #[must_use]
    pub const fn permissions(&self) -> u32 {
        self.mode & !TYPE_MASK
    }

    /// Returns the entry kind, or `None` for sockets and unknown types.
    #[must_use]
    pub const fn kind(&self) -> Option<EntryKind> {
        match self.mode & TYPE_MASK {
            TYPE_SYMLINK => Some(EntryKind::Symlink),
            TYPE_REGULAR => Some(EntryKind::Regular),
            TYPE_BLOCK => Some(EntryKind::BlockDevice),
            TYPE_DIR => Some(EntryKind::Directory),
            TYPE_CHAR => Some(EntryKind::CharDevice),
            TYPE_FIFO => Some(EntryKind::Fifo),
            _ => None,
        }
    }

    /// Returns a human-readable name of the file type.
    #[must_use]
    pub fn type_name(&self) -> String {
        match (self.mode & TYPE_MASK, self.kind()) {
            (TYPE_SOCKET, _) => "socket file".to_string(),
            (_, Some(kind)) => kind.to_string(),
            (bits, None) => bits.to_string(),
        }
    }
}

/// Returns the newc file type bits for a kind, if cpio can store it.
#[must_use]
pub const fn type_bits(kind: EntryKind) -> Option<u32> {
    match kind {
        EntryKind::Regular | EntryKind::RegularA => Some(TYPE_REGULAR),
        EntryKind::Symlink => Some(TYPE_SYMLINK),
        EntryKind::CharDevice => Some(TYPE_CHAR),
        EntryKind::BlockDevice => Some(TYPE_BLOCK),
        EntryKind::Directory => Some(TYPE_DIR),
        EntryKind::Fifo => Some(TYPE_FIFO),
        _ => None,
    }
}

const fn padding(len: usize) -> usize {
    (4 - (len % 4)) % 4
}

/// Streaming newc writer.
pub struct CpioWriter<W: Write> {
    writer: W,
}

impl<W: Write> CpioWriter<W> {
    /// Wraps a writer.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one record with the given data.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is longer than a newc size field can
    /// express or the underlying writer fails.
    pub fn append(&mut self, header: &CpioHeader, data: &[u8]) -> io::Result<()> {
        let size = u32::try_from(data.len()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{}: body too large for cpio", header.name),
            )
        })?;
        let mut name = Vec::with_capacity(header.name.len() + 1);
        name.extend_from_slice(header.name.as_bytes());
        name.push(0);
        let namesize = u32::try_from(name.len()).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "cpio member name too long")
        })?;

        let mut record = Vec::with_capacity(HEADER_SIZE + name.len() + data.len() + 6);
        record.extend_from_slice(MAGIC_NEWC);
        for field in [
            header.ino,
            header.mode,
            header.uid,
            header.gid,
            header.nlink,
            header.mtime,
            size,
            0, // devmajor
            0, // devminor
            header.rdev_major,
            header.rdev_minor,
            namesize,
            0, // check, unused by newc
        ] {
            record.extend_from_slice(format!("{field:08x}").as_bytes());
        }
        record.extend_from_slice(&name);
        record.resize(record.len() + padding(HEADER_SIZE + name.len()), 0);
        record.extend_from_slice(data);
        record.resize(record.len() + padding(data.len()), 0);

        self.writer.write_all(&record)
    }

    /// Writes the trailer record and returns the inner writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn finish(mut self) -> io::Result<W> {
        let trailer = CpioHeader {
            name: TRAILER.to_string(),
            nlink: 1,
            ..CpioHeader::default()
        };
        self.append(&trailer, &[])?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Reader for newc archives.
pub struct CpioReader<R: Read> {
    reader: R,
}

impl<R: Read> CpioReader<R> {
    /// Wraps a reader.
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Reads the next record.
    ///
    /// Returns `Ok(None)` at the trailer or at a clean end of input.
    ///
    /// # Errors
    ///
    /// Returns [`MetatarError::InvalidArchive`] on a bad magic or a
    /// malformed header field.
    pub fn next_entry(&mut self) -> Result<Option<(CpioHeader, Vec<u8>)>> {
        let mut header_buf = [0u8; HEADER_SIZE];
        if let Err(e) = self.reader.read_exact(&mut header_buf) {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                return Ok(None);
            }
            return Err(e.into());
        }

        let magic = &header_buf[0..6];
        if magic != MAGIC_NEWC && magic != MAGIC_CRC {
            return Err(MetatarError::InvalidArchive(format!(
                "invalid cpio magic: {:?}",
                String::from_utf8_lossy(magic)
            )));
        }

        let field = |index: usize| -> Result<u32> {
            let start = 6 + index * 8;
            let text = std::str::from_utf8(&header_buf[start..start + 8])
                .map_err(|e| MetatarError::InvalidArchive(format!("cpio header: {e}")))?;
            u32::from_str_radix(text, 16)
                .map_err(|e| MetatarError::InvalidArchive(format!("cpio header field {text:?}: {e}")))
        };

        let filesize = field(6)? as usize;
        let namesize = field(11)? as usize;
        let mut header = CpioHeader {
            name: String::new(),
            ino: field(0)?,
            mode: field(1)?,
            uid: field(2)?,
            gid: field(3)?,
            nlink: field(4)?,
            mtime: field(5)?,
            size: field(6)?,
            rdev_major: field(9)?,
            rdev_minor: field(10)?,
        };

        let mut name_buf = vec![0u8; namesize];
        self.reader.read_exact(&mut name_buf)?;
        if name_buf.last() == Some(&0) {
            name_buf.pop();
        }
        header.name = String::from_utf8_lossy(&name_buf).into_owned();
        if header.name == TRAILER {
            return Ok(None);
        }
        self.skip(padding(HEADER_SIZE + namesize))?;

        let mut data = vec![0u8; filesize];
        self.reader.read_exact(&mut data)?;
        self.skip(padding(filesize))?;

        Ok(Some((header, data)))
    }

    fn skip(&mut self, pad: usize) -> io::Result<()> {
        if pad > 0 {
            let mut buf = [0u8; 3];
            self.reader.read_exact(&mut buf[..pad])?;
        }
        Ok(())
    }
}

/// Reads every record of a newc archive held in memory.
pub fn read_all(bytes: &[u8]) -> Result<Vec<(CpioHeader, Vec<u8>)>> {
    let mut reader = CpioReader::new(bytes);
    let mut records = Vec::new();
    while let Some(record) = reader.next_entry()? {
        records.push(record);
    }
    Ok(records)
}

/// Order-dependent output format writing newc cpio.
///
/// Hard links are stored as symlinks and a symlink's data is its target.
pub struct CpioSink {
    writer: CpioWriter<Vec<u8>>,
    mtime: u32,
    next_ino: u32,
}

impl CpioSink {
    /// Creates a sink stamping every record with `mtime`.
    #[must_use]
    pub const fn new(mtime: u32) -> Self {
        Self {
            writer: CpioWriter::new(Vec::new()),
            mtime,
            next_ino: 1,
        }
    }
}

fn narrow(path: &str, what: &str, value: u64) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        MetatarError::InvalidArchive(format!("{path}: {what} {value} does not fit in a cpio header"))
    })
}

impl ArchiveSink for CpioSink {
    fn format_name(&self) -> &'static str {
        "cpio"
    }

    fn requires_ordering(&self) -> bool {
        true
    }

    fn map_kind(&self, path: &str, kind: EntryKind) -> Result<EntryKind> {
        match kind {
            EntryKind::Regular | EntryKind::RegularA => Ok(EntryKind::Regular),
            EntryKind::Hardlink | EntryKind::Symlink => Ok(EntryKind::Symlink),
            EntryKind::CharDevice
            | EntryKind::BlockDevice
            | EntryKind::Directory
            | EntryKind::Fifo => Ok(kind),
            _ => Err(MetatarError::UnsupportedKind {
                path: path.to_string(),
                kind,
                format: "cpio",
            }),
        }
    }

    fn append(&mut self, header: &EntryHeader, body: &[u8]) -> Result<()> {
        let bits = type_bits(header.kind).ok_or_else(|| MetatarError::UnsupportedKind {
            path: header.name.clone(),
            kind: header.kind,
            format: "cpio",
        })?;
        let data = match header.kind {
            EntryKind::Symlink => header.link_target.as_bytes(),
            EntryKind::Directory => &[],
            _ => body,
        };

        let record = CpioHeader {
            name: header.name.clone(),
            ino: self.next_ino,
            mode: bits | (header.mode & !TYPE_MASK),
            uid: narrow(&header.name, "uid", header.uid)?,
            gid: narrow(&header.name, "gid", header.gid)?,
            nlink: if header.kind.is_directory() { 2 } else { 1 },
            mtime: self.mtime,
            size: 0,
            rdev_major: header.device_major,
            rdev_minor: header.device_minor,
        };
        debug!(name = %record.name, mode = format_args!("{:o}", record.mode), size = data.len(), "cpio record");
        self.writer.append(&record, data)?;
        self.next_ino = self.next_ino.wrapping_add(1);
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>> {
        Ok(self.writer.finish()?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn header(name: &str, kind: EntryKind, mode: u32) -> EntryHeader {
        EntryHeader {
            name: name.into(),
            kind,
            mode,
            ..EntryHeader::default()
        }
    }

    #[test]
    fn test_record_layout() {
        let mut writer = CpioWriter::new(Vec::new());
        let h = CpioHeader {
            name: "a".into(),
            mode: TYPE_REGULAR | 0o644,
            nlink: 1,
            ..CpioHeader::default()
        };
        writer.append(&h, b"hello").unwrap();
        let out = writer.writer;

        assert!(out.starts_with(b"070701"));
        // 110 + "a\0" = 112, already aligned; 5 data bytes pad to 8
        assert_eq!(out.len(), 112 + 8);
        assert_eq!(&out[54..62], b"00000005");
        assert_eq!(&out[110..112], b"a\0");
        assert_eq!(&out[112..117], b"hello");
        assert_eq!(&out[117..], &[0, 0, 0]);
    }

    #[test]
    fn test_trailer_terminates_reading() {
        let mut sink = CpioSink::new(0);
        sink.append(&header("etc/", EntryKind::Directory, 0o755), &[])
            .unwrap();
        let bytes = sink.finish().unwrap();
        assert!(
            bytes
                .windows(TRAILER.len())
                .any(|w| w == TRAILER.as_bytes())
        );

        let records = read_all(&bytes).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0.name, "etc/");
        assert_eq!(records[0].0.kind(), Some(EntryKind::Directory));
        assert_eq!(records[0].0.nlink, 2);
    }

    #[test]
    fn test_sink_roundtrip_fields() {
        let mut sink = CpioSink::new(1_700_000_000);
        let mut dev = header("dev/ttyS0", EntryKind::CharDevice, 0o620);
        dev.device_major = 4;
        dev.device_minor = 64;
        dev.gid = 5;
        sink.append(&dev, &[]).unwrap();

        let mut link = header("bin/sh", EntryKind::Symlink, 0o777);
        link.link_target = "busybox".into();
        sink.append(&link, b"ignored").unwrap();

        sink.append(&header("etc/motd", EntryKind::Regular, 0o644), b"hi\n")
            .unwrap();

        let records = read_all(&sink.finish().unwrap()).unwrap();
        assert_eq!(records.len(), 3);

        let (h, data) = &records[0];
        assert_eq!(h.kind(), Some(EntryKind::CharDevice));
        assert_eq!((h.rdev_major, h.rdev_minor), (4, 64));
        assert_eq!(h.gid, 5);
        assert_eq!(h.permissions(), 0o620);
        assert_eq!(h.mtime, 1_700_000_000);
        assert!(data.is_empty());

        let (h, data) = &records[1];
        assert_eq!(h.kind(), Some(EntryKind::Symlink));
        assert_eq!(data, b"busybox");

        let (h, data) = &records[2];
        assert_eq!(h.ino, 3);
        assert_eq!(data, b"hi\n");
    }

    #[test]
    fn test_map_kind() {
        let sink = CpioSink::new(0);
        assert_eq!(
            sink.map_kind("x", EntryKind::Hardlink).unwrap(),
            EntryKind::Symlink
        );
        assert_eq!(
            sink.map_kind("x", EntryKind::RegularA).unwrap(),
            EntryKind::Regular
        );
        for kind in [
            EntryKind::Reserved,
            EntryKind::ExtendedHeader,
            EntryKind::GlobalExtendedHeader,
            EntryKind::LongName,
            EntryKind::LongLink,
            EntryKind::Sparse,
            EntryKind::Other(b'Z'),
        ] {
            assert!(matches!(
                sink.map_kind("x", kind),
                Err(MetatarError::UnsupportedKind { format: "cpio", .. })
            ));
        }
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = vec![b'0'; HEADER_SIZE];
        bytes[..6].copy_from_slice(b"123456");
        assert!(matches!(
            read_all(&bytes),
            Err(MetatarError::InvalidArchive(_))
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(read_all(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_socket_type_name() {
        let h = CpioHeader {
            mode: TYPE_SOCKET | 0o755,
            ..CpioHeader::default()
        };
        assert_eq!(h.kind(), None);
        assert_eq!(h.type_name(), "socket file");
    }
}
