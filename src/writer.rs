//! Write sinks behind the engine: stdout, externally supplied writers,
//! fan-out over several sinks, and the rolling file writer.

use std::ffi::OsStr;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use flate2::Compression;
use flate2::write::GzEncoder;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::rotation::Rotation;

/// A destination for encoded records. Implementations must serialize their
/// own writes; the engine calls `write` from any thread.
pub trait Sink: Send + Sync {
    fn write(&self, buf: &[u8]) -> io::Result<()>;
    fn sync(&self) -> io::Result<()>;
}

/// Stdout, locked per record so concurrent loggers do not interleave lines.
pub(crate) struct StdoutSink;

impl Sink for StdoutSink {
    fn write(&self, buf: &[u8]) -> io::Result<()> {
        io::stdout().lock().write_all(buf)
    }

    fn sync(&self) -> io::Result<()> {
        io::stdout().lock().flush()
    }
}

/// An externally supplied writer, wrapped for use alongside the built-ins.
pub(crate) struct RawSink(Mutex<Box<dyn Write + Send>>);

impl RawSink {
    pub(crate) fn new(writer: Box<dyn Write + Send>) -> Self {
        RawSink(Mutex::new(writer))
    }
}

impl Sink for RawSink {
    fn write(&self, buf: &[u8]) -> io::Result<()> {
        self.0.lock().unwrap().write_all(buf)
    }

    fn sync(&self) -> io::Result<()> {
        self.0.lock().unwrap().flush()
    }
}

/// Writes every record to each sink. Every sink receives the write even
/// when an earlier one fails; the first error is the one reported.
pub(crate) struct Fanout(Vec<Arc<dyn Sink>>);

impl Fanout {
    pub(crate) fn new(sinks: Vec<Arc<dyn Sink>>) -> Self {
        Fanout(sinks)
    }
}

impl Sink for Fanout {
    fn write(&self, buf: &[u8]) -> io::Result<()> {
        let mut first_err = None;
        for sink in &self.0 {
            if let Err(err) = sink.write(buf)
                && first_err.is_none()
            {
                first_err = Some(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn sync(&self) -> io::Result<()> {
        let mut first_err = None;
        for sink in &self.0 {
            if let Err(err) = sink.sync()
                && first_err.is_none()
            {
                first_err = Some(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// State of the active log file.
#[derive(Debug)]
struct FileState {
    file: File,
    size: u64,
}

/// A rotated-out backup next to the active file.
struct Backup {
    path: PathBuf,
    stamp: OffsetDateTime,
    compressed: bool,
}

/// A size-capped log file that retires its contents to timestamped
/// backups. The file opens lazily on the first write (construction never
/// touches the filesystem) and an existing file is appended to while it
/// stays under the size limit. After a rotation, backups beyond the
/// configured count or age are deleted and the rest optionally gzipped.
pub struct RollingFileWriter {
    path: PathBuf,
    rotation: Rotation,
    state: Mutex<Option<FileState>>,
}

impl RollingFileWriter {
    pub fn new(path: impl Into<PathBuf>, rotation: Rotation) -> Self {
        RollingFileWriter {
            path: path.into(),
            rotation,
            state: Mutex::new(None),
        }
    }

    /// Path of the active log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_locked(&self, buf: &[u8]) -> io::Result<()> {
        let mut guard = self.state.lock().unwrap();
        let mut state = match guard.take() {
            Some(state) => state,
            None => self.open_current()?,
        };

        if state.size + buf.len() as u64 > self.rotation.max_size_bytes() {
            // Close the handle before the rename.
            drop(state);
            self.rotate()?;
            state = self.open_current()?;
        }

        state.file.write_all(buf)?;
        state.size += buf.len() as u64;
        *guard = Some(state);
        Ok(())
    }

    fn sync_locked(&self) -> io::Result<()> {
        let guard = self.state.lock().unwrap();
        match guard.as_ref() {
            Some(state) => state.file.sync_all(),
            None => Ok(()),
        }
    }

    fn open_current(&self) -> io::Result<FileState> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(FileState { file, size })
    }

    fn rotate(&self) -> io::Result<()> {
        if self.path.exists() {
            fs::rename(&self.path, self.backup_path(self.now()))?;
        }
        self.prune();
        Ok(())
    }

    fn now(&self) -> OffsetDateTime {
        if self.rotation.local_time {
            OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
        } else {
            OffsetDateTime::now_utc()
        }
    }

    /// Backup name: `<stem>-<timestamp>.<ext>`, e.g. `app-2026-08-04T10-30-00.123.log`.
    fn backup_path(&self, now: OffsetDateTime) -> PathBuf {
        let layout = format_description!(
            "[year]-[month]-[day]T[hour]-[minute]-[second].[subsecond digits:3]"
        );
        let stamp = now
            .format(layout)
            .unwrap_or_else(|_| now.unix_timestamp().to_string());

        let stem = self.path.file_stem().and_then(OsStr::to_str).unwrap_or("log");
        let name = match self.path.extension().and_then(OsStr::to_str) {
            Some(ext) => format!("{stem}-{stamp}.{ext}"),
            None => format!("{stem}-{stamp}"),
        };
        self.path.with_file_name(name)
    }

    /// Retention and compression run inline after a rotation. Per-file
    /// failures are skipped so one undeletable backup cannot wedge logging.
    fn prune(&self) {
        let mut backups = self.list_backups();
        backups.sort_by(|a, b| b.stamp.cmp(&a.stamp));

        let mut expired = Vec::new();
        let keep = self.rotation.max_backups as usize;
        if keep > 0 && backups.len() > keep {
            expired.extend(backups.split_off(keep));
        }
        if self.rotation.max_age > 0 {
            let cutoff =
                OffsetDateTime::now_utc() - Duration::days(i64::from(self.rotation.max_age));
            let (fresh, stale): (Vec<_>, Vec<_>) =
                backups.into_iter().partition(|b| b.stamp >= cutoff);
            backups = fresh;
            expired.extend(stale);
        }

        for backup in expired {
            let _ = fs::remove_file(&backup.path);
        }
        if self.rotation.compress {
            for backup in backups.iter().filter(|b| !b.compressed) {
                let _ = compress_backup(&backup.path);
            }
        }
    }

    fn list_backups(&self) -> Vec<Backup> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let stem = self.path.file_stem().and_then(OsStr::to_str).unwrap_or("log");
        let ext = self.path.extension().and_then(OsStr::to_str);
        let prefix = format!("{stem}-");

        let entries = match fs::read_dir(&parent) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut backups = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(rest) = name.strip_prefix(&prefix) else {
                continue;
            };
            let (rest, compressed) = match rest.strip_suffix(".gz") {
                Some(inner) => (inner, true),
                None => (rest, false),
            };
            let stamp_text = match ext {
                Some(ext) => match rest.strip_suffix(ext).and_then(|r| r.strip_suffix('.')) {
                    Some(inner) => inner,
                    None => continue,
                },
                None => rest,
            };
            let Some(stamp) = self.parse_stamp(stamp_text) else {
                continue;
            };
            backups.push(Backup {
                path: entry.path(),
                stamp,
                compressed,
            });
        }
        backups
    }

    fn parse_stamp(&self, text: &str) -> Option<OffsetDateTime> {
        let layout = format_description!(
            "[year]-[month]-[day]T[hour]-[minute]-[second].[subsecond digits:3]"
        );
        let parsed = PrimitiveDateTime::parse(text, layout).ok()?;
        let offset = if self.rotation.local_time {
            UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
        } else {
            UtcOffset::UTC
        };
        Some(parsed.assume_offset(offset))
    }
}

fn compress_backup(path: &Path) -> io::Result<()> {
    let mut source = File::open(path)?;
    let mut target_name = path.as_os_str().to_os_string();
    target_name.push(".gz");

    let target = File::create(PathBuf::from(&target_name))?;
    let mut encoder = GzEncoder::new(target, Compression::default());
    io::copy(&mut source, &mut encoder)?;
    encoder.finish()?.sync_all()?;
    fs::remove_file(path)
}

impl Write for RollingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_locked(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sync_locked()
    }
}

impl Sink for RollingFileWriter {
    fn write(&self, buf: &[u8]) -> io::Result<()> {
        self.write_locked(buf)
    }

    fn sync(&self) -> io::Result<()> {
        self.sync_locked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_rotation(max_size: u64) -> Rotation {
        Rotation {
            max_size,
            ..Rotation::default()
        }
    }

    fn backup_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|name| name.starts_with("test-"))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_construction_does_not_touch_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never/test.log");

        let _writer = RollingFileWriter::new(&path, Rotation::default());
        assert!(!path.exists());
        assert!(!path.parent().unwrap().exists());
    }

    #[test]
    fn test_first_write_creates_file_and_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/inner/test.log");

        let mut writer = RollingFileWriter::new(&path, Rotation::default());
        writer.write_all(b"hello\n").unwrap();
        writer.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_appends_to_existing_file_under_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.log");
        fs::write(&path, "existing\n").unwrap();

        let mut writer = RollingFileWriter::new(&path, Rotation::default());
        writer.write_all(b"appended\n").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("existing"));
        assert!(content.contains("appended"));
        assert!(backup_files(dir.path()).is_empty());
    }

    #[test]
    fn test_overflow_rotates_to_timestamped_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.log");

        let mut writer = RollingFileWriter::new(&path, small_rotation(20));
        writer.write_all(b"first record padding\n").unwrap();
        writer.write_all(b"second record\n").unwrap();

        let backups = backup_files(dir.path());
        assert_eq!(backups.len(), 1);
        assert!(backups[0].ends_with(".log"), "backup keeps the extension");

        let rotated = fs::read_to_string(dir.path().join(&backups[0])).unwrap();
        assert!(rotated.contains("first record"));
        let active = fs::read_to_string(&path).unwrap();
        assert_eq!(active, "second record\n");
    }

    #[test]
    fn test_prunes_backups_beyond_max_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.log");
        let rotation = Rotation {
            max_size: 10,
            max_backups: 2,
            ..Rotation::default()
        };

        let mut writer = RollingFileWriter::new(&path, rotation);
        for i in 0..5 {
            writer
                .write_all(format!("record number {i}\n").as_bytes())
                .unwrap();
            // Distinct backup timestamps need distinct milliseconds.
            std::thread::sleep(std::time::Duration::from_millis(5));
        }

        assert!(backup_files(dir.path()).len() <= 2);
    }

    #[test]
    fn test_compress_gzips_backups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.log");
        let rotation = Rotation {
            max_size: 10,
            compress: true,
            ..Rotation::default()
        };

        let mut writer = RollingFileWriter::new(&path, rotation);
        writer.write_all(b"first record\n").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        writer.write_all(b"second record\n").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        writer.write_all(b"third record\n").unwrap();

        let backups = backup_files(dir.path());
        assert!(
            backups.iter().any(|name| name.ends_with(".log.gz")),
            "expected a gzipped backup, got {backups:?}"
        );
    }

    #[test]
    fn test_fanout_writes_to_every_sink() {
        #[derive(Default)]
        struct Memory(Mutex<Vec<u8>>);
        impl Sink for Memory {
            fn write(&self, buf: &[u8]) -> io::Result<()> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(())
            }
            fn sync(&self) -> io::Result<()> {
                Ok(())
            }
        }

        let a = Arc::new(Memory::default());
        let b = Arc::new(Memory::default());
        let sinks: Vec<Arc<dyn Sink>> = vec![a.clone(), b.clone()];
        let fanout = Fanout::new(sinks);

        fanout.write(b"record\n").unwrap();
        fanout.sync().unwrap();

        assert_eq!(&*a.0.lock().unwrap(), b"record\n");
        assert_eq!(&*b.0.lock().unwrap(), b"record\n");
    }
}
