//! Call-site resolution and rendering.
//!
//! Every public logging method carries `#[track_caller]` and hands its
//! captured [`Location`] down explicitly, so the reported frame is the
//! caller's code with no frame arithmetic. A positive skip count walks
//! the stack that many frames above the captured site, for callers that
//! log through wrapper layers of their own.

use std::backtrace::Backtrace;
use std::panic::Location;

/// Trim a source path to its final two `/`-separated segments, `dir/file`.
/// Paths with fewer than two segments pass through whole.
pub(crate) fn short_path(file: &str) -> &str {
    match file.rfind('/') {
        None => file,
        Some(last) => match file[..last].rfind('/') {
            None => file,
            Some(prev) => &file[prev + 1..],
        },
    }
}

/// Render a captured call site as `dir/file:line`.
pub(crate) fn format_caller(location: &Location<'_>) -> String {
    format!("{}:{}", short_path(location.file()), location.line())
}

/// Render the call site for a record: the captured location itself, or,
/// with a positive skip, the frame that many levels above it.
pub(crate) fn resolve(location: &'static Location<'static>, skip: usize) -> String {
    if skip == 0 {
        format_caller(location)
    } else {
        skip_frames(location, skip)
    }
}

/// Walk the captured stack to the frame `skip` levels above the call
/// site. Falls back to the captured location when the stack carries no
/// source info (stripped binaries) or the walk runs off the top.
fn skip_frames(location: &'static Location<'static>, skip: usize) -> String {
    let backtrace = Backtrace::force_capture().to_string();
    let mut frames = backtrace
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix("at "))
        .skip_while(|frame| !matches_location(frame, location));

    match frames.nth(skip).and_then(parse_frame) {
        Some((file, line)) => format!("{}:{line}", short_path(file)),
        None => format_caller(location),
    }
}

fn matches_location(frame: &str, location: &Location<'_>) -> bool {
    match parse_frame(frame) {
        Some((file, line)) => line == location.line() && file.ends_with(location.file()),
        None => false,
    }
}

/// Frame text is `<path>:<line>:<column>`.
fn parse_frame(frame: &str) -> Option<(&str, u32)> {
    let (rest, _column) = frame.rsplit_once(':')?;
    let (file, line) = rest.rsplit_once(':')?;
    Some((file, line.parse().ok()?))
}
