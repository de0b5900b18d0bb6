/*!
 * Stack walker.
 *
 * Captures the current call stack with the `backtrace` crate and turns each
 * resolved symbol into a `Frame` with a normalized file path. Inlined
 * functions resolve to several symbols for one physical frame; each becomes
 * its own `Frame`, innermost first.
 */
use backtrace::{Backtrace, SymbolName};

use crate::protocol::constants::UNKNOWN_FUNCTION;
use crate::protocol::types::{Frame, Stack};

/// Interior markers of standard-library sources. The path is kept from the
/// marker's last directory on.
const STD_SOURCE_MARKERS: &[&str] = &["/src/pkg/", "/library/std/", "/library/core/", "/library/alloc/"];

/// Source-hosting fragments that start a machine-independent import path.
const HOSTING_MARKERS: &[&str] = &[
    "github.com/",
    "code.google.com/",
    "bitbucket.org/",
    "launchpad.net/",
    "gitlab.com/",
];

/// Demangled-name suffixes of the walker entry points.
const WALKER_SYMBOLS: &[&str] = &["stack::capture_stack", "stack::capture_caller_stack"];

/// Prefixes of the reporting entry points a report is built through.
const REPORTER_FRAMES: &[&str] = &[
    "rollbar_core::report_error",
    "rollbar_core::client::Client::",
    "rollbar_core::report::builder::ReportBuilder::",
];

/**
 * Captures the call stack of the caller.
 *
 * `skip == 0` makes the first frame the function that called
 * `capture_stack`; each increment drops one more frame. Frames contributed by
 * the unwinder and by this function are always removed. The walk continues
 * until the stack is exhausted; if `skip` goes past the real depth the
 * result is empty.
 */
#[inline(never)]
pub fn capture_stack(skip: usize) -> Stack {
    let frames = trim_walker(resolve(&Backtrace::new()));
    frames.into_iter().skip(skip).collect()
}

/**
 * Captures the stack of whoever called into the reporter.
 *
 * Unlike `capture_stack`, frames are not counted: the leading frames of the
 * reporting entry points are dropped by name, then `skip` more. Optimized
 * builds may inline or tail-call those entry points away, so their number
 * on the stack is not fixed.
 */
#[inline(never)]
pub fn capture_caller_stack(skip: usize) -> Stack {
    strip_reporter_frames(trim_walker(resolve(&Backtrace::new())), skip)
}

fn resolve(bt: &Backtrace) -> Stack {
    let mut frames = Vec::new();
    for frame in bt.frames() {
        let symbols = frame.symbols();
        if symbols.is_empty() {
            frames.push(resolve_frame(None, None, None));
            continue;
        }
        for symbol in symbols {
            let file = symbol.filename().map(|p| p.display().to_string());
            frames.push(resolve_frame(symbol.name(), file, symbol.lineno()));
        }
    }
    frames
}

/*
 * Everything up to and including the walker's own frame belongs to the
 * unwinder. Without symbols we cannot tell where that is, so nothing is
 * trimmed.
 */
fn trim_walker(frames: Stack) -> Stack {
    let start = frames
        .iter()
        .position(|f| WALKER_SYMBOLS.iter().any(|sym| f.method.ends_with(sym)))
        .map_or(0, |i| i + 1);
    frames.into_iter().skip(start).collect()
}

fn strip_reporter_frames(frames: Stack, skip: usize) -> Stack {
    frames
        .into_iter()
        .skip_while(|f| REPORTER_FRAMES.iter().any(|prefix| f.method.starts_with(prefix)))
        .skip(skip)
        .collect()
}

/**
 * Builds a `Frame` from whatever the symbolizer produced, degrading missing
 * pieces to sentinels: `"???"` for the function, `""` for the file and `0`
 * for the line.
 */
pub(crate) fn resolve_frame(name: Option<SymbolName<'_>>, file: Option<String>, line: Option<u32>) -> Frame {
    Frame {
        filename: file.as_deref().map(shorten_file_path).unwrap_or_default(),
        method: name
            .map(|n| function_name(&format!("{n:#}")))
            .unwrap_or_else(|| UNKNOWN_FUNCTION.to_string()),
        line: line.unwrap_or(0),
    }
}

/**
 * Keeps only the trailing qualified name of a symbol, dropping anything up
 * to the last `/`.
 */
pub fn function_name(symbol: &str) -> String {
    if symbol.is_empty() {
        return UNKNOWN_FUNCTION.to_string();
    }
    match symbol.rfind('/') {
        Some(idx) => symbol[idx + 1..].to_string(),
        None => symbol.to_string(),
    }
}

/**
 * Removes the machine-specific prefix of a source path so that the same
 * code reports the same file name wherever it was built.
 *
 * ```text
 * /usr/local/go/src/pkg/runtime/proc.c              -> pkg/runtime/proc.c
 * /rustc/<hash>/library/std/src/panicking.rs        -> std/src/panicking.rs
 * /home/foo/go/src/github.com/stvp/rollbar.go       -> github.com/stvp/rollbar.go
 * foo.go                                            -> foo.go
 * ```
 *
 * Applying it to its own output changes nothing.
 */
pub fn shorten_file_path(path: &str) -> String {
    let mut current = path;
    loop {
        let next = shorten_once(current);
        if next.len() == current.len() {
            return next.to_string();
        }
        current = next;
    }
}

fn shorten_once(path: &str) -> &str {
    let std_cut = STD_SOURCE_MARKERS
        .iter()
        .filter_map(|marker| path.rfind(marker).map(|idx| idx + last_segment_offset(marker)))
        .max();
    if let Some(cut) = std_cut {
        return &path[cut..];
    }

    match HOSTING_MARKERS.iter().filter_map(|marker| path.find(marker)).min() {
        Some(idx) => &path[idx..],
        None => path,
    }
}

/// Offset of the last directory name inside a marker, e.g. 5 for `/src/pkg/`.
fn last_segment_offset(marker: &str) -> usize {
    marker
        .trim_end_matches('/')
        .rfind('/')
        .map_or(0, |idx| idx + 1)
}
