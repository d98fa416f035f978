//! Extended attribute access without following symlinks
//!
//! mergerfs publishes its control metadata through extended attributes on
//! the entries of the mount, so the whole audit hangs off `lgetxattr(2)`
//! (the "l" variant queries the path itself, never a symlink target).
//!
//! The kernel does not tell us the value size up front in a race-free way,
//! so the query starts with a small buffer and doubles it on `ERANGE`
//! until the full value fits. The number of retries is logarithmic in the
//! final value size and a value is never silently truncated.

use crate::error::XattrError;
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Initial query buffer size; most mergerfs attribute values fit
const INITIAL_BUFFER_SIZE: usize = 64;

/// Classified outcome of a single `lgetxattr` attempt
enum Attempt {
    /// The value fit; `usize` is the number of valid bytes in the buffer
    Value(usize),
    /// The attribute does not exist on this entry (`ENODATA`)
    Absent,
    /// The buffer was too small for the value (`ERANGE`)
    NeedsLargerBuffer,
    /// Any other errno (permission denied, stale handle, I/O fault, ...)
    Fault(std::io::Error),
}

/// Issue one `lgetxattr` call into `buf` and classify the result by errno
fn attempt(path: &CString, name: &CString, buf: &mut [u8]) -> Attempt {
    // SAFETY: both strings are NUL-terminated CStrings and the pointer and
    // length describe a buffer we exclusively own for the whole call.
    let res = unsafe {
        libc::lgetxattr(
            path.as_ptr(),
            name.as_ptr(),
            buf.as_mut_ptr().cast::<libc::c_void>(),
            buf.len(),
        )
    };

    if res >= 0 {
        #[allow(clippy::cast_sign_loss)]
        return Attempt::Value(res as usize);
    }

    let err = std::io::Error::last_os_error();
    match err.raw_os_error() {
        Some(libc::ERANGE) => Attempt::NeedsLargerBuffer,
        Some(libc::ENODATA) => Attempt::Absent,
        _ => Attempt::Fault(err),
    }
}

/// Read the named extended attribute on `path` itself
///
/// Symlinks are not followed. The buffer is grown (strictly doubled) until
/// the value fits, so the full value is always returned.
///
/// # Returns
///
/// `Ok(Some(bytes))` with the complete attribute value, or `Ok(None)` when
/// the attribute is not present on the entry. Absence is a normal
/// outcome, not an error.
///
/// # Errors
///
/// Returns [`XattrError`] for any failure other than absence: permission
/// denied, stale handle, I/O fault, or a path/name with an interior NUL.
pub fn get(path: &Path, name: &str) -> Result<Option<Vec<u8>>, XattrError> {
    let path_cstr =
        CString::new(path.as_os_str().as_bytes()).map_err(|_| XattrError::InvalidPath {
            path: path.to_path_buf(),
        })?;
    let name_cstr = CString::new(name).map_err(|_| XattrError::InvalidName {
        name: name.to_string(),
    })?;

    let mut buf = vec![0u8; INITIAL_BUFFER_SIZE];
    loop {
        match attempt(&path_cstr, &name_cstr, &mut buf) {
            Attempt::Value(len) => {
                buf.truncate(len);
                return Ok(Some(buf));
            }
            Attempt::Absent => return Ok(None),
            Attempt::NeedsLargerBuffer => {
                let grown = buf.len() * 2;
                buf = vec![0u8; grown];
            }
            Attempt::Fault(source) => {
                return Err(XattrError::Query {
                    path: path.to_path_buf(),
                    name: name.to_string(),
                    source,
                })
            }
        }
    }
}
