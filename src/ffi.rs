// C ABI over the tag handle: read, write, set popularity, release
//
// Handles are `Box<Tag>` pointers. Failures are logged and reported as
// negative status codes (see `Id3Error::code`); `id3_read` returns null.

use std::ffi::{c_char, c_int, CStr};
use std::path::Path;
use std::ptr;

use log::error;

use crate::error::{Id3Error, Result};
use crate::id3::Tag;

unsafe fn path_arg<'a>(path: *const c_char) -> Result<&'a Path> {
    if path.is_null() {
        return Err(Id3Error::InvalidHandle);
    }
    let path = CStr::from_ptr(path).to_str().map_err(|e| {
        Id3Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
    })?;
    Ok(Path::new(path))
}

unsafe fn tag_arg<'a>(ptr: *mut Tag) -> Result<&'a mut Tag> {
    ptr.as_mut().ok_or(Id3Error::InvalidHandle)
}

fn status(result: Result<()>) -> c_int {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{}", e);
            e.code()
        }
    }
}

/// Read the tag of `file`. Returns null on failure.
///
/// # Safety
///
/// `file` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn id3_read(file: *const c_char) -> *mut Tag {
    match path_arg(file).and_then(Tag::read) {
        Ok(tag) => Box::into_raw(Box::new(tag)),
        Err(e) => {
            error!("{}", e);
            ptr::null_mut()
        }
    }
}

/// Write the tag and the audio of the file it was read from to `file`.
/// Returns 0 or a negative status code.
///
/// # Safety
///
/// `ptr` must be null or a live handle from `id3_read`; `file` must be
/// null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn id3_write(ptr: *mut Tag, file: *const c_char) -> c_int {
    status(tag_arg(ptr).and_then(|tag| tag.write_to(path_arg(file)?)))
}

/// Set the rating for `email`. Returns 0 or a negative status code.
///
/// # Safety
///
/// `ptr` must be null or a live handle from `id3_read`; `email` must be
/// null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn id3_set_popularity(ptr: *mut Tag, email: *const c_char, rating: u8) -> c_int {
    status(tag_arg(ptr).and_then(|tag| {
        if email.is_null() {
            return Err(Id3Error::InvalidHandle);
        }
        tag.set_popularity_bytes(CStr::from_ptr(email).to_bytes(), rating);
        Ok(())
    }))
}

/// Release a handle. Null is a no-op.
///
/// # Safety
///
/// `ptr` must be null or a live handle from `id3_read` that is not used
/// afterwards.
#[no_mangle]
pub unsafe extern "C" fn id3_free(ptr: *mut Tag) {
    if ptr.is_null() {
        return;
    }
    drop(Box::from_raw(ptr));
}

/// Release the handle stored in `*handle` and null it, so releasing twice
/// is a no-op.
///
/// # Safety
///
/// `handle` must be null or point to a pointer that is null or a live
/// handle from `id3_read`.
#[no_mangle]
pub unsafe extern "C" fn id3_release(handle: *mut *mut Tag) {
    if let Some(slot) = handle.as_mut() {
        id3_free(std::mem::replace(slot, ptr::null_mut()));
    }
}
