use std::ffi::CStr;

/// Map a uid to its login name. When the user database has no entry
/// (or refuses to answer) the numeric id is rendered instead, so the
/// caller always gets something printable.
pub fn user_name(uid: u32) -> String {
    let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
    let mut buf = vec![0 as libc::c_char; 1024];
    let mut result: *mut libc::passwd = std::ptr::null_mut();

    let rc = unsafe {
        libc::getpwuid_r(
            uid as libc::uid_t,
            &mut pwd,
            buf.as_mut_ptr(),
            buf.len(),
            &mut result,
        )
    };

    if rc == 0 && !result.is_null() {
        let name = unsafe { CStr::from_ptr(pwd.pw_name) };
        name.to_string_lossy().into_owned()
    } else {
        uid.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_uid_falls_back_to_numeric() {
        // Nothing sane assigns a uid this close to the top of the range
        let uid = u32::MAX - 7;
        assert_eq!(user_name(uid), uid.to_string());
    }
}
