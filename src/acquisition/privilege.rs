//! Process elevation check gating raw access

/// Reports whether the current process may use raw volume access
pub trait PrivilegeProbe {
    fn is_elevated(&self) -> bool;
}

/// Elevation of the running process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessElevation;

impl PrivilegeProbe for ProcessElevation {
    fn is_elevated(&self) -> bool {
        process_is_elevated()
    }
}

/// Reads `TokenElevation` from the process token
#[cfg(windows)]
fn process_is_elevated() -> bool {
    use std::ffi::c_void;
    use std::mem;

    use windows::Win32::Foundation::{CloseHandle, HANDLE};
    use windows::Win32::Security::{
        GetTokenInformation, TokenElevation, TOKEN_ELEVATION, TOKEN_QUERY,
    };
    use windows::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};

    let mut token = HANDLE::default();

    unsafe {
        if OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token).is_err() {
            return false;
        }

        let mut elevation = TOKEN_ELEVATION::default();
        let mut returned: u32 = 0;
        let queried = GetTokenInformation(
            token,
            TokenElevation,
            Some(&mut elevation as *mut TOKEN_ELEVATION as *mut c_void),
            mem::size_of::<TOKEN_ELEVATION>() as u32,
            &mut returned,
        )
        .is_ok();

        let _ = CloseHandle(token);

        queried && elevation.TokenIsElevated != 0
    }
}

#[cfg(not(windows))]
fn process_is_elevated() -> bool {
    false
}
