//! Live Win32 process binding.
//!
//! Finds `sekiro.exe` with a ToolHelp snapshot, opens it for read/write and
//! exposes it through the memory traits.

use std::path::PathBuf;

use tracing::debug;

use crate::error::{Error, Result};
use crate::memory::reader::{ProcessBinding, ProcessProvider, ReadMemory, WriteMemory};

#[cfg(target_os = "windows")]
use windows::Win32::Foundation::{CloseHandle, HANDLE};

/// Image name of the only supported target
pub const TARGET_PROCESS: &str = "sekiro.exe";

/// Exit code reported by `GetExitCodeProcess` while a process is running
#[cfg(target_os = "windows")]
const STILL_ACTIVE: u32 = 259;

/// Open handle to the target process
pub struct ProcessHandle {
    pub pid: u32,
    pub base_address: u64,
    pub image_path: PathBuf,
    #[cfg(target_os = "windows")]
    handle: HANDLE,
}

impl std::fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .field("base_address", &format_args!("{:#x}", self.base_address))
            .field("image_path", &self.image_path)
            .finish()
    }
}

#[cfg(target_os = "windows")]
impl ProcessHandle {
    /// Find a running process by image name (case-insensitive) and open it
    pub fn find_and_open(process_name: &str) -> Result<Self> {
        let pid = find_process_id(process_name)?;
        debug!("Found {} with PID {}", process_name, pid);
        Self::open(pid)
    }

    /// Open a process by PID with read/write access
    pub fn open(pid: u32) -> Result<Self> {
        use windows::Win32::System::Threading::{
            OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION, PROCESS_VM_OPERATION,
            PROCESS_VM_READ, PROCESS_VM_WRITE,
        };

        // SAFETY: OpenProcess has no pointer arguments; the returned handle is
        // owned by ProcessHandle and closed on drop.
        let handle = unsafe {
            OpenProcess(
                PROCESS_VM_READ
                    | PROCESS_VM_WRITE
                    | PROCESS_VM_OPERATION
                    | PROCESS_QUERY_LIMITED_INFORMATION,
                false,
                pid,
            )
        }
        .map_err(|e| Error::ProcessOpenFailed(format!("PID {}: {}", pid, e)))?;

        let mut process = Self {
            pid,
            base_address: 0,
            image_path: PathBuf::new(),
            handle,
        };
        process.base_address = main_module_base(pid)?;
        process.image_path = process.query_image_path()?;

        Ok(process)
    }

    fn query_image_path(&self) -> Result<PathBuf> {
        use windows::Win32::System::Threading::{PROCESS_NAME_WIN32, QueryFullProcessImageNameW};
        use windows::core::PWSTR;

        let mut buffer = vec![0u16; 1024];
        let mut size = buffer.len() as u32;
        // SAFETY: buffer outlives the call and size holds its capacity in u16s.
        unsafe {
            QueryFullProcessImageNameW(
                self.handle,
                PROCESS_NAME_WIN32,
                PWSTR(buffer.as_mut_ptr()),
                &mut size,
            )
        }
        .map_err(|e| Error::ProcessOpenFailed(format!("image path query failed: {}", e)))?;

        buffer.truncate(size as usize);
        Ok(PathBuf::from(String::from_utf16_lossy(&buffer)))
    }
}

#[cfg(target_os = "windows")]
impl Drop for ProcessHandle {
    fn drop(&mut self) {
        // SAFETY: the handle was returned by OpenProcess and is closed once.
        unsafe {
            let _ = CloseHandle(self.handle);
        }
    }
}

#[cfg(target_os = "windows")]
impl ReadMemory for ProcessHandle {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        use windows::Win32::System::Diagnostics::Debug::ReadProcessMemory;

        let mut buffer = vec![0u8; size];
        let mut read = 0usize;
        // SAFETY: the destination buffer has exactly `size` bytes; the source
        // address lives in the target process and is validated by the kernel.
        unsafe {
            ReadProcessMemory(
                self.handle,
                address as *const _,
                buffer.as_mut_ptr().cast(),
                size,
                Some(&mut read),
            )
        }
        .map_err(|e| Error::MemoryReadFailed {
            address,
            message: e.to_string(),
        })?;

        if read != size {
            return Err(Error::MemoryReadFailed {
                address,
                message: format!("partial read: {} of {} bytes", read, size),
            });
        }
        Ok(buffer)
    }
}

#[cfg(target_os = "windows")]
impl WriteMemory for ProcessHandle {
    fn write_bytes(&self, address: u64, data: &[u8]) -> Result<()> {
        use windows::Win32::System::Diagnostics::Debug::WriteProcessMemory;

        let mut written = 0usize;
        // SAFETY: the source slice is valid for data.len() bytes.
        unsafe {
            WriteProcessMemory(
                self.handle,
                address as *const _,
                data.as_ptr().cast(),
                data.len(),
                Some(&mut written),
            )
        }
        .map_err(|e| Error::MemoryWriteFailed {
            address,
            message: e.to_string(),
        })?;

        if written != data.len() {
            return Err(Error::MemoryWriteFailed {
                address,
                message: format!("partial write: {} of {} bytes", written, data.len()),
            });
        }
        Ok(())
    }
}

#[cfg(target_os = "windows")]
impl ProcessBinding for ProcessHandle {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn base_address(&self) -> u64 {
        self.base_address
    }

    fn is_alive(&self) -> bool {
        use windows::Win32::System::Threading::GetExitCodeProcess;

        let mut code = 0u32;
        // SAFETY: `code` is a valid out pointer for the duration of the call.
        match unsafe { GetExitCodeProcess(self.handle, &mut code) } {
            Ok(()) => code == STILL_ACTIVE,
            Err(_) => false,
        }
    }

    fn file_version(&self) -> Result<(u32, u32, u32)> {
        read_file_version(&self.image_path)
    }
}

#[cfg(target_os = "windows")]
fn find_process_id(process_name: &str) -> Result<u32> {
    use windows::Win32::System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW,
        TH32CS_SNAPPROCESS,
    };

    // SAFETY: the snapshot handle is closed before returning.
    let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) }
        .map_err(|e| Error::ProcessNotFound(format!("process snapshot failed: {}", e)))?;

    let mut entry = PROCESSENTRY32W {
        dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
        ..Default::default()
    };

    let mut found = None;
    // SAFETY: `entry` is initialized with its size as the API requires.
    let mut more = unsafe { Process32FirstW(snapshot, &mut entry) }.is_ok();
    while more {
        let len = entry
            .szExeFile
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(entry.szExeFile.len());
        let name = String::from_utf16_lossy(&entry.szExeFile[..len]);
        if name.eq_ignore_ascii_case(process_name) {
            found = Some(entry.th32ProcessID);
            break;
        }
        // SAFETY: same snapshot and entry as above.
        more = unsafe { Process32NextW(snapshot, &mut entry) }.is_ok();
    }

    // SAFETY: snapshot came from CreateToolhelp32Snapshot.
    unsafe {
        let _ = CloseHandle(snapshot);
    }

    found.ok_or_else(|| Error::ProcessNotFound(process_name.to_string()))
}

#[cfg(target_os = "windows")]
fn main_module_base(pid: u32) -> Result<u64> {
    use windows::Win32::System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, MODULEENTRY32W, Module32FirstW, TH32CS_SNAPMODULE,
        TH32CS_SNAPMODULE32,
    };

    // SAFETY: the snapshot handle is closed before returning.
    let snapshot =
        unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPMODULE | TH32CS_SNAPMODULE32, pid) }
            .map_err(|e| Error::ProcessOpenFailed(format!("module snapshot failed: {}", e)))?;

    let mut entry = MODULEENTRY32W {
        dwSize: std::mem::size_of::<MODULEENTRY32W>() as u32,
        ..Default::default()
    };

    // The first module of a snapshot is always the main executable
    // SAFETY: `entry` is initialized with its size as the API requires.
    let result = unsafe { Module32FirstW(snapshot, &mut entry) };

    // SAFETY: snapshot came from CreateToolhelp32Snapshot.
    unsafe {
        let _ = CloseHandle(snapshot);
    }

    result.map_err(|e| Error::ProcessOpenFailed(format!("main module lookup failed: {}", e)))?;
    Ok(entry.modBaseAddr as u64)
}

#[cfg(target_os = "windows")]
fn read_file_version(path: &std::path::Path) -> Result<(u32, u32, u32)> {
    use windows::Win32::Storage::FileSystem::{
        GetFileVersionInfoSizeW, GetFileVersionInfoW, VS_FIXEDFILEINFO, VerQueryValueW,
    };
    use windows::core::HSTRING;

    let file = HSTRING::from(path.to_string_lossy().as_ref());

    // SAFETY: querying the size has no out buffers.
    let size = unsafe { GetFileVersionInfoSizeW(&file, None) };
    if size == 0 {
        return Err(Error::VersionDetectionFailed(format!(
            "{} has no version resource",
            path.display()
        )));
    }

    let mut block = vec![0u8; size as usize];
    // SAFETY: block has exactly `size` bytes.
    unsafe { GetFileVersionInfoW(&file, 0, size, block.as_mut_ptr().cast()) }
        .map_err(|e| Error::VersionDetectionFailed(e.to_string()))?;

    let mut info: *mut std::ffi::c_void = std::ptr::null_mut();
    let mut len = 0u32;
    // SAFETY: `info` points into `block`, which stays alive until we copy out.
    let ok = unsafe {
        VerQueryValueW(
            block.as_ptr().cast(),
            &HSTRING::from("\\"),
            &mut info,
            &mut len,
        )
    };
    if !ok.as_bool() || info.is_null() || (len as usize) < std::mem::size_of::<VS_FIXEDFILEINFO>()
    {
        return Err(Error::VersionDetectionFailed(
            "fixed file info missing".to_string(),
        ));
    }

    // SAFETY: VerQueryValueW returned a VS_FIXEDFILEINFO of at least `len` bytes.
    let fixed = unsafe { &*(info as *const VS_FIXEDFILEINFO) };
    Ok((
        fixed.dwProductVersionMS >> 16,
        fixed.dwProductVersionMS & 0xFFFF,
        fixed.dwProductVersionLS >> 16,
    ))
}

#[cfg(not(target_os = "windows"))]
impl ProcessHandle {
    pub fn find_and_open(process_name: &str) -> Result<Self> {
        debug!("Process lookup for {} is only supported on Windows", process_name);
        Err(Error::ProcessNotFound(format!(
            "{} (process access is only supported on Windows)",
            process_name
        )))
    }

    pub fn open(pid: u32) -> Result<Self> {
        Err(Error::ProcessOpenFailed(format!(
            "PID {} (process access is only supported on Windows)",
            pid
        )))
    }
}

#[cfg(not(target_os = "windows"))]
impl ReadMemory for ProcessHandle {
    fn read_bytes(&self, address: u64, _size: usize) -> Result<Vec<u8>> {
        Err(Error::MemoryReadFailed {
            address,
            message: "unsupported platform".to_string(),
        })
    }
}

#[cfg(not(target_os = "windows"))]
impl WriteMemory for ProcessHandle {
    fn write_bytes(&self, address: u64, _data: &[u8]) -> Result<()> {
        Err(Error::MemoryWriteFailed {
            address,
            message: "unsupported platform".to_string(),
        })
    }
}

#[cfg(not(target_os = "windows"))]
impl ProcessBinding for ProcessHandle {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn base_address(&self) -> u64 {
        self.base_address
    }

    fn is_alive(&self) -> bool {
        false
    }

    fn file_version(&self) -> Result<(u32, u32, u32)> {
        Err(Error::VersionDetectionFailed(
            "unsupported platform".to_string(),
        ))
    }
}

/// Attaches to real processes through the Win32 API
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessProvider;

impl ProcessProvider for SystemProcessProvider {
    type Binding = ProcessHandle;

    fn attach(&self, process_name: &str) -> Result<ProcessHandle> {
        ProcessHandle::find_and_open(process_name)
    }
}
