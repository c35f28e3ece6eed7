//! Raw transport for printer-ready jobs.

use std::io::Write;
use std::path::Path;

use tracing::{debug, info};

use crate::error::PrintError;

/// Write a job to a device node (`/dev/usb/lp0`) or a plain file.
pub fn write_raw_to_device(path: &Path, data: &[u8]) -> Result<(), PrintError> {
    let mut file = std::fs::OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
    file.write_all(data)?;
    file.flush()?;
    info!(device = %path.display(), bytes = data.len(), "raw job written");
    Ok(())
}

/// Send a RAW job through the Windows spooler.
pub fn send_raw_to_printer(printer_name: &str, data: &[u8]) -> Result<(), PrintError> {
    #[cfg(target_os = "windows")]
    {
        windows::send_raw(printer_name, data)?;
        info!(printer = printer_name, bytes = data.len(), "raw job spooled");
        Ok(())
    }

    #[cfg(not(target_os = "windows"))]
    {
        debug!(printer = printer_name, bytes = data.len(), "spooler unavailable");
        Err(PrintError::Printer(format!(
            "cannot spool to '{printer_name}': the RAW spooler is only available on Windows, configure a device path instead"
        )))
    }
}

/// Installed printers; always empty off Windows.
pub fn list_printers() -> Result<Vec<String>, PrintError> {
    #[cfg(target_os = "windows")]
    {
        windows::list()
    }

    #[cfg(not(target_os = "windows"))]
    {
        debug!("printer enumeration is Windows only");
        Ok(Vec::new())
    }
}

#[cfg(target_os = "windows")]
mod windows {
    use std::ffi::{OsStr, OsString};
    use std::iter::once;
    use std::os::windows::ffi::{OsStrExt, OsStringExt};
    use std::ptr::null_mut;

    use winapi::shared::minwindef::DWORD;
    use winapi::shared::ntdef::LPWSTR;
    use winapi::um::errhandlingapi::GetLastError;
    use winapi::um::winbase::{FormatMessageW, FORMAT_MESSAGE_FROM_SYSTEM, FORMAT_MESSAGE_IGNORE_INSERTS};
    use winapi::um::winspool::*;

    use crate::error::PrintError;

    fn wide(s: &str) -> Vec<u16> {
        OsStr::new(s).encode_wide().chain(once(0)).collect()
    }

    pub(super) fn send_raw(printer_name: &str, data: &[u8]) -> Result<(), PrintError> {
        let name = wide(printer_name);
        let doc = wide("Kitchen label");
        let raw = wide("RAW");

        unsafe {
            let mut handle: *mut winapi::ctypes::c_void = null_mut();
            if OpenPrinterW(name.as_ptr() as LPWSTR, &mut handle as *mut _ as *mut _, null_mut()) == 0 {
                return Err(last_error(&format!("OpenPrinterW '{printer_name}'")));
            }

            let doc_info = DOC_INFO_1W {
                pDocName: doc.as_ptr() as LPWSTR,
                pOutputFile: null_mut(),
                pDatatype: raw.as_ptr() as LPWSTR,
            };
            if StartDocPrinterW(handle as *mut _, 1, &doc_info as *const _ as *mut _) == 0 {
                let err = last_error("StartDocPrinterW");
                ClosePrinter(handle as *mut _);
                return Err(err);
            }
            if StartPagePrinter(handle as *mut _) == 0 {
                let err = last_error("StartPagePrinter");
                EndDocPrinter(handle as *mut _);
                ClosePrinter(handle as *mut _);
                return Err(err);
            }

            let mut written: DWORD = 0;
            let ok = WritePrinter(handle as *mut _, data.as_ptr() as *mut _, data.len() as DWORD, &mut written);
            let err = (ok == 0).then(|| last_error("WritePrinter"));

            EndPagePrinter(handle as *mut _);
            EndDocPrinter(handle as *mut _);
            ClosePrinter(handle as *mut _);

            if let Some(err) = err {
                return Err(err);
            }
            if written as usize != data.len() {
                return Err(PrintError::Printer(format!("partial write: {written} of {} bytes", data.len())));
            }
        }
        Ok(())
    }

    pub(super) fn list() -> Result<Vec<String>, PrintError> {
        let flags = PRINTER_ENUM_LOCAL | PRINTER_ENUM_CONNECTIONS;
        unsafe {
            let mut needed: DWORD = 0;
            let mut returned: DWORD = 0;
            EnumPrintersW(flags, null_mut(), 4, null_mut(), 0, &mut needed, &mut returned);
            if needed == 0 {
                return Ok(Vec::new());
            }

            let mut buffer = vec![0u8; needed as usize];
            if EnumPrintersW(flags, null_mut(), 4, buffer.as_mut_ptr(), needed, &mut needed, &mut returned) == 0 {
                return Err(last_error("EnumPrintersW"));
            }

            let infos = std::slice::from_raw_parts(buffer.as_ptr() as *const PRINTER_INFO_4W, returned as usize);
            let names = infos
                .iter()
                .filter(|info| !info.pPrinterName.is_null())
                .filter_map(|info| {
                    let mut len = 0;
                    while *info.pPrinterName.offset(len) != 0 {
                        len += 1;
                    }
                    let slice = std::slice::from_raw_parts(info.pPrinterName, len as usize);
                    OsString::from_wide(slice).into_string().ok()
                })
                .collect();
            Ok(names)
        }
    }

    fn last_error(call: &str) -> PrintError {
        let code = unsafe { GetLastError() };
        let mut buf = [0u16; 1024];
        let len = unsafe {
            FormatMessageW(
                FORMAT_MESSAGE_FROM_SYSTEM | FORMAT_MESSAGE_IGNORE_INSERTS,
                std::ptr::null(),
                code,
                0,
                buf.as_mut_ptr(),
                buf.len() as u32,
                std::ptr::null_mut(),
            )
        };
        let msg = if len == 0 {
            format!("OS error {code}")
        } else {
            format!("{} (code {code})", OsString::from_wide(&buf[..len as usize]).to_string_lossy().trim())
        };
        PrintError::Printer(format!("{call} failed: {msg}"))
    }
}
