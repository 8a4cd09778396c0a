use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::error;
use path_clean::PathClean;
use tempfile::NamedTempFile;

const CONFIG_FILE: &str = "config.yml";

pub fn file_writer<W>(w: W) -> BufWriter<W>
where
    W: Write,
{
    BufWriter::with_capacity(131_072, w)
}

pub fn get_exe_path() -> PathBuf {
    let default_path = std::path::PathBuf::from("./");
    let current_exe = std::env::current_exe();
    match current_exe {
        Ok(exe) => {
            match fs::read_link(&exe) {
                Ok(f) => f.parent().map_or(default_path, std::path::Path::to_path_buf),
                Err(_) => exe.parent().map_or(default_path, std::path::Path::to_path_buf)
            }
        }
        Err(_) => default_path
    }
}

/// `config.yml` next to the executable if it exists, otherwise in the current directory.
pub fn get_default_config_file_path() -> String {
    let default_path = get_exe_path().join(CONFIG_FILE);
    String::from(if default_path.exists() {
        default_path.to_str().unwrap_or(CONFIG_FILE)
    } else {
        CONFIG_FILE
    })
}

pub fn get_working_path(wd: &str) -> String {
    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    if wd.is_empty() {
        String::from(current_dir.to_str().unwrap_or("."))
    } else {
        let work_path = std::path::PathBuf::from(wd);
        let _ = fs::create_dir_all(&work_path);
        let wdpath = fs::metadata(&work_path).map_or(None, |md| if md.is_dir() && !md.permissions().readonly() {
            work_path.canonicalize().ok()
        } else {
            error!("Path not found {:?}", &work_path);
            None
        });
        let rp: PathBuf = wdpath.map_or_else(|| current_dir.join(wd), |d| d);
        rp.canonicalize().map_or_else(|_| {
            error!("Path not found {:?}", &rp);
            String::from("./")
        }, |ap| String::from(ap.to_str().unwrap_or("./")))
    }
}

#[inline]
/// Relative paths are resolved against the working dir.
pub fn get_file_path(wd: &str, path: Option<PathBuf>) -> Option<PathBuf> {
    path.map(|p| if p.is_relative() {
        let pb = PathBuf::from(wd);
        pb.join(&p).clean()
    } else {
        p
    })
}

/// Writes `content` into a temp file beside `path` and renames it into place,
/// so readers never observe a partially written file.
pub fn write_atomically(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;
    let mut tmp_file = NamedTempFile::new_in(&parent)?;
    {
        let mut writer = file_writer(tmp_file.as_file_mut());
        writer.write_all(content)?;
        writer.flush()?;
    }
    tmp_file.persist(path).map_err(|err| err.error)?;
    Ok(())
}
