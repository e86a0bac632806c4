use std::path::Path;

use crate::{Error, Result};

/// Opens a directory in the platform's file manager.
pub fn open_folder(path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Err(Error::InvalidArgument(format!(
            "{} is not a directory",
            path.display()
        )));
    }

    log::debug!("opening {}", path.display());
    open::that(path).map_err(|e| Error::CommandExecution {
        command: "open".to_string(),
        reason: e.to_string(),
    })
}
