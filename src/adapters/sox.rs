//! Sound backend that shells out to sox's `play`.
//!
//! Each playback is one `play -q <file>` child process.  Finished is
//! detected by polling `try_wait`; stop kills the child.  Requires sox on
//! `PATH`.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Child, Command, Stdio};

use log::{debug, warn};

use crate::app::ports::SoundBackend;
use crate::error::SoundError;

pub struct SoxPlayer {
    program: OsString,
}

impl Default for SoxPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl SoxPlayer {
    pub fn new() -> Self {
        Self::with_program("play")
    }

    /// Use another player binary taking the same `-q <file>` arguments.
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl SoundBackend for SoxPlayer {
    type Handle = Child;

    fn play(&mut self, file: &Path) -> Result<Child, SoundError> {
        debug!("SoxPlayer: play {}", file.display());
        Command::new(&self.program)
            .arg("-q")
            .arg(file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|e| SoundError::StartFailed {
                file: file.display().to_string(),
                reason: e.to_string(),
            })
    }

    fn is_playing(&mut self, child: &mut Child) -> bool {
        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                if !status.success() {
                    warn!("SoxPlayer: pid {} exited with {}", child.id(), status);
                }
                false
            }
            Err(e) => {
                warn!("SoxPlayer: cannot poll pid {}: {}", child.id(), e);
                false
            }
        }
    }

    fn stop(&mut self, child: &mut Child) -> Result<(), SoundError> {
        if !self.is_playing(child) {
            debug!("SoxPlayer: pid {} already finished", child.id());
            return Ok(());
        }
        debug!("SoxPlayer: killing pid {}", child.id());
        child
            .kill()
            .map_err(|e| SoundError::StopFailed(e.to_string()))?;
        // Reap so the child does not linger as a zombie.
        child
            .wait()
            .map(|_| ())
            .map_err(|e| SoundError::StopFailed(e.to_string()))
    }
}
