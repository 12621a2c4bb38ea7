//! Display window and keyboard command input

use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::video::{Command, CommandInput, DisplaySink, Frame};
use crate::{Error, Result};

/// Window refresh cap; also bounds the per-frame key poll wait
const TARGET_FPS: usize = 30;

/// On-screen window implementing both [`DisplaySink`] and [`CommandInput`]
///
/// `q` quits, `f` starts a focus change. The frame-rate limiter inside
/// `update_with_buffer` is the render loop's bounded blocking point.
pub struct VideoWindow {
    window: Window,
}

impl VideoWindow {
    /// Open a window sized to the frame source
    ///
    /// # Errors
    ///
    /// Returns error if the window cannot be created
    pub fn open(title: &str, width: usize, height: usize) -> Result<Self> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::Display(e.to_string()))?;
        window.set_target_fps(TARGET_FPS);

        Ok(Self { window })
    }
}

impl DisplaySink for VideoWindow {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        self.window
            .update_with_buffer(frame.pixels(), frame.width().max(1), frame.height().max(1))
            .map_err(|e| Error::Display(e.to_string()))?;
        Ok(())
    }
}

impl CommandInput for VideoWindow {
    fn poll_command(&mut self) -> Option<Command> {
        if !self.window.is_open() || self.window.is_key_pressed(Key::Q, KeyRepeat::No) {
            return Some(Command::Quit);
        }
        if self.window.is_key_pressed(Key::F, KeyRepeat::No) {
            return Some(Command::ChangeFocus);
        }
        None
    }
}
