// Keep-awake toggle state, independent of the browser API that backs it.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WakeCommand {
    Acquire,
    Release,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeepAwake {
    supported: bool,
    /// User wants the screen kept on.
    enabled: bool,
    /// A lock is currently held.
    held: bool,
    /// An acquire request is in flight.
    pending: bool,
    /// A release we asked for is in flight.
    releasing: bool,
}

impl KeepAwake {
    pub fn new(supported: bool) -> Self {
        Self {
            supported,
            ..Default::default()
        }
    }

    pub fn toggle(&mut self) -> Option<WakeCommand> {
        if !self.supported {
            return None;
        }
        self.enabled = !self.enabled;
        if self.enabled {
            self.request()
        } else if self.held && !self.releasing {
            self.releasing = true;
            Some(WakeCommand::Release)
        } else {
            None
        }
    }

    /// Page became visible again; the platform drops locks while hidden.
    pub fn on_visible(&mut self) -> Option<WakeCommand> {
        if self.enabled { self.request() } else { None }
    }

    /// Returns `Release` when the user switched off while the request was in flight.
    pub fn on_acquired(&mut self) -> Option<WakeCommand> {
        self.pending = false;
        self.held = true;
        if self.enabled {
            None
        } else {
            self.releasing = true;
            Some(WakeCommand::Release)
        }
    }

    pub fn on_acquire_failed(&mut self) {
        self.pending = false;
        self.enabled = false;
    }

    /// Returns `Acquire` when the user switched back on while our own
    /// release was in flight. A platform-initiated release waits for
    /// `on_visible` instead.
    pub fn on_released(&mut self) -> Option<WakeCommand> {
        self.held = false;
        let requested = std::mem::take(&mut self.releasing);
        if requested && self.enabled {
            self.request()
        } else {
            None
        }
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn label(&self) -> &'static str {
        match (self.supported, self.enabled) {
            (false, _) => "Keep Awake (Unsupported)",
            (true, true) => "Allow Sleep",
            (true, false) => "Keep Awake",
        }
    }

    fn request(&mut self) -> Option<WakeCommand> {
        if self.held || self.pending {
            return None;
        }
        self.pending = true;
        Some(WakeCommand::Acquire)
    }
}
