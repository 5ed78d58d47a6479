//! Status bar model: connection indicator, play icon and process fields.

use crate::clock::format_hhmmss;
use crate::float_fmt::fmt_number;
use crate::protocol::{InfoMessage, SampleMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Green,
    Yellow,
    Red,
}

impl StatusColor {
    pub fn css_class(self) -> &'static str {
        match self {
            StatusColor::Green => "bg-green-700",
            StatusColor::Yellow => "bg-yellow-700",
            StatusColor::Red => "bg-red-700",
        }
    }

    pub fn all() -> &'static [StatusColor] {
        &[StatusColor::Green, StatusColor::Yellow, StatusColor::Red]
    }
}

/// Icon on the play/pause button; shows the action a click would take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayIcon {
    Play,
    #[default]
    Pause,
}

impl PlayIcon {
    pub fn css_class(self) -> &'static str {
        match self {
            PlayIcon::Play => "fa-play",
            PlayIcon::Pause => "fa-pause",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            PlayIcon::Play => "▶",
            PlayIcon::Pause => "⏸",
        }
    }
}

/// Text fields of the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusField {
    Duration,
    Samples,
    Cpu,
    Memory,
    Pid,
    Command,
}

impl StatusField {
    pub fn all() -> &'static [StatusField] {
        &[
            StatusField::Duration,
            StatusField::Samples,
            StatusField::Cpu,
            StatusField::Memory,
            StatusField::Pid,
            StatusField::Command,
        ]
    }

    /// DOM id of the element showing this field.
    pub fn element_id(self) -> &'static str {
        match self {
            StatusField::Duration => "duration",
            StatusField::Samples => "samples",
            StatusField::Cpu => "cpu",
            StatusField::Memory => "memory",
            StatusField::Pid => "pid",
            StatusField::Command => "command",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBar {
    pub duration: String,
    pub samples: String,
    pub cpu: String,
    pub memory: String,
    pub pid: String,
    pub command: String,
    /// `None` until the connection opens.
    pub indicator: Option<StatusColor>,
    pub play_icon: PlayIcon,
}

impl Default for StatusBar {
    fn default() -> Self {
        Self {
            duration: format_hhmmss(0),
            samples: String::new(),
            cpu: String::new(),
            memory: String::new(),
            pid: String::new(),
            command: String::new(),
            indicator: None,
            play_icon: PlayIcon::Pause,
        }
    }
}

impl StatusBar {
    pub fn apply_sample(&mut self, sample: &SampleMessage) {
        self.samples = sample.samples.to_string();
        self.cpu = format!("{}%", fmt_number(&sample.cpu));
        self.memory = format!("{} MB", fmt_number(&sample.memory));
    }

    pub fn apply_info(&mut self, info: &InfoMessage) {
        self.pid = info.pid.to_string();
        self.command = info.command.clone();
    }

    pub fn field(&self, field: StatusField) -> &str {
        match field {
            StatusField::Duration => &self.duration,
            StatusField::Samples => &self.samples,
            StatusField::Cpu => &self.cpu,
            StatusField::Memory => &self.memory,
            StatusField::Pid => &self.pid,
            StatusField::Command => &self.command,
        }
    }

    pub fn indicator_class(&self) -> &'static str {
        self.indicator.map(StatusColor::css_class).unwrap_or("")
    }
}
