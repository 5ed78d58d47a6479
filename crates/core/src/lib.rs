//! # flamewatch
//!
//! Live profiler dashboard core: the producer wire protocol, a mergeable
//! flame tree, its layout and labels, the status bar model, and the
//! per-connection session state machine.
//!
//! Nothing here touches a DOM or a socket. The browser front end
//! (`flamewatch_web`) and the native client (`flamewatch_cli`) plug in
//! through [`session::SessionHost`] and [`widget::FlameWidget`].
//!
//! ## Quick Start
//!
//! ```
//! use flamewatch::prelude::*;
//!
//! let mut graph = FlameGraph::new(FlameGraphConfig::default());
//! graph.render(&FrameNode::new("root", 10).with_children(vec![FrameNode::new("main", 10)]));
//! graph.set_width(800);
//! assert_eq!(graph.rows(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`protocol`]: inbound `sample`/`info` messages and the `data` request
//! - [`flame`]: arena flame tree with merge and search
//! - [`layout`]: icicle geometry, palette and transitions
//! - [`session`]: connection lifecycle, timers and dispatch

pub mod clock;
pub mod config;
pub mod controller;
pub mod flame;
pub mod float_fmt;
pub mod label;
pub mod layout;
pub mod location;
pub mod protocol;
pub mod session;
pub mod status;
pub mod widget;

/// Prelude module for convenient imports.
///
/// ```
/// use flamewatch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{ConfigError, DashboardConfig};
    pub use crate::controller::FlameGraphController;
    pub use crate::flame::{FlameTree, NodeId, SearchSummary};
    pub use crate::location::{LocationError, PageLocation};
    pub use crate::protocol::{FrameNode, InfoMessage, Message, ProtocolError, SampleMessage};
    pub use crate::session::{
        ConnectionState, Dispatch, HostError, Session, SessionError, SessionHost, TimerHandle,
        TimerKind,
    };
    pub use crate::status::{PlayIcon, StatusBar, StatusColor, StatusField};
    pub use crate::widget::{FlameGraph, FlameGraphConfig, FlameWidget};
}
