//! # kinetic-stage: tracked-body control runtime
//!
//! Turns webcam landmark tracking into smoothed control values that drive a
//! reactive stage. The work is expressed as a small dataflow graph that is
//! re-evaluated once per display refresh.
//!
//! ## Architecture
//!
//! - **Tracking**: camera and landmark-detector capabilities (external; synthetic
//!   stand-ins provided)
//! - **Signal**: metric extraction from point sets and per-channel smoothing
//! - **Graph**: typed node/edge model, deterministic topological execution
//! - **Runtime**: session lifecycle, frame scheduler, editing bridge
//! - **Preview**: diagnostic images, rendered for observed nodes only
//! - **Stage**: the primary reactive output
//!
//! ## Configuration
//!
//! Settings are read from `stage.toml` (or `.json`) under the platform
//! config directory `dev.kinetic-stage`:
//!
//! - **Linux**: `~/.config/dev.kinetic-stage/`
//! - **macOS**: `~/Library/Application Support/dev.kinetic-stage/`
//! - **Windows**: `%APPDATA%\dev.kinetic-stage\`
//!
//! ## Example
//!
//! ```ignore
//! use kinetic_stage::{
//!     config::StageConfig,
//!     graph::build_default_graph,
//!     runtime::{FrameScheduler, ManualTicker, RuntimeContext},
//!     stage::ReactiveStage,
//!     tracking::{SyntheticFrameSource, SyntheticLandmarkSource},
//! };
//!
//! let config = StageConfig::default();
//! let (graph, ids) = build_default_graph()?;
//! let context = RuntimeContext::create(
//!     Box::new(SyntheticFrameSource::new(640, 360)),
//!     Box::new(SyntheticLandmarkSource::new()),
//! );
//! let stage = ReactiveStage::new(config.stage, config.calibration.jaw_max);
//! let mut scheduler =
//!     FrameScheduler::new(&config, context, graph, Box::new(stage), ManualTicker::new());
//!
//! scheduler.graph_mut().set_observed(ids.mapper, true)?;
//! scheduler.start()?;
//! while let Some(outcome) = scheduler.pump() {
//!     println!("{:?}", outcome);
//! }
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod preview;
pub mod runtime;
pub mod signal;
pub mod stage;
pub mod tracking;
pub mod types;

// Re-export commonly used types
pub use config::StageConfig;
pub use error::{AcquisitionError, Result, StageError};
pub use graph::{build_default_graph, DataflowGraph, GraphError, NodeId, NodeType};
pub use runtime::{FrameScheduler, RuntimeBridge, RuntimeContext, SchedulerState, TickOutcome};
pub use signal::{ControlSmoother, MetricExtractor};
pub use stage::{ReactiveStage, StageRenderer};
pub use types::{ControlValues, Frame, Landmark, SubjectKind, SubjectPointSet};
