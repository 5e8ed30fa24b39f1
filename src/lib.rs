//! Page Curl Engine - frame-driven page-turn animation core
//!
//! This library combines a paper-curl physics simulator, a page-turn
//! coordinator with sensory feedback, and a bounded chapter cache that keeps
//! adjacent chapters resident so turns never wait on loading.

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod feedback;
pub mod geometry;
pub mod lighting;
pub mod physics;
pub mod session;
pub mod state;

pub use cache::{ChapterContent, ChapterWindowCache, ContentProvider, PerformanceTier};
pub use config::{AnimationMode, TurnConfiguration};
pub use coordinator::{FrameTicker, TurnCoordinator, TurnEvent, TurnObserver};
pub use feedback::{FeedbackController, HapticSink, SoundSink};
pub use geometry::{MeshVertex, PageMesh};
pub use lighting::LightingModel;
pub use physics::PhysicsSimulator;
pub use session::{LoadState, ReaderSession, SessionEvent};
pub use state::{PhysicsState, TurnDirection, TurnPhase, TurnState};
