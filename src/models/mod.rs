//! Records carried through a pipeline stage.
//!
//! The collectors never look inside an event or a group; these types exist so producers,
//! consumers and the driver binary have something concrete to pass around.

pub mod event;
pub mod group;

pub use event::*;
pub use group::*;
