//! Paintshop Editor - the asset-editing session
//!
//! Drives one painting session end to end: supervises asynchronous asset
//! loads and record fetches, feeds finished loads through the
//! reconciliation engine, and runs the save/retry flow. Callers poll the
//! session once per tick and react to the events it emits.

mod session;

pub use session::{EditorSession, SavedRecord, SessionEvent};
