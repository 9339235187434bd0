//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// General utility commands
pub mod general;

/// Ledger, history and roster commands
pub mod ledger;

/// Order and menu commands
pub mod orders;

/// Ticket and payment commands
pub mod session;

// Export commands
pub use general::*;
pub use ledger::*;
pub use orders::*;
pub use session::*;
