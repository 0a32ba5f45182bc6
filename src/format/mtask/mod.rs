//! Mtask: the canonical on-disk JSON format
//!
//! A document is a flat JSON array of records in depth-first pre-order:
//!
//! ```json
//! [
//!   {
//!     "_id": "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
//!     "type": "task",
//!     "name": "buy milk",
//!     "indent": 0,
//!     "parent": null,
//!     "data": {"status": "todo", "created": null, "finished": false, "modified": null}
//!   }
//! ]
//! ```
//!
//! Sections and files carry `"data": {}`.

mod lexer;
mod render;

pub use lexer::MtaskLexer;
pub use render::MtaskRenderer;
