//! # FIM - Find IMage
//!
//! FIM is a terminal-first front end for image similarity search: describe
//! a concept in plain language and rank the images in a directory by how
//! well they match it. The embedding model lives in an external scoring
//! engine that FIM runs as a long-lived subprocess.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`engine`] - Scoring engine subprocess lifecycle and wire protocol
//! - [`candidates`] - Image file discovery under the search path
//! - [`rank`] - Deterministic ordering and top-K truncation of scores
//! - [`search`] - One-shot orchestration of a full query cycle
//! - [`output`] - Result formatting (ranked lines or JSON)
//!
//! ## Quick Start
//!
//! ```ignore
//! use fim::engine::{EngineConfig, EngineSession};
//! use fim::rank::rank;
//!
//! let mut session = EngineSession::new(EngineConfig::default());
//! session.start(&["cat.jpeg".into(), "dog.jpeg".into()]).unwrap();
//!
//! let scores = session.query(&["a sleeping dog".into()]).unwrap();
//! for item in rank(&scores, 5) {
//!     println!("{} {}", item.name, item.score);
//! }
//!
//! session.close();
//! ```
//!
//! ## Engine contract
//!
//! The engine is launched with `--interactive` plus the candidate files as
//! positional arguments, reads one request line per query batch from stdin,
//! and answers each with one JSON line mapping candidate names to scores.
//! The literal payload `quit` ends it. Anything with that contract works;
//! the tests drive the session against a shell-script stand-in.

pub mod candidates;
pub mod engine;
pub mod output;
pub mod rank;
pub mod search;
