//! # etl-pipeline
//!
//! A synchronous Extract-Transform-Load engine with batched commits,
//! rollback and a priority-ordered hook bus.
//!
//! ## Features
//!
//! - **Lazy extraction** pulling one item at a time from any sequence
//! - **Buffered transforms** whose output can be replayed by the loader
//! - **Flush / rollback** batching driven by a threshold or by listeners
//! - **Hooks** on every stage, able to skip items, stop the run or ignore errors
//!
//! ## Quick Start
//!
//! ```rust
//! use etl_pipeline::etl::{EtlTool, Pairs};
//! use etl_pipeline::loader::ArrayLoader;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let sink = Rc::new(RefCell::new(ArrayLoader::new(false)));
//!
//! let mut etl = EtlTool::<Vec<&str>, &str>::new()
//!     .transform_with(|item: &&str, key, decision| {
//!         if item.is_empty() {
//!             decision.skip_current_item();
//!         }
//!         Ok(Pairs::once(key.clone(), item.to_uppercase()))
//!     })
//!     .loader(Rc::clone(&sink))
//!     .flush_count(100)
//!     .on_end(|event| {
//!         println!("loaded {:?} items", event.counter());
//!         Ok(())
//!     })
//!     .build()
//!     .unwrap();
//!
//! let summary = etl.process(vec!["a", "", "b"]).unwrap();
//! assert_eq!(summary.total, 2);
//! assert_eq!(sink.borrow().values(), vec!["A", "B"]);
//! ```
//!
//! ## Modules
//!
//! - [`etl`] - Pipeline engine, stage traits and builder
//! - [`hooks`] - Topics, events and the listener bus
//! - [`extractor`] - Text, CSV, JSON and file sources
//! - [`loader`] - In-memory, text, JSON and CSV sinks

pub mod etl;
pub mod extractor;
pub mod hooks;
pub mod loader;

pub use etl::{Etl, EtlError, EtlTool, Key, Pairs};
