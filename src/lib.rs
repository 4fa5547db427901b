//! Parse context-free grammars with an Earley chart parser or a canonical
//! LR(k) parser.
//!
//! ```
//! use twinparse::{production, terminals, EarleyParser, Grammar, LrConfig, LrParser, LrTable};
//!
//! let grammar = Grammar::build(
//!     [production!(S => "a" S "b"), production!(S =>)],
//!     "S",
//! )
//! .unwrap();
//!
//! let tokens = terminals(["a", "a", "b", "b"]);
//!
//! let forest = EarleyParser::new(&grammar).parse(&tokens).accepted().unwrap();
//! assert_eq!(forest.flatten_to_string(), "(S a (S a (S) b) b)");
//!
//! let table = LrTable::build(&grammar, &LrConfig::default()).unwrap();
//! let tree = LrParser::new(&table).parse(&tokens).accepted().unwrap();
//! assert_eq!(tree.flatten_to_string(), "(S a (S a (S) b) b)");
//! ```

pub use twinparse_core::*;
