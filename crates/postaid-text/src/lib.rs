#![forbid(unsafe_code)]

//! Text normalization for Post Aid search.
//!
//! - [`normalize`] - NFC composition plus lowercase
//! - [`chosung`] - Hangul syllables reduced to their initial consonants
//! - [`SearchKey`] - a field's normalized and chosung forms, ready to match
//! - [`Query`] - a trimmed, normalized, non-empty query
//!
//! # Example
//! ```
//! use postaid_text::{Query, SearchKey};
//!
//! let tenant = SearchKey::new("홍길동");
//! assert!(tenant.contains(&Query::parse("ㅎ").unwrap()));
//! assert!(Query::parse("   ").is_none());
//! ```

pub mod chosung;
pub mod search;

pub use chosung::{chosung, initial_consonant};
pub use search::{Query, SearchKey, match_ranges, normalize};
