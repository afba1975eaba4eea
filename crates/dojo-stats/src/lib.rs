//! Statistical helpers for summarizing evolutionary runs.
//!
//! Currently this is limited to descriptive statistics, which the checkpoint
//! writer uses to condense a generation's fitness scores into a single row.
//!
//! # Examples
//!
//! ```
//! use dojo_stats::descriptive::DescriptiveStats;
//!
//! let scores = [2.5, 3.0, 3.5];
//! let stats = DescriptiveStats::new(scores).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! assert_eq!(stats.max, 3.5);
//! ```

pub mod descriptive;
