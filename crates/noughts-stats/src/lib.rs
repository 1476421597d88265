//! Summary statistics for training reports.
//!
//! The genetic algorithm reports the spread of fitness scores and genome sizes of
//! every generation. This crate provides the summaries it uses.
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//!
//! # Examples
//!
//! ```
//! use noughts_stats::descriptive::DescriptiveStats;
//!
//! let fitness = [12.0, -3.0, 40.0, 7.0];
//! let stats = DescriptiveStats::new(fitness).unwrap();
//! assert_eq!(stats.count, 4);
//! assert_eq!(stats.max, 40.0);
//! assert_eq!(stats.median, 9.5);
//! ```

pub mod descriptive;
