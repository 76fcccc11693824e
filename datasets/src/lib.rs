//! `carebill-datasets` reads delimited patient records into a [`carebill::table::Table`].
//!
//! ## The Big Picture
//!
//! Loading is the first stage of the billing pipeline. The reader expects a header row, infers a
//! type for every column from its cells and hands back a typed table; nothing is transformed or
//! dropped at this point.
//!
//! Column types are inferred the same way for every column:
//!
//! * every cell parses as a 64-bit integer: `Int`
//! * every non-empty cell parses as a float: `Float`, with empty cells stored as `NaN`
//! * anything else: `Str`
//!
//! ## Using the loader
//!
//! ```no_run
//! let table = carebill_datasets::load("healthcare_dataset.csv")?;
//! println!("{} patients, columns {:?}", table.nrows(), table.column_names());
//! # Ok::<(), carebill_datasets::Error>(())
//! ```
//!
//! Files ending in `.gz` are decompressed on the fly. With the `generate` feature the crate also
//! produces synthetic tables shaped like the real dataset, see [`generate::healthcare_records`].

mod dataset;
mod error;

#[cfg(feature = "generate")]
pub mod generate;

pub use dataset::{load, table_from_csv, table_from_gz_csv, write_csv};
pub use error::{Error, Result};
