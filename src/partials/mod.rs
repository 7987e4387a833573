pub mod array_partial;
