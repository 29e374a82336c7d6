pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::{all_backends, gzip_options, json_object};
