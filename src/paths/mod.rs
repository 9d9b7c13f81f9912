pub mod path;

pub use path::{normalize, os_path_to_string, parent_dir, relative_path, relative_target, same_dir};
