pub mod path;
pub mod property_list;

pub use path::{
    compile_criteria, escape_tags, glob_to_regex, to_id_segment, unescape_quoted, Glob,
};
pub use property_list::PropertyList;
