pub mod index;
pub mod session;

pub use index::{
    build_find_index, build_find_index_with, count_find_matches, locate_find_match, FindIndex,
    MatchLocation,
};
pub use session::FindSession;
