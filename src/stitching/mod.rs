mod interface;
mod matching;
mod rule;

pub use interface::{Interface, RuffleSection};
pub use matching::{is_matching, match_interfaces, MatchParams};
pub use rule::{AssemblePattern, Stitches, StitchingRule};
