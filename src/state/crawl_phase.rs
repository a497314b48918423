/// Crawl phase definitions for the breadth-first level schedule
///
/// A crawl moves through `Seeding -> LevelActive(0) -> LevelActive(1) -> ... -> Done`.
use std::fmt;

/// Represents the current phase of one crawl invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Building the level-0 frontier from the start URL and common paths
    Seeding,

    /// Fetching the frontier at the given breadth-first depth
    LevelActive { depth: u32 },

    /// Terminal: the discovered set is final
    Done,
}

impl CrawlPhase {
    /// Returns true if this is the terminal phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns the active depth, if a level is being processed
    pub fn depth(&self) -> Option<u32> {
        match self {
            Self::LevelActive { depth } => Some(*depth),
            _ => None,
        }
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// Seeding may only enter level 0; a level may only advance to the next
    /// depth or finish; Done is final. Seeding may also finish directly when
    /// there is nothing to seed.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        match (self, next) {
            (Self::Seeding, Self::LevelActive { depth: 0 }) => true,
            (Self::Seeding, Self::Done) => true,
            (Self::LevelActive { depth }, Self::LevelActive { depth: next_depth }) => {
                next_depth == depth + 1
            }
            (Self::LevelActive { .. }, Self::Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seeding => write!(f, "seeding"),
            Self::LevelActive { depth } => write!(f, "level {}", depth),
            Self::Done => write!(f, "done"),
        }
    }
}
