//! Shared test doubles and story fixtures for the Lifeline story player.

mod clock;
mod rng;
mod source;
mod story;

pub use clock::FixedClock;
pub use rng::{MockRng, SequenceRng};
pub use source::{FailingStorySource, InMemoryStorySource};
pub use story::{StoryBuilder, choice, random, single};
