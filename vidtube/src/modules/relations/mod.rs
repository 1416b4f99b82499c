//! Like and subscription relations: read-side facts and write-side toggles.

mod index;
mod toggle;

pub use entity::like::TargetKind;
pub use index::{FactSet, RelationFacts, RelationIndex};
pub use toggle::{ToggleEngine, Toggled};

/// Which relation collection a fact or toggle addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// Likes on a video, comment or post
    Like(TargetKind),
    /// Subscriptions to a channel
    Subscription,
}
