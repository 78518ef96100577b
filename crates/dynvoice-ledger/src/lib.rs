//! dynvoice Channel Ledger
//!
//! In-memory, per-guild record of the voice channels under management.
//!
//! # Design
//!
//! The ledger keeps two views of the same membership:
//!
//! - a keyed map from [`ChannelId`] to [`ChannelEntry`] for O(1) occupancy updates
//! - an ordered sequence giving each channel its position in the managed set
//!
//! Every mutator keeps both views in agreement. Ordering is derived once, at
//! seed time, from the numeric suffix of each channel's display name
//! (see [`Ordinal`]); channels created later are appended at the tail.

mod entry;
mod id;
mod ledger;
mod ordinal;

pub use entry::{ChannelEntry, SeedChannel};
pub use id::{ChannelId, GuildId};
pub use ledger::{ChannelLedger, LedgerSnapshot};
pub use ordinal::{channel_name, Ordinal};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_name_round_trips_through_ordinal() {
        let name = channel_name("Voice", 7);
        assert_eq!(name, "Voice 7");
        assert_eq!(Ordinal::parse(&name, "Voice"), Ordinal::Parsed(7));
    }
}
