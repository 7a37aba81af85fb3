//! The snapshot diff locating a consumed invite link.

use crate::gateway::InviteLink;

/// Find the invite link consumed between two snapshots of a community's
/// invite list.
///
/// A link counts as consumed when it appears in both snapshots under the
/// same code with a strictly greater use count in `new`. The scan walks
/// `new` in platform order and stops at the first such link.
///
/// Best-effort by construction: if several links were used between the
/// two observations, only the first survivor of the scan is reported.
/// Links absent from `old` (created since the last observation, or
/// vanity links the platform exposes no deltas for) never match, and a
/// `None` result is a normal outcome, not a failure.
pub fn consumed_link<'a>(old: &[InviteLink], new: &'a [InviteLink]) -> Option<&'a InviteLink> {
    new.iter()
        .find(|link| {
            old.iter()
                .any(|prev| prev.code == link.code && link.uses > prev.uses)
        })
}
