//! Access control gate

use crate::domain::{CallerIdentity, Reservation};

/// Only the owner may cancel. Roles never override ownership.
pub fn can_cancel(caller: &CallerIdentity, reservation: &Reservation) -> bool {
    reservation.is_owned_by(&caller.user_id)
}

pub fn can_manage_catalog(caller: &CallerIdentity) -> bool {
    caller.is_admin()
}

/// Owner id as the caller may see it: own reservations only.
pub fn redact_for<'a>(caller: &CallerIdentity, reservation: &'a Reservation) -> Option<&'a str> {
    reservation
        .is_owned_by(&caller.user_id)
        .then_some(reservation.owner_id.as_str())
}
