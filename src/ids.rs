use uuid::Uuid;

// Prefixes keep the two record families recognizable in exported data;
// uniqueness comes from the uuid payload.

pub fn event_id() -> String {
    prefixed('e')
}

pub fn registration_id() -> String {
    prefixed('r')
}

/// Short confirmation code shown to the attendee. Not an identity:
/// lookups always go through the registration id.
pub fn confirmation_code() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("R{}", hex[..6].to_uppercase())
}

fn prefixed(prefix: char) -> String {
    format!("{prefix}{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_carry_their_prefix() {
        assert!(event_id().starts_with('e'));
        assert!(registration_id().starts_with('r'));
    }

    #[test]
    fn ids_do_not_collide() {
        let ids: HashSet<String> = (0..1000).map(|_| event_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn confirmation_codes_are_short_and_uppercase() {
        let code = confirmation_code();
        assert_eq!(code.len(), 7);
        assert!(code.starts_with('R'));
        assert!(code[1..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
