/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Marker prefix on identifiers that exist only locally and have not been
/// persisted by the backend yet.
pub const PENDING_ID_PREFIX: &str = "new-";

/// Whether an identifier denotes a not-yet-persisted entity.
pub fn is_pending_id(id: &str) -> bool {
    id.starts_with(PENDING_ID_PREFIX)
}

/// Generate a fresh local-only identifier, e.g. `new-variant-<uuid>`.
pub fn new_local_id(kind: &str) -> String {
    format!("{PENDING_ID_PREFIX}{kind}-{}", uuid::Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_ids_carry_pending_marker() {
        let id = new_local_id("photo");
        assert!(id.starts_with("new-photo-"));
        assert!(is_pending_id(&id));
    }

    #[test]
    fn local_ids_are_unique() {
        assert_ne!(new_local_id("variant"), new_local_id("variant"));
    }

    #[test]
    fn stored_ids_are_not_pending() {
        assert!(!is_pending_id("clx1a2b3c"));
        assert!(!is_pending_id(""));
    }
}
