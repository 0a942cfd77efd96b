use sha256::digest;

const POSTER_ID_LEN: usize = 6;

/// Produces the anonymised per-thread identifier shown next to a post.
pub trait PosterId {
    fn poster_id(&self, ip: &str, thread: u64, board: &str) -> String;
}

/// Salted double hash of the poster's address, thread and board, cut to
/// six hex characters.
#[derive(Debug, Clone, Default)]
pub struct SaltedPosterId {
    salt: String,
}

impl SaltedPosterId {
    pub fn new(salt: &str) -> SaltedPosterId {
        SaltedPosterId { salt: salt.to_string() }
    }
}

impl PosterId for SaltedPosterId {
    fn poster_id(&self, ip: &str, thread: u64, board: &str) -> String {
        let inner = digest(format!("{}{}{}{}", ip, self.salt, board, thread));
        let mut id = digest(format!("{}{}", inner, self.salt));
        id.truncate(POSTER_ID_LEN);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poster_id_shape() {
        let ids = SaltedPosterId::new("pepper");
        let id = ids.poster_id("10.0.0.1", 100, "b");

        assert_eq!(id.len(), POSTER_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_poster_id_is_stable_per_thread() {
        let ids = SaltedPosterId::new("pepper");

        assert_eq!(ids.poster_id("10.0.0.1", 100, "b"), ids.poster_id("10.0.0.1", 100, "b"));
        assert_ne!(ids.poster_id("10.0.0.1", 100, "b"), ids.poster_id("10.0.0.1", 101, "b"));
        assert_ne!(ids.poster_id("10.0.0.1", 100, "b"), ids.poster_id("10.0.0.2", 100, "b"));
    }

    #[test]
    fn test_salt_changes_ids() {
        let a = SaltedPosterId::new("pepper");
        let b = SaltedPosterId::new("paprika");

        assert_ne!(a.poster_id("10.0.0.1", 100, "b"), b.poster_id("10.0.0.1", 100, "b"));
    }
}
