use std::sync::atomic::{AtomicI32, Ordering};

/// Identity of a calling thread, as recorded in object ownership and locks.
///
/// Tokens are small positive integers handed out on first use, so they can
/// be returned through numeric attributes such as `PROPERTY_OWNER`.
pub type ThreadToken = i32;

static NEXT_TOKEN: AtomicI32 = AtomicI32::new(1);

thread_local! {
    static TOKEN: ThreadToken = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
}

/// Token of the calling thread
pub fn current_thread() -> ThreadToken {
    TOKEN.with(|token| *token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_stable_per_thread() {
        assert_eq!(current_thread(), current_thread());
        assert!(current_thread() > 0);
    }

    #[test]
    fn test_tokens_differ_across_threads() {
        let here = current_thread();
        let there = std::thread::spawn(current_thread).join().unwrap();
        assert_ne!(here, there);
    }
}
