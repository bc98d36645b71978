/// Run `$body`, then `$clean` even if `$body` panics. The panic is resumed afterwards.
#[cfg(test)]
macro_rules! cleanup {
    ($body:block, $clean:block) => {{
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $body));
        $clean;
        if let Err(e) = result {
            std::panic::resume_unwind(e);
        }
    }};
}
#[cfg(test)]
pub(crate) use cleanup;

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use pretty_assertions::assert_eq;

    #[test]
    fn cleanup_runs_after_panic() {
        let hit = Cell::new(false);
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            cleanup!({ panic!("boom") }, { hit.set(true) });
        }));
        assert!(outcome.is_err());
        assert!(hit.get());
    }

    #[test]
    fn cleanup_runs_after_success() {
        let hit = Cell::new(0);
        cleanup!({ hit.set(hit.get() + 1) }, { hit.set(hit.get() * 10) });
        assert_eq!(hit.get(), 10);
    }
}
