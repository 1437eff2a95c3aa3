/// Type-state for a remote read
///
/// Tracks where the latest ledger read stands with one enum instead of
/// separate `is_loading` / `error` flags. The displayed counters live
/// elsewhere, so an `Error` here never wipes what the user already sees.
///
/// # Examples
///
/// ```
/// let mut status = DataState::Pending;
///
/// // Read in flight:
/// status = DataState::Loading;
///
/// // Read resolved:
/// status = match reader_result {
///     Ok(state) => DataState::Loaded(state),
///     Err(e) => DataState::Error(e.to_string()),
/// };
/// ```

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DataState<T> {
    /// Nothing requested yet
    #[default]
    Pending,

    /// Request in flight
    Loading,

    /// Last request succeeded
    Loaded(T),

    /// Last request failed with a message
    Error(String),
}

impl<T> DataState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, DataState::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_pending() {
        let state: DataState<u64> = DataState::default();
        assert_eq!(state, DataState::Pending);
        assert!(!state.is_loading());
        assert!(DataState::<u64>::Loading.is_loading());
    }
}
