//! Tracking for independent loads that a page waits on together.
//!
//! Each request runs in its own task and settles its own `Loadable`; one
//! failure does not cancel the others. The page renders once all are settled.

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Loadable<T> {
    #[default]
    Pending,
    Ready(T),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Pending,
    Ready,
    Failed(String),
}

impl<T> Loadable<T> {
    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Loadable::Ready(value),
            Err(err) => Loadable::Failed(err.to_string()),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn status(&self) -> LoadStatus {
        match self {
            Loadable::Pending => LoadStatus::Pending,
            Loadable::Ready(_) => LoadStatus::Ready,
            Loadable::Failed(message) => LoadStatus::Failed(message.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Joined {
    /// At least one load is still running
    Waiting,
    Ready,
    /// Everything settled and some loads failed
    Failed(Vec<String>),
}

/// Joins the statuses of several loads; waits for all of them to settle
pub fn join_all(statuses: &[LoadStatus]) -> Joined {
    if statuses.iter().any(|s| *s == LoadStatus::Pending) {
        return Joined::Waiting;
    }
    let errors: Vec<String> = statuses
        .iter()
        .filter_map(|s| match s {
            LoadStatus::Failed(message) => Some(message.clone()),
            _ => None,
        })
        .collect();
    if errors.is_empty() {
        Joined::Ready
    } else {
        Joined::Failed(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_waits_for_every_load() {
        let failed = Loadable::<u8>::from_result(Err::<u8, _>("timeout"));
        let pending = Loadable::<u8>::Pending;
        assert_eq!(join_all(&[failed.status(), pending.status()]), Joined::Waiting);
    }

    #[test]
    fn test_join_collects_failures_after_settling() {
        let ready = Loadable::Ready(1);
        let failed = Loadable::<i32>::Failed("HTTP error: 500".to_string());
        assert_eq!(
            join_all(&[ready.status(), failed.status()]),
            Joined::Failed(vec!["HTTP error: 500".to_string()])
        );
        assert_eq!(ready.ready(), Some(&1));
    }

    #[test]
    fn test_join_ready() {
        assert_eq!(join_all(&[LoadStatus::Ready, LoadStatus::Ready]), Joined::Ready);
        assert_eq!(join_all(&[]), Joined::Ready);
    }
}
