use log::debug;

/// Where a server request made on behalf of a view stands.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FetchState<T> {
    #[default]
    Idle,
    Pending,
    Ready(T),
    /// Holds the message the view shows instead of the data
    Failed(String),
}

impl<T> FetchState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// A fetch whose replies are matched against the request sent last.
///
/// Generations come from the owner and must not repeat while it lives; a
/// reply carrying any other generation, or arriving when nothing is pending,
/// is dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackedFetch<T> {
    state: FetchState<T>,
    generation: u64,
}

impl<T> TrackedFetch<T> {
    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Mark a new request as in flight. Any earlier request becomes stale.
    pub fn start(&mut self, generation: u64) {
        self.generation = generation;
        self.state = FetchState::Pending;
    }

    pub fn clear(&mut self) {
        self.state = FetchState::Idle;
    }

    /// Store a reply. Returns false if it was stale and dropped.
    pub fn resolve(&mut self, generation: u64, reply: Result<T, String>) -> bool {
        if generation != self.generation || !self.state.is_pending() {
            debug!(
                "Dropping reply for generation {} (current {}, pending {})",
                generation,
                self.generation,
                self.state.is_pending()
            );
            return false;
        }
        self.state = match reply {
            Ok(data) => FetchState::Ready(data),
            Err(message) => FetchState::Failed(message),
        };
        true
    }
}
