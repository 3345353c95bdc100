mod scout;

pub use scout::ScoutError;

pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}
